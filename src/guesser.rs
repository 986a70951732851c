use regex::Regex;

/// What a guesser could make of a file name. A missing title means the file
/// is not usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guess {
    pub title: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

pub trait MetadataGuesser: Send + Sync {
    fn guess(&self, filename: &str) -> Guess;
}

const RELEASE_TOKENS: [&str; 24] = [
    "2160p", "1080p", "720p", "480p", "bluray", "blu-ray", "brrip", "bdrip", "dvdrip", "webrip",
    "web-dl", "web", "hdtv", "x264", "x265", "h264", "h265", "hevc", "xvid", "aac", "ac3", "proper",
    "repack", "internal",
];

/// Regex heuristics for the common TV naming schemes.
#[derive(Debug)]
pub struct FilenameGuesser {
    standard_pattern: Regex,
    flexible_pattern: Regex,
    verbose_pattern: Regex,
    absolute_pattern: Regex,
    bracket_pattern: Regex,
    year_pattern: Regex,
}

impl FilenameGuesser {
    pub fn new() -> Self {
        let standard_pattern = Regex::new(
            r"(?i)^(?P<title>.*?)(?:^|[\s._\-\[(]+)S(?P<season>\d{1,3})[\s._-]*E(?P<episode>\d{1,3})",
        )
        .expect("valid standard pattern");

        let flexible_pattern = Regex::new(
            r"(?i)^(?P<title>.*?)\b(?P<season>\d{1,2})x(?P<episode>\d{2,3})\b",
        )
        .expect("valid flexible pattern");

        let verbose_pattern = Regex::new(
            r"(?i)^(?P<title>.*?)\bseason[\s._-]*(?P<season>\d{1,3})[\s._-]*episode[\s._-]*(?P<episode>\d{1,3})",
        )
        .expect("valid verbose pattern");

        // "[Group] Title - 05 (1080p)"
        let absolute_pattern = Regex::new(r"^(?P<title>.*?)\s+-\s+(?P<episode>\d{1,4})(?:v\d)?\b")
            .expect("valid absolute pattern");

        let bracket_pattern =
            Regex::new(r"\[.*?\]|\(.*?\)|\{.*?\}").expect("valid bracket pattern");
        let year_pattern = Regex::new(r"\s(?:19|20)\d{2}$").expect("valid year pattern");

        Self {
            standard_pattern,
            flexible_pattern,
            verbose_pattern,
            absolute_pattern,
            bracket_pattern,
            year_pattern,
        }
    }

    fn clean_title(&self, raw: &str) -> Option<String> {
        let without_brackets = self.bracket_pattern.replace_all(raw, " ");

        let mut words = Vec::new();
        for word in without_brackets.split(|c: char| c == '.' || c == '_' || c.is_whitespace()) {
            let lower = word.to_lowercase();
            if RELEASE_TOKENS.contains(&lower.as_str()) {
                break;
            }
            if !word.is_empty() {
                words.push(word);
            }
        }

        let separators: &[char] = &['.', ' ', '-', '_', ',', '&'];
        let title = words.join(" ");
        let title = self.year_pattern.replace(title.trim_matches(separators), "");
        let title = title.trim_matches(separators).to_string();

        if title.is_empty() { None } else { Some(title) }
    }
}

impl Default for FilenameGuesser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number(captures: &regex::Captures<'_>, name: &str) -> Option<u32> {
    captures.name(name).and_then(|m| m.as_str().parse().ok())
}

impl MetadataGuesser for FilenameGuesser {
    fn guess(&self, filename: &str) -> Guess {
        let stem = match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.contains(' ') => stem,
            _ => filename,
        };

        for pattern in [&self.standard_pattern, &self.verbose_pattern, &self.flexible_pattern] {
            if let Some(captures) = pattern.captures(stem) {
                let title = captures.name("title").and_then(|m| self.clean_title(m.as_str()));
                return Guess {
                    title,
                    season: parse_number(&captures, "season"),
                    episode: parse_number(&captures, "episode"),
                };
            }
        }

        if let Some(captures) = self.absolute_pattern.captures(stem) {
            return Guess {
                title: captures.name("title").and_then(|m| self.clean_title(m.as_str())),
                season: None,
                episode: parse_number(&captures, "episode"),
            };
        }

        Guess {
            title: self.clean_title(stem),
            season: None,
            episode: None,
        }
    }
}
