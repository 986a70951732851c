use regex::Regex;

/// Token users put in a template where the episode tag goes.
pub const PLACEHOLDER: &str = "S00E00";

/// Zero-pads to two digits, or three once the value no longer fits in two.
pub fn pad_number(value: u32) -> String {
    if value > 99 {
        format!("{:03}", value)
    } else {
        format!("{:02}", value)
    }
}

pub fn episode_tag(season: u32, episode: u32) -> String {
    format!("S{}E{}", pad_number(season), pad_number(episode))
}

/// Splits a block of template text into its non-blank lines.
pub fn parse_template_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct ReleaseTemplates {
    literal_pattern: Regex,
    general_pattern: Regex,
}

impl ReleaseTemplates {
    pub fn new() -> Self {
        let literal_pattern =
            Regex::new(&regex::escape(PLACEHOLDER)).expect("valid placeholder pattern");
        let general_pattern =
            Regex::new(r"S\d{2,3}E\d{2,3}").expect("valid season/episode pattern");

        Self {
            literal_pattern,
            general_pattern,
        }
    }

    /// Renders one release string per non-blank template, in order. Any text
    /// shaped like `S##E##` is rewritten too, not only the placeholder.
    pub fn render<S: AsRef<str>>(
        &self,
        season: u32,
        episode: u32,
        fallback: &str,
        templates: &[S],
    ) -> Vec<String> {
        let tag = episode_tag(season, episode);

        let releases: Vec<String> = templates
            .iter()
            .map(AsRef::as_ref)
            .filter(|template| !template.trim().is_empty())
            .map(|template| {
                let release = self.literal_pattern.replace_all(template, tag.as_str());
                self.general_pattern.replace_all(&release, tag.as_str()).into_owned()
            })
            .collect();

        if releases.is_empty() {
            vec![fallback.to_string()]
        } else {
            releases
        }
    }
}

impl Default for ReleaseTemplates {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_releases<S: AsRef<str>>(
    season: u32,
    episode: u32,
    fallback: &str,
    templates: &[S],
) -> Vec<String> {
    ReleaseTemplates::new().render(season, episode, fallback, templates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_number() {
        assert_eq!(pad_number(0), "00");
        assert_eq!(pad_number(7), "07");
        assert_eq!(pad_number(99), "99");
        assert_eq!(pad_number(100), "100");
        assert_eq!(pad_number(999), "999");
    }

    #[test]
    fn test_padding_is_independent() {
        assert_eq!(episode_tag(1, 105), "S01E105");
        assert_eq!(episode_tag(120, 3), "S120E03");
    }

    #[test]
    fn test_parse_template_lines() {
        let lines = parse_template_lines("Show.S00E00.WEB\n\n   \nShow.S00E00.BluRay\n");
        assert_eq!(lines, vec!["Show.S00E00.WEB", "Show.S00E00.BluRay"]);
    }
}
