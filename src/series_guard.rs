use crate::error::SeriesConflict;

/// Lowercased and trimmed form titles are compared in.
pub fn normalize(title: &str) -> String {
    title.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Nothing locked yet, this title becomes the job's series.
    Lock,
    Accept,
    Conflict(SeriesConflict),
}

/// Keeps every record of a job on one series. The first accepted title wins
/// and later titles are compared against it case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesGuard {
    locked: Option<String>,
}

impl SeriesGuard {
    pub fn unlocked() -> Self {
        Self { locked: None }
    }

    pub fn locked_to(title: &str) -> Self {
        Self {
            locked: Some(normalize(title)),
        }
    }

    pub fn locked_title(&self) -> Option<&str> {
        self.locked.as_deref()
    }

    pub fn check(&self, title: &str) -> GuardDecision {
        let found = normalize(title);
        match &self.locked {
            None => GuardDecision::Lock,
            Some(locked) if *locked == found => GuardDecision::Accept,
            Some(locked) => GuardDecision::Conflict(SeriesConflict {
                locked: locked.clone(),
                found,
            }),
        }
    }

    pub fn lock(&mut self, title: &str) {
        if self.locked.is_none() {
            self.locked = Some(normalize(title));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_title_locks() {
        let mut guard = SeriesGuard::unlocked();
        assert_eq!(guard.check("The Show"), GuardDecision::Lock);
        guard.lock("The Show");
        assert_eq!(guard.locked_title(), Some("the show"));
        guard.lock("Something Else");
        assert_eq!(guard.locked_title(), Some("the show"));
    }

    #[test]
    fn test_case_insensitive_accept() {
        let guard = SeriesGuard::locked_to("Show");
        assert_eq!(guard.check("show"), GuardDecision::Accept);
        assert_eq!(guard.check("SHOW"), GuardDecision::Accept);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let mut guard = SeriesGuard::unlocked();
        guard.lock("  The Show ");
        assert_eq!(guard.locked_title(), Some("the show"));
        assert_eq!(guard.check("The Show "), GuardDecision::Accept);
        assert_eq!(SeriesGuard::locked_to("Show\t").check(" show"), GuardDecision::Accept);
    }

    #[test]
    fn test_conflict_carries_both_titles() {
        let guard = SeriesGuard::locked_to("Show");
        assert_eq!(
            guard.check("Other Show"),
            GuardDecision::Conflict(SeriesConflict {
                locked: "show".to_string(),
                found: "other show".to_string(),
            })
        );
    }
}
