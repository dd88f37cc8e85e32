//! Acceptance gate for candidate outlines.

use crate::model::Outline;

/// Accepts a candidate only if its entry count lies within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultValidator {
    min_entries: usize,
    max_entries: usize,
}

impl ResultValidator {
    /// Create a validator accepting `min..=max` entries.
    pub fn new(min_entries: usize, max_entries: usize) -> Self {
        Self {
            min_entries,
            max_entries,
        }
    }

    /// Check a candidate. A missing candidate is always rejected.
    pub fn accepts(&self, candidate: Option<&Outline>) -> bool {
        candidate.is_some_and(|outline| {
            (self.min_entries..=self.max_entries).contains(&outline.entries.len())
        })
    }
}

impl Default for ResultValidator {
    fn default() -> Self {
        Self::new(1, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, OutlineEntry};

    fn outline_with(count: usize) -> Outline {
        let entries = (0..count)
            .map(|i| OutlineEntry::new(HeadingLevel::H2, format!("Heading {}", i), 1))
            .collect();
        Outline::new("Title", entries)
    }

    #[test]
    fn test_boundaries() {
        let validator = ResultValidator::default();
        assert!(!validator.accepts(Some(&outline_with(0))));
        assert!(validator.accepts(Some(&outline_with(1))));
        assert!(validator.accepts(Some(&outline_with(100))));
        assert!(!validator.accepts(Some(&outline_with(101))));
    }

    #[test]
    fn test_missing_candidate_rejected() {
        assert!(!ResultValidator::default().accepts(None));
    }

    #[test]
    fn test_custom_bounds() {
        let validator = ResultValidator::new(2, 3);
        assert!(!validator.accepts(Some(&outline_with(1))));
        assert!(validator.accepts(Some(&outline_with(3))));
        assert!(!validator.accepts(Some(&outline_with(4))));
    }
}
