use std::fmt;

use crate::{Catalog, Isbn, IsbnRule};

/// Consecutive identical readings required before a code is trusted.
pub const DEFAULT_THRESHOLD: u32 = 5;

/// Outcome of observing one decode event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Not yet confirmed across enough frames.
    Ignore,
    Reject(RejectReason),
    Accept(Isbn),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    InvalidFormat { code: String },
    AlreadyRegistered { isbn: String },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InvalidFormat { code } => write!(f, "invalid format: {code}"),
            RejectReason::AlreadyRegistered { isbn } => write!(f, "already registered: {isbn}"),
        }
    }
}

/// Turns a noisy stream of decoded codes into confirmed, validated isbns.
///
/// A code must be seen `threshold` times in a row before it is validated;
/// any different code in between restarts the count. After a confirmation
/// the count starts over regardless of the validation result, so a code held
/// in front of the camera is re-confirmed every `threshold` frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanDebouncer {
    threshold: u32,
    rule: IsbnRule,
    last_seen: Option<String>,
    repeat_count: u32,
}

impl ScanDebouncer {
    pub fn new(threshold: u32, rule: IsbnRule) -> Self {
        Self {
            threshold: threshold.max(1),
            rule,
            last_seen: None,
            repeat_count: 0,
        }
    }

    pub fn observe(&mut self, code: &str, catalog: &Catalog) -> Action {
        if self.last_seen.as_deref() == Some(code) {
            self.repeat_count += 1;
        } else {
            self.last_seen = Some(code.to_string());
            self.repeat_count = 1;
        }
        if self.repeat_count < self.threshold {
            return Action::Ignore;
        }
        self.repeat_count = 0;

        let Some(isbn) = self.rule.validate(code) else {
            return Action::Reject(RejectReason::InvalidFormat {
                code: code.to_string(),
            });
        };
        if catalog.contains(isbn.as_str()) {
            return Action::Reject(RejectReason::AlreadyRegistered {
                isbn: isbn.into_string(),
            });
        }
        Action::Accept(isbn)
    }

    pub fn reset(&mut self) {
        self.last_seen = None;
        self.repeat_count = 0;
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn rule(&self) -> &IsbnRule {
        &self.rule
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }
}

impl Default for ScanDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, IsbnRule::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BookRecord;

    const CODE: &str = "9784000000000";

    fn feed(debouncer: &mut ScanDebouncer, catalog: &Catalog, code: &str, times: u32) -> Vec<Action> {
        (0..times).map(|_| debouncer.observe(code, catalog)).collect()
    }

    #[test]
    fn below_threshold_is_always_ignored() {
        let catalog = Catalog::new();
        for len in 0..DEFAULT_THRESHOLD {
            let mut debouncer = ScanDebouncer::default();
            let actions = feed(&mut debouncer, &catalog, CODE, len);
            assert!(actions.iter().all(|a| *a == Action::Ignore), "len {len}");
        }
    }

    #[test]
    fn threshold_hit_yields_one_decision_then_restarts() {
        let catalog = Catalog::new();
        let mut debouncer = ScanDebouncer::default();
        let actions = feed(&mut debouncer, &catalog, CODE, DEFAULT_THRESHOLD * 2);

        let decisions: Vec<_> = actions
            .iter()
            .enumerate()
            .filter(|(_, a)| **a != Action::Ignore)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(decisions, vec![4, 9]);
        assert!(matches!(actions[4], Action::Accept(ref isbn) if isbn.as_str() == CODE));
    }

    #[test]
    fn counter_restarts_from_one_after_decision() {
        let catalog = Catalog::new();
        let mut debouncer = ScanDebouncer::default();
        feed(&mut debouncer, &catalog, CODE, DEFAULT_THRESHOLD);
        assert_eq!(debouncer.repeat_count(), 0);
        debouncer.observe(CODE, &catalog);
        assert_eq!(debouncer.repeat_count(), 1);
    }

    #[test]
    fn different_code_resets_count() {
        let catalog = Catalog::new();
        let mut debouncer = ScanDebouncer::default();
        feed(&mut debouncer, &catalog, CODE, DEFAULT_THRESHOLD - 1);
        assert_eq!(debouncer.observe("9780000000002", &catalog), Action::Ignore);
        assert_eq!(debouncer.repeat_count(), 1);
        assert_eq!(debouncer.last_seen(), Some("9780000000002"));
        // The interrupted code has to start over.
        let actions = feed(&mut debouncer, &catalog, CODE, DEFAULT_THRESHOLD - 1);
        assert!(actions.iter().all(|a| *a == Action::Ignore));
    }

    #[test]
    fn malformed_code_is_rejected_with_echo() {
        let catalog = Catalog::new();
        let mut debouncer = ScanDebouncer::default();
        let actions = feed(&mut debouncer, &catalog, "123", DEFAULT_THRESHOLD);
        let last = actions.last().cloned();
        assert_eq!(
            last,
            Some(Action::Reject(RejectReason::InvalidFormat {
                code: "123".to_string()
            }))
        );
        assert_eq!(
            RejectReason::InvalidFormat {
                code: "123".to_string()
            }
            .to_string(),
            "invalid format: 123"
        );
    }

    #[test]
    fn catalogued_code_is_rejected_as_duplicate() {
        let mut catalog = Catalog::new();
        let isbn = IsbnRule::default().validate(CODE).unwrap();
        catalog.insert(BookRecord::bare(&isbn));
        let mut debouncer = ScanDebouncer::default();
        let actions = feed(&mut debouncer, &catalog, CODE, DEFAULT_THRESHOLD);
        assert_eq!(
            actions.last(),
            Some(&Action::Reject(RejectReason::AlreadyRegistered {
                isbn: CODE.to_string()
            }))
        );
    }

    #[test]
    fn zero_threshold_is_clamped_to_one() {
        let catalog = Catalog::new();
        let mut debouncer = ScanDebouncer::new(0, IsbnRule::default());
        assert_eq!(debouncer.threshold(), 1);
        assert!(matches!(debouncer.observe(CODE, &catalog), Action::Accept(_)));
    }

    #[test]
    fn reset_forgets_candidate() {
        let catalog = Catalog::new();
        let mut debouncer = ScanDebouncer::default();
        feed(&mut debouncer, &catalog, CODE, 3);
        debouncer.reset();
        assert_eq!(debouncer.last_seen(), None);
        assert_eq!(debouncer.repeat_count(), 0);
    }
}
