use crate::{IsbnRule, MessageTtl, DEFAULT_THRESHOLD};

/// Tunables for the scan state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerSettings {
    /// Consecutive identical readings before a code is validated.
    pub threshold: u32,
    pub rule: IsbnRule,
    pub message_ttl: MessageTtl,
    /// Stop capturing as soon as a code is accepted.
    pub stop_after_accept: bool,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            rule: IsbnRule::default(),
            message_ttl: MessageTtl::default(),
            stop_after_accept: false,
        }
    }
}
