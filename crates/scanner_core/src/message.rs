use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub kind: MessageKind,
}

/// How long each kind of message stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTtl {
    pub success: Duration,
    pub error: Duration,
}

impl Default for MessageTtl {
    fn default() -> Self {
        Self {
            success: Duration::from_millis(1500),
            error: Duration::from_millis(3000),
        }
    }
}

impl MessageTtl {
    pub fn for_kind(&self, kind: MessageKind) -> Duration {
        match kind {
            MessageKind::Success => self.success,
            MessageKind::Error => self.error,
        }
    }
}

/// The single "current message" slot.
///
/// Every `show` bumps the generation; an expiry only clears the slot when it
/// carries the generation currently displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct MessageSlot {
    current: Option<Message>,
    generation: u64,
}

impl MessageSlot {
    /// Replaces the current message and returns its generation.
    pub(crate) fn show(&mut self, message: Message) -> u64 {
        self.generation += 1;
        self.current = Some(message);
        self.generation
    }

    /// Empties the slot. Returns whether a message was showing.
    pub(crate) fn clear(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub(crate) fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.clear()
    }

    pub(crate) fn current(&self) -> Option<&Message> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: &str) -> Message {
        Message {
            text: text.to_string(),
            kind: MessageKind::Success,
        }
    }

    #[test]
    fn stale_expiry_keeps_newer_message() {
        let mut slot = MessageSlot::default();
        let first = slot.show(msg("first"));
        let second = slot.show(msg("second"));
        assert_ne!(first, second);

        assert!(!slot.expire(first));
        assert_eq!(slot.current().map(|m| m.text.as_str()), Some("second"));
        assert!(slot.expire(second));
        assert!(slot.current().is_none());
    }

    #[test]
    fn error_outlives_success() {
        let ttl = MessageTtl::default();
        assert!(ttl.for_kind(MessageKind::Error) > ttl.for_kind(MessageKind::Success));
    }
}
