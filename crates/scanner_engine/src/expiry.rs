use std::sync::Arc;
use std::time::Duration;

use scanner_logging::scanner_trace;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, EventSink};

/// Expiry timer for the single message slot.
///
/// At most one timer is pending: scheduling a new one cancels the previous
/// one first, so an older message can never expire a newer one.
pub struct MessageTimer {
    runtime: Handle,
    sink: Arc<dyn EventSink>,
    pending: Option<PendingExpiry>,
}

struct PendingExpiry {
    generation: u64,
    after: Duration,
    token: CancellationToken,
}

impl MessageTimer {
    pub fn new(runtime: Handle, sink: Arc<dyn EventSink>) -> Self {
        Self {
            runtime,
            sink,
            pending: None,
        }
    }

    pub fn schedule(&mut self, generation: u64, after: Duration) {
        self.cancel();

        let token = CancellationToken::new();
        let task_token = token.clone();
        let sink = self.sink.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => {
                    scanner_trace!("Message expiry {} cancelled", generation);
                }
                _ = tokio::time::sleep(after) => {
                    // Mark as no longer pending before reporting.
                    task_token.cancel();
                    sink.emit(EngineEvent::MessageExpired { generation });
                }
            }
        });

        self.pending = Some(PendingExpiry {
            generation,
            after,
            token,
        });
    }

    /// Cancels the pending timer. Returns whether one was still running.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                let was_running = !pending.token.is_cancelled();
                pending.token.cancel();
                was_running
            }
            None => false,
        }
    }

    /// Generation and delay of the timer that has not fired yet, if any.
    pub fn pending(&self) -> Option<(u64, Duration)> {
        self.pending
            .as_ref()
            .filter(|pending| !pending.token.is_cancelled())
            .map(|pending| (pending.generation, pending.after))
    }
}

impl Drop for MessageTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
