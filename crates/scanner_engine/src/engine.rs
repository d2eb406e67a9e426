use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use scanner_core::Isbn;
use scanner_logging::{scanner_debug, scanner_info};
use thiserror::Error;

use crate::dispatch::{DispatchOutcome, LookupDispatcher, RetryPolicy};
use crate::expiry::MessageTimer;
use crate::lookup::{BookLookup, LookupSettings, ReqwestBookLookup};
use crate::sink::{ChannelEventSink, EventSink};
use crate::{EngineEvent, LookupError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to build async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[source] LookupError),
    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[source] std::io::Error),
}

enum EngineCommand {
    Lookup { isbn: Isbn },
    ScheduleExpiry { generation: u64, after: Duration },
    CancelExpiry,
}

/// Handle to the background IO thread.
///
/// Commands are executed on a tokio runtime owned by that thread; results come
/// back as [`EngineEvent`]s in the order they complete.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: LookupSettings) -> Result<Self, EngineError> {
        let retry = RetryPolicy::from_settings(&settings);
        let lookup = ReqwestBookLookup::new(settings).map_err(EngineError::Client)?;
        Self::with_lookup(Arc::new(lookup), retry)
    }

    pub fn with_lookup(lookup: Arc<dyn BookLookup>, retry: RetryPolicy) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(EngineError::Runtime)?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx.clone()));
        let dispatcher = LookupDispatcher::new(lookup, retry);

        thread::Builder::new()
            .name("scanner-engine".to_string())
            .spawn(move || {
                let mut timer = MessageTimer::new(runtime.handle().clone(), sink.clone());
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Lookup { isbn } => {
                            let outcome = dispatcher.dispatch(runtime.handle(), isbn, sink.clone());
                            if outcome == DispatchOutcome::AlreadyInFlight {
                                scanner_debug!("Duplicate lookup command dropped");
                            }
                        }
                        EngineCommand::ScheduleExpiry { generation, after } => {
                            timer.schedule(generation, after);
                        }
                        EngineCommand::CancelExpiry => {
                            timer.cancel();
                        }
                    }
                }
                drop(timer);
                scanner_info!("Engine command channel closed; shutting down");
                runtime.shutdown_timeout(Duration::from_secs(1));
            })
            .map_err(EngineError::Spawn)?;

        Ok(Self {
            cmd_tx,
            event_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn lookup(&self, isbn: Isbn) {
        let _ = self.cmd_tx.send(EngineCommand::Lookup { isbn });
    }

    pub fn schedule_message_expiry(&self, generation: u64, after: Duration) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::ScheduleExpiry { generation, after });
    }

    pub fn cancel_message_expiry(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CancelExpiry);
    }

    /// Sink feeding this engine's event stream, for decode sources.
    pub fn event_sink(&self) -> Arc<dyn EventSink> {
        Arc::new(ChannelEventSink::new(self.event_tx.clone()))
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.receiver().try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.receiver().recv_timeout(timeout).ok()
    }

    fn receiver(&self) -> std::sync::MutexGuard<'_, mpsc::Receiver<EngineEvent>> {
        self.event_rx.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
