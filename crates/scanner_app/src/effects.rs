use scanner_core::{Effect, LookupOutcome, Msg};
use scanner_engine::{DecodeSource, EngineEvent, EngineHandle, LookupResult};
use scanner_logging::{scanner_debug, scanner_error, scanner_info, scanner_warn};

pub struct EffectRunner {
    engine: EngineHandle,
    source: Option<Box<dyn DecodeSource>>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, source: Option<Box<dyn DecodeSource>>) -> Self {
        Self { engine, source }
    }

    /// Executes `effects` and returns any messages they produce immediately.
    pub fn run(&mut self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut follow_ups = Vec::new();
        for effect in effects {
            match effect {
                Effect::StartCapture => match self.source.as_mut() {
                    Some(source) => {
                        if let Err(err) = source.start(self.engine.event_sink()) {
                            scanner_error!("Could not start capture: {}", err);
                            follow_ups.push(Msg::CaptureFailed {
                                reason: err.to_string(),
                            });
                        }
                    }
                    None => {
                        scanner_info!(
                            "No decoder input configured; codes are read from stdin, \
                             each line counting as one reading"
                        );
                    }
                },
                Effect::StopCapture => {
                    if let Some(source) = self.source.as_mut() {
                        source.stop();
                    }
                }
                Effect::Lookup { isbn } => {
                    scanner_info!("Lookup isbn={}", isbn);
                    self.engine.lookup(isbn);
                }
                Effect::ScheduleMessageExpiry { generation, after } => {
                    scanner_debug!("Message {} expires in {:?}", generation, after);
                    self.engine.schedule_message_expiry(generation, after);
                }
                Effect::CancelMessageExpiry => {
                    self.engine.cancel_message_expiry();
                }
            }
        }
        follow_ups
    }

    /// Releases the capture device on shutdown.
    pub fn shutdown(&mut self) {
        if let Some(source) = self.source.as_mut() {
            source.stop();
        }
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::CodeDecoded(code) => Msg::CodeDetected(code),
        EngineEvent::SourceClosed => {
            scanner_warn!("Decoder input closed");
            Msg::CaptureFailed {
                reason: "decoder input closed".to_string(),
            }
        }
        EngineEvent::LookupCompleted { isbn, result } => {
            let outcome = match result {
                Ok(LookupResult::Found(record)) => LookupOutcome::Found(record),
                Ok(LookupResult::NotFound) => LookupOutcome::NotFound,
                Err(err) => LookupOutcome::Failed {
                    reason: err.kind.to_string(),
                },
            };
            Msg::LookupFinished { isbn, outcome }
        }
        EngineEvent::MessageExpired { generation } => Msg::MessageExpired { generation },
    }
}
