use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use scanner_logging::{scanner_debug, scanner_info, scanner_trace, scanner_warn};
use thiserror::Error;

use crate::{EngineEvent, EventSink};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open decoder input {target}: {source}")]
    Open {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn reader thread: {0}")]
    Spawn(#[source] io::Error),
}

/// A collaborator that turns camera frames into decoded code strings.
pub trait DecodeSource: Send {
    /// Begins capturing; every decoded code is sent to `sink`.
    fn start(&mut self, sink: Arc<dyn EventSink>) -> Result<(), SourceError>;
    /// Stops forwarding codes. Sources that own a capture device release it.
    fn stop(&mut self);
    fn is_capturing(&self) -> bool;
}

type Opener = Box<dyn Fn() -> io::Result<Box<dyn BufRead + Send>> + Send>;

/// Reads one decoded code per line from an external decoder's output.
///
/// One reader thread serves the input until it ends and sessions only gate
/// forwarding, so a restart never has two readers competing for lines. The
/// input is opened on the first `start` and again only after it has ended.
pub struct LineDecodeSource {
    label: String,
    open: Opener,
    shared: Arc<Mutex<ReaderState>>,
}

#[derive(Default)]
struct ReaderState {
    /// Present while capturing.
    sink: Option<Arc<dyn EventSink>>,
    reader_alive: bool,
    /// The source was dropped; the reader exits on its next line.
    closed: bool,
}

impl LineDecodeSource {
    pub fn new(
        label: impl Into<String>,
        open: impl Fn() -> io::Result<Box<dyn BufRead + Send>> + Send + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            open: Box::new(open),
            shared: Arc::new(Mutex::new(ReaderState::default())),
        }
    }

    /// Reads from a file or named pipe.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self::new(label, move || {
            let file = File::open(&path)?;
            Ok(Box::new(BufReader::new(file)) as Box<dyn BufRead + Send>)
        })
    }

    fn state(&self) -> MutexGuard<'_, ReaderState> {
        lock_state(&self.shared)
    }
}

impl DecodeSource for LineDecodeSource {
    fn start(&mut self, sink: Arc<dyn EventSink>) -> Result<(), SourceError> {
        let mut state = lock_state(&self.shared);
        if state.sink.is_some() {
            return Ok(());
        }
        if !state.reader_alive {
            let reader = (self.open)().map_err(|source| SourceError::Open {
                target: self.label.clone(),
                source,
            })?;
            let shared = self.shared.clone();
            let label = self.label.clone();
            thread::Builder::new()
                .name("decode-source".to_string())
                .spawn(move || read_lines(reader, &shared, &label))
                .map_err(SourceError::Spawn)?;
            state.reader_alive = true;
        }
        state.sink = Some(sink);
        scanner_info!("Capture started on {}", self.label);
        Ok(())
    }

    fn stop(&mut self) {
        if self.state().sink.take().is_some() {
            scanner_info!("Capture stopped on {}", self.label);
        }
    }

    fn is_capturing(&self) -> bool {
        self.state().sink.is_some()
    }
}

impl Drop for LineDecodeSource {
    fn drop(&mut self) {
        let mut state = self.state();
        state.sink = None;
        state.closed = true;
    }
}

fn lock_state(shared: &Mutex<ReaderState>) -> MutexGuard<'_, ReaderState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_lines(reader: Box<dyn BufRead + Send>, shared: &Mutex<ReaderState>, label: &str) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                scanner_warn!("Reading {} failed: {}", label, err);
                break;
            }
        };
        let code = line.trim();
        let sink = {
            let state = lock_state(shared);
            if state.closed {
                scanner_debug!("Reader for {} released", label);
                return;
            }
            state.sink.clone()
        };
        match sink {
            Some(sink) if !code.is_empty() => sink.emit(EngineEvent::CodeDecoded(code.to_string())),
            Some(_) => {}
            None => scanner_trace!("Dropped {:?} from {} while stopped", code, label),
        }
    }
    let sink = {
        let mut state = lock_state(shared);
        state.reader_alive = false;
        state.sink.take()
    };
    // Only a session that is still capturing hears about the end of input.
    if let Some(sink) = sink {
        sink.emit(EngineEvent::SourceClosed);
    }
}
