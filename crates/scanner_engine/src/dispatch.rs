use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use scanner_core::Isbn;
use scanner_logging::{scanner_debug, scanner_error, scanner_info, scanner_warn};
use tokio::runtime::Handle;

use crate::{
    BookLookup, EngineEvent, EventSink, FailureKind, LookupError, LookupResult, LookupSettings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    pub fn from_settings(settings: &LookupSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            backoff: settings.retry_backoff,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Dispatched,
    /// A lookup for the same isbn has not finished yet; nothing was sent.
    AlreadyInFlight,
}

/// Issues lookups, at most one in flight per isbn.
#[derive(Clone)]
pub struct LookupDispatcher {
    lookup: Arc<dyn BookLookup>,
    retry: RetryPolicy,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl LookupDispatcher {
    pub fn new(lookup: Arc<dyn BookLookup>, retry: RetryPolicy) -> Self {
        Self {
            lookup,
            retry,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn is_in_flight(&self, isbn: &str) -> bool {
        self.lock().contains(isbn)
    }

    /// Spawns the lookup on `runtime` and reports the result to `sink`.
    pub fn dispatch(&self, runtime: &Handle, isbn: Isbn, sink: Arc<dyn EventSink>) -> DispatchOutcome {
        let Some(guard) = self.claim(&isbn) else {
            scanner_debug!("Lookup for {} already in flight", isbn);
            return DispatchOutcome::AlreadyInFlight;
        };
        let this = self.clone();
        runtime.spawn(async move {
            // Every claimed isbn gets a completion, even if the lookup panics.
            let result = AssertUnwindSafe(this.run(&isbn))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    scanner_error!("Lookup task for {} panicked", isbn);
                    Err(LookupError::new(FailureKind::Panicked, "lookup task panicked"))
                });
            drop(guard);
            sink.emit(EngineEvent::LookupCompleted {
                isbn: isbn.into_string(),
                result,
            });
        });
        DispatchOutcome::Dispatched
    }

    /// Performs the lookup, retrying retryable failures per the policy.
    pub async fn run(&self, isbn: &Isbn) -> Result<LookupResult, LookupError> {
        let mut attempt = 0;
        loop {
            match self.lookup.lookup(isbn).await {
                Ok(result) => {
                    scanner_info!(
                        "Lookup for {} finished: {}",
                        isbn,
                        match &result {
                            LookupResult::Found(_) => "found",
                            LookupResult::NotFound => "not found",
                        }
                    );
                    return Ok(result);
                }
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.backoff * attempt;
                    scanner_warn!(
                        "Lookup for {} failed ({}); retry {}/{} in {:?}",
                        isbn,
                        err,
                        attempt,
                        self.retry.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    scanner_warn!("Lookup for {} failed: {}", isbn, err);
                    return Err(err);
                }
            }
        }
    }

    fn claim(&self, isbn: &Isbn) -> Option<InFlightGuard> {
        if !self.lock().insert(isbn.as_str().to_string()) {
            return None;
        }
        Some(InFlightGuard {
            in_flight: self.in_flight.clone(),
            isbn: isbn.as_str().to_string(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the in-flight marker when the lookup task ends, even on panic.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    isbn: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.isbn);
    }
}
