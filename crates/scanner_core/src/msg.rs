use crate::BookRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked to start scanning.
    StartClicked,
    /// User asked to stop scanning.
    StopClicked,
    /// User asked to empty the catalog.
    ClearCatalogClicked,
    /// The decode source reported a raw code for one frame.
    CodeDetected(String),
    /// The decode source could not start or ended on its own.
    CaptureFailed { reason: String },
    /// Engine finished a lookup.
    LookupFinished {
        isbn: String,
        outcome: LookupOutcome,
    },
    /// The expiry timer for a shown message fired.
    MessageExpired { generation: u64 },
    /// Idle tick from the host loop.
    Tick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(BookRecord),
    NotFound,
    Failed { reason: String },
}
