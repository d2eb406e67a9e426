//! Scanner core: pure state machine, scan debouncing and view-model helpers.
mod catalog;
mod debounce;
mod effect;
mod isbn;
mod message;
mod msg;
mod settings;
mod state;
mod update;
mod view_model;

pub use catalog::{BookRecord, Catalog};
pub use debounce::{Action, RejectReason, ScanDebouncer, DEFAULT_THRESHOLD};
pub use effect::Effect;
pub use isbn::{Isbn, IsbnRule};
pub use message::{Message, MessageKind, MessageTtl};
pub use msg::{LookupOutcome, Msg};
pub use settings::ScannerSettings;
pub use state::{AppState, SessionState};
pub use update::update;
pub use view_model::AppViewModel;
