use crate::{BookRecord, Message};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub running: bool,
    /// At least one lookup is in flight.
    pub loading: bool,
    pub message: Option<Message>,
    /// Most recently accepted code.
    pub last_code: Option<String>,
    pub catalog: Vec<BookRecord>,
    pub catalog_len: usize,
    pub dirty: bool,
}
