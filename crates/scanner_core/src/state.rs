use std::collections::BTreeSet;

use crate::message::MessageSlot;
use crate::view_model::AppViewModel;
use crate::{Action, BookRecord, Catalog, Effect, Isbn, Message, MessageKind, ScanDebouncer, ScannerSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    settings: ScannerSettings,
    session: SessionState,
    debouncer: ScanDebouncer,
    catalog: Catalog,
    pending_lookups: BTreeSet<String>,
    message: MessageSlot,
    last_code: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(ScannerSettings::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ScannerSettings) -> Self {
        let debouncer = ScanDebouncer::new(settings.threshold, settings.rule.clone());
        Self {
            settings,
            session: SessionState::Idle,
            debouncer,
            catalog: Catalog::new(),
            pending_lookups: BTreeSet::new(),
            message: MessageSlot::default(),
            last_code: None,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            running: self.session == SessionState::Running,
            loading: !self.pending_lookups.is_empty(),
            message: self.message.current().cloned(),
            last_code: self.last_code.clone(),
            catalog: self.catalog.iter().cloned().collect(),
            catalog_len: self.catalog.len(),
            dirty: self.dirty,
        }
    }

    pub fn settings(&self) -> &ScannerSettings {
        &self.settings
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn debouncer(&self) -> &ScanDebouncer {
        &self.debouncer
    }

    pub fn is_lookup_pending(&self, isbn: &str) -> bool {
        self.pending_lookups.contains(isbn)
    }

    pub fn has_pending_lookups(&self) -> bool {
        !self.pending_lookups.is_empty()
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn start_session(&mut self) {
        self.session = SessionState::Running;
        self.debouncer.reset();
        self.last_code = None;
        self.mark_dirty();
    }

    pub(crate) fn stop_session(&mut self) {
        self.session = SessionState::Idle;
        self.debouncer.reset();
        self.mark_dirty();
    }

    pub(crate) fn observe_code(&mut self, code: &str) -> Action {
        self.debouncer.observe(code, &self.catalog)
    }

    /// Marks `isbn` as in flight. Returns `false` if it already was.
    pub(crate) fn begin_lookup(&mut self, isbn: &Isbn) -> bool {
        if !self.pending_lookups.insert(isbn.as_str().to_string()) {
            return false;
        }
        self.last_code = Some(isbn.as_str().to_string());
        self.mark_dirty();
        true
    }

    pub(crate) fn finish_lookup(&mut self, isbn: &str) {
        if self.pending_lookups.remove(isbn) {
            self.mark_dirty();
        }
    }

    pub(crate) fn add_record(&mut self, record: BookRecord) -> bool {
        let added = self.catalog.insert(record);
        if added {
            self.mark_dirty();
        }
        added
    }

    pub(crate) fn clear_catalog(&mut self) {
        if !self.catalog.is_empty() {
            self.catalog.clear();
            self.mark_dirty();
        }
    }

    pub(crate) fn show_message(&mut self, text: impl Into<String>, kind: MessageKind) -> Effect {
        let generation = self.message.show(Message {
            text: text.into(),
            kind,
        });
        self.mark_dirty();
        Effect::ScheduleMessageExpiry {
            generation,
            after: self.settings.message_ttl.for_kind(kind),
        }
    }

    pub(crate) fn clear_message(&mut self) -> Option<Effect> {
        if self.message.clear() {
            self.mark_dirty();
            Some(Effect::CancelMessageExpiry)
        } else {
            None
        }
    }

    pub(crate) fn expire_message(&mut self, generation: u64) {
        if self.message.expire(generation) {
            self.mark_dirty();
        }
    }
}
