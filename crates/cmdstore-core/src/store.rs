// crates/cmdstore-core/src/store.rs - The command store
//
// The store is the single owner of every record. Hosts (a panel popup, a
// launcher, a test) drive it through the operations below and read records
// back through shared references, so nothing outside this module can break
// the record invariants.
//
// FAILURE POLICY:
// - Blank text and unknown ids are silent no-ops (false / None).
// - Persistence errors are logged and swallowed. A failed save never rolls
//   back the in-memory change that triggered it; a failed load leaves the
//   store empty.
//
// PERSISTENCE:
// Every successful mutation writes a full snapshot through the backend.
// No-ops never touch the backend.

use chrono::Utc;
use tracing::{debug, error, info};

use crate::backend::{Backend, DotenvBackend, JsonBackend, MemoryBackend, Records};
use crate::config::{BackendKind, ConfigManager, ConfigResult, StoreConfig};
use crate::id::{CommandId, IdManager};
use crate::record::{CommandRecord, Privacy, normalize_text};
use crate::search::QueryFilter;

/// The one edit the host has in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSlot {
    pub id: CommandId,
    /// Text of the record when the edit started
    pub original_text: String,
}

/// In-memory command repository with a pluggable persistence backend
pub struct CommandStore {
    records: Records,
    backend: Box<dyn Backend>,
    ids: IdManager,
    edit_mode: bool,
    editing: Option<EditSlot>,
}

impl CommandStore {
    /// Create an empty store; call [`load`](Self::load) to read persisted records
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            records: Records::new(),
            backend,
            ids: IdManager::new(),
            edit_mode: false,
            editing: None,
        }
    }

    pub fn with_backend<B: Backend + 'static>(backend: B) -> Self {
        Self::new(Box::new(backend))
    }

    /// Build the configured backend and load it
    pub fn open(config: &StoreConfig) -> ConfigResult<Self> {
        ConfigManager::validate_config(config)?;

        let backend: Box<dyn Backend> = match (config.backend, config.backing_path()?) {
            (BackendKind::Json, Some(path)) => Box::new(JsonBackend::new(path)),
            (BackendKind::Dotenv, Some(path)) => Box::new(DotenvBackend::new(path)),
            _ => Box::new(MemoryBackend),
        };

        let mut store = Self::new(backend);
        store.load();
        Ok(store)
    }

    /// Replace the in-memory records with what the backend holds
    ///
    /// Any failure is logged and leaves the store empty.
    pub fn load(&mut self) {
        self.editing = None;

        match self.backend.load() {
            Ok(records) => {
                for id in records.keys() {
                    self.ids.observe(id);
                }
                info!(backend = self.backend.name(), count = records.len(), "commands loaded");
                self.records = records;
            }
            Err(e) => {
                error!(backend = self.backend.name(), "error loading commands: {:#}", e);
                self.records = Records::new();
            }
        }
    }

    /// Write the full current state; returns whether the write succeeded
    pub fn save(&self) -> bool {
        match self.backend.save(&self.records) {
            Ok(()) => {
                debug!(backend = self.backend.name(), count = self.records.len(), "commands saved");
                true
            }
            Err(e) => {
                error!(backend = self.backend.name(), "error saving commands: {:#}", e);
                false
            }
        }
    }

    /// Store a new command; blank input is ignored
    pub fn create(&mut self, text: &str) -> Option<&CommandRecord> {
        let Some(text) = normalize_text(text) else {
            debug!("ignoring blank command");
            return None;
        };

        let now = Utc::now();
        let records = &self.records;
        let id = self
            .ids
            .next_available(now, |candidate| records.contains_key(candidate));

        self.records.insert(id.clone(), CommandRecord::new(id.clone(), text, now));
        self.save();

        self.records.get(&id)
    }

    /// Replace a command's text, keeping its metadata
    pub fn update(&mut self, id: &CommandId, text: &str) -> bool {
        let Some(text) = normalize_text(text) else {
            debug!(id = %id, "ignoring blank update");
            return false;
        };

        let Some(record) = self.records.get_mut(id) else {
            debug!(id = %id, "update of unknown command");
            return false;
        };

        record.set_text(text);
        self.save();
        true
    }

    pub fn delete(&mut self, id: &CommandId) -> bool {
        if self.records.shift_remove(id).is_none() {
            debug!(id = %id, "delete of unknown command");
            return false;
        }

        if self.editing.as_ref().is_some_and(|slot| &slot.id == id) {
            self.editing = None;
        }

        self.save();
        true
    }

    /// Note that a command was copied out: bump its usage count and last-used time
    pub fn record_usage(&mut self, id: &CommandId) -> Option<&CommandRecord> {
        let Some(record) = self.records.get_mut(id) else {
            debug!(id = %id, "usage of unknown command");
            return None;
        };

        record.mark_used(Utc::now());
        self.save();
        self.records.get(id)
    }

    /// Advance a command's privacy state and return the new value
    pub fn cycle_privacy(&mut self, id: &CommandId) -> Option<Privacy> {
        let Some(record) = self.records.get_mut(id) else {
            debug!(id = %id, "privacy change of unknown command");
            return None;
        };

        let privacy = record.cycle_privacy();
        self.save();
        Some(privacy)
    }

    /// Records matching `filter`, in insertion order
    pub fn query(&self, filter: &QueryFilter) -> Vec<&CommandRecord> {
        let matcher = filter.matcher();
        self.records
            .values()
            .filter(|record| matcher.matches(record))
            .collect()
    }

    /// Query using the store's own edit mode flag
    pub fn query_session(&self, search_text: &str, show_private: bool) -> Vec<&CommandRecord> {
        self.query(&QueryFilter::new(search_text, show_private, self.edit_mode))
    }

    pub fn get(&self, id: &CommandId) -> Option<&CommandRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandRecord> {
        self.records.values()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn set_edit_mode(&mut self, on: bool) {
        self.edit_mode = on;
    }

    /// Flip edit mode and return the new state
    pub fn toggle_edit_mode(&mut self) -> bool {
        self.edit_mode = !self.edit_mode;
        self.edit_mode
    }

    /// The edit in progress, if any
    pub fn editing(&self) -> Option<&EditSlot> {
        self.editing.as_ref()
    }

    /// Start editing a command
    ///
    /// There is a single edit slot: starting a new edit while one is pending
    /// replaces it. Unknown ids leave the slot untouched.
    pub fn begin_edit(&mut self, id: &CommandId) -> Option<&EditSlot> {
        let record = self.records.get(id)?;

        if let Some(pending) = &self.editing {
            debug!(pending = %pending.id, id = %id, "replacing pending edit");
        }

        self.editing = Some(EditSlot {
            id: id.clone(),
            original_text: record.text().to_string(),
        });
        self.editing.as_ref()
    }

    /// Apply `text` to the command being edited
    ///
    /// Blank text keeps the edit pending. If the record is gone the slot is
    /// cleared and nothing is written.
    pub fn commit_edit(&mut self, text: &str) -> bool {
        let Some(slot) = &self.editing else {
            return false;
        };

        if normalize_text(text).is_none() {
            return false;
        }

        let id = slot.id.clone();
        self.editing = None;
        self.update(&id, text)
    }

    pub fn cancel_edit(&mut self) -> Option<EditSlot> {
        self.editing.take()
    }
}

impl std::fmt::Debug for CommandStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandStore")
            .field("backend", &self.backend.name())
            .field("records", &self.records.len())
            .field("edit_mode", &self.edit_mode)
            .field("editing", &self.editing)
            .finish()
    }
}
