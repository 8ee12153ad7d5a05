//! # cmdstore-core
//!
//! Storage layer for a quick-recall command list: short shell commands a user
//! saves, searches, edits, tags as private and copies back out.
//!
//! The [`CommandStore`] owns every record and persists a full snapshot through
//! a [`Backend`] after each change:
//!
//! - [`JsonBackend`]: pretty-printed JSON object, keeps all metadata
//! - [`DotenvBackend`]: `COMMAND_<id>="..."` lines, text only
//! - [`MemoryBackend`]: nothing is written
//!
//! ```no_run
//! use cmdstore_core::{CommandStore, QueryFilter, StoreConfig};
//!
//! let mut store = CommandStore::open(&StoreConfig::json("/tmp/commands.json"))?;
//! let id = store.create("git log --oneline").map(|r| r.id().clone());
//! if let Some(id) = id {
//!     store.record_usage(&id);
//! }
//! for record in store.query(&QueryFilter::new("git", false, false)) {
//!     println!("{}: {}", record.id(), record.text());
//! }
//! # Ok::<(), cmdstore_core::ConfigError>(())
//! ```

pub mod backend;
pub mod config;
pub mod id;
pub mod record;
pub mod search;
pub mod store;

pub use backend::{Backend, DotenvBackend, JsonBackend, MemoryBackend, Records};
pub use config::{BackendKind, ConfigError, ConfigManager, ConfigResult, StoreConfig};
pub use id::{CommandId, IdError, IdManager, IdResult};
pub use record::{CommandRecord, Privacy};
pub use search::QueryFilter;
pub use store::{CommandStore, EditSlot};
