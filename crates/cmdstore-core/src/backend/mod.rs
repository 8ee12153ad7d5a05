// crates/cmdstore-core/src/backend/mod.rs - Persistence strategies for the command store
//
// A backend knows HOW to read and write the full set of records, never WHEN.
// The store calls `load` once at startup and `save` after every mutation, and
// it owns the policy for failures (log and carry on). Backends therefore just
// report errors with enough context to be useful in a log line.
//
// Formats are not interchangeable: a file written by one backend is not meant
// to be read by another.

use anyhow::{Context as AnyhowContext, Result};
use indexmap::IndexMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::id::CommandId;
use crate::record::CommandRecord;

pub mod dotenv;
pub mod json;
pub mod memory;

pub use dotenv::DotenvBackend;
pub use json::JsonBackend;
pub use memory::MemoryBackend;

/// Insertion-ordered id -> record mapping held by the store
pub type Records = IndexMap<CommandId, CommandRecord>;

/// A storage format the store can be persisted to
pub trait Backend {
    /// Short name used in log lines ("json", "dotenv", "memory")
    fn name(&self) -> &'static str;

    /// Read every stored record
    ///
    /// A backing resource that does not exist yet is an empty store, not an error.
    fn load(&self) -> Result<Records>;

    /// Replace the backing resource with a full snapshot of `records`
    fn save(&self, records: &Records) -> Result<()>;
}

/// Read a whole file, treating a missing file as `None`
pub(crate) fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read file: {}", path.display())),
    }
}

/// Write a whole file, creating parent directories if they don't exist
pub(crate) fn write_snapshot(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}
