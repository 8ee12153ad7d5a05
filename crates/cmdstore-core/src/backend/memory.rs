// crates/cmdstore-core/src/backend/memory.rs - Session-only storage

use anyhow::Result;

use super::{Backend, Records};

/// Keeps nothing: every session starts empty and saves are dropped
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryBackend;

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&self) -> Result<Records> {
        Ok(Records::new())
    }

    fn save(&self, _records: &Records) -> Result<()> {
        Ok(())
    }
}
