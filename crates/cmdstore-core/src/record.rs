// crates/cmdstore-core/src/record.rs - Stored command record and privacy state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::CommandId;

/// Visibility tag of a stored command
///
/// Non-public commands are hidden from filtered views unless the host asks
/// for private entries or is in edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    #[default]
    Public,
    Private,
    Restricted,
}

impl Privacy {
    /// Next state in the fixed cycle Public -> Private -> Restricted -> Public
    pub fn next(self) -> Self {
        match self {
            Self::Public => Self::Private,
            Self::Private => Self::Restricted,
            Self::Restricted => Self::Public,
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Restricted => "restricted",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim user input and reject blank text
///
/// Returns `None` for empty or whitespace-only input, which the store treats
/// as a silent no-op.
pub fn normalize_text(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// A stored command and its metadata
///
/// Fields are read-only outside the crate; the store is the only place that
/// mutates records, so the invariants (non-blank text, immutable creation
/// time, non-decreasing usage count) hold for every record a caller can see.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRecord {
    id: CommandId,
    text: String,
    privacy: Privacy,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    usage_count: u64,
}

impl CommandRecord {
    pub(crate) fn new(id: CommandId, text: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.to_string(),
            privacy: Privacy::Public,
            created_at: now,
            last_used_at: None,
            usage_count: 0,
        }
    }

    /// Rebuild a record read back from storage
    ///
    /// Returns `None` when the stored text is blank. Metadata defaults to a
    /// public, never-used record; chain [`with_privacy`](Self::with_privacy)
    /// and [`with_usage`](Self::with_usage) for formats that keep it.
    pub fn restore(id: CommandId, text: &str, created_at: DateTime<Utc>) -> Option<Self> {
        let text = normalize_text(text)?;
        Some(Self::new(id, text, created_at))
    }

    pub fn with_privacy(mut self, privacy: Privacy) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn with_usage(mut self, last_used_at: Option<DateTime<Utc>>, usage_count: u64) -> Self {
        self.last_used_at = last_used_at;
        self.usage_count = usage_count;
        self
    }

    pub fn id(&self) -> &CommandId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn privacy(&self) -> Privacy {
        self.privacy
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_used_at(&self) -> Option<DateTime<Utc>> {
        self.last_used_at
    }

    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    /// Replace the text; `text` must already be normalized
    pub(crate) fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub(crate) fn mark_used(&mut self, now: DateTime<Utc>) {
        self.last_used_at = Some(now);
        self.usage_count = self.usage_count.saturating_add(1);
    }

    pub(crate) fn cycle_privacy(&mut self) -> Privacy {
        self.privacy = self.privacy.next();
        self.privacy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str) -> CommandRecord {
        CommandRecord::new(CommandId::parse("command_1").unwrap(), text, Utc::now())
    }

    #[test]
    fn test_privacy_cycle_wraps() {
        let start = Privacy::Public;
        assert_eq!(start.next(), Privacy::Private);
        assert_eq!(start.next().next(), Privacy::Restricted);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn test_privacy_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Privacy::Restricted).unwrap(), "\"restricted\"");
        let parsed: Privacy = serde_json::from_str("\"private\"").unwrap();
        assert_eq!(parsed, Privacy::Private);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  ls -la \n"), Some("ls -la"));
        assert_eq!(normalize_text(""), None);
        assert_eq!(normalize_text(" \t\n "), None);
    }

    #[test]
    fn test_new_record_defaults() {
        let rec = record("git status");
        assert_eq!(rec.privacy(), Privacy::Public);
        assert_eq!(rec.usage_count(), 0);
        assert!(rec.last_used_at().is_none());
    }

    #[test]
    fn test_mark_used() {
        let mut rec = record("git status");
        rec.mark_used(Utc::now());
        rec.mark_used(Utc::now());
        assert_eq!(rec.usage_count(), 2);
        assert!(rec.last_used_at().is_some());
    }

    #[test]
    fn test_restore_rejects_blank_text() {
        let id = CommandId::parse("command_2").unwrap();
        assert!(CommandRecord::restore(id.clone(), "   ", Utc::now()).is_none());

        let rec = CommandRecord::restore(id, " make test ", Utc::now())
            .unwrap()
            .with_privacy(Privacy::Private)
            .with_usage(None, 7);
        assert_eq!(rec.text(), "make test");
        assert_eq!(rec.privacy(), Privacy::Private);
        assert_eq!(rec.usage_count(), 7);
    }
}
