// crates/cmdstore-core/src/backend/json.rs - JSON object persistence
//
// FILE FORMAT:
// A pretty-printed JSON object keyed by command id. Values come in two shapes:
//
// ```json
// {
//   "command_1718101234567": "ls -la",
//   "command_1718101239999": {
//     "command": "git log --oneline",
//     "privacy": "private",
//     "createdAt": "2024-06-11T10:20:39.999Z",
//     "lastUsed": null,
//     "usageCount": 0
//   }
// }
// ```
//
// The plain-string shape is what early versions wrote. It is upgraded to a
// full record on load, and every save writes the object shape only.

use anyhow::{Context as AnyhowContext, Result};
use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{Backend, Records, read_if_exists, write_snapshot};
use crate::id::CommandId;
use crate::record::{CommandRecord, Privacy};

/// Stores commands as a JSON object at a fixed path
#[derive(Debug, Clone)]
pub struct JsonBackend {
    path: PathBuf,
}

impl JsonBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One value of the top-level object, in either historical shape
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Legacy(String),
    Full(StoredRecord),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    command: String,
    #[serde(default)]
    privacy: Privacy,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    last_used: Option<DateTime<Utc>>,
    #[serde(default)]
    usage_count: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecordRef<'a> {
    command: &'a str,
    privacy: Privacy,
    created_at: DateTime<Utc>,
    last_used: Option<DateTime<Utc>>,
    usage_count: u64,
}

impl<'a> From<&'a CommandRecord> for StoredRecordRef<'a> {
    fn from(record: &'a CommandRecord) -> Self {
        Self {
            command: record.text(),
            privacy: record.privacy(),
            created_at: record.created_at(),
            last_used: record.last_used_at(),
            usage_count: record.usage_count(),
        }
    }
}

/// Timestamps are RFC 3339 strings, but Unix milliseconds are accepted too
#[derive(Deserialize)]
#[serde(untagged)]
enum Timestamp {
    Millis(i64),
    Rfc3339(DateTime<Utc>),
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Timestamp>::deserialize(deserializer)?;
    Ok(raw.and_then(|stamp| match stamp {
        Timestamp::Millis(ms) => Utc.timestamp_millis_opt(ms).single(),
        Timestamp::Rfc3339(dt) => Some(dt),
    }))
}

/// Parse a JSON document into records, upgrading legacy entries
///
/// `loaded_at` stands in for creation times the file doesn't carry.
pub fn parse_document(content: &str, loaded_at: DateTime<Utc>) -> Result<Records> {
    let mut records = Records::new();
    if content.trim().is_empty() {
        return Ok(records);
    }

    let entries: IndexMap<String, serde_json::Value> =
        serde_json::from_str(content).context("Invalid JSON command document")?;

    for (key, value) in entries {
        let id = match CommandId::parse(&key) {
            Ok(id) => id,
            Err(e) => {
                warn!(key = %key, "skipping stored command: {}", e);
                continue;
            }
        };

        let entry = match serde_json::from_value::<StoredEntry>(value) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(id = %id, "skipping malformed stored command: {}", e);
                continue;
            }
        };

        let record = match entry {
            StoredEntry::Legacy(text) => CommandRecord::restore(id.clone(), &text, loaded_at),
            StoredEntry::Full(stored) => {
                let created_at = stored.created_at.unwrap_or(loaded_at);
                CommandRecord::restore(id.clone(), &stored.command, created_at).map(|record| {
                    record
                        .with_privacy(stored.privacy)
                        .with_usage(stored.last_used, stored.usage_count.max(0) as u64)
                })
            }
        };

        match record {
            Some(record) => {
                records.insert(id, record);
            }
            None => warn!(id = %id, "skipping stored command with blank text"),
        }
    }

    Ok(records)
}

/// Render records as the pretty-printed object shape
pub fn render_document(records: &Records) -> Result<String> {
    let document: IndexMap<&str, StoredRecordRef<'_>> = records
        .iter()
        .map(|(id, record)| (id.as_str(), StoredRecordRef::from(record)))
        .collect();

    serde_json::to_string_pretty(&document).context("Failed to serialize commands")
}

impl Backend for JsonBackend {
    fn name(&self) -> &'static str {
        "json"
    }

    fn load(&self) -> Result<Records> {
        let Some(content) = read_if_exists(&self.path)? else {
            debug!(path = %self.path.display(), "no saved commands file found");
            return Ok(Records::new());
        };

        parse_document(&content, Utc::now())
            .with_context(|| format!("Failed to load commands from {}", self.path.display()))
    }

    fn save(&self, records: &Records) -> Result<()> {
        let content = render_document(records)?;
        write_snapshot(&self.path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend_in(temp: &TempDir) -> JsonBackend {
        JsonBackend::new(temp.path().join("commands.json"))
    }

    #[test]
    fn test_legacy_string_is_upgraded() {
        let now = Utc::now();
        let records = parse_document(r#"{"id1": "ls -la"}"#, now).unwrap();

        let record = records.get("id1").unwrap();
        assert_eq!(record.text(), "ls -la");
        assert_eq!(record.privacy(), Privacy::Public);
        assert_eq!(record.usage_count(), 0);
        assert_eq!(record.created_at(), now);
        assert!(record.last_used_at().is_none());
    }

    #[test]
    fn test_full_object_shape() {
        let content = r#"{
            "command_1": {
                "command": "docker ps",
                "privacy": "restricted",
                "createdAt": "2024-06-11T10:20:39Z",
                "lastUsed": 1718101239999,
                "usageCount": 4
            }
        }"#;
        let records = parse_document(content, Utc::now()).unwrap();

        let record = records.get("command_1").unwrap();
        assert_eq!(record.text(), "docker ps");
        assert_eq!(record.privacy(), Privacy::Restricted);
        assert_eq!(record.usage_count(), 4);
        assert_eq!(record.created_at().to_rfc3339(), "2024-06-11T10:20:39+00:00");
        assert_eq!(record.last_used_at().unwrap().timestamp_millis(), 1_718_101_239_999);
    }

    #[test]
    fn test_missing_object_fields_default() {
        let records = parse_document(r#"{"command_1": {"command": "top"}}"#, Utc::now()).unwrap();
        let record = records.get("command_1").unwrap();
        assert_eq!(record.privacy(), Privacy::Public);
        assert_eq!(record.usage_count(), 0);
    }

    #[test]
    fn test_invalid_keys_and_blank_text_are_skipped() {
        let content = r#"{"bad key": "ls", "command_2": "   ", "command_3": "pwd"}"#;
        let records = parse_document(content, Utc::now()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records.contains_key("command_3"));
    }

    #[test]
    fn test_malformed_entry_does_not_drop_the_rest() {
        let content = r#"{
            "command_1": "ls -la",
            "command_2": {"command": "pwd", "usageCount": null},
            "command_3": {"command": "top", "privacy": "secret"},
            "command_4": 42,
            "command_5": {"command": "uptime"}
        }"#;
        let records = parse_document(content, Utc::now()).unwrap();

        let ids: Vec<_> = records.keys().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["command_1", "command_5"]);
    }

    #[test]
    fn test_empty_document_is_empty_store() {
        assert!(parse_document("  \n", Utc::now()).unwrap().is_empty());
        assert!(parse_document("{}", Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(parse_document("{ not json", Utc::now()).is_err());
        assert!(parse_document("[1, 2, 3]", Utc::now()).is_err());
    }

    #[test]
    fn test_save_writes_full_shape_only() {
        let temp = TempDir::new().unwrap();
        let backend = backend_in(&temp);
        std::fs::write(backend.path(), r#"{"command_1": "ls -la"}"#).unwrap();

        let records = backend.load().unwrap();
        backend.save(&records).unwrap();

        let written = std::fs::read_to_string(backend.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        let entry = &value["command_1"];
        assert_eq!(entry["command"], "ls -la");
        assert_eq!(entry["privacy"], "public");
        assert_eq!(entry["usageCount"], 0);
        assert!(entry["lastUsed"].is_null());
        assert!(entry["createdAt"].is_string());
        // Pretty-printed output
        assert!(written.contains('\n'));
    }

    #[test]
    fn test_round_trip_keeps_order_and_metadata() {
        let temp = TempDir::new().unwrap();
        let backend = backend_in(&temp);
        let now = Utc::now();

        let mut records = Records::new();
        for (i, text) in ["b second", "a first", "c third"].iter().enumerate() {
            let id = CommandId::parse(format!("command_{i}")).unwrap();
            let record = CommandRecord::restore(id.clone(), text, now)
                .unwrap()
                .with_privacy(Privacy::Private)
                .with_usage(Some(now), 3);
            records.insert(id, record);
        }

        backend.save(&records).unwrap();
        let loaded = backend.load().unwrap();

        let texts: Vec<_> = loaded.values().map(|r| r.text()).collect();
        assert_eq!(texts, ["b second", "a first", "c third"]);
        assert!(loaded.values().all(|r| r.privacy() == Privacy::Private && r.usage_count() == 3));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        assert!(backend_in(&temp).load().unwrap().is_empty());
    }
}
