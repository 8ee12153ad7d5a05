// crates/cmdstore-core/src/id.rs - Command id parsing and generation

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Errors that can occur during ID operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdError {
    #[error("Empty ID not allowed")]
    EmptyId,

    #[error("Invalid ID format: {0} (only word characters are allowed)")]
    InvalidFormat(String),
}

/// Result type for ID operations
pub type IdResult<T> = Result<T, IdError>;

/// Prefix of every generated id, kept compatible with files written by the panel extension
pub const ID_PREFIX: &str = "command_";

static WORD_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("word id pattern is valid"));

/// Identifier of a stored command (e.g. "command_1718101234567", "command_1718101234567_2")
///
/// Ids are opaque to callers. The only structural rule is that they consist of
/// word characters, so every id can be written as a `COMMAND_<id>` key in the
/// dotenv backend as well as a JSON object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommandId(String);

impl CommandId {
    /// Parse and validate an externally supplied id
    pub fn parse<S: AsRef<str>>(s: S) -> IdResult<Self> {
        let s = s.as_ref();
        if s.is_empty() {
            return Err(IdError::EmptyId);
        }

        if !WORD_ID.is_match(s) {
            return Err(IdError::InvalidFormat(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Millisecond token embedded in a generated id, if this id has that shape
    pub fn issued_millis(&self) -> Option<i64> {
        let rest = self.0.strip_prefix(ID_PREFIX)?;
        let digits = rest.split('_').next()?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CommandId {
    type Err = IdError;

    fn from_str(s: &str) -> IdResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CommandId {
    type Error = IdError;

    fn try_from(value: String) -> IdResult<Self> {
        Self::parse(value)
    }
}

impl From<CommandId> for String {
    fn from(id: CommandId) -> Self {
        id.0
    }
}

impl AsRef<str> for CommandId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for CommandId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Issues fresh ids for a single store
///
/// Tokens are `command_<millis>`. The millisecond part never goes backwards
/// within a session: when two ids are requested in the same millisecond (or the
/// clock steps back) the token is bumped past the last one issued. An id that
/// still collides with a live key gets a `_<n>` suffix.
#[derive(Debug, Default, Clone)]
pub struct IdManager {
    last_issued: Option<i64>,
}

impl IdManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take an existing id into account so later tokens sort after it
    pub fn observe(&mut self, id: &CommandId) {
        if let Some(millis) = id.issued_millis() {
            self.last_issued = Some(self.last_issued.map_or(millis, |last| last.max(millis)));
        }
    }

    /// Generate the next id not reported as taken by `existence_checker`
    pub fn next_available<F>(&mut self, now: DateTime<Utc>, existence_checker: F) -> CommandId
    where
        F: Fn(&str) -> bool,
    {
        let now_millis = now.timestamp_millis().max(0);
        let millis = match self.last_issued {
            // A loaded token at i64::MAX pins the sequence; suffixes take over from there
            Some(last) if now_millis <= last => last.saturating_add(1),
            _ => now_millis,
        };
        self.last_issued = Some(millis);

        let base = format!("{ID_PREFIX}{millis}");
        let mut candidate = base.clone();
        let mut suffix = 1u32;

        // Keep suffixing until we find an available ID
        while existence_checker(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }

        CommandId(candidate)
    }
}
