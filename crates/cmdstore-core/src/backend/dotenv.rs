// crates/cmdstore-core/src/backend/dotenv.rs - Dotenv-style line persistence
//
// FILE FORMAT:
// One assignment per record, lines joined with '\n':
//
// ```text
// COMMAND_command_1718101234567="ls -la"
// COMMAND_command_1718101239999="echo \"hi\"\nprintf '\\n'"
// ```
//
// Only the text survives. Privacy and usage metadata have no place in this
// format and come back as defaults on load.
//
// ESCAPING:
// Write: backslash -> \\, then double quote -> \", then newline -> \n.
// Read: the inverse, done in one left-to-right pass so an escaped backslash is
// consumed before the character after it is looked at.
//
// LIMITATION:
// A line is only recognized when its content between the quotes is non-empty,
// which is fine because blank commands are never stored.

use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use super::{Backend, Records, read_if_exists, write_snapshot};
use crate::id::CommandId;
use crate::record::CommandRecord;

/// Key prefix of every assignment line
pub const KEY_PREFIX: &str = "COMMAND_";

static ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^COMMAND_(\w+)="(.+)"$"#).expect("assignment pattern is valid"));

/// Stores commands as `COMMAND_<id>="..."` lines at a fixed path
#[derive(Debug, Clone)]
pub struct DotenvBackend {
    path: PathBuf,
}

impl DotenvBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Escape text for the inside of a double-quoted value
pub fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Undo [`escape`]
///
/// Unknown escapes and a dangling trailing backslash are kept verbatim.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Parse one assignment line into an id and unescaped text
pub fn parse_line(line: &str) -> Option<(CommandId, String)> {
    let captures = ASSIGNMENT.captures(line)?;
    let id = CommandId::parse(captures.get(1)?.as_str()).ok()?;
    Some((id, unescape(captures.get(2)?.as_str())))
}

/// Render one record as an assignment line
pub fn render_line(record: &CommandRecord) -> String {
    format!("{KEY_PREFIX}{}=\"{}\"", record.id(), escape(record.text()))
}

/// Parse a whole file; non-matching lines are skipped
pub fn parse_document(content: &str, loaded_at: DateTime<Utc>) -> Records {
    let mut records = Records::new();

    for line in content.lines() {
        let Some((id, text)) = parse_line(line) else {
            continue;
        };

        if let Some(record) = CommandRecord::restore(id.clone(), &text, loaded_at) {
            records.insert(id, record);
        }
    }

    records
}

pub fn render_document(records: &Records) -> String {
    records
        .values()
        .map(render_line)
        .collect::<Vec<_>>()
        .join("\n")
}

impl Backend for DotenvBackend {
    fn name(&self) -> &'static str {
        "dotenv"
    }

    fn load(&self) -> Result<Records> {
        let Some(content) = read_if_exists(&self.path)? else {
            debug!(path = %self.path.display(), "no saved commands file found");
            return Ok(Records::new());
        };

        Ok(parse_document(&content, Utc::now()))
    }

    fn save(&self, records: &Records) -> Result<()> {
        write_snapshot(&self.path, &render_document(records))
    }
}
