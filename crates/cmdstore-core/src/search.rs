// crates/cmdstore-core/src/search.rs - Text and visibility filtering of stored commands

use serde::{Deserialize, Serialize};

use crate::record::CommandRecord;

/// What the host is currently looking for
///
/// A record matches when its text contains `search_text` (case-insensitively;
/// an empty search matches everything) and it is visible: public records
/// always are, anything else only when `show_private` or `edit_mode` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    pub search_text: String,
    pub show_private: bool,
    pub edit_mode: bool,
}

impl QueryFilter {
    pub fn new(search_text: impl Into<String>, show_private: bool, edit_mode: bool) -> Self {
        Self {
            search_text: search_text.into(),
            show_private,
            edit_mode,
        }
    }

    /// Filter matching every record, private ones included
    pub fn everything() -> Self {
        Self::new("", true, true)
    }

    pub fn reveals_private(&self) -> bool {
        self.show_private || self.edit_mode
    }

    /// Compile into a matcher that lowercases the needle once
    pub fn matcher(&self) -> Matcher {
        Matcher {
            needle: self.search_text.to_lowercase(),
            reveal_private: self.reveals_private(),
        }
    }

    pub fn matches(&self, record: &CommandRecord) -> bool {
        self.matcher().matches(record)
    }
}

/// Prepared form of a [`QueryFilter`]
#[derive(Debug, Clone)]
pub struct Matcher {
    needle: String,
    reveal_private: bool,
}

impl Matcher {
    pub fn matches(&self, record: &CommandRecord) -> bool {
        if !record.privacy().is_public() && !self.reveal_private {
            return false;
        }

        self.needle.is_empty() || record.text().to_lowercase().contains(&self.needle)
    }
}
