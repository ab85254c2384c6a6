//! Cursor placement after a re-flow

use crate::document::Document;
use serde::{Deserialize, Serialize};

/// Where the cursor goes in the new document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "offset")]
pub enum CursorTarget {
    /// An exact position
    Offset(usize),
    /// Mapping failed or no cursor was given
    EndOfDocument,
}

impl CursorTarget {
    /// Concrete position in `document`
    pub fn resolve(self, document: &Document) -> usize {
        match self {
            CursorTarget::Offset(offset) => offset,
            CursorTarget::EndOfDocument => document.end_cursor(),
        }
    }

    pub fn offset(self) -> Option<usize> {
        match self {
            CursorTarget::Offset(offset) => Some(offset),
            CursorTarget::EndOfDocument => None,
        }
    }
}
