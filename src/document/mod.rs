//! Paged document model
//!
//! Positions use a token model: every page, region and block opens and
//! closes with one position unit, and each text character takes one unit.

mod block;
mod id;
mod page;

pub use block::{Block, BlockClass};
pub use id::{BlockId, BlockIdAllocator};
pub use page::{Page, Region, RegionKind};

use serde::{Deserialize, Serialize};

/// The paged document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document whose blocks all sit in one page body
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            pages: vec![Page::assemble(1, None, blocks, None)],
        }
    }

    /// Total size in position units
    pub fn size(&self) -> usize {
        self.pages.iter().map(Page::size).sum()
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Largest block id anywhere in the document, headers included
    pub fn max_block_id(&self) -> Option<BlockId> {
        self.pages
            .iter()
            .flat_map(|p| p.regions.iter())
            .flat_map(|r| r.blocks.iter())
            .map(|b| b.id)
            .max()
    }

    /// Body blocks in document order
    pub fn body_blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.pages
            .iter()
            .filter_map(Page::body)
            .flat_map(|r| r.blocks.iter())
    }

    /// Body text joined with newlines, split fragments rejoined
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut pending_joiner: Option<&str> = None;
        for block in self.body_blocks() {
            match pending_joiner.take() {
                Some(sep) if block.continued => out.push_str(sep),
                _ if !out.is_empty() => out.push('\n'),
                _ => {}
            }
            out.push_str(&block.text);
            pending_joiner = block.joiner.as_deref();
        }
        out
    }

    /// Cursor position at the end of the last body block's text
    ///
    /// Falls back to the last position of the document when no body
    /// block exists.
    pub fn end_cursor(&self) -> usize {
        let mut pos = 0;
        let mut end = None;
        for page in &self.pages {
            pos += 1;
            for region in &page.regions {
                pos += 1;
                for block in &region.blocks {
                    if region.kind == RegionKind::Body {
                        end = Some(pos + 1 + block.text_len());
                    }
                    pos += block.size();
                }
                pos += 1;
            }
            pos += 1;
        }
        end.unwrap_or_else(|| pos.saturating_sub(1))
    }
}
