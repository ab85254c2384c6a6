//! Content collection: flatten page bodies into an ordered block sequence
//!
//! Header and footer regions are structural and skipped. Split fragments
//! left by an earlier pass (a `joiner` block followed by a `continued`
//! block of the same class) are rejoined into one logical block, so every
//! pass sees whole speeches and paragraphs again.

use crate::document::{Block, BlockClass, BlockId, Document, RegionKind};
use crate::error::{PaginationError, Result};
use crate::layout::measure::{height_or, HeightProvider};
use smallvec::{smallvec, SmallVec};
use std::collections::BTreeMap;

/// Maps a run of old-document positions onto a block's text
///
/// Old position `key + 1 + t` holds text character `text_start + t`, for
/// `t` in `0..=len`. `key` itself is the slot before the character run
/// (the block's opening token for an unsplit fragment).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan {
    pub key: usize,
    pub text_start: usize,
    pub len: usize,
}

/// Extent of one body block in the old document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OldSpan {
    pub position: usize,
    pub size: usize,
}

impl OldSpan {
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.position && offset < self.position + self.size
    }
}

/// One unit of pagination input
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    /// Identity of the first fragment
    pub id: BlockId,
    /// Fragment ids in order; reused by split parts
    pub ids: SmallVec<[BlockId; 2]>,
    /// Old position of the first fragment
    pub position: usize,
    /// Old size summed over all fragments
    pub size: usize,
    pub class: BlockClass,
    pub attrs: BTreeMap<String, String>,
    /// Caller-supplied height (summed over fragments)
    pub height: f32,
    pub text: String,
    text_len: usize,
    /// Old positions covered by this block's text
    pub spans: SmallVec<[TextSpan; 1]>,
    /// Second part of a split made earlier in this pass
    pub continued: bool,
}

impl ContentBlock {
    /// A block collected from the old document at `position`
    pub fn from_block(block: &Block, position: usize, height: f32) -> Self {
        let text_len = block.text_len();
        Self {
            id: block.id,
            ids: smallvec![block.id],
            position,
            size: block.size(),
            class: block.class.clone(),
            attrs: block.attrs.clone(),
            height,
            text: block.text.clone(),
            text_len,
            spans: smallvec![TextSpan {
                key: position,
                text_start: 0,
                len: text_len,
            }],
            continued: false,
        }
    }

    /// Text length in chars
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Append a continuation fragment joined by `separator`
    fn absorb(&mut self, separator: &str, block: &Block, position: usize, height: f32) {
        let fragment_len = block.text_len();
        let text_start = self.text_len + separator.chars().count();

        self.text.push_str(separator);
        self.text.push_str(&block.text);
        self.text_len = text_start + fragment_len;
        self.size += block.size();
        self.height += height;
        self.ids.push(block.id);
        self.spans.push(TextSpan {
            key: position,
            text_start,
            len: fragment_len,
        });
    }

    /// A derived block (split part) sharing this block's class and attrs
    pub fn derive(
        &self,
        ids: SmallVec<[BlockId; 2]>,
        text: String,
        height: f32,
        spans: SmallVec<[TextSpan; 1]>,
        continued: bool,
    ) -> Self {
        let text_len = text.chars().count();
        Self {
            id: ids[0],
            ids,
            position: spans.first().map(|s| s.key).unwrap_or(self.position),
            size: text_len + 2,
            class: self.class.clone(),
            attrs: self.attrs.clone(),
            height,
            text,
            text_len,
            spans,
            continued,
        }
    }

    /// Document block carrying this content
    pub fn to_block(&self, id: BlockId, text: String, joiner: Option<String>, continued: bool) -> Block {
        Block {
            id,
            class: self.class.clone(),
            attrs: self.attrs.clone(),
            text,
            joiner,
            continued,
        }
    }
}

/// Output of the collector
#[derive(Debug, Clone, Default)]
pub struct Collected {
    /// Logical blocks in document order
    pub blocks: Vec<ContentBlock>,
    /// Every old body block, sorted by position
    pub old_spans: Vec<OldSpan>,
    /// Size of the old document
    pub old_size: usize,
}

/// Rejoins fragments while blocks stream past in document order
struct Rejoiner {
    blocks: Vec<ContentBlock>,
    open: Option<(ContentBlock, String)>,
}

impl Rejoiner {
    fn push(&mut self, block: &Block, position: usize, height: f32) {
        if let Some((mut current, separator)) = self.open.take() {
            if block.continued && block.class == current.class {
                current.absorb(&separator, block, position, height);
                self.hold(current, block.joiner.as_ref());
                return;
            }
            log::trace!("dropping unmatched joiner on block {}", current.id.0);
            self.blocks.push(current);
        }

        let current = ContentBlock::from_block(block, position, height);
        self.hold(current, block.joiner.as_ref());
    }

    fn hold(&mut self, block: ContentBlock, joiner: Option<&String>) {
        match joiner {
            Some(separator) => self.open = Some((block, separator.clone())),
            None => self.blocks.push(block),
        }
    }

    fn finish(mut self) -> Vec<ContentBlock> {
        if let Some((current, _)) = self.open.take() {
            self.blocks.push(current);
        }
        self.blocks
    }
}

/// Collect the body content of `document`
///
/// `gap_height` stands in for blocks the provider has no height for.
pub fn collect(
    document: &Document,
    heights: &dyn HeightProvider,
    gap_height: f32,
) -> Result<Collected> {
    let mut rejoiner = Rejoiner {
        blocks: Vec::new(),
        open: None,
    };
    let mut old_spans = Vec::new();
    let mut pos = 0;

    for (page_index, page) in document.pages.iter().enumerate() {
        let bodies = page
            .regions
            .iter()
            .filter(|r| r.kind == RegionKind::Body)
            .count();
        if bodies != 1 {
            let reason = if bodies == 0 {
                "page has no body region".to_string()
            } else {
                format!("page has {} body regions", bodies)
            };
            return Err(PaginationError::structural(page_index + 1, reason));
        }

        pos += 1;
        for region in &page.regions {
            if region.kind != RegionKind::Body {
                pos += region.size();
                continue;
            }

            pos += 1;
            for block in &region.blocks {
                let size = block.size();
                old_spans.push(OldSpan {
                    position: pos,
                    size,
                });
                rejoiner.push(block, pos, height_or(heights, block.id, gap_height));
                pos += size;
            }
            pos += 1;
        }
        pos += 1;
    }

    Ok(Collected {
        blocks: rejoiner.finish(),
        old_spans,
        old_size: pos,
    })
}
