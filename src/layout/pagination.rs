//! Page geometry, header/footer templates and widow/orphan rules

use crate::document::{Block, BlockClass, BlockIdAllocator, Page, Region, RegionKind};
use serde::{Deserialize, Serialize};

/// Per-page attributes, queried by sequential page index
///
/// Implementations must be pure: the same index always yields the same
/// answer within a pass.
pub trait PageLayoutPolicy {
    /// Height available to body content on the page
    fn body_height(&self, page_index: usize) -> f32;

    /// Fresh header for a page that has no reusable predecessor
    fn header(&self, _page_index: usize, _ids: &mut BlockIdAllocator) -> Option<Region> {
        None
    }

    /// Fresh footer for a page that has no reusable predecessor
    fn footer(&self, _page_index: usize, _ids: &mut BlockIdAllocator) -> Option<Region> {
        None
    }

    /// Whether an existing page at this index keeps its header and footer
    fn reuse_existing(&self, _page_index: usize) -> bool {
        true
    }
}

/// Resolved attributes for one page under construction
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Page index (0-based)
    pub page_index: usize,
    pub body_height: f32,
    pub header: Option<Region>,
    pub footer: Option<Region>,
}

impl PageLayout {
    /// Look up the attributes for `page_index`
    ///
    /// A header or footer present on the prior page at the same index is
    /// copied verbatim when the policy allows it; otherwise a template is
    /// built.
    pub fn resolve(
        policy: &dyn PageLayoutPolicy,
        prior_pages: &[Page],
        page_index: usize,
        ids: &mut BlockIdAllocator,
    ) -> Self {
        let body_height = policy.body_height(page_index);
        let prior = prior_pages
            .get(page_index)
            .filter(|_| policy.reuse_existing(page_index));

        let header = prior
            .and_then(Page::header)
            .cloned()
            .or_else(|| policy.header(page_index, ids));
        let footer = prior
            .and_then(Page::footer)
            .cloned()
            .or_else(|| policy.footer(page_index, ids));

        Self {
            page_index,
            body_height,
            header,
            footer,
        }
    }

    /// Distance from the page's start to its first body block
    pub fn body_offset(&self) -> usize {
        // page open + header + body open
        1 + self.header.as_ref().map(Region::size).unwrap_or(0) + 1
    }

    /// Build the finished page around its body blocks
    pub fn into_page(self, body: Vec<Block>) -> Page {
        Page::assemble(self.page_index + 1, self.header, body, self.footer)
    }
}

/// Default policy: a fixed paper size with margins and a page-number header
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    /// Space reserved for the header region when present
    pub header_height: f32,
    /// Space reserved for the footer region
    pub footer_height: f32,
    /// Screenplays leave the first page unnumbered
    pub first_page_header: bool,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            page_height: 792.0, // US Letter
            margin_top: 72.0,   // 1 inch
            margin_bottom: 72.0,
            header_height: 36.0,
            footer_height: 0.0,
            first_page_header: false,
        }
    }
}

impl PageSetup {
    fn has_header(&self, page_index: usize) -> bool {
        page_index > 0 || self.first_page_header
    }
}

impl PageLayoutPolicy for PageSetup {
    fn body_height(&self, page_index: usize) -> f32 {
        let header = if self.has_header(page_index) {
            self.header_height
        } else {
            0.0
        };
        (self.page_height - self.margin_top - self.margin_bottom - header - self.footer_height)
            .max(0.0)
    }

    fn header(&self, page_index: usize, ids: &mut BlockIdAllocator) -> Option<Region> {
        if !self.has_header(page_index) {
            return None;
        }
        let number = Block::new(
            ids.allocate(),
            BlockClass::Other("page-number".to_string()),
            format!("{}.", page_index + 1),
        );
        Some(Region::new(RegionKind::Header, vec![number]))
    }
}

/// Widow/orphan rules, expressed in lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationRules {
    /// Minimum lines on each side of a split
    pub min_split_lines: usize,
    /// Lines a scene heading needs below it on the same page
    pub scene_lookahead_lines: usize,
    /// Lines a character cue and its speech need below them
    pub dialogue_lookahead_lines: usize,
    /// Remaining lines below which no split is attempted
    pub split_threshold_lines: usize,
}

impl Default for PaginationRules {
    fn default() -> Self {
        Self {
            min_split_lines: 2,
            scene_lookahead_lines: 2,
            dialogue_lookahead_lines: 1,
            split_threshold_lines: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BlockId;

    #[test]
    fn test_page_setup_heights() {
        let setup = PageSetup::default();
        assert_eq!(setup.body_height(0), 648.0); // 792 - 72 - 72
        assert_eq!(setup.body_height(1), 612.0); // minus the header
    }

    #[test]
    fn test_template_header() {
        let setup = PageSetup::default();
        let mut ids = BlockIdAllocator::after(Some(BlockId(9)));
        assert!(setup.header(0, &mut ids).is_none());

        let header = setup.header(2, &mut ids).unwrap();
        assert_eq!(header.kind, RegionKind::Header);
        assert_eq!(header.blocks[0].text, "3.");
        assert_eq!(header.blocks[0].id, BlockId(10));
    }

    #[test]
    fn test_resolve_reuses_prior_header() {
        let setup = PageSetup::default();
        let custom = Region::new(
            RegionKind::Header,
            vec![Block::new(BlockId(1), BlockClass::Untagged, "REVISED 2.")],
        );
        let prior = vec![
            Page::assemble(1, None, Vec::new(), None),
            Page::assemble(2, Some(custom.clone()), Vec::new(), None),
        ];
        let mut ids = BlockIdAllocator::after(Some(BlockId(1)));

        let layout = PageLayout::resolve(&setup, &prior, 1, &mut ids);
        assert_eq!(layout.header, Some(custom));
        assert_eq!(ids.peek(), BlockId(2), "no template ids consumed");

        let fresh = PageLayout::resolve(&setup, &prior, 2, &mut ids);
        assert_eq!(fresh.header.unwrap().blocks[0].text, "3.");
    }

    #[test]
    fn test_body_offset() {
        let setup = PageSetup::default();
        let mut ids = BlockIdAllocator::after(None);
        let first = PageLayout::resolve(&setup, &[], 0, &mut ids);
        assert_eq!(first.body_offset(), 2);

        // header region: 2 tokens + block "2." (2 chars + 2)
        let second = PageLayout::resolve(&setup, &[], 1, &mut ids);
        assert_eq!(second.body_offset(), 1 + 6 + 1);
    }
}
