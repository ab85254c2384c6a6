//! Pages and their header/body/footer regions

use crate::document::Block;
use serde::{Deserialize, Serialize};

/// Role of a region inside a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Header,
    Body,
    Footer,
}

/// A run of blocks with one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub kind: RegionKind,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Region {
    pub fn new(kind: RegionKind, blocks: Vec<Block>) -> Self {
        Self { kind, blocks }
    }

    pub fn body(blocks: Vec<Block>) -> Self {
        Self::new(RegionKind::Body, blocks)
    }

    /// Size in position units: open token, blocks, close token
    pub fn size(&self) -> usize {
        2 + self.blocks.iter().map(Block::size).sum::<usize>()
    }
}

/// One page of the paginated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    pub number: usize,
    pub regions: Vec<Region>,
}

impl Page {
    /// Assemble a page in header, body, footer order
    pub fn assemble(
        number: usize,
        header: Option<Region>,
        body: Vec<Block>,
        footer: Option<Region>,
    ) -> Self {
        let mut regions = Vec::with_capacity(3);
        regions.extend(header);
        regions.push(Region::body(body));
        regions.extend(footer);
        Self { number, regions }
    }

    /// Size in position units: open token, regions, close token
    pub fn size(&self) -> usize {
        2 + self.regions.iter().map(Region::size).sum::<usize>()
    }

    /// First region of the given kind
    pub fn region(&self, kind: RegionKind) -> Option<&Region> {
        self.regions.iter().find(|r| r.kind == kind)
    }

    pub fn header(&self) -> Option<&Region> {
        self.region(RegionKind::Header)
    }

    pub fn body(&self) -> Option<&Region> {
        self.region(RegionKind::Body)
    }

    pub fn footer(&self) -> Option<&Region> {
        self.region(RegionKind::Footer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockClass, BlockId};

    #[test]
    fn test_sizes() {
        let block = Block::new(BlockId(0), BlockClass::Action, "abc");
        let region = Region::body(vec![block.clone(), block]);
        assert_eq!(region.size(), 2 + 5 + 5);

        let page = Page::assemble(1, None, region.blocks.clone(), None);
        assert_eq!(page.size(), 2 + 12);
    }

    #[test]
    fn test_assemble_order() {
        let header = Region::new(RegionKind::Header, Vec::new());
        let footer = Region::new(RegionKind::Footer, Vec::new());
        let page = Page::assemble(2, Some(header), Vec::new(), Some(footer));

        let kinds: Vec<_> = page.regions.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RegionKind::Header, RegionKind::Body, RegionKind::Footer]
        );
        assert!(page.body().is_some());
    }
}
