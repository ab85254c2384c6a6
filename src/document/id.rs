//! Block identity

use serde::{Deserialize, Serialize};

/// Stable identifier for blocks that survives re-flow
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct BlockId(pub u64);

/// Hands out fresh block ids for split parts and template regions
///
/// Seeded past the largest id already in the document, so allocation is
/// deterministic for a given input.
#[derive(Debug, Clone)]
pub struct BlockIdAllocator {
    next: u64,
}

impl BlockIdAllocator {
    /// Start allocating after `max_existing`
    pub fn after(max_existing: Option<BlockId>) -> Self {
        Self {
            next: max_existing.map(|id| id.0 + 1).unwrap_or(0),
        }
    }

    /// Allocate the next id
    pub fn allocate(&mut self) -> BlockId {
        let id = BlockId(self.next);
        self.next += 1;
        id
    }

    /// Peek at the id `allocate` would return next
    pub fn peek(&self) -> BlockId {
        BlockId(self.next)
    }
}
