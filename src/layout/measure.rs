//! Block heights supplied by a measurement provider

use crate::document::BlockId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Source of measured block heights
///
/// Heights come from the host's rendered view; the engine never computes
/// them. A missing height is a measurement gap, not an error.
pub trait HeightProvider {
    fn height(&self, id: BlockId) -> Option<f32>;
}

impl<F> HeightProvider for F
where
    F: Fn(BlockId) -> Option<f32>,
{
    fn height(&self, id: BlockId) -> Option<f32> {
        self(id)
    }
}

/// Heights keyed by block id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeightMap {
    heights: FxHashMap<BlockId, f32>,
}

impl HeightMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the height for a block
    pub fn set(&mut self, id: BlockId, height: f32) {
        self.heights.insert(id, height);
    }

    /// Builder-style setter
    pub fn with(mut self, id: BlockId, height: f32) -> Self {
        self.set(id, height);
        self
    }

    pub fn get(&self, id: BlockId) -> Option<f32> {
        self.heights.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Overlay another map; its entries win
    pub fn extend(&mut self, other: &HeightMap) {
        self.heights.extend(other.heights.iter().map(|(k, v)| (*k, *v)));
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, f32)> + '_ {
        self.heights.iter().map(|(k, v)| (*k, *v))
    }
}

impl HeightProvider for HeightMap {
    fn height(&self, id: BlockId) -> Option<f32> {
        self.get(id)
    }
}

impl FromIterator<(BlockId, f32)> for HeightMap {
    fn from_iter<I: IntoIterator<Item = (BlockId, f32)>>(iter: I) -> Self {
        Self {
            heights: iter.into_iter().collect(),
        }
    }
}

/// Resolve a height, substituting `fallback` for gaps and bad values
pub(crate) fn height_or(provider: &dyn HeightProvider, id: BlockId, fallback: f32) -> f32 {
    match provider.height(id) {
        Some(h) if h.is_finite() && h >= 0.0 => h,
        _ => {
            log::trace!("no usable height for block {}, using {}", id.0, fallback);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_map() {
        let map = HeightMap::new().with(BlockId(1), 12.0);
        assert_eq!(map.height(BlockId(1)), Some(12.0));
        assert_eq!(map.height(BlockId(2)), None);
    }

    #[test]
    fn test_gap_fallback() {
        let map = HeightMap::new()
            .with(BlockId(1), 30.0)
            .with(BlockId(2), f32::NAN)
            .with(BlockId(3), -4.0);
        assert_eq!(height_or(&map, BlockId(1), 10.0), 30.0);
        assert_eq!(height_or(&map, BlockId(2), 10.0), 10.0);
        assert_eq!(height_or(&map, BlockId(3), 10.0), 10.0);
        assert_eq!(height_or(&map, BlockId(9), 10.0), 10.0);
    }

    #[test]
    fn test_closure_provider() {
        let provider = |id: BlockId| Some(id.0 as f32 * 2.0);
        assert_eq!(height_or(&provider, BlockId(4), 1.0), 8.0);
    }

    #[test]
    fn test_extend_overrides() {
        let mut base: HeightMap = [(BlockId(1), 5.0), (BlockId(2), 6.0)].into_iter().collect();
        base.extend(&HeightMap::new().with(BlockId(2), 9.0));
        assert_eq!(base.get(BlockId(2)), Some(9.0));
        assert_eq!(base.len(), 2);
    }
}
