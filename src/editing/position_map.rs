//! Old → new position correspondence built while pages are composed

use crate::editing::CursorTarget;
use crate::layout::{OldSpan, TextSpan};
use std::collections::BTreeMap;

/// Where an old position run lands in the new document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapTarget {
    pub new_start: usize,
    /// Largest offset from the key this entry translates linearly
    pub reach: usize,
}

/// Old block-start positions mapped to new block-start positions
///
/// A split block contributes a second entry for where its tail began in
/// the old document; a rejoined block contributes one per old fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMap {
    entries: BTreeMap<usize, MapTarget>,
}

impl PositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one entry
    pub fn record(&mut self, old_start: usize, new_start: usize, reach: usize) {
        self.entries.insert(old_start, MapTarget { new_start, reach });
    }

    /// Record every span of a block placed at `new_position`
    pub fn record_block(&mut self, spans: &[TextSpan], new_position: usize) {
        for span in spans {
            self.record(span.key, new_position + span.text_start, span.len + 1);
        }
    }

    pub fn get(&self, old_start: usize) -> Option<MapTarget> {
        self.entries.get(&old_start).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in old-position order
    pub fn iter(&self) -> impl Iterator<Item = (usize, MapTarget)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    /// Whether new positions never decrease in old-position order
    pub fn is_monotonic(&self) -> bool {
        self.entries
            .values()
            .zip(self.entries.values().skip(1))
            .all(|(a, b)| a.new_start <= b.new_start)
    }

    /// Entry governing `offset` inside the old span `[lower, offset]`
    fn segment(&self, lower: usize, offset: usize) -> Option<(usize, MapTarget)> {
        self.entries
            .range(lower..=offset)
            .next_back()
            .map(|(k, v)| (*k, *v))
    }

    /// Entry with the key closest to `offset`; ties go to the earlier key
    fn nearest(&self, offset: usize) -> Option<(usize, MapTarget)> {
        let below = self.entries.range(..=offset).next_back();
        let above = self.entries.range(offset..).next();
        match (below, above) {
            (Some((bk, bv)), Some((ak, av))) => {
                if offset - bk <= ak - offset {
                    Some((*bk, *bv))
                } else {
                    Some((*ak, *av))
                }
            }
            (Some((k, v)), None) | (None, Some((k, v))) => Some((*k, *v)),
            (None, None) => None,
        }
    }
}

/// Translates a cursor offset from the old document into the new one
pub struct PositionMapper<'a> {
    old_spans: &'a [OldSpan],
    map: &'a PositionMap,
    new_size: usize,
}

impl<'a> PositionMapper<'a> {
    /// `old_spans` must be sorted and non-overlapping
    pub fn new(old_spans: &'a [OldSpan], map: &'a PositionMap, new_size: usize) -> Self {
        Self {
            old_spans,
            map,
            new_size,
        }
    }

    /// Old block containing `offset`, by binary search
    fn containing(&self, offset: usize) -> Option<&OldSpan> {
        let idx = self.old_spans.partition_point(|s| s.position <= offset);
        let span = self.old_spans.get(idx.checked_sub(1)?)?;
        span.contains(offset).then_some(span)
    }

    fn clamp(&self, offset: usize) -> usize {
        offset.min(self.new_size.saturating_sub(1))
    }

    /// Map an old cursor offset
    ///
    /// A cursor in a block found in the map keeps its offset within the
    /// block. Otherwise the closest mapped block by old position wins,
    /// which can land far from the logical spot. No cursor or no map at
    /// all means end of document.
    pub fn map(&self, old_offset: Option<usize>) -> CursorTarget {
        let Some(offset) = old_offset else {
            return CursorTarget::EndOfDocument;
        };
        if self.new_size == 0 {
            return CursorTarget::EndOfDocument;
        }

        if let Some(block) = self.containing(offset) {
            if let Some((key, target)) = self.map.segment(block.position, offset) {
                let delta = (offset - key).min(target.reach);
                return CursorTarget::Offset(self.clamp(target.new_start + delta));
            }
        }

        match self.map.nearest(offset) {
            Some((_, target)) => {
                log::trace!("cursor {} not in a mapped block, using nearest", offset);
                CursorTarget::Offset(self.clamp(target.new_start))
            }
            None => CursorTarget::EndOfDocument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans() -> Vec<OldSpan> {
        vec![
            OldSpan { position: 2, size: 7 },
            OldSpan { position: 9, size: 12 },
            OldSpan { position: 30, size: 6 },
        ]
    }

    #[test]
    fn test_offset_within_block() {
        let mut map = PositionMap::new();
        map.record(2, 2, 6);
        map.record(9, 40, 11);
        let old = spans();
        let mapper = PositionMapper::new(&old, &map, 100);

        assert_eq!(mapper.map(Some(4)), CursorTarget::Offset(4));
        assert_eq!(mapper.map(Some(12)), CursorTarget::Offset(43));
    }

    #[test]
    fn test_split_segment_lookup() {
        // block at 9 split: its old tail (from 15) now starts at 70
        let mut map = PositionMap::new();
        map.record(9, 40, 4);
        map.record(15, 70, 6);
        let old = spans();
        let mapper = PositionMapper::new(&old, &map, 100);

        assert_eq!(mapper.map(Some(11)), CursorTarget::Offset(42));
        assert_eq!(mapper.map(Some(14)), CursorTarget::Offset(44), "clamped to reach");
        assert_eq!(mapper.map(Some(17)), CursorTarget::Offset(72));
    }

    #[test]
    fn test_nearest_fallback() {
        let mut map = PositionMap::new();
        map.record(2, 5, 6);
        map.record(9, 20, 11);
        let old = spans();
        let mapper = PositionMapper::new(&old, &map, 100);

        // 31 lies in an unmapped block; 9 is the nearest key
        assert_eq!(mapper.map(Some(31)), CursorTarget::Offset(20));
        // 0 is outside every block (page/region tokens)
        assert_eq!(mapper.map(Some(0)), CursorTarget::Offset(5));
    }

    #[test]
    fn test_clamped_to_document() {
        let mut map = PositionMap::new();
        map.record(9, 40, 11);
        let old = spans();
        let mapper = PositionMapper::new(&old, &map, 45);
        assert_eq!(mapper.map(Some(20)), CursorTarget::Offset(44));
    }

    #[test]
    fn test_end_of_document_fallbacks() {
        let map = PositionMap::new();
        let old = spans();
        let mapper = PositionMapper::new(&old, &map, 50);
        assert_eq!(mapper.map(Some(4)), CursorTarget::EndOfDocument);

        let mut map = PositionMap::new();
        map.record(2, 2, 6);
        let mapper = PositionMapper::new(&old, &map, 50);
        assert_eq!(mapper.map(None), CursorTarget::EndOfDocument);
    }

    #[test]
    fn test_monotonic_check() {
        let mut map = PositionMap::new();
        map.record(2, 2, 1);
        map.record(9, 10, 1);
        assert!(map.is_monotonic());
        map.record(30, 5, 1);
        assert!(!map.is_monotonic());
    }
}
