//! Mid-block splitting at sentence boundaries

use crate::document::BlockIdAllocator;
use crate::layout::cache::PaginationCache;
use crate::layout::collect::{ContentBlock, TextSpan};
use smallvec::{smallvec, SmallVec};

/// A block cut in two across a page break
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOutcome {
    /// Index of the cut member within its group
    pub split_item_index: usize,
    /// Ends the current page
    pub first_part: ContentBlock,
    /// Opens the next page
    pub second_part: ContentBlock,
    pub first_part_height: f32,
    pub second_part_height: f32,
    /// Whitespace removed at the cut
    ///
    /// `first_part.text + separator + second_part.text` is the original.
    pub separator: String,
}

/// Finds the best sentence boundary to cut a block at
pub struct Splitter<'a> {
    line_height: f32,
    min_lines: usize,
    cache: &'a mut PaginationCache,
}

impl<'a> Splitter<'a> {
    pub fn new(line_height: f32, min_lines: usize, cache: &'a mut PaginationCache) -> Self {
        Self {
            line_height,
            min_lines,
            cache,
        }
    }

    /// Minimum height each side of a split must keep
    pub fn min_part_height(&self) -> f32 {
        self.line_height * self.min_lines as f32
    }

    /// Estimated height of `part` graphemes out of `total`
    fn estimate(&self, height: f32, part: usize, total: usize) -> f32 {
        (height * part as f32 / total as f32).max(self.line_height)
    }

    /// Cut `block` so its first part fits in `available_height`
    ///
    /// Returns `None` when the block has fewer than two sentences or no
    /// boundary leaves both parts at least `min_lines` tall.
    pub fn split(
        &mut self,
        block: &ContentBlock,
        split_item_index: usize,
        available_height: f32,
        ids: &mut BlockIdAllocator,
    ) -> Option<SplitOutcome> {
        let units = self.cache.sentences(&block.text);
        let count = units.len();
        let total = units.total();
        if count < 2 || total == 0 {
            return None;
        }

        let min = self.min_part_height();
        let first_height = |k: usize| self.estimate(block.height, units.prefix[k + 1], total);
        let second_height =
            |k: usize| self.estimate(block.height, total - units.prefix[k + 1], total);

        // Both upper bounds are monotone in k: the first part only grows
        // and the second only shrinks. Bisect for the last k meeting them.
        let fits = |k: usize| first_height(k) <= available_height && second_height(k) >= min;
        let (mut lo, mut hi) = (0, count - 1);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if fits(mid) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo == 0 {
            return None;
        }
        let k = lo - 1;
        if first_height(k) < min {
            return None;
        }

        let first_part_height = first_height(k);
        let second_part_height = second_height(k);

        let cut = units.starts[k + 1];
        let head = block.text[..cut].trim_end();
        let separator = block.text[head.len()..cut].to_string();
        let tail = &block.text[cut..];

        let head_len = head.chars().count();
        let tail_offset = head_len + separator.chars().count();
        let (head_spans, tail_spans) = partition_spans(&block.spans, head_len, tail_offset);

        let tail_ids: SmallVec<[_; 2]> = if block.ids.len() > 1 {
            block.ids[1..].iter().copied().collect()
        } else {
            smallvec![ids.allocate()]
        };

        log::trace!(
            "split block {} after sentence {} of {} ({:.1} + {:.1})",
            block.id.0,
            k + 1,
            count,
            first_part_height,
            second_part_height
        );

        Some(SplitOutcome {
            split_item_index,
            first_part: block.derive(
                smallvec![block.ids[0]],
                head.to_string(),
                first_part_height,
                head_spans,
                block.continued,
            ),
            second_part: block.derive(
                tail_ids,
                tail.to_string(),
                second_part_height,
                tail_spans,
                true,
            ),
            first_part_height,
            second_part_height,
            separator,
        })
    }
}

/// Distribute old-position spans over the two parts of a cut
///
/// Text `0..head_len` stays in the first part and text from `tail_offset`
/// on moves to the second; characters of the separator map to the end of
/// the first part.
fn partition_spans(
    spans: &[TextSpan],
    head_len: usize,
    tail_offset: usize,
) -> (SmallVec<[TextSpan; 1]>, SmallVec<[TextSpan; 1]>) {
    let mut head = SmallVec::new();
    let mut tail = SmallVec::new();

    for span in spans {
        let end = span.text_start + span.len;
        if span.text_start < tail_offset {
            let start = span.text_start.min(head_len);
            head.push(TextSpan {
                key: span.key,
                text_start: start,
                len: end.min(head_len) - start,
            });
        }
        if span.text_start >= tail_offset || end > tail_offset {
            let skip = tail_offset.saturating_sub(span.text_start);
            tail.push(TextSpan {
                key: span.key + skip,
                text_start: span.text_start + skip - tail_offset,
                len: span.len - skip,
            });
        }
    }

    (head, tail)
}
