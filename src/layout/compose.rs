//! Page composition: the page-breaking state machine
//!
//! Groups are consumed in order with one page open at a time. A group that
//! does not fit is split when it can be, otherwise it starts the next page.
//! Every block appended to a page records where its old positions land.

use crate::document::{Block, BlockIdAllocator, Page};
use crate::editing::PositionMap;
use crate::layout::cache::PaginationCache;
use crate::layout::collect::ContentBlock;
use crate::layout::engine::PaginationConfig;
use crate::layout::group::{ContentGroup, GroupType};
use crate::layout::measure::HeightMap;
use crate::layout::pagination::{PageLayout, PageLayoutPolicy};
use crate::layout::split::Splitter;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Counters reported for a composition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComposeStats {
    pub splits: usize,
    pub deferrals: usize,
    pub overflows: usize,
    /// Text characters placed on pages
    pub placed_chars: usize,
    /// Separator characters removed at splits
    pub separator_chars: usize,
}

/// Result of composing a group sequence
#[derive(Debug, Clone)]
pub struct Composition {
    pub pages: Vec<Page>,
    pub map: PositionMap,
    /// Height assumed for every emitted body block
    pub heights: HeightMap,
    /// Size of the composed document
    pub new_size: usize,
    pub stats: ComposeStats,
}

/// Packs groups into pages
pub struct Composer<'a> {
    policy: &'a dyn PageLayoutPolicy,
    prior_pages: &'a [Page],
    config: &'a PaginationConfig,
    splitter: Splitter<'a>,
    ids: BlockIdAllocator,

    pages: Vec<Page>,
    layout: PageLayout,
    current: Vec<Block>,
    current_height: f32,
    /// New position where the open page starts
    page_start: usize,
    /// New position for the next block on the open page
    body_cursor: usize,

    map: PositionMap,
    heights: HeightMap,
    stats: ComposeStats,
}

impl<'a> Composer<'a> {
    /// `prior_pages` is a read-only snapshot of the old pages by index
    pub fn new(
        policy: &'a dyn PageLayoutPolicy,
        prior_pages: &'a [Page],
        config: &'a PaginationConfig,
        cache: &'a mut PaginationCache,
        mut ids: BlockIdAllocator,
    ) -> Self {
        let layout = PageLayout::resolve(policy, prior_pages, 0, &mut ids);
        let body_cursor = layout.body_offset();
        Self {
            policy,
            prior_pages,
            config,
            splitter: Splitter::new(config.line_height, config.rules.min_split_lines, cache),
            ids,
            pages: Vec::new(),
            layout,
            current: Vec::new(),
            current_height: 0.0,
            page_start: 0,
            body_cursor,
            map: PositionMap::new(),
            heights: HeightMap::new(),
            stats: ComposeStats::default(),
        }
    }

    /// Lay out `groups` into pages
    pub fn compose(mut self, groups: Vec<ContentGroup>) -> Composition {
        let mut queue: VecDeque<ContentGroup> = groups.into();

        while let Some(mut group) = queue.pop_front() {
            let remaining = self.layout.body_height - self.current_height;
            let fits = group.total_height <= remaining;

            if !fits {
                if group.splittable && remaining >= self.split_threshold() {
                    if let Some(outcome) = self.try_split(&group, remaining) {
                        group.bind_split(outcome);
                        let rest = self.place_split(group);
                        queue.push_front(rest);
                        continue;
                    }
                }

                if !self.current.is_empty() {
                    log::trace!(
                        "page {}: break before {:?} ({:.1} > {:.1})",
                        self.layout.page_index + 1,
                        group.group_type,
                        group.total_height,
                        remaining
                    );
                    self.break_page();
                    queue.push_front(group);
                    continue;
                }

                log::warn!(
                    "page {}: {:?} group of height {:.1} exceeds an empty page of {:.1}",
                    self.layout.page_index + 1,
                    group.group_type,
                    group.total_height,
                    remaining
                );
                self.stats.overflows += 1;
                self.place_group(group);
                continue;
            }

            if !queue.is_empty() && !self.current.is_empty() && self.defers(&group, remaining) {
                log::trace!(
                    "page {}: deferring {:?} to keep it with what follows",
                    self.layout.page_index + 1,
                    group.group_type
                );
                self.stats.deferrals += 1;
                self.break_page();
                queue.push_front(group);
                continue;
            }

            self.place_group(group);
        }

        self.finish()
    }

    fn split_threshold(&self) -> f32 {
        self.config.rules.split_threshold_lines as f32 * self.config.line_height
    }

    /// Lookahead rules for groups that fit but would strand what follows
    fn defers(&self, group: &ContentGroup, remaining: f32) -> bool {
        let slack = remaining - group.total_height;
        let line = self.config.line_height;
        let rules = &self.config.rules;
        match group.group_type {
            GroupType::Scene => slack < rules.scene_lookahead_lines as f32 * line,
            GroupType::CharacterDialogue => {
                group.split.is_none() && slack < rules.dialogue_lookahead_lines as f32 * line
            }
            _ => false,
        }
    }

    fn try_split(
        &mut self,
        group: &ContentGroup,
        remaining: f32,
    ) -> Option<crate::layout::split::SplitOutcome> {
        let index = group.split_candidate()?;
        let available = remaining - group.height_before(index);
        if available <= 0.0 {
            return None;
        }
        self.splitter
            .split(&group.items[index], index, available, &mut self.ids)
    }

    /// Place the part of a split group that stays on this page, break, and
    /// hand back the remainder for the next page
    fn place_split(&mut self, mut group: ContentGroup) -> ContentGroup {
        let Some(outcome) = group.split.take() else {
            return group;
        };
        self.stats.splits += 1;
        self.stats.separator_chars += outcome.separator.chars().count();

        let mut items = group.items.into_iter();
        for item in items.by_ref().take(outcome.split_item_index) {
            self.place(&item, None);
        }
        // the cut member is replaced by its two parts
        items.next();
        self.place(&outcome.first_part, Some(outcome.separator.clone()));
        self.break_page();

        let mut rest: SmallVec<[ContentBlock; 3]> = SmallVec::new();
        rest.push(outcome.second_part);
        rest.extend(items);
        ContentGroup::new(
            rest,
            group.must_stay_together,
            true,
            GroupType::Continuation,
        )
    }

    fn place_group(&mut self, group: ContentGroup) {
        for item in &group.items {
            self.place(item, None);
        }
    }

    /// Append one block to the open page
    fn place(&mut self, content: &ContentBlock, joiner: Option<String>) {
        let block = content.to_block(content.id, content.text.clone(), joiner, content.continued);

        self.map.record_block(&content.spans, self.body_cursor);
        self.body_cursor += block.size();
        self.current_height += content.height;
        self.heights.set(block.id, content.height);
        self.stats.placed_chars += content.text_len();
        self.current.push(block);
    }

    /// Close the open page and open the next one
    fn break_page(&mut self) {
        let next = PageLayout::resolve(
            self.policy,
            self.prior_pages,
            self.layout.page_index + 1,
            &mut self.ids,
        );
        let layout = std::mem::replace(&mut self.layout, next);
        let page = layout.into_page(std::mem::take(&mut self.current));

        self.page_start += page.size();
        self.pages.push(page);
        self.body_cursor = self.page_start + self.layout.body_offset();
        self.current_height = 0.0;
    }

    fn finish(mut self) -> Composition {
        if !self.current.is_empty() || self.pages.is_empty() {
            let page = self.layout.into_page(std::mem::take(&mut self.current));
            self.page_start += page.size();
            self.pages.push(page);
        }

        Composition {
            pages: self.pages,
            map: self.map,
            heights: self.heights,
            new_size: self.page_start,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockClass, BlockId, Document};
    use crate::layout::group::build_groups;

    /// Every page has the same body height and no header
    struct Fixed(f32);

    impl PageLayoutPolicy for Fixed {
        fn body_height(&self, _page_index: usize) -> f32 {
            self.0
        }
    }

    fn config() -> PaginationConfig {
        PaginationConfig {
            line_height: 10.0,
            gap_height: 10.0,
            ..PaginationConfig::default()
        }
    }

    fn content(id: u64, tag: &str, text: &str, height: f32) -> ContentBlock {
        let block = Block::new(BlockId(id), BlockClass::from_tag(Some(tag)), text);
        ContentBlock::from_block(&block, 0, height)
    }

    fn compose(body: f32, blocks: Vec<ContentBlock>) -> Composition {
        let config = config();
        let mut cache = PaginationCache::default();
        let policy = Fixed(body);
        Composer::new(&policy, &[], &config, &mut cache, BlockIdAllocator::after(Some(BlockId(99))))
            .compose(build_groups(blocks))
    }

    fn texts(page: &Page) -> Vec<&str> {
        page.body().unwrap().blocks.iter().map(|b| b.text.as_str()).collect()
    }

    #[test]
    fn test_scene_group_deferred_when_it_does_not_fit() {
        // 75 of 100 used: 25 left for scene(20) + action(15)
        let result = compose(
            100.0,
            vec![
                content(0, "action", "Setup.", 75.0),
                content(1, "scene", "INT. LAB", 20.0),
                content(2, "action", "Beakers bubble.", 15.0),
            ],
        );
        assert_eq!(result.pages.len(), 2);
        assert_eq!(texts(&result.pages[0]), vec!["Setup."]);
        assert_eq!(texts(&result.pages[1]), vec!["INT. LAB", "Beakers bubble."]);
    }

    #[test]
    fn test_scene_needs_two_lines_below() {
        // scene fits (20 of 35) but leaves only 15 below it
        let result = compose(
            100.0,
            vec![
                content(0, "action", "Setup.", 65.0),
                content(1, "scene", "EXT. PIER", 20.0),
                content(2, "character", "ANNA", 10.0),
            ],
        );
        assert_eq!(texts(&result.pages[0]), vec!["Setup."]);
        assert_eq!(texts(&result.pages[1]), vec!["EXT. PIER", "ANNA"]);
        assert_eq!(result.stats.deferrals, 1);
    }

    #[test]
    fn test_last_scene_is_not_deferred() {
        let result = compose(
            100.0,
            vec![
                content(0, "action", "Setup.", 65.0),
                content(1, "scene", "EXT. PIER", 20.0),
            ],
        );
        assert_eq!(result.pages.len(), 1);
    }

    #[test]
    fn test_dialogue_split_across_pages() {
        let speech = "Stop now. Run away. Get up. Stay. Leave.";
        let result = compose(
            100.0,
            vec![
                content(0, "action", "Setup.", 70.0),
                content(1, "character", "BOB", 10.0),
                content(2, "dialogue", speech, 40.0),
            ],
        );
        assert_eq!(result.pages.len(), 2);
        assert_eq!(texts(&result.pages[0]), vec!["Setup.", "BOB", "Stop now. Run away."]);
        assert_eq!(texts(&result.pages[1]), vec!["Get up. Stay. Leave."]);

        let head = &result.pages[0].body().unwrap().blocks[2];
        let tail = &result.pages[1].body().unwrap().blocks[0];
        assert_eq!(head.joiner.as_deref(), Some(" "));
        assert!(tail.continued);
        assert_eq!(tail.id, BlockId(100));
        assert_eq!(result.heights.get(tail.id), Some(20.0));
        assert_eq!(result.stats.splits, 1);
    }

    #[test]
    fn test_single_sentence_forces_break() {
        let result = compose(
            100.0,
            vec![
                content(0, "action", "Setup.", 70.0),
                content(1, "action", "One long unbroken sentence here.", 50.0),
            ],
        );
        assert_eq!(result.pages.len(), 2);
        assert_eq!(result.stats.splits, 0);
        assert_eq!(texts(&result.pages[1]), vec!["One long unbroken sentence here."]);
    }

    #[test]
    fn test_character_needs_a_line_below() {
        // character + dialogue = 30 fits in 35 but leaves 5 < one line
        let result = compose(
            100.0,
            vec![
                content(0, "action", "Setup.", 65.0),
                content(1, "character", "BOB", 10.0),
                content(2, "dialogue", "Hi.", 20.0),
                content(3, "action", "He waves.", 10.0),
            ],
        );
        assert_eq!(texts(&result.pages[0]), vec!["Setup."]);
        assert_eq!(texts(&result.pages[1]), vec!["BOB", "Hi.", "He waves."]);
    }

    #[test]
    fn test_oversized_block_split_repeatedly() {
        // 12 sentences of 10 graphemes on 40-high pages
        let text = vec!["Aaaa bbbb."; 12].join(" ");
        let result = compose(40.0, vec![content(0, "action", &text, 120.0)]);

        assert!(result.pages.len() >= 3);
        let rebuilt = Document {
            pages: result.pages.clone(),
        };
        assert_eq!(rebuilt.text(), text);
        for page in &result.pages {
            let height: f32 = page
                .body()
                .unwrap()
                .blocks
                .iter()
                .map(|b| result.heights.get(b.id).unwrap())
                .sum();
            assert!(height <= 40.0 + 0.001);
        }
    }

    #[test]
    fn test_oversized_unsplittable_overflows_empty_page() {
        let result = compose(
            50.0,
            vec![
                content(0, "transition", "CUT TO:", 80.0),
                content(1, "action", "Next.", 10.0),
            ],
        );
        assert_eq!(result.pages.len(), 2);
        assert_eq!(result.stats.overflows, 1);
    }

    #[test]
    fn test_positions_recorded_in_new_document() {
        let blocks = vec![
            ContentBlock::from_block(&Block::new(BlockId(0), BlockClass::Action, "ab"), 2, 60.0),
            ContentBlock::from_block(&Block::new(BlockId(1), BlockClass::Action, "cd"), 6, 60.0),
        ];
        let result = compose(100.0, blocks);

        // page 1: page(1) body(1) [ab] body(1) page(1) = 8; page 2 body at 10
        assert_eq!(result.map.get(2).unwrap().new_start, 2);
        assert_eq!(result.map.get(6).unwrap().new_start, 10);
        assert_eq!(result.new_size, 16);
        assert!(result.map.is_monotonic());
    }

    #[test]
    fn test_empty_input_yields_one_page() {
        let result = compose(100.0, Vec::new());
        assert_eq!(result.pages.len(), 1);
        assert!(result.pages[0].body().unwrap().blocks.is_empty());
    }
}
