//! Grouping of adjacent blocks that are paginated together
//!
//! A single forward pass with at most two blocks of lookahead. The result
//! depends only on the class sequence, never on heights.

use crate::document::BlockClass;
use crate::layout::collect::ContentBlock;
use crate::layout::split::SplitOutcome;
use smallvec::SmallVec;

/// Kind of group, which selects the lookahead rules applied to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupType {
    /// Scene heading plus at most one following action/untagged block
    Scene,
    /// Character cue with its parenthetical and/or dialogue
    CharacterDialogue,
    /// Standalone action block
    Action,
    /// Any other single block
    Single(BlockClass),
    /// What is left of a group after a split, opening the next page
    Continuation,
}

/// Adjacent blocks reasoned about together for page breaking
#[derive(Debug, Clone)]
pub struct ContentGroup {
    pub items: SmallVec<[ContentBlock; 3]>,
    pub total_height: f32,
    pub must_stay_together: bool,
    pub splittable: bool,
    pub group_type: GroupType,
    /// Bound by the composer once a split has been decided
    pub split: Option<SplitOutcome>,
}

impl ContentGroup {
    pub fn new(
        items: SmallVec<[ContentBlock; 3]>,
        must_stay_together: bool,
        splittable: bool,
        group_type: GroupType,
    ) -> Self {
        let total_height = items.iter().map(|b| b.height).sum();
        Self {
            items,
            total_height,
            must_stay_together,
            splittable,
            group_type,
            split: None,
        }
    }

    /// Index of the member a split would cut, if any
    ///
    /// The last member whose class permits splitting: the absorbed action
    /// of a scene group, the dialogue of a speech, or a lone block.
    pub fn split_candidate(&self) -> Option<usize> {
        if !self.splittable {
            return None;
        }
        self.items.iter().rposition(|b| b.class.is_splittable())
    }

    /// Height of the members before `index`
    pub fn height_before(&self, index: usize) -> f32 {
        self.items[..index].iter().map(|b| b.height).sum()
    }

    /// Bind a split outcome decided during composition
    pub fn bind_split(&mut self, outcome: SplitOutcome) {
        self.split = Some(outcome);
    }
}

/// Classify the block sequence into groups
pub fn build_groups(blocks: Vec<ContentBlock>) -> Vec<ContentGroup> {
    let mut groups = Vec::new();
    let mut iter = blocks.into_iter().peekable();

    while let Some(block) = iter.next() {
        let group = match block.class {
            BlockClass::Scene => {
                let mut items: SmallVec<[ContentBlock; 3]> = SmallVec::new();
                items.push(block);
                let absorbs = iter
                    .peek()
                    .map(|next| matches!(next.class, BlockClass::Untagged | BlockClass::Action))
                    .unwrap_or(false);
                let mut splittable = false;
                if absorbs {
                    if let Some(next) = iter.next() {
                        splittable = next.class == BlockClass::Action;
                        items.push(next);
                    }
                }
                ContentGroup::new(items, true, splittable, GroupType::Scene)
            }
            BlockClass::Character => {
                let mut items: SmallVec<[ContentBlock; 3]> = SmallVec::new();
                items.push(block);
                if let Some(next) = iter.next_if(|b| b.class == BlockClass::Parenthetical) {
                    items.push(next);
                }
                if let Some(next) = iter.next_if(|b| b.class == BlockClass::Dialogue) {
                    items.push(next);
                }
                ContentGroup::new(items, true, true, GroupType::CharacterDialogue)
            }
            BlockClass::Action => {
                let mut items: SmallVec<[ContentBlock; 3]> = SmallVec::new();
                items.push(block);
                ContentGroup::new(items, false, true, GroupType::Action)
            }
            ref class => {
                let splittable = class.is_splittable();
                let group_type = GroupType::Single(class.clone());
                let mut items: SmallVec<[ContentBlock; 3]> = SmallVec::new();
                items.push(block);
                ContentGroup::new(items, false, splittable, group_type)
            }
        };
        groups.push(group);
    }

    groups
}
