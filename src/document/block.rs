//! Content blocks and their semantic classes

use crate::document::BlockId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic class of a block (screenplay element type)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum BlockClass {
    /// No class tag at all
    #[default]
    Untagged,
    /// Scene heading ("INT. KITCHEN - NIGHT")
    Scene,
    /// Action / description
    Action,
    /// Character cue above dialogue
    Character,
    /// Parenthetical direction inside a speech
    Parenthetical,
    /// Spoken dialogue
    Dialogue,
    /// Any other tag (transition, shot, ...)
    Other(String),
}

impl BlockClass {
    /// Parse a class tag; unknown tags are kept verbatim
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            None | Some("") => BlockClass::Untagged,
            Some("scene") => BlockClass::Scene,
            Some("action") => BlockClass::Action,
            Some("character") => BlockClass::Character,
            Some("parenthetical") => BlockClass::Parenthetical,
            Some("dialogue") => BlockClass::Dialogue,
            Some(other) => BlockClass::Other(other.to_string()),
        }
    }

    /// The tag string, if any
    pub fn tag(&self) -> Option<&str> {
        match self {
            BlockClass::Untagged => None,
            BlockClass::Scene => Some("scene"),
            BlockClass::Action => Some("action"),
            BlockClass::Character => Some("character"),
            BlockClass::Parenthetical => Some("parenthetical"),
            BlockClass::Dialogue => Some("dialogue"),
            BlockClass::Other(tag) => Some(tag),
        }
    }

    /// Whether a block of this class may be cut across two pages
    pub fn is_splittable(&self) -> bool {
        matches!(
            self,
            BlockClass::Untagged | BlockClass::Action | BlockClass::Dialogue
        )
    }
}

impl From<Option<String>> for BlockClass {
    fn from(tag: Option<String>) -> Self {
        BlockClass::from_tag(tag.as_deref())
    }
}

impl From<BlockClass> for Option<String> {
    fn from(class: BlockClass) -> Self {
        class.tag().map(str::to_string)
    }
}

/// A single text block in a page region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Stable identity across passes
    pub id: BlockId,
    #[serde(default)]
    pub class: BlockClass,
    /// Host attributes carried through pagination untouched
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
    /// Set on the first part of a split: the separator that rejoins it
    /// with the following `continued` block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joiner: Option<String>,
    /// Set on the second part of a split
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub continued: bool,
}

impl Block {
    /// Create a whole (unsplit) block
    pub fn new(id: BlockId, class: BlockClass, text: impl Into<String>) -> Self {
        Self {
            id,
            class,
            attrs: BTreeMap::new(),
            text: text.into(),
            joiner: None,
            continued: false,
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Text length in position units (chars)
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Size in position units: open token, text, close token
    pub fn size(&self) -> usize {
        self.text_len() + 2
    }

    /// Whether this block is one side of a split
    pub fn is_fragment(&self) -> bool {
        self.joiner.is_some() || self.continued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_tags() {
        assert_eq!(BlockClass::from_tag(Some("scene")), BlockClass::Scene);
        assert_eq!(BlockClass::from_tag(None), BlockClass::Untagged);
        assert_eq!(BlockClass::from_tag(Some("")), BlockClass::Untagged);
        assert_eq!(
            BlockClass::from_tag(Some("transition")),
            BlockClass::Other("transition".to_string())
        );
        assert_eq!(BlockClass::Dialogue.tag(), Some("dialogue"));
    }

    #[test]
    fn test_splittable_classes() {
        assert!(BlockClass::Untagged.is_splittable());
        assert!(BlockClass::Action.is_splittable());
        assert!(BlockClass::Dialogue.is_splittable());
        assert!(!BlockClass::Scene.is_splittable());
        assert!(!BlockClass::Parenthetical.is_splittable());
        assert!(!BlockClass::Other("transition".into()).is_splittable());
    }

    #[test]
    fn test_block_size_counts_chars() {
        let block = Block::new(BlockId(1), BlockClass::Action, "héllo");
        assert_eq!(block.text_len(), 5);
        assert_eq!(block.size(), 7);
    }

    #[test]
    fn test_class_serde_as_tag() {
        let block: Block =
            serde_json::from_str(r#"{"id":4,"class":"dialogue","text":"Hi."}"#).unwrap();
        assert_eq!(block.class, BlockClass::Dialogue);
        assert!(!block.continued);

        let untagged: Block = serde_json::from_str(r#"{"id":5,"text":"x"}"#).unwrap();
        assert_eq!(untagged.class, BlockClass::Untagged);

        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, r#"{"id":4,"class":"dialogue","text":"Hi."}"#);
    }
}
