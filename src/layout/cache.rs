//! Memoization shared across pagination passes
//!
//! Purely an optimization: entries are keyed by content, so a hit returns
//! exactly what a recomputation would.

use rustc_hash::FxHashMap;
use std::rc::Rc;
use unicode_segmentation::UnicodeSegmentation;

/// Sentence units of one text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceUnits {
    /// Byte offset where each unit starts; the first is always 0
    pub starts: Vec<usize>,
    /// `prefix[i]` = graphemes in units `0..i`; one longer than `starts`
    pub prefix: Vec<usize>,
}

impl SentenceUnits {
    /// Partition `text` into sentence units
    ///
    /// A unit ends after a run of periods that is followed by a non-word
    /// character or the end of the text. Closing quotes and brackets stay
    /// with the sentence, as does the whitespace after it, so units tile
    /// the text with no gaps.
    pub fn parse(text: &str) -> Self {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let n = chars.len();
        let mut starts = vec![0];
        let mut i = 0;

        while i < n {
            if chars[i].1 != '.' {
                i += 1;
                continue;
            }

            let mut j = i;
            while j < n && chars[j].1 == '.' {
                j += 1;
            }
            if j < n && is_word_char(chars[j].1) {
                i = j;
                continue;
            }

            while j < n && is_closer(chars[j].1) {
                j += 1;
            }
            while j < n && chars[j].1.is_whitespace() {
                j += 1;
            }
            if j < n {
                starts.push(chars[j].0);
            }
            i = j;
        }

        let mut prefix = Vec::with_capacity(starts.len() + 1);
        prefix.push(0);
        for (idx, &start) in starts.iter().enumerate() {
            let end = starts.get(idx + 1).copied().unwrap_or(text.len());
            let total = prefix[idx] + text[start..end].graphemes(true).count();
            prefix.push(total);
        }

        Self { starts, prefix }
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Total graphemes
    pub fn total(&self) -> usize {
        self.prefix.last().copied().unwrap_or(0)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}' | '\u{00BB}')
}

/// Cache hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Cross-pass memoization of sentence partitions
#[derive(Debug)]
pub struct PaginationCache {
    sentences: FxHashMap<String, Rc<SentenceUnits>>,
    capacity: usize,
    stats: CacheStats,
}

impl Default for PaginationCache {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl PaginationCache {
    /// Create a cache holding at most `capacity` distinct texts
    pub fn new(capacity: usize) -> Self {
        Self {
            sentences: FxHashMap::default(),
            capacity,
            stats: CacheStats::default(),
        }
    }

    /// Sentence units for `text`, computed on first use
    pub fn sentences(&mut self, text: &str) -> Rc<SentenceUnits> {
        if let Some(units) = self.sentences.get(text) {
            self.stats.hits += 1;
            return Rc::clone(units);
        }

        self.stats.misses += 1;
        let units = Rc::new(SentenceUnits::parse(text));
        if self.capacity > 0 {
            if self.sentences.len() >= self.capacity {
                // wholesale eviction
                self.sentences.clear();
            }
            self.sentences.insert(text.to_string(), Rc::clone(&units));
        }
        units
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn clear(&mut self) {
        self.sentences.clear();
    }
}
