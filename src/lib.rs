//! mini-pager: screenplay-aware pagination for a paged document
//!
//! This crate re-flows the body blocks of a paged document into pages:
//! - Widow/orphan rules keep scene headings and character cues with what follows
//! - Long dialogue and action blocks are split at sentence boundaries
//! - The text cursor is carried from the old page tree into the new one
//! - Repeated passes without edits are no-ops
//!
//! Block heights are measured by the host and supplied per pass.

pub mod document;
pub mod editing;
pub mod error;
pub mod layout;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPaginator;

// Re-export primary types
pub use document::{Block, BlockClass, BlockId, Document, Page, Region, RegionKind};
pub use editing::{CursorTarget, PositionMap};
pub use error::{PaginationError, Result};
pub use layout::{
    paginate, CacheStats, HeightMap, HeightProvider, PageLayoutPolicy, PageSetup,
    PaginationCache, PaginationConfig, PaginationRules, PassOutcome,
};

/// Pagination state for one document
///
/// Owns the document, the cursor and the sentence cache between passes.
/// A pass either replaces the document and cursor together or leaves both
/// untouched.
pub struct Paginator {
    document: Document,
    cursor: Option<usize>,
    config: PaginationConfig,
    policy: Box<dyn PageLayoutPolicy>,
    cache: PaginationCache,
}

impl Paginator {
    /// Create a paginator with the default page setup
    pub fn new(document: Document) -> Self {
        Self::with_policy(document, PageSetup::default(), PaginationConfig::default())
    }

    /// Create a paginator with a custom page policy
    pub fn with_policy(
        document: Document,
        policy: impl PageLayoutPolicy + 'static,
        config: PaginationConfig,
    ) -> Self {
        Self {
            document,
            cursor: None,
            cache: PaginationCache::new(config.sentence_cache_capacity),
            config,
            policy: Box::new(policy),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Replace the document after an edit; the cursor is kept as given
    pub fn set_document(&mut self, document: Document) {
        self.document = document;
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor;
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Run one pass and apply its result
    pub fn paginate(&mut self, heights: &dyn HeightProvider) -> Result<PassOutcome> {
        let outcome = layout::paginate(
            &self.document,
            heights,
            self.cursor,
            self.policy.as_ref(),
            &self.config,
            &mut self.cache,
        )
        .map_err(|err| {
            log::error!("pagination pass abandoned: {}", err);
            err
        })?;

        if let PassOutcome::Repaginated {
            document, cursor, ..
        } = &outcome
        {
            self.cursor = Some(cursor.resolve(document));
            self.document = document.clone();
        }

        Ok(outcome)
    }

    /// Get document text
    pub fn text(&self) -> String {
        self.document.text()
    }

    /// Get total page count
    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }
}
