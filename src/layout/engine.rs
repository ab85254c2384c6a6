//! One pagination pass: collect, group, compose, map the cursor

use crate::document::{BlockIdAllocator, Document};
use crate::editing::{CursorTarget, PositionMapper};
use crate::error::{PaginationError, Result};
use crate::layout::cache::PaginationCache;
use crate::layout::collect::collect;
use crate::layout::compose::{Composer, Composition};
use crate::layout::group::build_groups;
use crate::layout::measure::{HeightMap, HeightProvider};
use crate::layout::pagination::{PageLayoutPolicy, PaginationRules};
use serde::{Deserialize, Serialize};

/// Default line height in points (12 pt Courier)
pub const LINE_HEIGHT: f32 = 12.0;

/// Tunables for a pagination pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Height of one rendered line
    pub line_height: f32,
    /// Height assumed for a block with no measurement
    pub gap_height: f32,
    pub rules: PaginationRules,
    /// Distinct texts kept in the sentence cache
    pub sentence_cache_capacity: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            line_height: LINE_HEIGHT,
            gap_height: LINE_HEIGHT,
            rules: PaginationRules::default(),
            sentence_cache_capacity: 1024,
        }
    }
}

/// Result of a pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassOutcome {
    /// The composed pages equal the input; nothing to apply
    Unchanged,
    /// A new document to replace the old one
    Repaginated {
        document: Document,
        cursor: CursorTarget,
        /// Height assumed for each emitted body block
        heights: HeightMap,
    },
}

impl PassOutcome {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, PassOutcome::Unchanged)
    }
}

/// Run one pass over `document`
///
/// Pure with respect to its inputs: `cache` only memoizes sentence
/// boundaries, so a cold and a warm cache give the same outcome.
pub fn paginate(
    document: &Document,
    heights: &dyn HeightProvider,
    cursor: Option<usize>,
    policy: &dyn PageLayoutPolicy,
    config: &PaginationConfig,
    cache: &mut PaginationCache,
) -> Result<PassOutcome> {
    let started = current_timestamp();

    let collected = collect(document, heights, config.gap_height)?;
    let collected_chars: usize = collected.blocks.iter().map(|b| b.text_len()).sum();

    let groups = build_groups(collected.blocks);
    let group_count = groups.len();

    let ids = BlockIdAllocator::after(document.max_block_id());
    let composition =
        Composer::new(policy, &document.pages, config, cache, ids).compose(groups);

    check_invariants(&composition, collected_chars)?;

    log::debug!(
        "paginated {} groups into {} pages ({} splits, {} deferrals) in {:.2}ms",
        group_count,
        composition.pages.len(),
        composition.stats.splits,
        composition.stats.deferrals,
        current_timestamp() - started
    );

    if composition.pages == document.pages {
        log::debug!("page structure unchanged");
        return Ok(PassOutcome::Unchanged);
    }

    let target = PositionMapper::new(
        &collected.old_spans,
        &composition.map,
        composition.new_size,
    )
    .map(cursor);
    if let CursorTarget::Offset(offset) = target {
        if offset >= composition.new_size {
            return Err(PaginationError::internal(format!(
                "cursor {} outside document of size {}",
                offset, composition.new_size
            )));
        }
    }

    Ok(PassOutcome::Repaginated {
        document: Document {
            pages: composition.pages,
        },
        cursor: target,
        heights: composition.heights,
    })
}

fn check_invariants(composition: &Composition, collected_chars: usize) -> Result<()> {
    let stats = &composition.stats;
    if stats.placed_chars + stats.separator_chars != collected_chars {
        return Err(PaginationError::internal(format!(
            "collected {} characters but placed {} (+{} separators)",
            collected_chars, stats.placed_chars, stats.separator_chars
        )));
    }
    if !composition.map.is_monotonic() {
        return Err(PaginationError::internal("position map is not monotonic"));
    }
    Ok(())
}

/// Current timestamp in milliseconds
fn current_timestamp() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}
