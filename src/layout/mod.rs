//! Pagination engine
//!
//! A pass runs collector → group builder → composer (with the splitter)
//! and hands the position map to the cursor mapper.

mod cache;
mod collect;
mod compose;
mod engine;
mod group;
mod measure;
mod pagination;
mod split;

pub use cache::{CacheStats, PaginationCache, SentenceUnits};
pub use collect::{collect, Collected, ContentBlock, OldSpan, TextSpan};
pub use compose::{ComposeStats, Composer, Composition};
pub use engine::{paginate, PaginationConfig, PassOutcome, LINE_HEIGHT};
pub use group::{build_groups, ContentGroup, GroupType};
pub use measure::{HeightMap, HeightProvider};
pub use pagination::{PageLayout, PageLayoutPolicy, PageSetup, PaginationRules};
pub use split::{SplitOutcome, Splitter};
