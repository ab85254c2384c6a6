//! Cursor preservation across re-flows

mod cursor;
mod position_map;

pub use cursor::CursorTarget;
pub use position_map::{MapTarget, PositionMap, PositionMapper};
