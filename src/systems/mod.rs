//! Engine-facing systems for the UI layer.
pub mod cursor;
pub mod ui;
