//! Reusable UI composition modules.
pub mod menu;
