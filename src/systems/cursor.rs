//! Injected pointer/screen providers for the headless UI state machinery.
//!
//! The menu core never touches the window directly. The host application
//! syncs these resources from its input and window layers once per frame;
//! tests write them in place.
use bevy::prelude::*;

/// Last known pointer position in screen coordinates.
///
/// `None` until the host reports a position for the first time.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub position: Option<Vec2>,
}

/// Logical screen dimensions used for anchor resolution.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ScreenMetrics {
    pub size: Vec2,
}

impl Default for ScreenMetrics {
    fn default() -> Self {
        Self {
            size: Vec2::new(1280.0, 720.0),
        }
    }
}

impl ScreenMetrics {
    pub fn center(&self) -> Vec2 {
        self.size * 0.5
    }
}
