//! Per-mode menu configuration registry with bounded access history.
//!
//! Owns the mode configs, the available-mode set, and a short per-mode
//! history log used for debugging. Anchor resolution and config validation
//! are pure helpers so composition code and catalog loading share them.
use std::collections::{HashMap, HashSet, VecDeque};

use bevy::prelude::*;
use serde::Deserialize;

use crate::systems::cursor::{PointerState, ScreenMetrics};

use super::defs::{MenuAnchor, MenuConfig, MenuMode, TransitionKind};

/// Entries kept per mode in the access-history log.
pub const MODE_HISTORY_LIMIT: usize = 10;
/// Screen slot used by the `Fixed` anchor.
pub const FIXED_ANCHOR_POSITION: Vec2 = Vec2::new(100.0, 100.0);

/// Registry of per-mode menu policy.
#[derive(Debug)]
pub struct MenuConfigRegistry {
    configs: HashMap<MenuMode, MenuConfig>,
    available: HashSet<MenuMode>,
    history: HashMap<MenuMode, VecDeque<String>>,
}

impl Default for MenuConfigRegistry {
    fn default() -> Self {
        let mut registry = Self {
            configs: HashMap::new(),
            available: HashSet::new(),
            history: HashMap::new(),
        };
        for config in builtin_configs() {
            registry.register_mode(config);
        }
        registry
    }
}

impl MenuConfigRegistry {
    /// Upserts a mode config and marks the mode available.
    ///
    /// Blank mode names are rejected with a warning and leave the registry
    /// untouched.
    pub fn register_mode(&mut self, config: MenuConfig) -> bool {
        if config.mode.as_str().trim().is_empty() {
            warn!("cannot register a menu mode with a blank name");
            return false;
        }
        self.available.insert(config.mode.clone());
        self.configs.insert(config.mode.clone(), config);
        true
    }

    /// Removes a mode's config, availability, and history.
    ///
    /// Returns whether anything was removed.
    pub fn unregister_mode(&mut self, mode: &MenuMode) -> bool {
        let removed_config = self.configs.remove(mode).is_some();
        let removed_available = self.available.remove(mode);
        let removed_history = self.history.remove(mode).is_some();
        removed_config || removed_available || removed_history
    }

    /// Returns the registered config for a mode, or the synthesized default.
    ///
    /// Synthesizing never registers the mode as a side effect.
    pub fn config_for(&self, mode: &MenuMode) -> MenuConfig {
        self.configs
            .get(mode)
            .cloned()
            .unwrap_or_else(|| MenuConfig::for_mode(mode.clone()))
    }

    pub fn is_mode_available(&self, mode: &MenuMode) -> bool {
        self.available.contains(mode)
    }

    /// Snapshot of currently registered modes, in no particular order.
    pub fn registered_modes(&self) -> Vec<MenuMode> {
        self.available.iter().cloned().collect()
    }

    /// Appends a history stamp for a mode, skipping consecutive duplicates
    /// and evicting the oldest entry past the limit.
    pub fn record_history(&mut self, mode: &MenuMode, stamp: String) {
        let log = self.history.entry(mode.clone()).or_default();
        if log.back() == Some(&stamp) {
            return;
        }
        log.push_back(stamp);
        while log.len() > MODE_HISTORY_LIMIT {
            log.pop_front();
        }
    }

    /// Snapshot of a mode's access-history log, oldest first.
    pub fn history_snapshot(&self, mode: &MenuMode) -> Vec<String> {
        self.history
            .get(mode)
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Merges a JSON config catalog into the registry.
    ///
    /// Malformed JSON and entries that fail validation are skipped with a
    /// warning; already-registered configs stay untouched by bad input.
    /// Returns how many configs were applied.
    pub fn apply_catalog_json(&mut self, json: &str) -> usize {
        let catalog: MenuConfigCatalog = match serde_json::from_str(json) {
            Ok(catalog) => catalog,
            Err(error) => {
                warn!("failed to parse menu config catalog: {error}; keeping registered configs");
                return 0;
            }
        };

        let mut applied = 0;
        for config in catalog.configs {
            if !validate_config(&config) {
                warn!(
                    "menu config for `{}` failed validation; skipping catalog entry",
                    config.mode
                );
                continue;
            }
            if self.register_mode(config) {
                applied += 1;
            }
        }
        applied
    }
}

#[derive(Deserialize)]
struct MenuConfigCatalog {
    #[serde(default)]
    configs: Vec<MenuConfig>,
}

/// Checks a config against the registry's invariants: a non-blank mode, a
/// strictly positive item cap, and a finite non-negative duration.
pub fn validate_config(config: &MenuConfig) -> bool {
    !config.mode.as_str().trim().is_empty()
        && config.max_menu_items > 0
        && config.transition_duration.is_finite()
        && config.transition_duration >= 0.0
}

/// Resolves an anchor policy to a screen position.
///
/// The cursor anchor falls back to the screen center until the pointer has
/// reported a position.
pub fn resolve_anchor_position(
    anchor: MenuAnchor,
    pointer: &PointerState,
    screen: &ScreenMetrics,
    current: Vec2,
) -> Vec2 {
    match anchor {
        MenuAnchor::Cursor => pointer.position.unwrap_or_else(|| screen.center()),
        MenuAnchor::Center => screen.center(),
        MenuAnchor::Fixed => FIXED_ANCHOR_POSITION,
        MenuAnchor::Context => current,
    }
}

/// Formats the elapsed-time stamp recorded in mode history logs.
pub fn history_stamp(elapsed_secs: f64) -> String {
    format!("t+{elapsed_secs:.2}s")
}

fn builtin_configs() -> [MenuConfig; 3] {
    [
        MenuConfig {
            mode: MenuMode::Construction,
            auto_close_on_selection: true,
            allow_multiple_selection: false,
            max_menu_items: 12,
            anchor: MenuAnchor::Cursor,
            transition: TransitionKind::Fade,
            transition_duration: 0.2,
        },
        MenuConfig {
            mode: MenuMode::Cultivation,
            auto_close_on_selection: false,
            allow_multiple_selection: true,
            max_menu_items: 10,
            anchor: MenuAnchor::Fixed,
            transition: TransitionKind::Slide,
            transition_duration: 0.3,
        },
        MenuConfig {
            mode: MenuMode::Genetics,
            auto_close_on_selection: true,
            allow_multiple_selection: false,
            max_menu_items: 9,
            anchor: MenuAnchor::Context,
            transition: TransitionKind::Scale,
            transition_duration: 0.25,
        },
    ]
}
