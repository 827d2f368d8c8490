//! Authoritative contextual-menu state machine.
//!
//! Holds current mode, open/visible/focus flags, the selected item, and the
//! screen position. Each action takes its collaborators as explicit
//! arguments and appends the events it emits to a `MenuEvents` list; the
//! composition layer maps the list onto typed messages in order.
use std::sync::Arc;

use bevy::prelude::*;

use crate::systems::cursor::{PointerState, ScreenMetrics};

use super::{
    config::{history_stamp, resolve_anchor_position, MenuConfigRegistry},
    defs::{MenuEvent, MenuEvents, MenuMode, MenuStateSnapshot, TransitionKind},
    transition::MenuTransitionController,
};

#[derive(Debug)]
pub struct MenuStateCore {
    mode: Option<MenuMode>,
    is_open: bool,
    is_visible: bool,
    has_focus: bool,
    selected_item: Option<Arc<str>>,
    position: Vec2,
}

impl Default for MenuStateCore {
    fn default() -> Self {
        Self {
            mode: None,
            is_open: false,
            is_visible: true,
            has_focus: false,
            selected_item: None,
            position: Vec2::ZERO,
        }
    }
}

impl MenuStateCore {
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn current_mode(&self) -> Option<&MenuMode> {
        self.mode.as_ref()
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.selected_item.as_deref()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Opens a menu for `mode`, implicitly closing any other open mode.
    ///
    /// Fails on a blank or unregistered mode and while a transition is in
    /// flight. The position resolves from the explicit argument, else the
    /// mode's anchor policy. Emits `Closed` for a replaced mode, then
    /// `Opened`.
    pub fn open_menu(
        &mut self,
        mode: &MenuMode,
        position: Option<Vec2>,
        configs: &mut MenuConfigRegistry,
        transitions: &mut MenuTransitionController,
        pointer: &PointerState,
        screen: &ScreenMetrics,
        now_secs: f64,
        events: &mut MenuEvents,
    ) -> bool {
        if mode.as_str().trim().is_empty() {
            warn!("cannot open a menu for a blank mode");
            return false;
        }
        if !configs.is_mode_available(mode) {
            warn!("menu mode `{mode}` is not registered; open rejected");
            return false;
        }
        if transitions.is_transitioning() {
            warn!("menu transition in flight; open request for `{mode}` rejected");
            return false;
        }

        if self.is_open && self.mode.as_ref() != Some(mode) {
            if let Some(previous) = self.mode.take() {
                // Implicit close. The opening transition below takes the
                // slot a closing transition would have used, so none is
                // started for the replaced mode.
                self.selected_item = None;
                events.push(MenuEvent::Closed(previous));
            }
        }

        let config = configs.config_for(mode);
        let resolved = position.unwrap_or_else(|| {
            resolve_anchor_position(config.anchor, pointer, screen, self.position)
        });
        configs.record_history(mode, history_stamp(now_secs));

        let duration = if config.transition == TransitionKind::None {
            0.0
        } else {
            config.transition_duration
        };
        transitions.start(config.transition, true, duration);

        self.mode = Some(mode.clone());
        self.is_open = true;
        self.has_focus = true;
        self.position = resolved;
        events.push(MenuEvent::Opened(mode.clone()));
        true
    }

    /// Closes the open menu.
    ///
    /// No-op while closed or transitioning. Starts the closing transition,
    /// clears open/focus/selection, emits `Closed`, then drops the current
    /// mode.
    pub fn close_menu(
        &mut self,
        configs: &MenuConfigRegistry,
        transitions: &mut MenuTransitionController,
        events: &mut MenuEvents,
    ) -> bool {
        if !self.is_open {
            debug!("close requested while no menu is open");
            return false;
        }
        if transitions.is_transitioning() {
            warn!("menu transition in flight; close request rejected");
            return false;
        }
        let Some(closing) = self.mode.clone() else {
            self.is_open = false;
            return false;
        };

        let config = configs.config_for(&closing);
        let duration = if config.transition == TransitionKind::None {
            0.0
        } else {
            config.transition_duration
        };
        transitions.start(config.transition, false, duration);

        self.is_open = false;
        self.has_focus = false;
        self.selected_item = None;
        events.push(MenuEvent::Closed(closing));
        self.mode = None;
        true
    }

    /// Applies the mode's selection policy to `item`.
    ///
    /// Multi-select re-selection of the current item toggles the selection
    /// off; single-select always overwrites. Emits `ItemSelected` either
    /// way. Auto-close single-select configs close as a side effect, which
    /// itself no-ops while the opening transition is still in flight.
    pub fn select_item(
        &mut self,
        item: &str,
        configs: &MenuConfigRegistry,
        transitions: &mut MenuTransitionController,
        events: &mut MenuEvents,
    ) -> bool {
        if !self.is_open {
            warn!("cannot select a menu item while no menu is open");
            return false;
        }
        let trimmed = item.trim();
        if trimmed.is_empty() {
            warn!("cannot select a blank menu item");
            return false;
        }
        let Some(mode) = self.mode.clone() else {
            return false;
        };

        let config = configs.config_for(&mode);
        let selected: Arc<str> = Arc::from(trimmed);
        if config.allow_multiple_selection && self.selected_item.as_deref() == Some(trimmed) {
            self.selected_item = None;
        } else {
            self.selected_item = Some(selected.clone());
        }
        events.push(MenuEvent::ItemSelected {
            mode,
            item: selected,
        });

        if config.auto_close_on_selection && !config.allow_multiple_selection {
            self.close_menu(configs, transitions, events);
        }
        true
    }

    /// Retargets the machine to `new_mode`.
    ///
    /// No-op success when unchanged. When a menu was open it closes under
    /// the old mode, emits `ModeChanged`, and reopens under the new mode at
    /// the last-known position; when closed only the current mode moves.
    pub fn change_mode(
        &mut self,
        new_mode: &MenuMode,
        configs: &mut MenuConfigRegistry,
        transitions: &mut MenuTransitionController,
        pointer: &PointerState,
        screen: &ScreenMetrics,
        now_secs: f64,
        events: &mut MenuEvents,
    ) -> bool {
        if new_mode.as_str().trim().is_empty() {
            warn!("cannot change to a blank menu mode");
            return false;
        }
        if !configs.is_mode_available(new_mode) {
            warn!("menu mode `{new_mode}` is not registered; mode change rejected");
            return false;
        }
        if self.mode.as_ref() == Some(new_mode) {
            return true;
        }
        if transitions.is_transitioning() {
            warn!("menu transition in flight; mode change to `{new_mode}` rejected");
            return false;
        }

        let was_open = self.is_open;
        let reopen_position = self.position;
        if was_open {
            self.close_menu(configs, transitions, events);
            // The reopen below starts its own transition.
            transitions.reset();
        } else {
            self.mode = Some(new_mode.clone());
        }
        events.push(MenuEvent::ModeChanged(new_mode.clone()));
        if was_open {
            self.open_menu(
                new_mode,
                Some(reopen_position),
                configs,
                transitions,
                pointer,
                screen,
                now_secs,
                events,
            );
        }
        true
    }

    /// Shows or hides the menu independent of open state.
    ///
    /// Emits `VisibilityChanged` only on an actual change.
    pub fn set_visibility(&mut self, visible: bool, events: &mut MenuEvents) {
        if self.is_visible == visible {
            return;
        }
        self.is_visible = visible;
        events.push(MenuEvent::VisibilityChanged(visible));
    }

    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Force-closes and restores the defaults without emitting events.
    pub fn reset(&mut self, transitions: &mut MenuTransitionController) {
        self.mode = None;
        self.is_open = false;
        self.has_focus = false;
        self.is_visible = true;
        self.selected_item = None;
        self.position = Vec2::ZERO;
        transitions.reset();
    }

    /// Pure snapshot of the machine for external consumers.
    pub fn snapshot(&self, transitions: &MenuTransitionController) -> MenuStateSnapshot {
        MenuStateSnapshot {
            mode: self.mode.clone(),
            is_open: self.is_open,
            is_visible: self.is_visible,
            has_focus: self.has_focus,
            selected_item: self.selected_item.clone(),
            position: self.position,
            is_transitioning: transitions.is_transitioning(),
        }
    }
}
