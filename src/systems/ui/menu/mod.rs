//! Contextual menu composition built from the menu primitives.
//!
//! This module owns the facade over the configuration registry, transition
//! controller, and state core, plus the plugin wiring that applies inbound
//! intents, drives transitions each frame, and republishes state-machine
//! events as typed messages.
use bevy::prelude::*;

use crate::systems::cursor::{PointerState, ScreenMetrics};

pub mod command_flow;
pub mod config;
pub mod defs;
pub mod state_core;
pub mod transition;

pub use command_flow::{
    CommandFault, FnCommand, MenuCommand, MenuCommandRegistry, COMMAND_HISTORY_LIMIT,
};
pub use config::{MenuConfigRegistry, MODE_HISTORY_LIMIT};
pub use defs::{
    CommandExecuted, CommandOutcome, CommandValidationFailed, ExecuteCommandRequest, MenuAnchor,
    MenuClosed, MenuConfig, MenuEvent, MenuEvents, MenuIntent, MenuItemSelected, MenuMode,
    MenuModeChanged, MenuOpened, MenuStateSnapshot, MenuVisibilityChanged, TransitionCompleted,
    TransitionKind, TransitionUpdated,
};
pub use state_core::MenuStateCore;
pub use transition::{
    transition_params, Easing, MenuTransitionController, TransitionParams, TransitionTick,
};

/// Execution stages for the menu systems within `Update`.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum MenuSystems {
    Intents,
    Transitions,
    Commands,
}

/// Facade over the three menu components.
///
/// Exclusively owns one configuration registry, one transition controller,
/// and one state core, and forwards the public operations so collaborators
/// depend on a single surface.
#[derive(Resource, Debug, Default)]
pub struct ContextualMenuState {
    configs: MenuConfigRegistry,
    transitions: MenuTransitionController,
    core: MenuStateCore,
}

impl ContextualMenuState {
    pub fn open_menu(
        &mut self,
        mode: &MenuMode,
        position: Option<Vec2>,
        pointer: &PointerState,
        screen: &ScreenMetrics,
        now_secs: f64,
        events: &mut MenuEvents,
    ) -> bool {
        self.core.open_menu(
            mode,
            position,
            &mut self.configs,
            &mut self.transitions,
            pointer,
            screen,
            now_secs,
            events,
        )
    }

    pub fn close_menu(&mut self, events: &mut MenuEvents) -> bool {
        self.core
            .close_menu(&self.configs, &mut self.transitions, events)
    }

    pub fn select_item(&mut self, item: &str, events: &mut MenuEvents) -> bool {
        self.core
            .select_item(item, &self.configs, &mut self.transitions, events)
    }

    pub fn change_mode(
        &mut self,
        mode: &MenuMode,
        pointer: &PointerState,
        screen: &ScreenMetrics,
        now_secs: f64,
        events: &mut MenuEvents,
    ) -> bool {
        self.core.change_mode(
            mode,
            &mut self.configs,
            &mut self.transitions,
            pointer,
            screen,
            now_secs,
            events,
        )
    }

    pub fn set_visibility(&mut self, visible: bool, events: &mut MenuEvents) {
        self.core.set_visibility(visible, events);
    }

    pub fn set_focus(&mut self, has_focus: bool) {
        self.core.set_focus(has_focus);
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.core.set_position(position);
    }

    /// Force-closes and restores defaults without emitting events.
    pub fn reset(&mut self) {
        self.core.reset(&mut self.transitions);
    }

    pub fn snapshot(&self) -> MenuStateSnapshot {
        self.core.snapshot(&self.transitions)
    }

    pub fn is_menu_open(&self) -> bool {
        self.core.is_open()
    }

    pub fn current_mode(&self) -> Option<&MenuMode> {
        self.core.current_mode()
    }

    /// Advances the in-flight transition by a time step.
    pub fn tick_transition(&mut self, delta_secs: f32) -> TransitionTick {
        self.transitions.advance(delta_secs)
    }

    /// Drives the in-flight transition to an explicit progress value.
    pub fn set_transition_progress(&mut self, progress: f32) -> TransitionTick {
        self.transitions.set_progress(progress)
    }

    pub fn configs(&self) -> &MenuConfigRegistry {
        &self.configs
    }

    pub fn configs_mut(&mut self) -> &mut MenuConfigRegistry {
        &mut self.configs
    }

    pub fn transitions(&self) -> &MenuTransitionController {
        &self.transitions
    }
}

#[derive(bevy::ecs::system::SystemParam)]
struct MenuEventWriters<'w> {
    opened: MessageWriter<'w, MenuOpened>,
    closed: MessageWriter<'w, MenuClosed>,
    selected: MessageWriter<'w, MenuItemSelected>,
    mode_changed: MessageWriter<'w, MenuModeChanged>,
    visibility_changed: MessageWriter<'w, MenuVisibilityChanged>,
}

impl MenuEventWriters<'_> {
    fn write_all(&mut self, events: MenuEvents) {
        for event in events {
            match event {
                MenuEvent::Opened(mode) => {
                    self.opened.write(MenuOpened { mode });
                }
                MenuEvent::Closed(mode) => {
                    self.closed.write(MenuClosed { mode });
                }
                MenuEvent::ItemSelected { mode, item } => {
                    self.selected.write(MenuItemSelected { mode, item });
                }
                MenuEvent::ModeChanged(mode) => {
                    self.mode_changed.write(MenuModeChanged { mode });
                }
                MenuEvent::VisibilityChanged(visible) => {
                    self.visibility_changed
                        .write(MenuVisibilityChanged { visible });
                }
            }
        }
    }
}

fn apply_menu_intents(
    mut intents: MessageReader<MenuIntent>,
    mut menu: ResMut<ContextualMenuState>,
    pointer: Res<PointerState>,
    screen: Res<ScreenMetrics>,
    time: Res<Time>,
    mut writers: MenuEventWriters,
) {
    let now_secs = time.elapsed_secs_f64();
    for intent in intents.read() {
        let mut events = MenuEvents::new();
        match intent {
            MenuIntent::Open { mode, position } => {
                menu.open_menu(mode, *position, &pointer, &screen, now_secs, &mut events);
            }
            MenuIntent::Close => {
                menu.close_menu(&mut events);
            }
            MenuIntent::SelectItem { item } => {
                menu.select_item(item, &mut events);
            }
            MenuIntent::ChangeMode { mode } => {
                menu.change_mode(mode, &pointer, &screen, now_secs, &mut events);
            }
            MenuIntent::SetVisibility { visible } => menu.set_visibility(*visible, &mut events),
            MenuIntent::SetFocus { has_focus } => menu.set_focus(*has_focus),
            MenuIntent::SetPosition { position } => menu.set_position(*position),
            MenuIntent::Reset => menu.reset(),
        }
        writers.write_all(events);
    }
}

fn advance_menu_transitions(
    time: Res<Time>,
    mut menu: ResMut<ContextualMenuState>,
    mut updates: MessageWriter<TransitionUpdated>,
    mut completions: MessageWriter<TransitionCompleted>,
) {
    let tick = menu.tick_transition(time.delta_secs());
    if let Some((kind, progress)) = tick.updated {
        updates.write(TransitionUpdated { kind, progress });
    }
    if let Some((kind, was_opening)) = tick.completed {
        completions.write(TransitionCompleted { kind, was_opening });
    }
}

/// Contextual menu state machinery: facade resource, command registry,
/// injected providers, and the intent/transition/command systems.
pub struct ContextualMenuPlugin;

impl Plugin for ContextualMenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ContextualMenuState>()
            .init_resource::<MenuCommandRegistry>()
            .init_resource::<PointerState>()
            .init_resource::<ScreenMetrics>()
            .init_resource::<Time>()
            .add_message::<MenuIntent>()
            .add_message::<ExecuteCommandRequest>()
            .add_message::<MenuOpened>()
            .add_message::<MenuClosed>()
            .add_message::<MenuItemSelected>()
            .add_message::<MenuModeChanged>()
            .add_message::<MenuVisibilityChanged>()
            .add_message::<TransitionUpdated>()
            .add_message::<TransitionCompleted>()
            .add_message::<CommandExecuted>()
            .add_message::<CommandValidationFailed>();
        app.configure_sets(
            Update,
            (
                MenuSystems::Intents,
                MenuSystems::Transitions.after(MenuSystems::Intents),
                MenuSystems::Commands.after(MenuSystems::Transitions),
            ),
        );
        app.add_systems(Update, apply_menu_intents.in_set(MenuSystems::Intents));
        app.add_systems(
            Update,
            advance_menu_transitions.in_set(MenuSystems::Transitions),
        );
        app.add_systems(
            Update,
            command_flow::execute_command_requests.in_set(MenuSystems::Commands),
        );
    }
}
