//! Contextual menu state machinery for the cultivation-sim UI layer.
//!
//! The crate is headless presentation plumbing: a per-mode configuration
//! registry, a single-slot transition controller, the authoritative menu
//! state machine, and a command registry, composed behind
//! [`ContextualMenuPlugin`]. Rendering and input layers talk to it through
//! [`MenuIntent`]/[`ExecuteCommandRequest`] messages and observe the typed
//! event messages it republishes.
pub mod systems;

pub use systems::cursor::{PointerState, ScreenMetrics};
pub use systems::ui::menu::{
    CommandExecuted, CommandFault, CommandOutcome, CommandValidationFailed, ContextualMenuPlugin,
    ContextualMenuState, ExecuteCommandRequest, FnCommand, MenuAnchor, MenuClosed, MenuCommand,
    MenuCommandRegistry, MenuConfig, MenuConfigRegistry, MenuEvent, MenuEvents, MenuIntent,
    MenuItemSelected, MenuMode, MenuModeChanged, MenuOpened, MenuStateSnapshot, MenuSystems,
    MenuVisibilityChanged, TransitionCompleted, TransitionKind, TransitionUpdated,
};
