//! Shared contextual-menu data model: modes, configs, snapshots, and the
//! message surface consumed by rendering and input collaborators.
use std::{fmt, sync::Arc};

use bevy::prelude::*;
use enum_map::Enum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

pub(super) const MODE_CONSTRUCTION: &str = "construction";
pub(super) const MODE_CULTIVATION: &str = "cultivation";
pub(super) const MODE_GENETICS: &str = "genetics";

/// Fallback item cap for modes opened without a registered config.
pub const DEFAULT_MAX_MENU_ITEMS: usize = 8;
/// Fallback transition duration in seconds.
pub const DEFAULT_TRANSITION_DURATION: f32 = 0.2;

/// Gameplay mode a contextual menu belongs to.
///
/// The built-in variants cover the shipped gameplay modes; `Custom` is the
/// extensibility hook for modes registered at runtime. The configuration
/// registry is the authority on which modes are actually available.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MenuMode {
    Construction,
    Cultivation,
    Genetics,
    Custom(Arc<str>),
}

impl MenuMode {
    /// Maps a mode name onto a mode, rejecting blank input.
    pub fn parse(name: &str) -> Option<MenuMode> {
        let trimmed = name.trim();
        match trimmed {
            "" => None,
            MODE_CONSTRUCTION => Some(MenuMode::Construction),
            MODE_CULTIVATION => Some(MenuMode::Cultivation),
            MODE_GENETICS => Some(MenuMode::Genetics),
            other => Some(MenuMode::Custom(Arc::from(other))),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MenuMode::Construction => MODE_CONSTRUCTION,
            MenuMode::Cultivation => MODE_CULTIVATION,
            MenuMode::Genetics => MODE_GENETICS,
            MenuMode::Custom(name) => name,
        }
    }
}

impl fmt::Display for MenuMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MenuMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MenuMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        MenuMode::parse(&name)
            .ok_or_else(|| serde::de::Error::custom("menu mode name cannot be blank"))
    }
}

/// Where a menu lands on screen when opened without an explicit position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAnchor {
    /// Live pointer position.
    #[default]
    Cursor,
    /// Screen center.
    Center,
    /// A fixed screen slot.
    Fixed,
    /// The caller-provided context position.
    Context,
}

/// Visual transition style played while a menu opens or closes.
#[derive(Enum, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    None,
    #[default]
    Fade,
    Slide,
    Scale,
}

/// Per-mode menu policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuConfig {
    pub mode: MenuMode,
    #[serde(default = "default_auto_close")]
    pub auto_close_on_selection: bool,
    #[serde(default)]
    pub allow_multiple_selection: bool,
    #[serde(default = "default_max_menu_items")]
    pub max_menu_items: usize,
    #[serde(default)]
    pub anchor: MenuAnchor,
    #[serde(default)]
    pub transition: TransitionKind,
    #[serde(default = "default_transition_duration")]
    pub transition_duration: f32,
}

impl MenuConfig {
    /// Synthesizes the fallback policy for a mode with no registered config.
    pub fn for_mode(mode: MenuMode) -> Self {
        Self {
            mode,
            auto_close_on_selection: true,
            allow_multiple_selection: false,
            max_menu_items: DEFAULT_MAX_MENU_ITEMS,
            anchor: MenuAnchor::Cursor,
            transition: TransitionKind::Fade,
            transition_duration: DEFAULT_TRANSITION_DURATION,
        }
    }
}

fn default_auto_close() -> bool {
    true
}

fn default_max_menu_items() -> usize {
    DEFAULT_MAX_MENU_ITEMS
}

fn default_transition_duration() -> f32 {
    DEFAULT_TRANSITION_DURATION
}

/// Point-in-time view of the menu state machine for external consumers.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuStateSnapshot {
    pub mode: Option<MenuMode>,
    pub is_open: bool,
    pub is_visible: bool,
    pub has_focus: bool,
    pub selected_item: Option<Arc<str>>,
    pub position: Vec2,
    pub is_transitioning: bool,
}

/// Result of running a menu command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    pub message: String,
}

impl CommandOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// State-machine event produced by a core action, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum MenuEvent {
    Opened(MenuMode),
    Closed(MenuMode),
    ItemSelected { mode: MenuMode, item: Arc<str> },
    ModeChanged(MenuMode),
    VisibilityChanged(bool),
}

/// Ordered event list appended to by the reducer-style core actions.
pub type MenuEvents = SmallVec<[MenuEvent; 4]>;

/// Inbound request to mutate the menu state machine.
#[derive(Message, Clone, Debug)]
pub enum MenuIntent {
    Open {
        mode: MenuMode,
        position: Option<Vec2>,
    },
    Close,
    SelectItem {
        item: Arc<str>,
    },
    ChangeMode {
        mode: MenuMode,
    },
    SetVisibility {
        visible: bool,
    },
    SetFocus {
        has_focus: bool,
    },
    SetPosition {
        position: Vec2,
    },
    Reset,
}

/// Inbound request to run a registered command by id.
#[derive(Message, Clone, Debug)]
pub struct ExecuteCommandRequest {
    pub id: Arc<str>,
}

#[derive(Message, Clone, Debug, PartialEq)]
pub struct MenuOpened {
    pub mode: MenuMode,
}

#[derive(Message, Clone, Debug, PartialEq)]
pub struct MenuClosed {
    pub mode: MenuMode,
}

#[derive(Message, Clone, Debug, PartialEq)]
pub struct MenuItemSelected {
    pub mode: MenuMode,
    pub item: Arc<str>,
}

#[derive(Message, Clone, Debug, PartialEq)]
pub struct MenuModeChanged {
    pub mode: MenuMode,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuVisibilityChanged {
    pub visible: bool,
}

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct TransitionUpdated {
    pub kind: TransitionKind,
    pub progress: f32,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionCompleted {
    pub kind: TransitionKind,
    pub was_opening: bool,
}

#[derive(Message, Clone, Debug, PartialEq)]
pub struct CommandExecuted {
    /// Registry id of the executed command; `None` for detached dispatches.
    pub id: Option<Arc<str>>,
    pub outcome: CommandOutcome,
}

#[derive(Message, Clone, Debug, PartialEq, Eq)]
pub struct CommandValidationFailed {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parse_maps_builtin_names_and_rejects_blank() {
        assert_eq!(MenuMode::parse("construction"), Some(MenuMode::Construction));
        assert_eq!(MenuMode::parse("cultivation"), Some(MenuMode::Cultivation));
        assert_eq!(MenuMode::parse("genetics"), Some(MenuMode::Genetics));
        assert_eq!(MenuMode::parse("   "), None);
        assert_eq!(
            MenuMode::parse("processing"),
            Some(MenuMode::Custom(Arc::from("processing")))
        );
    }

    #[test]
    fn mode_round_trips_through_serde_as_a_name_string() {
        let serialized = serde_json::to_string(&MenuMode::Genetics).expect("serialize");
        assert_eq!(serialized, "\"genetics\"");
        let parsed: MenuMode = serde_json::from_str("\"processing\"").expect("deserialize");
        assert_eq!(parsed, MenuMode::Custom(Arc::from("processing")));
        assert!(serde_json::from_str::<MenuMode>("\"  \"").is_err());
    }

    #[test]
    fn config_deserializes_with_per_field_defaults() {
        let config: MenuConfig =
            serde_json::from_str(r#"{ "mode": "construction" }"#).expect("deserialize");
        assert!(config.auto_close_on_selection);
        assert!(!config.allow_multiple_selection);
        assert_eq!(config.max_menu_items, DEFAULT_MAX_MENU_ITEMS);
        assert_eq!(config.anchor, MenuAnchor::Cursor);
        assert_eq!(config.transition, TransitionKind::Fade);
        assert_eq!(config.transition_duration, DEFAULT_TRANSITION_DURATION);
    }
}
