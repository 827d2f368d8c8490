//! Menu command registry, dispatch boundary, and per-mode catalogs.
//!
//! Commands are polymorphic objects registered under string ids, decoupled
//! from menu state. The mode catalogs are declarative id lists that may
//! reference commands before they are wired to executables; executing an
//! unwired id is caught by the validation-failure path.
use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use bevy::prelude::*;
use smallvec::SmallVec;

use super::defs::{
    CommandExecuted, CommandOutcome, CommandValidationFailed, ExecuteCommandRequest, MenuMode,
};

/// Successful executions kept in the FIFO history.
pub const COMMAND_HISTORY_LIMIT: usize = 50;

const CONSTRUCTION_COMMANDS: [&str; 11] = [
    "construction.place_room",
    "construction.place_wall",
    "construction.place_door",
    "construction.place_window",
    "construction.demolish",
    "construction.rotate_blueprint",
    "construction.copy_blueprint",
    "construction.apply_schematic",
    "construction.save_schematic",
    "construction.toggle_grid_snap",
    "construction.cancel_placement",
];

const CULTIVATION_COMMANDS: [&str; 9] = [
    "cultivation.water_plant",
    "cultivation.feed_nutrients",
    "cultivation.prune_plant",
    "cultivation.train_plant",
    "cultivation.harvest_plant",
    "cultivation.inspect_plant",
    "cultivation.adjust_environment",
    "cultivation.apply_ipm",
    "cultivation.clear_waste",
];

const GENETICS_COMMANDS: [&str; 11] = [
    "genetics.breed_pair",
    "genetics.take_cutting",
    "genetics.analyze_strain",
    "genetics.view_lineage",
    "genetics.label_phenotype",
    "genetics.store_seed",
    "genetics.germinate_seed",
    "genetics.cross_reference",
    "genetics.tag_mother_plant",
    "genetics.discard_offspring",
    "genetics.export_report",
];

/// Fault raised by a command's `execute`.
///
/// Converted to a failure outcome at the dispatch boundary so subscribers
/// observe faults and ordinary failures through the same event.
#[derive(Debug, Clone)]
pub enum CommandFault {
    Failed(String),
    ServiceUnavailable(String),
}

impl std::fmt::Display for CommandFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(message) => write!(f, "{message}"),
            Self::ServiceUnavailable(message) => write!(f, "service unavailable: {message}"),
        }
    }
}

impl std::error::Error for CommandFault {}

/// A menu command: a gate plus an action.
pub trait MenuCommand: Send + Sync + 'static {
    /// Whether the command may run right now.
    fn can_execute(&self) -> bool {
        true
    }

    /// Runs the command. Faults become failure outcomes at the boundary.
    fn execute(&mut self) -> Result<CommandOutcome, CommandFault>;
}

/// Closure adapter for wiring commands without a dedicated type.
pub struct FnCommand<F> {
    action: F,
}

impl<F> FnCommand<F>
where
    F: FnMut() -> Result<CommandOutcome, CommandFault> + Send + Sync + 'static,
{
    pub fn new(action: F) -> Self {
        Self { action }
    }
}

impl<F> MenuCommand for FnCommand<F>
where
    F: FnMut() -> Result<CommandOutcome, CommandFault> + Send + Sync + 'static,
{
    fn execute(&mut self) -> Result<CommandOutcome, CommandFault> {
        (self.action)()
    }
}

/// Dispatch report produced by one execution attempt, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum CommandEvent {
    Executed {
        id: Option<Arc<str>>,
        outcome: CommandOutcome,
    },
    ValidationFailed(String),
}

pub type CommandEvents = SmallVec<[CommandEvent; 2]>;

/// Command registry plus dispatcher and bounded execution history.
#[derive(Resource)]
pub struct MenuCommandRegistry {
    commands: HashMap<Arc<str>, Box<dyn MenuCommand>>,
    mode_catalog: HashMap<MenuMode, Vec<Arc<str>>>,
    history: VecDeque<Arc<str>>,
}

impl Default for MenuCommandRegistry {
    fn default() -> Self {
        let mut registry = Self {
            commands: HashMap::new(),
            mode_catalog: HashMap::new(),
            history: VecDeque::new(),
        };
        registry.seed_mode_catalog(MenuMode::Construction, &CONSTRUCTION_COMMANDS);
        registry.seed_mode_catalog(MenuMode::Cultivation, &CULTIVATION_COMMANDS);
        registry.seed_mode_catalog(MenuMode::Genetics, &GENETICS_COMMANDS);
        registry
    }
}

impl MenuCommandRegistry {
    fn seed_mode_catalog(&mut self, mode: MenuMode, ids: &[&str]) {
        self.mode_catalog
            .insert(mode, ids.iter().map(|id| Arc::from(*id)).collect());
    }

    /// Registers (or replaces) an executable under `id`.
    pub fn register_command(&mut self, id: &str, command: Box<dyn MenuCommand>) -> bool {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            warn!("cannot register a command with a blank id");
            return false;
        }
        self.commands.insert(Arc::from(trimmed), command);
        true
    }

    /// Removes the executable registered under `id`, reporting whether one
    /// was present. Mode catalog entries are untouched.
    pub fn unregister_command(&mut self, id: &str) -> bool {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            warn!("cannot unregister a command with a blank id");
            return false;
        }
        self.commands.remove(trimmed).is_some()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.commands.contains_key(id.trim())
    }

    /// Looks up and runs a registered command.
    ///
    /// A blank or unknown id reports a validation failure and invokes
    /// nothing. Successful executions are appended to the bounded history.
    pub fn execute_by_id(&mut self, id: &str, events: &mut CommandEvents) -> CommandOutcome {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            let message = String::from("command id is blank");
            warn!("{message}");
            events.push(CommandEvent::ValidationFailed(message.clone()));
            return CommandOutcome::failure(message);
        }
        let Some(command) = self.commands.get_mut(trimmed) else {
            let message = format!("no command registered for id `{trimmed}`");
            warn!("{message}");
            events.push(CommandEvent::ValidationFailed(message.clone()));
            return CommandOutcome::failure(message);
        };

        let outcome = run_boundary(command.as_mut());
        if outcome.success {
            self.history.push_back(Arc::from(trimmed));
            while self.history.len() > COMMAND_HISTORY_LIMIT {
                self.history.pop_front();
            }
        }
        events.push(CommandEvent::Executed {
            id: Some(Arc::from(trimmed)),
            outcome: outcome.clone(),
        });
        outcome
    }

    /// Runs a command object the registry does not hold.
    ///
    /// Same gate and fault boundary as id dispatch; reported with no id and
    /// never recorded in history.
    pub fn dispatch(command: &mut dyn MenuCommand, events: &mut CommandEvents) -> CommandOutcome {
        let outcome = run_boundary(command);
        events.push(CommandEvent::Executed {
            id: None,
            outcome: outcome.clone(),
        });
        outcome
    }

    /// Snapshot of successfully executed ids, oldest first.
    pub fn history_snapshot(&self) -> Vec<Arc<str>> {
        self.history.iter().cloned().collect()
    }

    /// Adds a command id to a mode's catalog; duplicates are skipped.
    pub fn add_command_to_mode(&mut self, mode: &MenuMode, id: &str) -> bool {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            warn!("cannot catalog a blank command id for `{mode}`");
            return false;
        }
        let catalog = self.mode_catalog.entry(mode.clone()).or_default();
        if catalog.iter().any(|existing| existing.as_ref() == trimmed) {
            return false;
        }
        catalog.push(Arc::from(trimmed));
        true
    }

    /// Removes a command id from a mode's catalog.
    pub fn remove_command_from_mode(&mut self, mode: &MenuMode, id: &str) -> bool {
        let trimmed = id.trim();
        let Some(catalog) = self.mode_catalog.get_mut(mode) else {
            return false;
        };
        let before = catalog.len();
        catalog.retain(|existing| existing.as_ref() != trimmed);
        before != catalog.len()
    }

    /// Command ids cataloged for a mode, in declaration order.
    pub fn available_commands(&self, mode: &MenuMode) -> &[Arc<str>] {
        self.mode_catalog
            .get(mode)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_command_available_in_mode(&self, mode: &MenuMode, id: &str) -> bool {
        let trimmed = id.trim();
        self.available_commands(mode)
            .iter()
            .any(|existing| existing.as_ref() == trimmed)
    }
}

fn run_boundary(command: &mut dyn MenuCommand) -> CommandOutcome {
    if !command.can_execute() {
        return CommandOutcome::failure("command rejected by can_execute");
    }
    match command.execute() {
        Ok(outcome) => outcome,
        Err(fault) => {
            warn!("command execution faulted: {fault}");
            CommandOutcome::failure(fault.to_string())
        }
    }
}

/// Drains `ExecuteCommandRequest` through the registry, publishing outcomes
/// and validation failures as messages.
pub fn execute_command_requests(
    mut requests: MessageReader<ExecuteCommandRequest>,
    mut registry: ResMut<MenuCommandRegistry>,
    mut executed: MessageWriter<CommandExecuted>,
    mut validation_failures: MessageWriter<CommandValidationFailed>,
) {
    for request in requests.read() {
        let mut events = CommandEvents::new();
        registry.execute_by_id(&request.id, &mut events);
        for event in events {
            match event {
                CommandEvent::Executed { id, outcome } => {
                    executed.write(CommandExecuted { id, outcome });
                }
                CommandEvent::ValidationFailed(message) => {
                    validation_failures.write(CommandValidationFailed { message });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct GatedCommand {
        open: bool,
    }

    impl MenuCommand for GatedCommand {
        fn can_execute(&self) -> bool {
            self.open
        }

        fn execute(&mut self) -> Result<CommandOutcome, CommandFault> {
            Ok(CommandOutcome::success("gated command ran"))
        }
    }

    #[test]
    fn seed_catalogs_carry_the_shipped_id_counts() {
        let registry = MenuCommandRegistry::default();
        assert_eq!(registry.available_commands(&MenuMode::Construction).len(), 11);
        assert_eq!(registry.available_commands(&MenuMode::Cultivation).len(), 9);
        assert_eq!(registry.available_commands(&MenuMode::Genetics).len(), 11);
        assert!(registry
            .is_command_available_in_mode(&MenuMode::Cultivation, "cultivation.water_plant"));
        // Catalog entries are declarative; nothing is executable at startup.
        assert!(!registry.is_registered("cultivation.water_plant"));
    }

    #[test]
    fn execute_by_id_runs_reports_and_records_history() {
        let mut registry = MenuCommandRegistry::default();
        registry.register_command(
            "cultivation.water_plant",
            Box::new(FnCommand::new(|| Ok(CommandOutcome::success("watered")))),
        );

        let mut events = CommandEvents::new();
        let outcome = registry.execute_by_id("cultivation.water_plant", &mut events);
        assert!(outcome.success);
        assert_eq!(outcome.message, "watered");
        assert_eq!(
            events.as_slice(),
            [CommandEvent::Executed {
                id: Some(Arc::from("cultivation.water_plant")),
                outcome: CommandOutcome::success("watered"),
            }]
        );
        assert_eq!(
            registry.history_snapshot(),
            vec![Arc::<str>::from("cultivation.water_plant")]
        );
    }

    #[test]
    fn missing_id_fails_validation_once_and_invokes_nothing() {
        let mut registry = MenuCommandRegistry::default();
        let mut events = CommandEvents::new();
        let outcome = registry.execute_by_id("missing-id", &mut events);
        assert!(!outcome.success);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], CommandEvent::ValidationFailed(_)));
        assert!(registry.history_snapshot().is_empty());
    }

    #[test]
    fn gate_failure_short_circuits_without_executing() {
        let mut registry = MenuCommandRegistry::default();
        registry.register_command("gated", Box::new(GatedCommand { open: false }));

        let mut events = CommandEvents::new();
        let outcome = registry.execute_by_id("gated", &mut events);
        assert!(!outcome.success);
        assert_eq!(outcome.message, "command rejected by can_execute");
        // Rejections still flow through the executed event, not validation.
        assert!(matches!(events[0], CommandEvent::Executed { .. }));
        assert!(registry.history_snapshot().is_empty());
    }

    #[test]
    fn faults_become_failure_outcomes_at_the_boundary() {
        let mut registry = MenuCommandRegistry::default();
        registry.register_command(
            "faulty",
            Box::new(FnCommand::new(|| {
                Err(CommandFault::ServiceUnavailable(String::from(
                    "market service offline",
                )))
            })),
        );

        let mut events = CommandEvents::new();
        let outcome = registry.execute_by_id("faulty", &mut events);
        assert!(!outcome.success);
        assert_eq!(outcome.message, "service unavailable: market service offline");
        assert_eq!(events.len(), 1);
        assert!(registry.history_snapshot().is_empty());
    }

    #[test]
    fn history_keeps_only_the_most_recent_fifty_successes() {
        let mut registry = MenuCommandRegistry::default();
        for index in 0..60 {
            let id = format!("cmd-{index}");
            registry.register_command(
                &id,
                Box::new(FnCommand::new(|| Ok(CommandOutcome::success("ok")))),
            );
            let mut events = CommandEvents::new();
            registry.execute_by_id(&id, &mut events);
        }

        let history = registry.history_snapshot();
        assert_eq!(history.len(), COMMAND_HISTORY_LIMIT);
        assert_eq!(history.first().map(AsRef::as_ref), Some("cmd-10"));
        assert_eq!(history.last().map(AsRef::as_ref), Some("cmd-59"));
    }

    #[test]
    fn detached_dispatch_reports_without_an_id_or_history() {
        let mut registry = MenuCommandRegistry::default();
        let mut command = FnCommand::new(|| Ok(CommandOutcome::success("ad hoc")));
        let mut events = CommandEvents::new();
        let outcome = MenuCommandRegistry::dispatch(&mut command, &mut events);
        assert!(outcome.success);
        assert_eq!(
            events.as_slice(),
            [CommandEvent::Executed {
                id: None,
                outcome: CommandOutcome::success("ad hoc"),
            }]
        );
        assert!(registry.history_snapshot().is_empty());
    }

    #[test]
    fn mode_catalog_mutations_are_independent_of_registration() {
        let mut registry = MenuCommandRegistry::default();
        let mode = MenuMode::Construction;

        assert!(registry.add_command_to_mode(&mode, "construction.paint_wall"));
        assert!(!registry.add_command_to_mode(&mode, "construction.paint_wall"));
        assert!(registry.is_command_available_in_mode(&mode, "construction.paint_wall"));
        assert_eq!(registry.available_commands(&mode).len(), 12);

        assert!(registry.remove_command_from_mode(&mode, "construction.paint_wall"));
        assert!(!registry.remove_command_from_mode(&mode, "construction.paint_wall"));
        assert_eq!(registry.available_commands(&mode).len(), 11);

        // Registering an executable never touches the catalogs.
        registry.register_command(
            "standalone",
            Box::new(FnCommand::new(|| Ok(CommandOutcome::success("ok")))),
        );
        assert!(!registry.is_command_available_in_mode(&mode, "standalone"));
    }

    #[test]
    fn unregister_leaves_catalog_entries_for_later_rebinding() {
        let mut registry = MenuCommandRegistry::default();
        registry.register_command(
            "genetics.breed_pair",
            Box::new(FnCommand::new(|| Ok(CommandOutcome::success("bred")))),
        );
        assert!(registry.unregister_command("genetics.breed_pair"));
        assert!(!registry.is_registered("genetics.breed_pair"));
        assert!(registry.is_command_available_in_mode(&MenuMode::Genetics, "genetics.breed_pair"));
    }
}
