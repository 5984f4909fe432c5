use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::{Command, SuperCommand};

/// A command reachable from a [`SuperCommand`].
#[derive(Debug, Clone)]
pub enum Subcommand {
    /// A leaf command, which parses the remaining tokens to completion.
    Command(Arc<Command>),
    /// A nested super-command, which hands the remaining tokens off once more.
    Super(Arc<SuperCommand>),
}

impl Subcommand {
    /// The name of the command.
    pub fn name(&self) -> &str {
        match self {
            Subcommand::Command(command) => command.name(),
            Subcommand::Super(command) => command.name(),
        }
    }

    /// The one-line description of the command.
    pub fn about(&self) -> &str {
        match self {
            Subcommand::Command(command) => command.about(),
            Subcommand::Super(command) => command.about(),
        }
    }
}

impl From<Command> for Subcommand {
    fn from(command: Command) -> Self {
        Subcommand::Command(Arc::new(command))
    }
}

impl From<SuperCommand> for Subcommand {
    fn from(command: SuperCommand) -> Self {
        Subcommand::Super(Arc::new(command))
    }
}

/// Resolves sub-command names for a [`SuperCommand`].
///
/// Implementations must be shareable across threads, since a super-command may be parsed concurrently.
pub trait CommandLoader: Send + Sync {
    /// Resolve `name`, or `None` when no such command exists.
    fn load_command(&self, name: &str) -> Option<Subcommand>;

    /// The names of every loadable command, in display order.
    fn list_commands(&self) -> Vec<String>;
}

/// A [`CommandLoader`] over a fixed, name-keyed table.
///
/// ### Example
/// ```
/// # use quiver_builder as quiver;
/// use quiver::{Command, CommandLoader, CommandTable};
///
/// let table = CommandTable::default()
///     .add(Command::builder("run").build().unwrap())
///     .add(Command::builder("stop").build().unwrap());
/// assert_eq!(table.list_commands(), vec!["run", "stop"]);
/// assert!(table.load_command("walk").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: BTreeMap<String, Subcommand>,
}

impl CommandTable {
    /// Register a command under its own name.
    /// A later command of the same name replaces the earlier one.
    pub fn add(mut self, command: impl Into<Subcommand>) -> Self {
        let command = command.into();
        self.commands.insert(command.name().to_string(), command);
        self
    }
}

impl CommandLoader for CommandTable {
    fn load_command(&self, name: &str) -> Option<Subcommand> {
        self.commands.get(name).cloned()
    }

    fn list_commands(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }
}
