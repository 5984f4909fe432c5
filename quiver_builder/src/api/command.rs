use std::sync::Arc;

use crate::api::{Argument, ArgumentGroup, CommandLoader, Opt, OptionGroup};
use crate::error::{DefinitionError, Interrupt, ParseOutcome};
use crate::model::Values;
use crate::parser::{
    as_tokens, dispatch, env_argv, report, CommandInfo, Layout, Lineage, Mode, Parser, Printer,
    TerminalPrinter,
};

const DEFAULT_ARGUMENTS_TITLE: &str = "Arguments";
const DEFAULT_OPTIONS_TITLE: &str = "Options";

// Loose declarations are collected into a leading group, ahead of the explicit groups.
fn assemble<T, G>(
    loose: Vec<T>,
    mut groups: Vec<G>,
    group: impl FnOnce(Vec<T>) -> G,
) -> Vec<G> {
    if !loose.is_empty() {
        groups.insert(0, group(loose));
    }

    groups
}

/// A leaf command: parses its arguments and options to completion.
///
/// Immutable once built, so one command may be parsed any number of times (including concurrently).
///
/// ### Example
/// ```
/// # use quiver_builder as quiver;
/// use quiver::{Argument, Command, Nargs, Opt};
///
/// let command = Command::builder("summer")
///     .about("Sum some numbers.")
///     .option(Opt::flag(["-v", "--verbose"]).build().unwrap())
///     .argument(Argument::builder("item").nargs(Nargs::Variadic).build().unwrap())
///     .build()
///     .unwrap();
///
/// let outcome = command.parse(&["-v", "1", "2"]);
/// let values = outcome.complete().unwrap();
/// assert_eq!(values.get_bool("verbose"), Some(true));
/// assert_eq!(values.get_list("item").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    version: Option<String>,
    prog: Option<String>,
    about: String,
    argument_groups: Vec<ArgumentGroup>,
    option_groups: Vec<OptionGroup>,
    layout: Layout,
}

/// Configures a [`Command`].
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    name: String,
    version: Option<String>,
    prog: Option<String>,
    about: String,
    arguments: Vec<Argument>,
    options: Vec<Opt>,
    argument_groups: Vec<ArgumentGroup>,
    option_groups: Vec<OptionGroup>,
}

impl CommandBuilder {
    /// Document the version of this command.
    /// Sub-commands without a version of their own inherit it.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version.replace(version.into());
        self
    }

    /// Display `prog` as the program path, rather than the name (or the parent path followed by the name).
    pub fn prog(mut self, prog: impl Into<String>) -> Self {
        self.prog.replace(prog.into());
        self
    }

    /// Document the about message for this command.
    /// If repeated, only the final message will apply.
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }

    /// Add an argument to the leading `Arguments` group.
    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Add an option to the leading `Options` group.
    pub fn option(mut self, option: Opt) -> Self {
        self.options.push(option);
        self
    }

    /// Add a group of arguments.
    /// Positional tokens are dispatched to arguments in group order, then in the order within each group.
    pub fn argument_group(mut self, group: ArgumentGroup) -> Self {
        self.argument_groups.push(group);
        self
    }

    /// Add a group of options.
    pub fn option_group(mut self, group: OptionGroup) -> Self {
        self.option_groups.push(group);
        self
    }

    /// Build the command, validating the declarations as a whole.
    ///
    /// Fails when a destination or an option key is declared more than once.
    pub fn build(self) -> Result<Command, DefinitionError> {
        let CommandBuilder {
            name,
            version,
            prog,
            about,
            arguments,
            options,
            argument_groups,
            option_groups,
        } = self;
        let argument_groups = assemble(arguments, argument_groups, |arguments| {
            arguments
                .into_iter()
                .fold(ArgumentGroup::new(DEFAULT_ARGUMENTS_TITLE), ArgumentGroup::add)
        });
        let option_groups = assemble(options, option_groups, |options| {
            options
                .into_iter()
                .fold(OptionGroup::new(DEFAULT_OPTIONS_TITLE), OptionGroup::add)
        });
        let layout = Layout::new(&argument_groups, &option_groups)?;

        Ok(Command {
            name,
            version,
            prog,
            about,
            argument_groups,
            option_groups,
            layout,
        })
    }
}

impl Command {
    /// Start configuring a command.
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            version: None,
            prog: None,
            about: String::default(),
            arguments: Vec::default(),
            options: Vec::default(),
            argument_groups: Vec::default(),
            option_groups: Vec::default(),
        }
    }

    /// *Available using 'unit_test' crate feature only.*</br></br>
    /// Start configuring a placeholder command, for testing functions which configure a [`CommandBuilder`].
    ///
    /// ### Example
    /// ```
    /// # use quiver_builder as quiver;
    /// use quiver::{Command, CommandBuilder, Opt};
    ///
    /// fn setup(builder: CommandBuilder) -> CommandBuilder {
    ///     builder.option(Opt::flag(["--dry-run"]).build().unwrap())
    /// }
    ///
    /// let command = setup(Command::test_dummy()).build().unwrap();
    /// let values = command.parse(&["--dry-run"]).complete().unwrap();
    /// assert_eq!(values.get_bool("dry_run"), Some(true));
    /// ```
    #[cfg(feature = "unit_test")]
    pub fn test_dummy() -> CommandBuilder {
        Command::builder("test-dummy")
    }

    /// The command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version set on this command (not inherited).
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The explicit program path, if set.
    pub fn prog(&self) -> Option<&str> {
        self.prog.as_deref()
    }

    /// The about message.
    pub fn about(&self) -> &str {
        &self.about
    }

    /// The argument groups, in dispatch order.
    pub fn argument_groups(&self) -> &[ArgumentGroup] {
        &self.argument_groups
    }

    /// The option groups.
    pub fn option_groups(&self) -> &[OptionGroup] {
        &self.option_groups
    }

    pub(crate) fn lineage(&self) -> Lineage<'_> {
        Lineage::root(&self.name, self.prog(), self.version())
    }

    pub(crate) fn info<'a>(&'a self, lineage: &Lineage<'a>) -> CommandInfo<'a> {
        CommandInfo::new(
            lineage.prog(),
            &self.name,
            lineage.version(),
            &self.about,
            &self.argument_groups,
            &self.option_groups,
        )
    }

    /// Parse the tokens `argv` (not including the program name).
    ///
    /// Every call works on its own parse state; nothing is retained between calls.
    pub fn parse(&self, argv: &[&str]) -> ParseOutcome<Values> {
        Parser::new(
            &self.argument_groups,
            &self.option_groups,
            &self.layout,
            Mode::Command,
        )
        .parse(argv)
        .map(|parsed| parsed.values)
        .into()
    }

    /// Parse the tokens `argv`, printing help/version/errors through `printer`.
    ///
    /// On interruption, returns the exit code the program should terminate with (`0` for help/version).
    pub fn run_with(&self, argv: &[&str], printer: &dyn Printer) -> Result<Values, i32> {
        match self.parse(argv).into_result() {
            Ok(values) => Ok(values),
            Err(interrupt) => {
                let lineage = self.lineage();
                report(printer, &self.info(&lineage), &interrupt);
                Err(interrupt.exit_code())
            }
        }
    }

    /// Parse the tokens `argv`, printing help/version/errors to the terminal.
    pub fn run(&self, argv: &[&str]) -> Result<Values, i32> {
        self.run_with(argv, &TerminalPrinter::terminal())
    }

    /// Parse the process arguments ([`std::env::args`]), printing to the terminal.
    ///
    /// On interruption, exits the process with the corresponding exit code (via `std::process::exit`).
    pub fn run_env(&self) -> Values {
        let argv = env_argv();

        match self.run(&as_tokens(&argv)) {
            Ok(values) => values,
            Err(exit_code) => std::process::exit(exit_code),
        }
    }
}

/// The result of parsing a [`SuperCommand`] level.
#[derive(Debug, PartialEq)]
pub struct Handoff {
    /// The values of the super-command's own options (plus the command name under [`COMMAND_NAME_DEST`](crate::COMMAND_NAME_DEST)).
    pub values: Values,
    /// The sub-command name, unless there were no positional tokens.
    pub command_name: Option<String>,
    /// The tokens following the sub-command name, untouched.
    pub argv_remained: Vec<String>,
}

/// One level of a fully dispatched command line.
#[derive(Debug, PartialEq)]
pub struct Invocation {
    /// The displayed program path of this level (ex: `git remote`).
    pub prog: String,
    /// The sub-command this level handed off to; `None` for the final (leaf) level.
    pub command_name: Option<String>,
    /// The values parsed at this level.
    pub values: Values,
}

/// A command whose first positional token names a sub-command.
///
/// Only options are declared on a super-command, and they must precede the sub-command name.
/// Everything after the name is handed off, untouched, to the sub-command.
///
/// ### Example
/// ```
/// # use quiver_builder as quiver;
/// use quiver::{Command, CommandTable, Opt, SuperCommand};
///
/// let command = SuperCommand::builder(
///     "tool",
///     CommandTable::default()
///         .add(Command::builder("run").option(Opt::flag(["--fast"]).build().unwrap()).build().unwrap()),
/// )
/// .option(Opt::flag(["--verbose"]).build().unwrap())
/// .build()
/// .unwrap();
///
/// let invocations = command.dispatch(&["--verbose", "run", "--fast"]).complete().unwrap();
/// assert_eq!(invocations[0].values.get_bool("verbose"), Some(true));
/// assert_eq!(invocations[0].command_name.as_deref(), Some("run"));
/// assert_eq!(invocations[1].prog, "tool run");
/// assert_eq!(invocations[1].values.get_bool("fast"), Some(true));
/// ```
#[derive(Clone)]
pub struct SuperCommand {
    name: String,
    version: Option<String>,
    prog: Option<String>,
    about: String,
    option_groups: Vec<OptionGroup>,
    layout: Layout,
    loader: Arc<dyn CommandLoader>,
}

impl std::fmt::Debug for SuperCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperCommand")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("prog", &self.prog)
            .field("about", &self.about)
            .field("option_groups", &self.option_groups)
            .field("commands", &self.loader.list_commands())
            .finish()
    }
}

/// Configures a [`SuperCommand`].
pub struct SuperCommandBuilder {
    name: String,
    version: Option<String>,
    prog: Option<String>,
    about: String,
    options: Vec<Opt>,
    option_groups: Vec<OptionGroup>,
    loader: Arc<dyn CommandLoader>,
}

impl SuperCommandBuilder {
    /// Document the version of this command.
    /// Sub-commands without a version of their own inherit it.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version.replace(version.into());
        self
    }

    /// Display `prog` as the program path, rather than the name (or the parent path followed by the name).
    pub fn prog(mut self, prog: impl Into<String>) -> Self {
        self.prog.replace(prog.into());
        self
    }

    /// Document the about message for this command.
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }

    /// Add an option to the leading `Options` group.
    pub fn option(mut self, option: Opt) -> Self {
        self.options.push(option);
        self
    }

    /// Add a group of options.
    pub fn option_group(mut self, group: OptionGroup) -> Self {
        self.option_groups.push(group);
        self
    }

    /// Build the super-command, validating the declarations as a whole.
    pub fn build(self) -> Result<SuperCommand, DefinitionError> {
        let SuperCommandBuilder {
            name,
            version,
            prog,
            about,
            options,
            option_groups,
            loader,
        } = self;
        let option_groups = assemble(options, option_groups, |options| {
            options
                .into_iter()
                .fold(OptionGroup::new(DEFAULT_OPTIONS_TITLE), OptionGroup::add)
        });
        let layout = Layout::new(&[], &option_groups)?;

        Ok(SuperCommand {
            name,
            version,
            prog,
            about,
            option_groups,
            layout,
            loader,
        })
    }
}

impl SuperCommand {
    /// Start configuring a super-command, which resolves its sub-commands through `loader`.
    pub fn builder(name: impl Into<String>, loader: impl CommandLoader + 'static) -> SuperCommandBuilder {
        SuperCommandBuilder {
            name: name.into(),
            version: None,
            prog: None,
            about: String::default(),
            options: Vec::default(),
            option_groups: Vec::default(),
            loader: Arc::new(loader),
        }
    }

    /// The command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version set on this command (not inherited).
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The explicit program path, if set.
    pub fn prog(&self) -> Option<&str> {
        self.prog.as_deref()
    }

    /// The about message.
    pub fn about(&self) -> &str {
        &self.about
    }

    /// The option groups.
    pub fn option_groups(&self) -> &[OptionGroup] {
        &self.option_groups
    }

    /// The sub-command resolver.
    pub fn loader(&self) -> &dyn CommandLoader {
        self.loader.as_ref()
    }

    pub(crate) fn lineage(&self) -> Lineage<'_> {
        Lineage::root(&self.name, self.prog(), self.version())
    }

    pub(crate) fn info<'a>(&'a self, lineage: &Lineage<'a>) -> CommandInfo<'a> {
        let commands = self
            .loader
            .list_commands()
            .into_iter()
            .filter_map(|name| {
                self.loader
                    .load_command(&name)
                    .map(|command| (name, command.about().to_string()))
            })
            .collect();

        CommandInfo::new(
            lineage.prog(),
            &self.name,
            lineage.version(),
            &self.about,
            &[],
            &self.option_groups,
        )
        .with_commands(commands)
    }

    /// Parse this level only: the options up to the sub-command name.
    ///
    /// The sub-command is neither resolved nor parsed; see [`SuperCommand::dispatch`] for that.
    pub fn parse(&self, argv: &[&str]) -> ParseOutcome<Handoff> {
        Parser::new(&[], &self.option_groups, &self.layout, Mode::Super)
            .parse(argv)
            .map(|parsed| Handoff {
                command_name: parsed.values.command_name().map(String::from),
                values: parsed.values,
                argv_remained: parsed.remained,
            })
            .into()
    }

    /// Parse the tokens `argv`, resolving and parsing sub-commands until a leaf [`Command`] completes.
    ///
    /// Returns one [`Invocation`] per level, outermost first.
    pub fn dispatch(&self, argv: &[&str]) -> ParseOutcome<Vec<Invocation>> {
        let lineage = self.lineage();
        dispatch(self, &lineage, argv, &mut |_: &CommandInfo, _: &Interrupt| {}).into()
    }

    /// Dispatch the tokens `argv`, printing help/version/errors (of whichever level raised them) through `printer`.
    ///
    /// On interruption, returns the exit code the program should terminate with (`0` for help/version).
    pub fn run_with(&self, argv: &[&str], printer: &dyn Printer) -> Result<Vec<Invocation>, i32> {
        let lineage = self.lineage();
        dispatch(
            self,
            &lineage,
            argv,
            &mut |info: &CommandInfo, interrupt: &Interrupt| {
                report(printer, info, interrupt);
            },
        )
        .map_err(|interrupt| interrupt.exit_code())
    }

    /// Dispatch the tokens `argv`, printing help/version/errors to the terminal.
    pub fn run(&self, argv: &[&str]) -> Result<Vec<Invocation>, i32> {
        self.run_with(argv, &TerminalPrinter::terminal())
    }

    /// Dispatch the process arguments ([`std::env::args`]), printing to the terminal.
    ///
    /// On interruption, exits the process with the corresponding exit code (via `std::process::exit`).
    pub fn run_env(&self) -> Vec<Invocation> {
        let argv = env_argv();

        match self.run(&as_tokens(&argv)) {
            Ok(invocations) => invocations,
            Err(exit_code) => std::process::exit(exit_code),
        }
    }
}
