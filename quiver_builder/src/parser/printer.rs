use terminal_size::{terminal_size, Width};

use crate::api::{ArgumentGroup, OptKind, OptionGroup};
use crate::error::{Signal, UsageError};
use crate::model::Nargs;
use crate::parser::interface::{ColumnRenderer, ConsoleInterface, UserInterface};

/// Everything a [`Printer`] needs to know about the command being printed.
#[derive(Debug, Clone)]
pub struct CommandInfo<'a> {
    prog: String,
    name: &'a str,
    version: Option<&'a str>,
    about: &'a str,
    argument_groups: &'a [ArgumentGroup],
    option_groups: &'a [OptionGroup],
    commands: Option<Vec<(String, String)>>,
}

impl<'a> CommandInfo<'a> {
    pub(crate) fn new(
        prog: String,
        name: &'a str,
        version: Option<&'a str>,
        about: &'a str,
        argument_groups: &'a [ArgumentGroup],
        option_groups: &'a [OptionGroup],
    ) -> Self {
        Self {
            prog,
            name,
            version,
            about,
            argument_groups,
            option_groups,
            commands: None,
        }
    }

    pub(crate) fn with_commands(mut self, commands: Vec<(String, String)>) -> Self {
        self.commands.replace(commands);
        self
    }

    /// The displayed program path (ex: `git remote add`).
    pub fn prog(&self) -> &str {
        &self.prog
    }

    /// The command name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// The version, resolved through the parent commands when unset.
    pub fn version(&self) -> Option<&str> {
        self.version
    }

    /// The description of the command.
    pub fn about(&self) -> &str {
        self.about
    }

    /// The argument groups, in order.
    pub fn argument_groups(&self) -> &[ArgumentGroup] {
        self.argument_groups
    }

    /// The option groups, in order.
    pub fn option_groups(&self) -> &[OptionGroup] {
        self.option_groups
    }

    /// The `(name, about)` of each sub-command, when this is a super-command.
    pub fn commands(&self) -> Option<&[(String, String)]> {
        self.commands.as_deref()
    }

    /// The usage line (ex: `Usage: prog [OPTIONS]... SOURCE [TARGET]...`).
    ///
    /// Optional arguments are bracketed, and variadic arguments are followed by `...`.
    pub fn usage(&self) -> String {
        let mut usage = format!("Usage: {}", self.prog);

        if self
            .option_groups
            .iter()
            .any(|group| !group.options().is_empty())
        {
            usage.push_str(" [OPTIONS]...");
        }

        for argument in self
            .argument_groups
            .iter()
            .flat_map(|group| group.arguments())
        {
            let mut metavar = argument.show_metavar();

            if !argument.is_required() {
                metavar = format!("[{metavar}]");
            }

            if argument.nargs() == Nargs::Variadic {
                metavar.push_str("...");
            }

            usage.push(' ');
            usage.push_str(&metavar);
        }

        if self.commands.is_some() {
            usage.push_str(" COMMAND [ARGS]...");
        }

        usage
    }

    /// The hint pointing at the help option (ex: `Try 'prog --help' for help.`), if there is one.
    pub fn try_help(&self) -> Option<String> {
        self.option_groups
            .iter()
            .flat_map(|group| group.options())
            .find(|option| option.kind() == &OptKind::Signal(Signal::Help))
            .and_then(|option| {
                option
                    .long_keys()
                    .first()
                    .or_else(|| option.short_keys().first())
            })
            .map(|key| format!("Try '{} {key}' for help.", self.prog))
    }
}

/// Renders help, version and error information for a command.
///
/// Passed explicitly to [`Command::run_with`](crate::Command::run_with) and [`SuperCommand::run_with`](crate::SuperCommand::run_with).
pub trait Printer {
    /// Print the help for `command`.
    fn print_help(&self, command: &CommandInfo);

    /// Print the version for `command`.
    fn print_version(&self, command: &CommandInfo);

    /// Print the usage `error` raised while parsing `command`.
    fn print_error(&self, command: &CommandInfo, error: &UsageError);
}

const INDENT: usize = 2;
const PADDING_WIDTH: usize = 2;
// Used when the width of the terminal cannot be detected (ex: output is piped).
const DEFAULT_TOTAL_WIDTH: usize = 80;

/// The default [`Printer`]: plain text, wrapped to the width of the terminal.
pub struct TerminalPrinter {
    user_interface: Box<dyn UserInterface>,
    terminal_width: Option<usize>,
}

impl std::fmt::Debug for TerminalPrinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalPrinter")
            .field("terminal_width", &self.terminal_width)
            .finish()
    }
}

impl Default for TerminalPrinter {
    fn default() -> Self {
        Self::terminal()
    }
}

impl TerminalPrinter {
    /// Print to stdout/stderr, wrapping to the width of the current terminal (if any).
    pub fn terminal() -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self::new(ConsoleInterface::default(), terminal_width)
    }

    /// Print to `user_interface`, wrapping to `terminal_width` (or 80 when `None`).
    pub fn new(user_interface: impl UserInterface + 'static, terminal_width: Option<usize>) -> Self {
        Self {
            user_interface: Box::new(user_interface),
            terminal_width,
        }
    }
}

struct Section {
    title: String,
    rows: Vec<(String, String)>,
}

fn describe(help: &str, default: Option<String>) -> String {
    match default {
        Some(default) if help.is_empty() => format!("[default: {default}]"),
        Some(default) => format!("{help} [default: {default}]"),
        None => help.to_string(),
    }
}

fn sections(command: &CommandInfo) -> Vec<Section> {
    let mut sections = Vec::default();

    for group in command.argument_groups() {
        if group.is_hidden() {
            continue;
        }

        let rows: Vec<(String, String)> = group
            .arguments()
            .iter()
            .filter(|argument| !argument.is_hidden())
            .map(|argument| {
                (
                    argument.format_decl(),
                    describe(argument.help(), argument.show_default()),
                )
            })
            .collect();

        if !rows.is_empty() {
            sections.push(Section {
                title: group.title().to_string(),
                rows,
            });
        }
    }

    for group in command.option_groups() {
        if group.is_hidden() {
            continue;
        }

        let rows: Vec<(String, String)> = group
            .options()
            .iter()
            .filter(|option| !option.is_hidden())
            .map(|option| {
                let decls = match option.show_metavar() {
                    Some(metavar) => format!("{} {metavar}", option.format_decls()),
                    None => option.format_decls(),
                };
                (decls, describe(option.help_text(), option.show_default()))
            })
            .collect();

        if !rows.is_empty() {
            sections.push(Section {
                title: group.title().to_string(),
                rows,
            });
        }
    }

    if let Some(commands) = command.commands() {
        if !commands.is_empty() {
            sections.push(Section {
                title: "Commands".to_string(),
                rows: commands.to_vec(),
            });
        }
    }

    sections
}

impl Printer for TerminalPrinter {
    fn print_help(&self, command: &CommandInfo) {
        let sections = sections(command);
        let rows = sections.iter().flat_map(|section| section.rows.iter());
        let (left_width, middle_width) = rows.fold((0, 0), |(left, middle), (l, m)| {
            (
                std::cmp::max(left, l.chars().count()),
                std::cmp::max(middle, m.chars().count()),
            )
        });
        let column_renderer = ColumnRenderer::guided(
            INDENT,
            PADDING_WIDTH,
            left_width,
            middle_width,
            self.terminal_width.unwrap_or(DEFAULT_TOTAL_WIDTH),
        );

        self.user_interface.print(command.usage());

        if !command.about().is_empty() {
            self.user_interface.print("".to_string());
            self.user_interface.print(command.about().to_string());
        }

        for Section { title, rows } in sections {
            self.user_interface.print("".to_string());
            self.user_interface.print(format!("{title}:"));

            for (left, middle) in rows {
                for line in column_renderer.render(&left, &middle) {
                    self.user_interface.print(line);
                }
            }
        }
    }

    fn print_version(&self, command: &CommandInfo) {
        match command.version() {
            Some(version) => self
                .user_interface
                .print(format!("{} {version}", command.name())),
            None => self.user_interface.print(command.name().to_string()),
        }
    }

    fn print_error(&self, command: &CommandInfo, error: &UsageError) {
        self.user_interface.print_error(command.usage());

        if let Some(try_help) = command.try_help() {
            self.user_interface.print_error(try_help);
        }

        self.user_interface.print_error("".to_string());
        self.user_interface.print_error(format!("Error: {error}"));
    }
}
