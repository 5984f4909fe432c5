use std::env;

use crate::api::{Invocation, Subcommand, SuperCommand};
use crate::error::{Interrupt, Signal, UsageError};
use crate::parser::printer::{CommandInfo, Printer};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The chain of commands leading to the one being parsed.
///
/// Sub-commands borrow their parent's lineage, so the displayed program path (ex: `git remote add`) and the version resolve by walking up the chain.
#[derive(Debug, Clone, Copy)]
pub struct Lineage<'a> {
    parent: Option<&'a Lineage<'a>>,
    name: &'a str,
    prog: Option<&'a str>,
    version: Option<&'a str>,
}

impl<'a> Lineage<'a> {
    pub(crate) fn root(name: &'a str, prog: Option<&'a str>, version: Option<&'a str>) -> Self {
        Self {
            parent: None,
            name,
            prog,
            version,
        }
    }

    pub(crate) fn child<'b>(
        &'b self,
        name: &'b str,
        prog: Option<&'b str>,
        version: Option<&'b str>,
    ) -> Lineage<'b>
    where
        'a: 'b,
    {
        Lineage {
            parent: Some(self),
            name,
            prog,
            version,
        }
    }

    /// The parent command, unless this is the root.
    pub fn parent(&self) -> Option<&'a Lineage<'a>> {
        self.parent
    }

    /// The command name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The displayed program path.
    /// An explicit `prog` wins; otherwise the parent's program path is followed by this command's name.
    pub fn prog(&self) -> String {
        match (self.prog, self.parent) {
            (Some(prog), _) => prog.to_string(),
            (None, Some(parent)) => format!("{} {}", parent.prog(), self.name),
            (None, None) => self.name.to_string(),
        }
    }

    /// The version, inherited from the closest ancestor which sets one.
    pub fn version(&self) -> Option<&'a str> {
        self.version
            .or_else(|| self.parent.and_then(|parent| parent.version()))
    }
}

/// Print the outcome of an interrupted parse.
pub(crate) fn report(printer: &dyn Printer, command: &CommandInfo, interrupt: &Interrupt) {
    match interrupt {
        Interrupt::Signal(Signal::Help) => printer.print_help(command),
        Interrupt::Signal(Signal::Version) => printer.print_version(command),
        Interrupt::Usage(error) => printer.print_error(command, error),
    }
}

/// The process argument vector, minus the program name.
pub(crate) fn env_argv() -> Vec<String> {
    env::args().skip(1).collect()
}

pub(crate) fn as_tokens(argv: &[String]) -> Vec<&str> {
    argv.iter().map(AsRef::as_ref).collect()
}

/// Parse `argv` against `command`, then keep handing the remaining tokens off until a leaf command completes.
///
/// Every interruption is passed to `on_interrupt` alongside the command which raised it, before being returned.
pub(crate) fn dispatch(
    command: &SuperCommand,
    lineage: &Lineage,
    argv: &[&str],
    on_interrupt: &mut dyn FnMut(&CommandInfo, &Interrupt),
) -> Result<Vec<Invocation>, Interrupt> {
    let handoff = match command.parse(argv).into_result() {
        Ok(handoff) => handoff,
        Err(interrupt) => {
            on_interrupt(&command.info(lineage), &interrupt);
            return Err(interrupt);
        }
    };
    let resolved = match &handoff.command_name {
        Some(name) => command
            .loader()
            .load_command(name)
            .map(|subcommand| (name.clone(), subcommand))
            .ok_or_else(|| UsageError::Subcommand(format!("Unknown command '{name}'."))),
        None => Err(UsageError::Subcommand("Missing command.".to_string())),
    };
    let (name, subcommand) = match resolved {
        Ok(resolved) => resolved,
        Err(error) => {
            let interrupt = Interrupt::from(error);
            on_interrupt(&command.info(lineage), &interrupt);
            return Err(interrupt);
        }
    };

    #[cfg(feature = "tracing_debug")]
    {
        debug!(
            "Handing off {:?} from '{}' to '{name}'.",
            handoff.argv_remained,
            lineage.prog()
        );
    }

    let remained = as_tokens(&handoff.argv_remained);
    let mut invocations = vec![Invocation {
        prog: lineage.prog(),
        command_name: Some(name),
        values: handoff.values,
    }];

    match subcommand {
        Subcommand::Command(child) => {
            let child_lineage = lineage.child(child.name(), child.prog(), child.version());

            match child.parse(&remained).into_result() {
                Ok(values) => {
                    invocations.push(Invocation {
                        prog: child_lineage.prog(),
                        command_name: None,
                        values,
                    });
                }
                Err(interrupt) => {
                    on_interrupt(&child.info(&child_lineage), &interrupt);
                    return Err(interrupt);
                }
            }
        }
        Subcommand::Super(child) => {
            let child_lineage = lineage.child(child.name(), child.prog(), child.version());
            invocations.extend(dispatch(&child, &child_lineage, &remained, on_interrupt)?);
        }
    }

    Ok(invocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Command, CommandTable, Opt, OptionGroup};
    use crate::parser::printer::TerminalPrinter;
    use crate::parser::util::channel_interface;
    use crate::test::assert_contains;

    fn remote() -> SuperCommand {
        SuperCommand::builder(
            "remote",
            CommandTable::default().add(
                Command::builder("add")
                    .about("Add a remote.")
                    .option_group(OptionGroup::new("Options").add(Opt::help().build().unwrap()))
                    .build()
                    .unwrap(),
            ),
        )
        .about("Manage remotes.")
        .build()
        .unwrap()
    }

    fn git() -> SuperCommand {
        SuperCommand::builder(
            "git",
            CommandTable::default()
                .add(remote())
                .add(Command::builder("status").version("0.1").build().unwrap()),
        )
        .version("2.0")
        .option_group(
            OptionGroup::new("Options")
                .add(Opt::help().build().unwrap())
                .add(Opt::version().build().unwrap()),
        )
        .build()
        .unwrap()
    }

    fn run(argv: &[&str]) -> (Result<Vec<Invocation>, Interrupt>, Vec<(String, Option<String>)>) {
        let command = git();
        let lineage = Lineage::root(command.name(), None, command.version());
        let mut seen = Vec::default();
        let result = dispatch(&command, &lineage, argv, &mut |info: &CommandInfo, _: &Interrupt| {
            seen.push((info.prog().to_string(), info.version().map(String::from)));
        });
        (result, seen)
    }

    #[test]
    fn lineage() {
        // Setup
        let root = Lineage::root("git", None, Some("2.0"));
        let remote = root.child("remote", None, None);
        let add = remote.child("add", None, Some("0.1"));
        let renamed = root.child("status", Some("git-status"), None);

        // Verify
        assert_eq!(root.prog(), "git");
        assert_eq!(remote.prog(), "git remote");
        assert_eq!(add.prog(), "git remote add");
        assert_eq!(renamed.prog(), "git-status");
        assert_eq!(remote.version(), Some("2.0"));
        assert_eq!(add.version(), Some("0.1"));
        assert_eq!(add.parent().unwrap().name(), "remote");
        assert!(root.parent().is_none());
    }

    #[test]
    fn lineage_unversioned() {
        let root = Lineage::root("prog", Some("my-prog"), None);
        let child = root.child("sub", None, None);

        assert_eq!(child.prog(), "my-prog sub");
        assert_eq!(child.version(), None);
    }

    #[test]
    fn dispatch_nested() {
        // Execute
        let (result, seen) = run(&["remote", "add"]);

        // Verify
        let invocations = result.unwrap();
        assert!(seen.is_empty());
        assert_eq!(invocations.len(), 3);
        assert_eq!(invocations[0].prog, "git");
        assert_eq!(invocations[0].command_name, Some("remote".to_string()));
        assert_eq!(invocations[0].values.command_name(), Some("remote"));
        assert_eq!(invocations[1].prog, "git remote");
        assert_eq!(invocations[1].command_name, Some("add".to_string()));
        assert_eq!(invocations[2].prog, "git remote add");
        assert_eq!(invocations[2].command_name, None);
        assert!(invocations[2].values.is_empty());
    }

    #[test]
    fn dispatch_leaf() {
        let (result, _) = run(&["status"]);
        let invocations = result.unwrap();

        assert_eq!(invocations.len(), 2);
        assert_eq!(invocations[1].prog, "git status");
    }

    #[test]
    fn dispatch_missing_command() {
        // Execute
        let (result, seen) = run(empty::slice());

        // Verify
        assert_matches!(result, Err(Interrupt::Usage(UsageError::Subcommand(message))) if message == "Missing command.");
        assert_eq!(seen, vec![("git".to_string(), Some("2.0".to_string()))]);
    }

    #[test]
    fn dispatch_unknown_command() {
        let (result, seen) = run(&["remote", "rm", "origin"]);

        assert_matches!(result, Err(Interrupt::Usage(UsageError::Subcommand(message))) if message == "Unknown command 'rm'.");
        assert_eq!(seen, vec![("git remote".to_string(), Some("2.0".to_string()))]);
    }

    #[test]
    fn dispatch_signal_at_depth() {
        // Execute
        let (result, seen) = run(&["remote", "add", "--help"]);

        // Verify
        assert_matches!(result, Err(Interrupt::Signal(Signal::Help)));
        assert_eq!(
            seen,
            vec![("git remote add".to_string(), Some("2.0".to_string()))]
        );
    }

    #[test]
    fn dispatch_error_at_leaf() {
        let (result, seen) = run(&["status", "extra"]);

        assert_matches!(result, Err(Interrupt::Usage(UsageError::TooManyArguments)));
        assert_eq!(seen, vec![("git status".to_string(), Some("0.1".to_string()))]);
    }

    #[test]
    fn report_from_thread() {
        // Setup
        let (sender, receiver) = channel_interface();

        // Execute
        let handle = std::thread::spawn(move || {
            let command = git();
            let printer = TerminalPrinter::new(sender, Some(80));
            let lineage = Lineage::root(command.name(), None, command.version());
            let result = dispatch(&command, &lineage, &["--version"], &mut |info: &CommandInfo, interrupt: &Interrupt| {
                report(&printer, info, interrupt);
            });
            assert_matches!(result, Err(Interrupt::Signal(Signal::Version)));

            let result = dispatch(&command, &lineage, &["--bogus"], &mut |info: &CommandInfo, interrupt: &Interrupt| {
                report(&printer, info, interrupt);
            });
            assert_matches!(result, Err(Interrupt::Usage(UsageError::UnknownOption(_))));
        });
        handle.join().unwrap();

        // Verify
        let (message, error) = receiver.consume();
        assert_eq!(message, Some("git 2.0".to_string()));
        let error = error.unwrap();
        assert_contains!(error, "Usage: git [OPTIONS]... COMMAND [ARGS]...");
        assert_contains!(error, "Try 'git --help' for help.");
        assert_contains!(error, "Error: Unknown option '--bogus'.");
    }

    #[test]
    fn env_tokens() {
        let argv = vec!["a".to_string(), "--b".to_string()];

        assert_eq!(as_tokens(&argv), vec!["a", "--b"]);
    }
}
