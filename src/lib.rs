//! `quiver` is a declarative command line parser for Rust.
//!
//! Declare the positional arguments, options and option groups of your program, then let `quiver` tokenize the Cli, validate it, and convert the tokens into typed [`Value`]s.
//! `quiver` prioritizes the following design concerns:
//! * *Declarations are data*:
//! A [`Command`] is an immutable description of the Cli.
//! Every parse works on its own, short-lived state, so the same command may be parsed repeatedly (or concurrently) without interference.
//! * *Fail fast*:
//! Mistakes in the declarations (ex: conflicting option keys, a default which doesn't convert) are reported by `build()`, before any parsing takes place.
//! * *Three outcomes*:
//! A parse either completes, is interrupted by a signal (help/version), or fails with a usage error.
//! These are modelled explicitly by [`ParseOutcome`], rather than folding the signals into the errors.
//! * *Group constraints*:
//! Groups of arguments/options may constrain how many of their members occur (ex: [`GroupKind::ExactlyOne`]).
//! * *Sub-commands*:
//! A [`SuperCommand`] parses its own options, then hands the remaining tokens off to a nested command.
//!
//! We do not aim to support rich display configurations, such as colour output, shell completions, etc.
//!
//! # Usage
//! ```no_run
//! use quiver::{Argument, Command, Nargs, Opt, Type};
//!
//! let command = Command::builder("summer")
//!     .about("Sum some numbers.")
//!     .option(Opt::help().build().unwrap())
//!     .option(Opt::flag(["-v", "--verbose"]).help("Show the items.").build().unwrap())
//!     .argument(
//!         Argument::builder("item")
//!             .nargs(Nargs::Variadic)
//!             .ty(Type::int(10).unwrap())
//!             .help("The items to sum.")
//!             .build()
//!             .unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let values = command.run_env();
//! let items: Vec<i64> = values
//!     .get_list("item")
//!     .unwrap()
//!     .iter()
//!     .filter_map(|item| item.as_int())
//!     .collect();
//!
//! if values.get_bool("verbose") == Some(true) {
//!     println!("Items: {items:?}");
//! }
//!
//! println!("Sum: {}", items.iter().sum::<i64>());
//! ```
//!
//! ```console
//! $ summer -h
//! Usage: summer [OPTIONS]... [ITEM]...
//!
//! Sum some numbers.
//!
//! Arguments:
//!   item           The items to sum.
//!
//! Options:
//!   -h, --help     Show help information and exit.
//!   -v, --verbose  Show the items.
//!
//! $ summer 1 2 3
//! Sum: 6
//!
//! $ summer 1 blah
//! Usage: summer [OPTIONS]... [ITEM]...
//! Try 'summer --help' for help.
//!
//! Error: Invalid value for argument 'item'. 'blah' is not a valid int.
//! ```
//!
//! # Declarations
//! * [`Argument`]: a positional parameter, taking exactly one token ([`Nargs::One`]) or every remaining positional token ([`Nargs::Variadic`]).
//! * [`Opt`]: an option, matched by its long (`--name`) or short (`-n`) keys.
//! The variants are selected by the constructor: [`Opt::builder`] (one value), [`Opt::flag`], [`Opt::append`], [`Opt::count`], [`Opt::on_off`] and [`Opt::signal`] (with the conventional [`Opt::help`] and [`Opt::version`]).
//! * [`ArgumentGroup`] / [`OptionGroup`]: ordered, titled collections of the above, constrained by a [`GroupKind`].
//!
//! Values are stored under each declaration's *destination*, inferred from the declaration (ex: `--line-count` stores under `line_count`).
//! Every declaration converts its tokens through a [`Type`] (ex: [`Type::int`], [`Type::choice`], [`Type::file`]).
//! Declarations which do not occur store their default, so the parsed [`Values`] always hold every destination.
//!
//! ### Sub-commands
//! A [`SuperCommand`] declares options only.
//! Its first positional token names a sub-command, resolved through a [`CommandLoader`] (ex: [`CommandTable`]).
//! Everything after the name is handed off, untouched, to the sub-command; so the super-command's options must precede the name.
//!
//! ```
//! use quiver::{Command, CommandTable, Opt, SuperCommand};
//!
//! let command = SuperCommand::builder(
//!     "tool",
//!     CommandTable::default()
//!         .add(Command::builder("run").option(Opt::flag(["--fast"]).build().unwrap()).build().unwrap())
//!         .add(Command::builder("stop").build().unwrap()),
//! )
//! .option(Opt::flag(["--verbose"]).build().unwrap())
//! .build()
//! .unwrap();
//!
//! let invocations = command.dispatch(&["--verbose", "run", "--fast"]).complete().unwrap();
//! assert_eq!(invocations[0].command_name.as_deref(), Some("run"));
//! assert_eq!(invocations[1].prog, "tool run");
//! assert_eq!(invocations[1].values.get_bool("fast"), Some(true));
//! ```
//!
//! # Cli Semantics
//! `quiver` parses the Cli tokens according to the following set of rules.
//!
//! * The separator `--` switches the parser into positional-only mode; every subsequent token is positional, even if it looks like an option.
//! * Long options are matched by `--NAME`.
//! A value may be attached with `=` (only the first `=` separates), or otherwise the next token is taken as the value, even if it looks like an option.
//! For example, `--key=123=456` is equivalent to `--key 123=456`.
//! * Short options may be clustered: `-abc` is equivalent to `-a -b -c`.
//! The first value-taking option in a cluster takes the rest of the token as its value (`-abofoo` is `-a -b -o foo`), or otherwise the next token.
//! * Positional tokens are dispatched to the arguments in declaration order.
//! A variadic argument never advances, absorbing every subsequent positional token.
//! * A signal option (ex: `--help`) stops the parse at once; the remaining tokens are not evaluated.
//! * Groups count the *distinct* members which occurred; repeating an option does not count twice.
//!
//! # Exit codes
//! [`Command::run`] and [`SuperCommand::run`] print through a [`Printer`] and report the exit code the program should terminate with:
//! `0` for help/version, `137` for usage errors, and `138` for group constraint violations.
//! Definition errors carry `129` (see [`DefinitionError::exit_code`]).
//!
//! # Features
//! * `unit_test`: For features that help with unit testing.
//! * `tracing_debug`: Emit `tracing` debug events from the tokenizer and help renderer.
pub use quiver_builder::*;
