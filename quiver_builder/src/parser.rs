mod base;
mod context;
mod interface;
mod middleware;
mod printer;

pub(crate) use base::{Mode, Parser};
pub(crate) use context::Layout;
pub use interface::{ConsoleInterface, UserInterface};
pub(crate) use middleware::{as_tokens, dispatch, env_argv, report};
pub use middleware::Lineage;
pub use printer::{CommandInfo, Printer, TerminalPrinter};

#[cfg(test)]
pub(crate) use interface::util;
