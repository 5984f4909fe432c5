//! Builder module for `quiver`.
//! See the `quiver` crate root for the full walkthrough of declarations, groups and token semantics.
#![deny(missing_docs)]
mod api;
mod constant;
mod error;
mod model;
mod parser;

pub use api::*;
pub use constant::{is_long_option, is_separator, is_short_option, COMMAND_NAME_DEST};
pub use error::*;
pub use model::*;
pub use parser::{
    CommandInfo, ConsoleInterface, Lineage, Printer, TerminalPrinter, UserInterface,
};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
