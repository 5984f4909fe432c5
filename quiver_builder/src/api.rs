mod argument;
mod command;
mod declaration;
mod group;
mod loader;
mod option;
mod types;

pub use argument::*;
pub use command::*;
pub use group::*;
pub use loader::*;
pub use option::*;
pub use types::*;
