pub use command::{Command, Output};
pub use error::{Error, Result};
pub use tool::resolve;

pub mod command;
mod error;
pub mod tool;
