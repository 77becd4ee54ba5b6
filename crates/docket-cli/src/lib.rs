//! docket CLI - run productions and stream progress from the terminal

#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Command, ProcessArgs};
pub use error::{CliError, Result};
pub use output::EventPrinter;
