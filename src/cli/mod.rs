//! Handles Command Line Interface (CLI) related functionalities.
//!
//! Includes defining commands and parsing arguments, the shared command context (console
//! output, logging, progress bars), and the interactive project selection.

mod commands;
pub mod console;
mod context;
mod select;

pub use commands::*;
pub use context::*;
