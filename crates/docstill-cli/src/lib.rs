//! Docstill CLI library.
//!
//! This library provides the core functionality for the docstill
//! command-line interface: argument parsing, output formatting, and
//! error handling around the extraction pipeline.

pub mod cli;
pub mod error;
pub mod output;

pub use cli::{mime_type_for, Cli, CliFormat};
pub use error::{CliError, Result};
pub use output::Formatter;
