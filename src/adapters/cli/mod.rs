//! CLI Adapter
//!
//! Command-line interface for the Space Lab backend.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    execute, CliApp, Command, MigrateCmd, QuoteCmd, ServeCmd, UpdatePricesCmd, VanityCmd,
};
