//! Core domain types, errors, and constants for the `taskbridge` application.
//!
//! This crate establishes the foundational data structures and error handling
//! mechanisms used throughout the entire workspace.
//!
//! ## Key Components
//!
//! - **`errors`**: Defines the primary `Error` enum and `Result` type alias,
//!   centralizing all possible failure modes for predictable error handling.
//! - **`types`**: Contains domain-specific data structures like `TaskId`,
//!   `Diagnostic`, and `TaskResult` that make the task lifecycle explicit at
//!   the type level.
//! - **`constants`**: Shared static constants such as result file name
//!   patterns and default timing values.
//! - **`settings`**: Runtime configuration for the watcher.

pub mod constants;
pub mod errors;
pub mod settings;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result, ResultExt},
    settings::Settings,
    types::*,
};
