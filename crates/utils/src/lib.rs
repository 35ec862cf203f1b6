//! Shared utilities for taskbridge
//!
//! This crate provides common utility functions used throughout the
//! taskbridge workspace: atomic file writes and the per-watch-directory
//! state directory layout.

pub mod atomic_file;
pub mod paths;

pub use atomic_file::*;
pub use paths::*;
