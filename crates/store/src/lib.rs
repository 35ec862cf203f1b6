//! Durable persistence for taskbridge.
//!
//! Four concerns live here, all filesystem-backed:
//!
//! - **`layout`**: the file naming scheme inside a watch directory.
//! - **`state`**: the process-wide durable key-value state (pending marker,
//!   enabled flag) that must survive restarts.
//! - **`result_store`**: the result/marker pair external pollers observe.
//! - **`recovery`**: the defensively written diagnostics file consumed after
//!   a restart that happened mid-compilation.

pub mod layout;
pub mod recovery;
pub mod result_store;
pub mod state;

pub use layout::TaskFiles;
pub use recovery::RecoveryStore;
pub use result_store::ResultStore;
pub use state::StateStore;
