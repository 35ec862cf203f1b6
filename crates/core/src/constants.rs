//! Constants used throughout the taskbridge codebase

// File name patterns in the watch directory
pub const RESULT_FILE_PREFIX: &str = "result_";
pub const RESULT_FILE_EXT: &str = "json";
pub const DONE_FILE_EXT: &str = "done";
pub const PENDING_ERRORS_PREFIX: &str = "pending_errors_";

// Default source extension for dropped task files
pub const DEFAULT_SOURCE_EXT: &str = "src";

// Environment variable names
pub const TASKBRIDGE_LOG_VAR: &str = "TASKBRIDGE_LOG";

// Timing defaults (seconds)
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_PENDING_TIMEOUT_SECS: u64 = 5;

// Durable state file name inside the per-directory state dir
pub const STATE_FILE_NAME: &str = "state.json";
