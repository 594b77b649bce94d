//! Shared utilities for the Snapfeed workspace.
//!
//! Holds build metadata captured by `build.rs` and the version string that
//! the service reports for its runtime environment.

pub mod version_info;
