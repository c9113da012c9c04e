//! Error handling utilities
//!
//! Centralized fatal-error reporting for the binary.

use crate::error::Error;
use tracing::error;

/// Exit status for a rejected pipeline configuration
pub const EXIT_CONFIGURATION: i32 = 2;
/// Exit status for every other failure
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for `error`
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<Error>() {
        Some(Error::Configuration(_)) => EXIT_CONFIGURATION,
        _ => EXIT_FAILURE,
    }
}

/// Handle fatal errors and exit with appropriate status code
///
/// # Verbose Mode Behavior
/// - `verbose = 0`: the top-level message only
/// - `verbose >= 1`: the full error chain
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    eprintln!("Error: {error}");
    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code(&error))
}
