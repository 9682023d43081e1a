//! User interface module.
//!
//! The tool runs unattended inside builds, so there are no prompts: this
//! module only reports. Failures are printed once and the process exits.

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_error, display_outcome, display_status, display_success,
    outcome_summary,
};

/// Print a failure with its full cause chain.
///
/// With `verbose` the debug representation is printed as well, which
/// includes a backtrace when `RUST_BACKTRACE` is set.
pub fn report_failure(error: &anyhow::Error, verbose: bool) {
    display_error(&format!("Version incrementing failed: {:#}", error));
    if verbose {
        eprintln!();
        eprintln!("{:?}", error);
    }
}
