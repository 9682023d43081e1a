//! Pure formatting functions for UI output.
//!
//! Styling goes through `console`, which drops colors when the stream is not
//! a terminal (the usual case inside a build).

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::BumpOutcome;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Headline printed after a bump.
pub fn outcome_summary(outcome: &BumpOutcome, dry_run: bool) -> String {
    if dry_run {
        format!(
            "Dry run: version would change from {} to {}",
            outcome.previous, outcome.version
        )
    } else {
        format!(
            "Version incremented. New version number is {}",
            outcome.version
        )
    }
}

/// Display the result of a bump: the new version, the package version and
/// every file touched.
pub fn display_outcome(outcome: &BumpOutcome, dry_run: bool) {
    for warning in &outcome.warnings {
        display_boundary_warning(warning);
    }

    display_success(&outcome_summary(outcome, dry_run));

    if let Some(package) = &outcome.package {
        display_status(&format!("Package version: {}", package));
    }

    for patched in &outcome.patched {
        let verb = if patched.written { "Patched" } else { "Would patch" };
        display_status(&format!(
            "{} {} ({} replacements)",
            verb,
            patched.path.display(),
            patched.replacements
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssemblyVersion, RevisionCount};
    use crate::project::DescriptorFormat;

    fn outcome() -> BumpOutcome {
        BumpOutcome {
            format: DescriptorFormat::Modern,
            previous: AssemblyVersion::new(1, 0, 0),
            version: AssemblyVersion::new(1, 1, 7),
            package: None,
            revision: RevisionCount::new(7).unwrap(),
            patched: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_outcome_summary() {
        assert_eq!(
            outcome_summary(&outcome(), false),
            "Version incremented. New version number is 1.1.7"
        );
        assert_eq!(
            outcome_summary(&outcome(), true),
            "Dry run: version would change from 1.0.0 to 1.1.7"
        );
    }

    #[test]
    fn test_display_functions() {
        // Visual verification test - output goes to stdout/stderr
        display_error("test error");
        display_status("test status");
        display_outcome(&outcome(), false);
    }
}
