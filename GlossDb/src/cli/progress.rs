//! CLI progress display utilities
//!
//! Yarnish-style step lines with emoji, plus the end-of-run summary.

use std::time::Duration;

use console::{Emoji, style};
use indicatif::HumanDuration;

use crate::merge::RunSummary;

// =============================================================================
// Emoji Constants (with ASCII fallbacks for terminals without emoji support)
// =============================================================================

/// Floppy disk - for opening the database
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Package - for mounting and merging archives
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

// =============================================================================
// Step-Based Progress
// =============================================================================

/// Print a step indicator: `[1/3] 📦 Message...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

/// One line per archive: merged, skipped, or where the run stopped.
pub fn print_summary(summary: &RunSummary) {
    for report in &summary.reports {
        println!("  {} {}", style("✔").green(), report);
    }
    for failure in &summary.failures {
        println!(
            "  {} {}: {}",
            style("✘").red(),
            failure.path.display(),
            style(&failure.message).dim()
        );
    }
    if let Some(fatal) = &summary.fatal {
        println!("  {} stopped: {}", style("✘").red().bold(), fatal);
    }
}
