//! Styled diagnostics on stderr.
//!
//! Scan lines themselves go through the result sink on stdout; everything
//! here is for the human at the terminal.

use crate::scanner::ScanSummary;
use console::style;

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print the end-of-scan statistics.
pub fn print_summary(summary: &ScanSummary) {
    eprintln!("{} {}", style("✓").green().bold(), summary_line(summary));
}

fn summary_line(summary: &ScanSummary) -> String {
    format!(
        "{} open, {} refused, {} timed out in {:.2}s",
        style(summary.open_ports.len()).green().bold(),
        style(summary.refused).red(),
        style(summary.timed_out).yellow(),
        summary.duration.as_secs_f64()
    )
}
