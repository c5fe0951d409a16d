//! Transient user notifications.
//!
//! The terminal stand-in for a toast popup: one colored line on stderr,
//! out of the way of any view output on stdout. Notifications never
//! carry state — callers that need to keep a message around append it to
//! their own transcript as well.

use colored::Colorize;

/// Neutral informational notice.
pub fn info(message: &str) {
    eprintln!("  {} {}", "·".dimmed(), message);
}

/// Positive outcome notice.
pub fn success(message: &str) {
    eprintln!("  {} {}", "✓".green().bold(), message);
}

/// Error notice. Never fatal; the caller decides what happens next.
pub fn error(message: &str) {
    eprintln!("  {} {}", "✗".red().bold(), message);
}
