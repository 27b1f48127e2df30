//! Progress reporting for the filesystem walker
//!
//! Provides a real-time progress display using indicatif, plus the
//! styled header and summary the CLI prints around a walk.

use crate::walker::WalkProgress;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays walk status
///
/// Clones share the underlying bar, so a polling thread can update the
/// display while the main flow clears it when the walk resolves.
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &WalkProgress) {
        let bytes_str = format_size(progress.bytes, BINARY);
        let rate = progress.entries_per_second();

        let msg = format!(
            "Dirs: {} | Files: {} | Size: {} | Rate: {:.0}/s | Errors: {}",
            format_number(progress.dirs),
            format_number(progress.files),
            bytes_str,
            rate,
            format_number(progress.errors),
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the walk results
pub fn print_summary(dirs: u64, files: u64, bytes: u64, errors: u64, duration: Duration) {
    let bytes_str = format_size(bytes, BINARY);
    let duration_secs = duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        (files + dirs) as f64 / duration_secs
    } else {
        0.0
    };

    println!();
    println!("{}", style("Walk Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Directories:").bold(),
        format_number(dirs)
    );
    println!("  {} {}", style("Files:").bold(), format_number(files));
    println!("  {} {}", style("Total Size:").bold(), bytes_str);
    println!(
        "  {} {:.1}s ({:.0} entries/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    if errors > 0 {
        println!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(errors)
        );
    }
    println!();
}

/// Print a header at the start of the walk
pub fn print_header(root: &str, engine: &str, pattern: Option<&str>) {
    println!();
    println!(
        "{} {}",
        style("fs-walker").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Root:").bold(), root);
    println!("  {} {}", style("Engine:").bold(), engine);
    if let Some(pattern) = pattern {
        println!("  {} {}", style("Pattern:").bold(), pattern);
    }
    println!();
}
