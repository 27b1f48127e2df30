//! fs-walker - Recursive Filesystem Walker
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use fs_walker::config::{CliArgs, WalkConfig};
use fs_walker::progress::{print_header, print_summary, ProgressReporter};
use fs_walker::storage::{Entry, LocalStorage};
use fs_walker::walker::{AsyncWalker, SyncWalker, DEFAULT_ROOT};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Validate and create config
    let config = WalkConfig::from_args(args).context("Invalid configuration")?;

    // Setup logging
    setup_logging(config.verbose)?;

    if !config.quiet {
        print_header(
            config.root.as_deref().unwrap_or(DEFAULT_ROOT),
            if config.sequential {
                "sequential"
            } else {
                "concurrent"
            },
            config.pattern.as_ref().map(|p| p.as_str()),
        );
    }

    // Run in sequential or concurrent mode
    if config.sequential {
        run_sync(config)
    } else {
        run_async(config)
    }
}

/// Run the walk with the blocking engine
fn run_sync(config: WalkConfig) -> Result<()> {
    let start = Instant::now();
    let walker = SyncWalker::new(Arc::new(LocalStorage));
    let printer = EntryPrinter::from_config(&config);
    let root = config.root.as_deref();

    let entries = match (&config.pattern, config.read_contents) {
        (Some(pattern), true) => {
            let files = walker
                .read_each_file_matching(pattern, root, |entry, content| {
                    printer.print_content(entry, content);
                })
                .context("Walk failed")?;
            files.into_iter().map(|f| f.entry).collect()
        }
        (Some(pattern), false) => walker
            .each_file_matching(pattern, root, |entry| printer.print(entry))
            .context("Walk failed")?,
        (None, _) => walker
            .each_entry(root, |entry| printer.print(entry))
            .context("Walk failed")?,
    };

    let (dirs, files, bytes) = tally(&entries);
    print_summary(dirs, files, bytes, 0, start.elapsed());

    Ok(())
}

/// Run the walk with the concurrent engine
fn run_async(config: WalkConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    runtime.block_on(run_async_inner(config))
}

async fn run_async_inner(config: WalkConfig) -> Result<()> {
    let start = Instant::now();
    let walker = AsyncWalker::new(Arc::new(LocalStorage));
    let counters = walker.counters();
    let printer = EntryPrinter::from_config(&config);
    let root = config.root.as_deref();

    // Progress thread polls the walk counters until the walk resolves
    let reporter = config.show_progress.then(ProgressReporter::new);
    let stop = Arc::new(AtomicBool::new(false));
    let ticker = reporter.clone().map(|reporter| {
        let counters = counters.clone();
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                reporter.update(&counters.snapshot(start.elapsed()));
                std::thread::sleep(Duration::from_millis(100));
            }
        })
    });

    let walk_result = match (&config.pattern, config.read_contents) {
        (Some(pattern), true) => walker
            .read_each_file_matching(pattern, root, |res| {
                if let Ok((entry, content)) = res {
                    printer.print_content(entry, content);
                }
            })
            .await
            .map(|files| files.len()),
        (Some(pattern), false) => walker
            .each_file_matching(pattern, root, |res| {
                if let Ok(entry) = res {
                    printer.print(entry);
                }
            })
            .await
            .map(|entries| entries.len()),
        (None, _) => walker
            .each_entry(root, |res| {
                if let Ok(entry) = res {
                    printer.print(entry);
                }
            })
            .await
            .map(|entries| entries.len()),
    };

    stop.store(true, Ordering::SeqCst);
    if let Some(handle) = ticker {
        let _ = handle.join();
    }
    if let Some(reporter) = &reporter {
        reporter.finish_and_clear();
    }

    walk_result.context("Walk failed")?;

    let progress = counters.snapshot(start.elapsed());
    print_summary(
        progress.dirs,
        progress.files,
        progress.bytes,
        progress.errors,
        progress.elapsed,
    );

    Ok(())
}

/// Per-entry output for the CLI
struct EntryPrinter {
    json: bool,
    verbose: bool,
    suppress: bool,
}

impl EntryPrinter {
    fn from_config(config: &WalkConfig) -> Self {
        Self {
            json: config.json,
            verbose: config.verbose,
            // per-entry lines would fight the progress spinner
            suppress: config.quiet || config.show_progress,
        }
    }

    fn print(&self, entry: &Entry) {
        if self.suppress {
            return;
        }
        if self.json {
            match serde_json::to_string(entry) {
                Ok(line) => println!("{line}"),
                Err(e) => error!("Failed to serialize entry: {e}"),
            }
        } else if self.verbose {
            println!(
                "{:>12}  {}  {}",
                entry.meta.size,
                format_mtime(entry.meta.mtime),
                entry.path
            );
        } else {
            println!("{}", entry.path);
        }
    }

    fn print_content(&self, entry: &Entry, content: &[u8]) {
        if self.suppress {
            return;
        }
        if self.json {
            let line = serde_json::json!({
                "path": entry.path,
                "meta": entry.meta,
                "bytes_read": content.len(),
            });
            println!("{line}");
        } else {
            println!("{} ({} bytes read)", entry.path, content.len());
        }
    }
}

fn format_mtime(mtime: Option<i64>) -> String {
    mtime
        .and_then(|t| chrono::DateTime::from_timestamp(t, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".repeat(19))
}

fn tally(entries: &[Entry]) -> (u64, u64, u64) {
    let mut dirs = 0u64;
    let mut files = 0u64;
    let mut bytes = 0u64;
    for entry in entries {
        if entry.meta.is_dir() {
            dirs += 1;
        } else {
            files += 1;
            bytes += entry.meta.size;
        }
    }
    (dirs, files, bytes)
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("fs_walker=debug,warn")
    } else {
        EnvFilter::new("fs_walker=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
