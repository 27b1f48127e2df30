//! fs-walker - Recursive Filesystem Traversal
//!
//! A library and CLI for walking directory trees: every nested file and
//! directory is visited through a per-entry handler, optionally filtered
//! by a path pattern, optionally with matched file contents read and
//! delivered alongside the entry.
//!
//! # Features
//!
//! - **Two engines, same semantics**: a concurrent engine that
//!   dispatches probes without blocking and tracks outstanding work to
//!   signal completion exactly once, and a sequential engine that is
//!   plain recursion.
//!
//! - **Deliberate error asymmetry**: the concurrent engine isolates
//!   failures to their branch and reports the first one at completion;
//!   the sequential engine aborts the whole walk at the first failure.
//!
//! - **Pluggable storage**: the engines orchestrate a storage
//!   collaborator (stat, list, read) rather than touching a filesystem
//!   directly. A local std::fs collaborator and an instrumented
//!   in-memory collaborator ship with the crate.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Operations                               │
//! │   each_entry          each_file_matching   read_each_file_...   │
//! │   (raw traversal)     (pattern filter)     (filter + contents)  │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ per-entry handler + resolved result
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Traversal engines                           │
//! │  ┌────────────────────────┐    ┌────────────────────────┐       │
//! │  │      AsyncWalker       │    │       SyncWalker       │       │
//! │  │ driver task + channel  │    │    plain recursion     │       │
//! │  │ outstanding-work count │    │   abort on first error │       │
//! │  └───────────┬────────────┘    └───────────┬────────────┘       │
//! └──────────────┼─────────────────────────────┼────────────────────┘
//!                │ stat / list_dir / read_file │
//!                ▼                             ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Storage collaborator                          │
//! │        LocalStorage (std::fs)  │  MemoryStorage (tests)         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use fs_walker::storage::LocalStorage;
//! use fs_walker::walker::AsyncWalker;
//! use regex::Regex;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), fs_walker::IoError> {
//! let walker = AsyncWalker::new(Arc::new(LocalStorage));
//! let pattern = Regex::new(r"\.log$").unwrap();
//!
//! let matched = walker
//!     .each_file_matching(&pattern, Some("/var/log"), |res| {
//!         if let Ok(entry) = res {
//!             println!("{} ({} bytes)", entry.path, entry.meta.size);
//!         }
//!     })
//!     .await?;
//!
//! println!("{} log files", matched.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod progress;
pub mod storage;
pub mod walker;

pub use error::{IoError, IoResult, Result, WalkerError};
pub use storage::{Entry, EntryKind, FileContent, LocalStorage, MemoryStorage, Metadata, Storage};
pub use walker::{join_path, AsyncWalker, SyncWalker, WalkCounters, WalkProgress, DEFAULT_ROOT};
