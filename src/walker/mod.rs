//! Recursive traversal engines
//!
//! Two engines with equivalent visiting semantics and deliberately
//! different error policies:
//!
//! ```text
//!                   ┌──────────────────────────┐
//!                   │       AsyncWalker         │
//!                   │  - driver task + channel  │
//!                   │  - outstanding-work count │
//!                   │  - branch errors isolated │
//!                   └──────────────────────────┘
//!                   ┌──────────────────────────┐
//!                   │        SyncWalker         │
//!                   │  - plain recursion        │
//!                   │  - first error aborts all │
//!                   └──────────────────────────┘
//!                                │
//!                                ▼
//!                     Storage (stat / list_dir
//!                          / read_file)
//! ```
//!
//! Each engine offers the same three operations: `each_entry` (every
//! file and directory below the root), `each_file_matching` (matched
//! non-directories only) and `read_each_file_matching` (matched
//! non-directories plus their contents).

mod async_walker;
mod sync_walker;

pub use async_walker::{AsyncWalker, WalkCounters, WalkProgress};
pub use sync_walker::SyncWalker;

/// Root used when the caller does not name one
pub const DEFAULT_ROOT: &str = ".";

/// Join a directory path and a child name with a single separator
///
/// Any trailing separators on the parent are collapsed, so `"root/"`
/// and `"root"` produce the same child paths. A parent of `"/"` keeps
/// its leading separator.
pub fn join_path(parent: &str, name: &str) -> String {
    let trimmed = parent.trim_end_matches('/');
    if trimmed.is_empty() {
        format!("/{name}")
    } else {
        format!("{trimmed}/{name}")
    }
}
