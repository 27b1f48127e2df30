//! Entry types produced by the storage collaborators
//!
//! These types represent filesystem entries as the traversal engines see
//! them: a path, the metadata the collaborator reported for it, and (for
//! the content-reading operations) the raw bytes that were read.

use serde::Serialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Type of filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link (reported, never followed)
    Symlink,
    /// Anything else (device, fifo, socket, ...)
    Other,
}

impl EntryKind {
    /// Check if this is a regular file
    pub fn is_file(&self) -> bool {
        *self == EntryKind::File
    }

    /// Check if this is a directory
    pub fn is_dir(&self) -> bool {
        *self == EntryKind::Directory
    }
}

/// Metadata for a filesystem entry
///
/// The minimum record a collaborator must produce for a probe: the kind
/// (directories are the only kind recursed into), the size in bytes, and
/// the modification time as a Unix timestamp when the collaborator knows
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// Entry kind
    pub kind: EntryKind,

    /// Size in bytes (0 for directories on most filesystems)
    pub size: u64,

    /// Last modification time (Unix timestamp, seconds)
    pub mtime: Option<i64>,
}

impl Metadata {
    /// Check if this entry is a directory
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Convert mtime to SystemTime
    pub fn mtime_as_system_time(&self) -> Option<SystemTime> {
        self.mtime.map(|t| {
            if t >= 0 {
                UNIX_EPOCH + Duration::from_secs(t as u64)
            } else {
                UNIX_EPOCH - Duration::from_secs((-t) as u64)
            }
        })
    }
}

/// A visited filesystem entry: full joined path plus its metadata
///
/// Entries are immutable once produced; the engines never re-visit or
/// update them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Full path, joined from the root with single separators
    pub path: String,

    /// Metadata the collaborator reported for the path
    pub meta: Metadata,
}

impl Entry {
    /// Create an entry from a path and its metadata
    pub fn new(path: impl Into<String>, meta: Metadata) -> Self {
        Self {
            path: path.into(),
            meta,
        }
    }

    /// Entry name (final path component)
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A matched entry together with its full contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// The matched entry
    pub entry: Entry,

    /// Raw file contents
    pub content: Vec<u8>,
}
