//! Local filesystem collaborator backed by std::fs

use super::types::{EntryKind, Metadata};
use super::Storage;
use crate::error::{IoError, IoResult};
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

/// Storage collaborator for the local filesystem
///
/// Probes use `symlink_metadata`, so symbolic links are reported as
/// `Symlink` entries and never followed; a link to a directory is not
/// recursed into.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl Storage for LocalStorage {
    fn stat(&self, path: &str) -> IoResult<Metadata> {
        let meta = fs::symlink_metadata(path).map_err(|source| IoError::Stat {
            path: path.to_string(),
            source,
        })?;

        let file_type = meta.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::Other
        };

        Ok(Metadata {
            kind,
            size: meta.len(),
            mtime: meta.modified().ok().map(system_time_to_unix),
        })
    }

    fn list_dir(&self, path: &str) -> IoResult<Vec<String>> {
        let reader = fs::read_dir(path).map_err(|source| IoError::List {
            path: path.to_string(),
            source,
        })?;

        let mut names = Vec::new();
        for dirent in reader {
            let dirent = dirent.map_err(|source| IoError::List {
                path: path.to_string(),
                source,
            })?;
            names.push(dirent.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn read_file(&self, path: &str) -> IoResult<Vec<u8>> {
        fs::read(path).map_err(|source| IoError::Read {
            path: path.to_string(),
            source,
        })
    }
}

fn system_time_to_unix(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}
