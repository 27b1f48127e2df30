//! In-memory storage collaborator
//!
//! A deterministic tree for tests, demos and benchmarks. Supports
//! per-path fault injection and per-operation call counters so a test
//! can assert exactly which operations a traversal performed.
//!
//! Listings return child names in insertion order, which gives tests a
//! deterministic ordering without promising one in the `Storage`
//! contract.

use super::types::{EntryKind, Metadata};
use super::Storage;
use crate::error::{IoError, IoResult};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed mtime stamped on every node
const NODE_MTIME: i64 = 1_700_000_000;

#[derive(Debug, Clone)]
enum Node {
    Dir { children: Vec<String> },
    File { content: Vec<u8> },
}

/// In-memory storage collaborator with fault injection
///
/// # Example
///
/// ```
/// use fs_walker::storage::{MemoryStorage, Storage};
///
/// let storage = MemoryStorage::new();
/// storage.add_file("root/a.txt", b"alpha");
/// storage.add_file("root/sub/b.txt", b"bravo");
///
/// assert_eq!(storage.list_dir("root").unwrap(), vec!["a.txt", "sub"]);
/// assert_eq!(storage.read_file("root/a.txt").unwrap(), b"alpha");
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    nodes: Mutex<HashMap<String, Node>>,
    deny_stat: Mutex<HashSet<String>>,
    deny_list: Mutex<HashSet<String>>,
    deny_read: Mutex<HashSet<String>>,
    stat_calls: AtomicU64,
    list_calls: AtomicU64,
    read_calls: AtomicU64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory, creating missing ancestors
    pub fn add_dir(&self, path: &str) {
        let mut nodes = self.nodes.lock();
        ensure_dir(&mut nodes, path);
    }

    /// Add a file with the given contents, creating missing ancestors
    pub fn add_file(&self, path: &str, content: &[u8]) {
        let mut nodes = self.nodes.lock();
        if let Some((parent, name)) = split_parent(path) {
            ensure_dir(&mut nodes, parent);
            register_child(&mut nodes, parent, name);
        }
        nodes.insert(
            path.to_string(),
            Node::File {
                content: content.to_vec(),
            },
        );
    }

    /// Make every stat of `path` fail with permission denied
    pub fn deny_stat(&self, path: &str) {
        self.deny_stat.lock().insert(path.to_string());
    }

    /// Make every listing of `path` fail with permission denied
    pub fn deny_list(&self, path: &str) {
        self.deny_list.lock().insert(path.to_string());
    }

    /// Make every read of `path` fail with permission denied
    pub fn deny_read(&self, path: &str) {
        self.deny_read.lock().insert(path.to_string());
    }

    /// Number of stat operations issued against this collaborator
    pub fn stat_calls(&self) -> u64 {
        self.stat_calls.load(Ordering::SeqCst)
    }

    /// Number of list operations issued against this collaborator
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of read operations issued against this collaborator
    pub fn read_calls(&self) -> u64 {
        self.read_calls.load(Ordering::SeqCst)
    }

    fn denied(set: &Mutex<HashSet<String>>, path: &str) -> bool {
        set.lock().contains(path)
    }
}

impl Storage for MemoryStorage {
    fn stat(&self, path: &str) -> IoResult<Metadata> {
        self.stat_calls.fetch_add(1, Ordering::SeqCst);

        if Self::denied(&self.deny_stat, path) {
            return Err(IoError::Stat {
                path: path.to_string(),
                source: std::io::Error::new(ErrorKind::PermissionDenied, "stat denied"),
            });
        }

        match self.nodes.lock().get(path) {
            Some(Node::Dir { .. }) => Ok(Metadata {
                kind: EntryKind::Directory,
                size: 0,
                mtime: Some(NODE_MTIME),
            }),
            Some(Node::File { content }) => Ok(Metadata {
                kind: EntryKind::File,
                size: content.len() as u64,
                mtime: Some(NODE_MTIME),
            }),
            None => Err(IoError::Stat {
                path: path.to_string(),
                source: std::io::Error::new(ErrorKind::NotFound, "no such path"),
            }),
        }
    }

    fn list_dir(&self, path: &str) -> IoResult<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if Self::denied(&self.deny_list, path) {
            return Err(IoError::List {
                path: path.to_string(),
                source: std::io::Error::new(ErrorKind::PermissionDenied, "list denied"),
            });
        }

        match self.nodes.lock().get(path) {
            Some(Node::Dir { children }) => Ok(children.clone()),
            Some(Node::File { .. }) => Err(IoError::List {
                path: path.to_string(),
                source: std::io::Error::new(ErrorKind::NotADirectory, "not a directory"),
            }),
            None => Err(IoError::List {
                path: path.to_string(),
                source: std::io::Error::new(ErrorKind::NotFound, "no such path"),
            }),
        }
    }

    fn read_file(&self, path: &str) -> IoResult<Vec<u8>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);

        if Self::denied(&self.deny_read, path) {
            return Err(IoError::Read {
                path: path.to_string(),
                source: std::io::Error::new(ErrorKind::PermissionDenied, "read denied"),
            });
        }

        match self.nodes.lock().get(path) {
            Some(Node::File { content }) => Ok(content.clone()),
            Some(Node::Dir { .. }) => Err(IoError::Read {
                path: path.to_string(),
                source: std::io::Error::new(ErrorKind::IsADirectory, "is a directory"),
            }),
            None => Err(IoError::Read {
                path: path.to_string(),
                source: std::io::Error::new(ErrorKind::NotFound, "no such path"),
            }),
        }
    }
}

/// Split a path into (parent, name); None for single-component paths
fn split_parent(path: &str) -> Option<(&str, &str)> {
    let (parent, name) = path.rsplit_once('/')?;
    if name.is_empty() {
        return None;
    }
    Some((if parent.is_empty() { "/" } else { parent }, name))
}

fn ensure_dir(nodes: &mut HashMap<String, Node>, path: &str) {
    if nodes.contains_key(path) {
        return;
    }
    if let Some((parent, name)) = split_parent(path) {
        ensure_dir(nodes, parent);
        register_child(nodes, parent, name);
    }
    nodes.insert(
        path.to_string(),
        Node::Dir {
            children: Vec::new(),
        },
    );
}

fn register_child(nodes: &mut HashMap<String, Node>, parent: &str, name: &str) {
    if let Some(Node::Dir { children }) = nodes.get_mut(parent) {
        if !children.iter().any(|c| c == name) {
            children.push(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_building() {
        let storage = MemoryStorage::new();
        storage.add_file("root/a.txt", b"alpha");
        storage.add_file("root/sub/b.txt", b"bravo");
        storage.add_dir("root/empty");

        assert_eq!(
            storage.list_dir("root").unwrap(),
            vec!["a.txt", "sub", "empty"]
        );
        assert_eq!(storage.list_dir("root/sub").unwrap(), vec!["b.txt"]);
        assert!(storage.list_dir("root/empty").unwrap().is_empty());

        assert!(storage.stat("root/sub").unwrap().is_dir());
        let meta = storage.stat("root/a.txt").unwrap();
        assert_eq!(meta.kind, EntryKind::File);
        assert_eq!(meta.size, 5);
    }

    #[test]
    fn test_missing_paths() {
        let storage = MemoryStorage::new();
        storage.add_dir("root");

        assert!(storage.stat("root/nope").unwrap_err().is_not_found());
        assert!(storage.list_dir("root/nope").unwrap_err().is_not_found());
        assert!(storage.read_file("root/nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_of_file_fails() {
        let storage = MemoryStorage::new();
        storage.add_file("root/a.txt", b"alpha");

        let err = storage.list_dir("root/a.txt").unwrap_err();
        assert_eq!(err.path(), "root/a.txt");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_fault_injection_and_counters() {
        let storage = MemoryStorage::new();
        storage.add_file("root/a.txt", b"alpha");
        storage.deny_read("root/a.txt");

        assert!(storage.stat("root/a.txt").is_ok());
        assert!(storage.read_file("root/a.txt").is_err());

        assert_eq!(storage.stat_calls(), 1);
        assert_eq!(storage.read_calls(), 1);
        assert_eq!(storage.list_calls(), 0);
    }

    #[test]
    fn test_absolute_paths() {
        let storage = MemoryStorage::new();
        storage.add_file("/data/x.bin", &[0u8; 16]);

        assert_eq!(storage.list_dir("/").unwrap(), vec!["data"]);
        assert_eq!(storage.list_dir("/data").unwrap(), vec!["x.bin"]);
    }
}
