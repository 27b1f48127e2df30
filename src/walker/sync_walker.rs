//! Sequential traversal engine
//!
//! The blocking counterpart of the concurrent engine: the same
//! expand-probe-recurse structure, collapsed to plain recursion. No
//! outstanding-work counter is needed because nothing is in flight; the
//! call returns only after the entire subtree is visited, so the return
//! value is the completion.
//!
//! Error policy differs from the concurrent engine on purpose: any
//! probe, expand or read failure aborts the entire call immediately,
//! with no per-branch isolation. The handler types make that visible —
//! a sequential handler only ever observes successes.
//!
//! Visit order is deterministic: parent before children, children in
//! collaborator order.

use crate::error::IoResult;
use crate::storage::{Entry, FileContent, Storage};
use crate::walker::{join_path, DEFAULT_ROOT};
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// Stage events delivered to the operation adapters
///
/// No failure arm: sequential errors unwind the recursion instead of
/// reaching the handler.
enum Event<'a> {
    Entry(&'a Entry),
    Content(&'a Entry, &'a [u8]),
}

/// Accumulated session output
#[derive(Default)]
struct WalkOutput {
    entries: Vec<Entry>,
    contents: Vec<Vec<u8>>,
}

/// Sequential (blocking) walker
pub struct SyncWalker {
    storage: Arc<dyn Storage>,
}

impl SyncWalker {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Visit every file and directory below `root`
    ///
    /// The handler observes each entry before its branch is descended
    /// into. Any failure aborts the whole call; `root` defaults to
    /// [`DEFAULT_ROOT`] when `None`.
    pub fn each_entry<F>(&self, root: Option<&str>, mut on_entry: F) -> IoResult<Vec<Entry>>
    where
        F: FnMut(&Entry),
    {
        let mut out = WalkOutput::default();
        self.walk_dir(
            root.unwrap_or(DEFAULT_ROOT),
            None,
            false,
            &mut |event| {
                if let Event::Entry(entry) = event {
                    on_entry(entry);
                }
            },
            &mut out,
        )?;
        Ok(out.entries)
    }

    /// Visit every non-directory below `root` whose path matches `pattern`
    pub fn each_file_matching<F>(
        &self,
        pattern: &Regex,
        root: Option<&str>,
        mut on_match: F,
    ) -> IoResult<Vec<Entry>>
    where
        F: FnMut(&Entry),
    {
        let mut out = WalkOutput::default();
        self.walk_dir(
            root.unwrap_or(DEFAULT_ROOT),
            Some(pattern),
            false,
            &mut |event| {
                if let Event::Entry(entry) = event {
                    on_match(entry);
                }
            },
            &mut out,
        )?;
        Ok(out.entries)
    }

    /// Read every matching file below `root` and deliver its contents
    ///
    /// A read failure aborts the whole call like any other failure.
    pub fn read_each_file_matching<F>(
        &self,
        pattern: &Regex,
        root: Option<&str>,
        mut on_file: F,
    ) -> IoResult<Vec<FileContent>>
    where
        F: FnMut(&Entry, &[u8]),
    {
        let mut out = WalkOutput::default();
        self.walk_dir(
            root.unwrap_or(DEFAULT_ROOT),
            Some(pattern),
            true,
            &mut |event| {
                if let Event::Content(entry, content) = event {
                    on_file(entry, content);
                }
            },
            &mut out,
        )?;
        Ok(out
            .entries
            .into_iter()
            .zip(out.contents)
            .map(|(entry, content)| FileContent { entry, content })
            .collect())
    }

    fn walk_dir(
        &self,
        dir: &str,
        filter: Option<&Regex>,
        read_contents: bool,
        emit: &mut dyn FnMut(Event<'_>),
        out: &mut WalkOutput,
    ) -> IoResult<()> {
        debug!("Expanding {dir}");
        for name in self.storage.list_dir(dir)? {
            let path = join_path(dir, &name);
            let meta = self.storage.stat(&path)?;
            let entry = Entry::new(path, meta);
            let forwarded = match filter {
                None => true,
                Some(pattern) => !meta.is_dir() && pattern.is_match(&entry.path),
            };

            if meta.is_dir() {
                if forwarded {
                    emit(Event::Entry(&entry));
                    out.entries.push(entry.clone());
                }
                self.walk_dir(&entry.path, filter, read_contents, emit, out)?;
            } else if forwarded {
                if read_contents {
                    let content = self.storage.read_file(&entry.path)?;
                    emit(Event::Content(&entry, &content));
                    out.entries.push(entry);
                    out.contents.push(content);
                } else {
                    emit(Event::Entry(&entry));
                    out.entries.push(entry);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn scenario_storage() -> Arc<MemoryStorage> {
        let storage = MemoryStorage::new();
        storage.add_file("root/a.txt", b"alpha");
        storage.add_file("root/sub/b.txt", b"bravo");
        storage.add_file("root/sub/c.log", b"charlie");
        Arc::new(storage)
    }

    #[test]
    fn test_each_entry_preorder() {
        let walker = SyncWalker::new(scenario_storage());

        let mut seen = Vec::new();
        let entries = walker
            .each_entry(Some("root"), |entry| seen.push(entry.path.clone()))
            .unwrap();

        // children in collaborator order, parent before children
        let expected = vec![
            "root/a.txt".to_string(),
            "root/sub".to_string(),
            "root/sub/b.txt".to_string(),
            "root/sub/c.log".to_string(),
        ];
        assert_eq!(seen, expected);
        let paths: Vec<String> = entries.iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_each_file_matching() {
        let walker = SyncWalker::new(scenario_storage());
        let pattern = Regex::new(r"\.txt$").unwrap();

        let matched = walker
            .each_file_matching(&pattern, Some("root"), |_| {})
            .unwrap();
        let paths: Vec<String> = matched.iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, vec!["root/a.txt", "root/sub/b.txt"]);
    }

    #[test]
    fn test_read_each_file_matching() {
        let walker = SyncWalker::new(scenario_storage());
        let pattern = Regex::new(r"\.txt$").unwrap();

        let files = walker
            .read_each_file_matching(&pattern, Some("root"), |_, _| {})
            .unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].entry.path, "root/a.txt");
        assert_eq!(files[0].content, b"alpha");
        assert_eq!(files[1].entry.path, "root/sub/b.txt");
        assert_eq!(files[1].content, b"bravo");
    }

    #[test]
    fn test_error_aborts_whole_call() {
        let storage = MemoryStorage::new();
        storage.add_file("root/a.txt", b"alpha");
        storage.add_file("root/bad", b"x");
        storage.add_file("root/z.txt", b"zulu");
        storage.deny_stat("root/bad");
        let storage = Arc::new(storage);
        let walker = SyncWalker::new(storage.clone());

        let mut seen = Vec::new();
        let err = walker
            .each_entry(Some("root"), |entry| seen.push(entry.path.clone()))
            .unwrap_err();

        assert_eq!(err.path(), "root/bad");
        // the failing sibling killed the rest of the walk
        assert_eq!(seen, vec!["root/a.txt".to_string()]);
        assert_eq!(storage.stat_calls(), 2);
    }

    #[test]
    fn test_read_error_aborts_before_siblings() {
        let storage = MemoryStorage::new();
        storage.add_file("root/a.txt", b"alpha");
        storage.add_file("root/b.txt", b"bravo");
        storage.deny_read("root/a.txt");
        let storage = Arc::new(storage);
        let walker = SyncWalker::new(storage.clone());
        let pattern = Regex::new(r"\.txt$").unwrap();

        let mut delivered = 0u32;
        let err = walker
            .read_each_file_matching(&pattern, Some("root"), |_, _| delivered += 1)
            .unwrap_err();

        assert_eq!(err.path(), "root/a.txt");
        assert_eq!(delivered, 0);
        assert_eq!(storage.read_calls(), 1);
        assert_eq!(storage.stat_calls(), 1);
    }

    #[test]
    fn test_missing_root() {
        let walker = SyncWalker::new(Arc::new(MemoryStorage::new()));
        let mut calls = 0u32;
        let err = walker
            .each_entry(Some("nope"), |_| calls += 1)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(calls, 0);
    }
}
