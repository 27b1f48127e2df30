//! Concurrent traversal engine
//!
//! A single driver task dispatches probe (stat), expand (list) and read
//! operations to the runtime's blocking pool and receives their results
//! over an unbounded channel. The session's outstanding-work counter is
//! a plain local integer owned by the driver: it is incremented before
//! every dispatch and decremented when the result arrives, before any
//! follow-up work is issued. The walk completes the moment the counter
//! returns to zero, which can only happen once.
//!
//! ```text
//! driver task                              blocking pool
//! ───────────                              ─────────────
//! expand(root)          ──dispatch──▶      list_dir(root)
//! recv Expanded(root)   ◀──result────
//!   probe each child    ──dispatch──▶      stat(child) × N
//! recv Probed(child)    ◀──result────
//!   handler(child)
//!   expand if dir       ──dispatch──▶      list_dir(child)
//! ...
//! counter == 0  →  resolve with Ok(entries) | Err(first error)
//! ```
//!
//! Branch errors are isolated: a failed probe or expand is reported to
//! the per-entry handler and kills only that branch, while every other
//! branch keeps running. The resolved value is all-or-error; the first
//! error observed wins and the partial accumulation is withheld.

use crate::error::{IoError, IoResult};
use crate::storage::{Entry, FileContent, Metadata, Storage};
use crate::walker::{join_path, DEFAULT_ROOT};
use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, warn};

/// Result of one dispatched storage operation
enum TaskResult {
    Expanded {
        dir: String,
        outcome: IoResult<Vec<String>>,
    },
    Probed {
        path: String,
        outcome: IoResult<Metadata>,
    },
    ReadDone {
        entry: Entry,
        outcome: IoResult<Vec<u8>>,
    },
}

/// Stage events delivered to the operation adapters
enum Event<'a> {
    Entry(&'a Entry),
    Content(&'a Entry, &'a [u8]),
    Failed(&'a IoError),
}

/// Accumulated session output
#[derive(Default)]
struct WalkOutput {
    entries: Vec<Entry>,
    contents: Vec<Vec<u8>>,
}

/// Progress snapshot for display
#[derive(Debug, Clone, Default)]
pub struct WalkProgress {
    pub dirs: u64,
    pub files: u64,
    pub bytes: u64,
    pub errors: u64,
    pub elapsed: Duration,
}

impl WalkProgress {
    pub fn entries_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.files + self.dirs) as f64 / secs
        } else {
            0.0
        }
    }
}

/// Cloneable handle onto a walker's counters
///
/// A progress reporter polls this from its own thread; it observes the
/// walk without participating in it.
#[derive(Debug, Clone)]
pub struct WalkCounters {
    dirs: Arc<AtomicU64>,
    files: Arc<AtomicU64>,
    bytes: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
}

impl WalkCounters {
    pub fn snapshot(&self, elapsed: Duration) -> WalkProgress {
        WalkProgress {
            dirs: self.dirs.load(Ordering::Relaxed),
            files: self.files.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// Concurrent walker
///
/// Cheap to construct; every operation call is an independent session.
pub struct AsyncWalker {
    storage: Arc<dyn Storage>,
    dirs_count: Arc<AtomicU64>,
    files_count: Arc<AtomicU64>,
    bytes_count: Arc<AtomicU64>,
    errors_count: Arc<AtomicU64>,
}

impl AsyncWalker {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            dirs_count: Arc::new(AtomicU64::new(0)),
            files_count: Arc::new(AtomicU64::new(0)),
            bytes_count: Arc::new(AtomicU64::new(0)),
            errors_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handle onto the walk counters for progress reporting
    pub fn counters(&self) -> WalkCounters {
        WalkCounters {
            dirs: Arc::clone(&self.dirs_count),
            files: Arc::clone(&self.files_count),
            bytes: Arc::clone(&self.bytes_count),
            errors: Arc::clone(&self.errors_count),
        }
    }

    /// Visit every file and directory below `root`
    ///
    /// The handler is invoked with `Ok` for every successfully probed
    /// entry before its branch is descended into, and with `Err` for a
    /// failed probe or expand (which kills only that branch). Resolves
    /// with every visited entry, or with the first error observed.
    ///
    /// `root` defaults to [`DEFAULT_ROOT`] when `None`.
    pub async fn each_entry<F>(&self, root: Option<&str>, mut on_entry: F) -> IoResult<Vec<Entry>>
    where
        F: FnMut(std::result::Result<&Entry, &IoError>),
    {
        let out = self
            .drive(root.unwrap_or(DEFAULT_ROOT), None, false, |event| {
                match event {
                    Event::Entry(entry) => on_entry(Ok(entry)),
                    Event::Failed(err) => on_entry(Err(err)),
                    // content events only come from the read stage
                    Event::Content(..) => {}
                }
            })
            .await?;
        Ok(out.entries)
    }

    /// Visit every non-directory below `root` whose path matches `pattern`
    ///
    /// Directories are probed and descended into but never forwarded.
    /// Errors reach the handler exactly as in [`Self::each_entry`].
    pub async fn each_file_matching<F>(
        &self,
        pattern: &Regex,
        root: Option<&str>,
        mut on_match: F,
    ) -> IoResult<Vec<Entry>>
    where
        F: FnMut(std::result::Result<&Entry, &IoError>),
    {
        let out = self
            .drive(root.unwrap_or(DEFAULT_ROOT), Some(pattern), false, |event| {
                match event {
                    Event::Entry(entry) => on_match(Ok(entry)),
                    Event::Failed(err) => on_match(Err(err)),
                    Event::Content(..) => {}
                }
            })
            .await?;
        Ok(out.entries)
    }

    /// Read every matching file below `root` and deliver its contents
    ///
    /// A pending read is outstanding work: completion waits for every
    /// read, and a read failure is reported exactly like a probe or
    /// expand failure.
    pub async fn read_each_file_matching<F>(
        &self,
        pattern: &Regex,
        root: Option<&str>,
        mut on_file: F,
    ) -> IoResult<Vec<FileContent>>
    where
        F: FnMut(std::result::Result<(&Entry, &[u8]), &IoError>),
    {
        let out = self
            .drive(root.unwrap_or(DEFAULT_ROOT), Some(pattern), true, |event| {
                match event {
                    Event::Content(entry, content) => on_file(Ok((entry, content))),
                    Event::Failed(err) => on_file(Err(err)),
                    Event::Entry(_) => {}
                }
            })
            .await?;
        Ok(out
            .entries
            .into_iter()
            .zip(out.contents)
            .map(|(entry, content)| FileContent { entry, content })
            .collect())
    }

    /// Run one traversal session
    ///
    /// `in_flight` is incremented before every dispatch and decremented
    /// as each result is received, before any follow-up dispatch. It can
    /// therefore never be observed as zero while an operation is in
    /// flight or logically implied, and the loop exit is the session's
    /// single completion point.
    async fn drive<F>(
        &self,
        root: &str,
        filter: Option<&Regex>,
        read_contents: bool,
        mut emit: F,
    ) -> IoResult<WalkOutput>
    where
        F: FnMut(Event<'_>),
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut out = WalkOutput::default();
        let mut first_error: Option<IoError> = None;
        let mut in_flight: u64 = 0;

        in_flight += 1;
        self.spawn_expand(root.to_string(), &tx);

        while in_flight > 0 {
            let Some(result) = rx.recv().await else {
                break;
            };
            in_flight -= 1;

            match result {
                TaskResult::Expanded { dir, outcome } => match outcome {
                    Ok(names) => {
                        self.dirs_count.fetch_add(1, Ordering::Relaxed);
                        for name in names {
                            in_flight += 1;
                            self.spawn_probe(join_path(&dir, &name), &tx);
                        }
                    }
                    Err(err) => {
                        self.note_failure(err, &mut first_error, &mut emit);
                    }
                },
                TaskResult::Probed { path, outcome } => match outcome {
                    Ok(meta) => {
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
                            in_flight += 1;
                            self.spawn_expand(entry.path, &tx);
                        } else {
                            self.files_count.fetch_add(1, Ordering::Relaxed);
                            self.bytes_count.fetch_add(meta.size, Ordering::Relaxed);
                            if forwarded {
                                if read_contents {
                                    in_flight += 1;
                                    self.spawn_read(entry, &tx);
                                } else {
                                    emit(Event::Entry(&entry));
                                    out.entries.push(entry);
                                }
                            }
                        }
                    }
                    Err(err) => {
                        self.note_failure(err, &mut first_error, &mut emit);
                    }
                },
                TaskResult::ReadDone { entry, outcome } => match outcome {
                    Ok(content) => {
                        emit(Event::Content(&entry, &content));
                        out.entries.push(entry);
                        out.contents.push(content);
                    }
                    Err(err) => {
                        self.note_failure(err, &mut first_error, &mut emit);
                    }
                },
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(out),
        }
    }

    fn note_failure<F>(&self, err: IoError, first_error: &mut Option<IoError>, emit: &mut F)
    where
        F: FnMut(Event<'_>),
    {
        // Not-found is routine on filesystems that change during a scan
        if err.is_not_found() {
            debug!("{err}");
        } else {
            warn!("{err}");
        }
        self.errors_count.fetch_add(1, Ordering::Relaxed);
        emit(Event::Failed(&err));
        if first_error.is_none() {
            *first_error = Some(err);
        }
    }

    fn spawn_probe(&self, path: String, tx: &UnboundedSender<TaskResult>) {
        let storage = Arc::clone(&self.storage);
        let tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = storage.stat(&path);
            let _ = tx.send(TaskResult::Probed { path, outcome });
        });
    }

    fn spawn_expand(&self, dir: String, tx: &UnboundedSender<TaskResult>) {
        debug!("Expanding {dir}");
        let storage = Arc::clone(&self.storage);
        let tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = storage.list_dir(&dir);
            let _ = tx.send(TaskResult::Expanded { dir, outcome });
        });
    }

    fn spawn_read(&self, entry: Entry, tx: &UnboundedSender<TaskResult>) {
        let storage = Arc::clone(&self.storage);
        let tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = storage.read_file(&entry.path);
            let _ = tx.send(TaskResult::ReadDone { entry, outcome });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::collections::HashSet;

    fn scenario_storage() -> Arc<MemoryStorage> {
        let storage = MemoryStorage::new();
        storage.add_file("root/a.txt", b"alpha");
        storage.add_file("root/sub/b.txt", b"bravo");
        storage.add_file("root/sub/c.log", b"charlie");
        Arc::new(storage)
    }

    fn paths(entries: &[Entry]) -> HashSet<String> {
        entries.iter().map(|e| e.path.clone()).collect()
    }

    #[tokio::test]
    async fn test_each_entry_visits_all() {
        let storage = scenario_storage();
        let walker = AsyncWalker::new(storage.clone());

        let mut seen = Vec::new();
        let entries = walker
            .each_entry(Some("root"), |res| {
                seen.push(res.unwrap().path.clone());
            })
            .await
            .unwrap();

        let expected: HashSet<String> = ["root/a.txt", "root/sub", "root/sub/b.txt", "root/sub/c.log"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(paths(&entries), expected);
        assert_eq!(entries.len(), 4);
        assert_eq!(seen.len(), 4);

        // one listing per directory, one probe per child
        assert_eq!(storage.list_calls(), 2);
        assert_eq!(storage.stat_calls(), 4);
        assert_eq!(storage.read_calls(), 0);
    }

    #[tokio::test]
    async fn test_directory_delivered_before_descent() {
        let storage = scenario_storage();
        let walker = AsyncWalker::new(storage);

        let mut order = Vec::new();
        walker
            .each_entry(Some("root"), |res| {
                order.push(res.unwrap().path.clone());
            })
            .await
            .unwrap();

        let dir_pos = order.iter().position(|p| p == "root/sub").unwrap();
        let child_pos = order.iter().position(|p| p == "root/sub/b.txt").unwrap();
        assert!(dir_pos < child_pos);
    }

    #[tokio::test]
    async fn test_each_file_matching() {
        let storage = scenario_storage();
        let walker = AsyncWalker::new(storage);
        let pattern = Regex::new(r"\.txt$").unwrap();

        let mut forwarded = Vec::new();
        let matched = walker
            .each_file_matching(&pattern, Some("root"), |res| {
                let entry = res.unwrap();
                assert!(!entry.meta.is_dir());
                forwarded.push(entry.path.clone());
            })
            .await
            .unwrap();

        let expected: HashSet<String> = ["root/a.txt", "root/sub/b.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(paths(&matched), expected);
        assert_eq!(forwarded.len(), 2);
    }

    #[tokio::test]
    async fn test_read_each_file_matching() {
        let storage = scenario_storage();
        let walker = AsyncWalker::new(storage);
        let pattern = Regex::new(r"\.txt$").unwrap();

        let mut delivered = Vec::new();
        let files = walker
            .read_each_file_matching(&pattern, Some("root"), |res| {
                let (entry, content) = res.unwrap();
                delivered.push((entry.path.clone(), content.to_vec()));
            })
            .await
            .unwrap();

        assert_eq!(files.len(), 2);
        for file in &files {
            match file.entry.path.as_str() {
                "root/a.txt" => assert_eq!(file.content, b"alpha"),
                "root/sub/b.txt" => assert_eq!(file.content, b"bravo"),
                other => panic!("unexpected match: {other}"),
            }
        }
        assert_eq!(delivered.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_root() {
        let storage = Arc::new(MemoryStorage::new());
        let walker = AsyncWalker::new(storage);

        let mut ok_count = 0u32;
        let mut err_count = 0u32;
        let result = walker
            .each_entry(Some("nope"), |res| match res {
                Ok(_) => ok_count += 1,
                Err(_) => err_count += 1,
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.path(), "nope");
        assert_eq!(ok_count, 0);
        assert_eq!(err_count, 1);
    }

    #[tokio::test]
    async fn test_branch_error_keeps_siblings_running() {
        let storage = scenario_storage();
        storage.deny_list("root/sub");
        let walker = AsyncWalker::new(storage.clone());

        let mut visited = Vec::new();
        let mut failures = Vec::new();
        let result = walker
            .each_entry(Some("root"), |res| match res {
                Ok(entry) => visited.push(entry.path.clone()),
                Err(err) => failures.push(err.path().to_string()),
            })
            .await;

        // the sibling branch was still walked
        assert!(visited.contains(&"root/a.txt".to_string()));
        // sub was probed and delivered before its expansion failed
        assert!(visited.contains(&"root/sub".to_string()));
        assert_eq!(failures, vec!["root/sub".to_string()]);

        // completion is all-or-error
        let err = result.unwrap_err();
        assert_eq!(err.path(), "root/sub");
    }

    #[tokio::test]
    async fn test_read_error_reported_at_completion() {
        let storage = scenario_storage();
        storage.deny_read("root/sub/b.txt");
        let walker = AsyncWalker::new(storage);
        let pattern = Regex::new(r"\.txt$").unwrap();

        let mut ok_paths = Vec::new();
        let mut err_paths = Vec::new();
        let result = walker
            .read_each_file_matching(&pattern, Some("root"), |res| match res {
                Ok((entry, _)) => ok_paths.push(entry.path.clone()),
                Err(err) => err_paths.push(err.path().to_string()),
            })
            .await;

        assert_eq!(ok_paths, vec!["root/a.txt".to_string()]);
        assert_eq!(err_paths, vec!["root/sub/b.txt".to_string()]);
        assert_eq!(result.unwrap_err().path(), "root/sub/b.txt");
    }

    #[tokio::test]
    async fn test_default_root() {
        let storage = MemoryStorage::new();
        storage.add_file("./only.txt", b"x");
        let walker = AsyncWalker::new(Arc::new(storage));

        let entries = walker.each_entry(None, |_| {}).await.unwrap();
        assert_eq!(paths(&entries), HashSet::from(["./only.txt".to_string()]));
    }

    #[tokio::test]
    async fn test_counters_accumulate() {
        let storage = scenario_storage();
        let walker = AsyncWalker::new(storage);
        let counters = walker.counters();

        walker.each_entry(Some("root"), |_| {}).await.unwrap();

        let progress = counters.snapshot(Duration::from_secs(1));
        assert_eq!(progress.dirs, 2);
        assert_eq!(progress.files, 3);
        assert_eq!(progress.bytes, 5 + 5 + 7);
        assert_eq!(progress.errors, 0);
        assert!(progress.entries_per_second() > 0.0);
    }
}
