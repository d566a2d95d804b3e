// warp-coder-builtins/src/memory.rs
// ============================================================================
// Module: Reflection Memory Store
// Description: Single-writer-locked read/append/compact primitive over the
//              global reflection memory file.
// Purpose: Back the `memory`/`compact` CLI commands. Reflection content
//          itself (what gets written, and when) is an external side channel
//          and out of scope here; this only guarantees the file is never
//          corrupted by concurrent writers.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The memory file is global, not per-issue (§9 open question 3), so every
//! writer in the process must go through the same [`MemoryStore`] instance.
//! [`MemoryStore::append`] and [`MemoryStore::compact`] take the same
//! in-process lock; reads are also serialized against in-flight writes so a
//! reader never observes a half-written line.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;

/// Path to the reflection memory file, relative to the project root.
pub const MEMORY_FILE: &str = ".warp-coder/memory.md";

/// A single-writer-locked handle onto the reflection memory file.
pub struct MemoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl MemoryStore {
    /// Opens the memory store rooted at `project_root`. Does not touch disk.
    #[must_use]
    pub fn new(project_root: &Path) -> Self {
        Self {
            path: project_root.join(MEMORY_FILE),
            lock: Mutex::new(()),
        }
    }

    /// The memory file's path on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the full contents of the memory file, or an empty string if it
    /// has never been written.
    pub fn read(&self) -> io::Result<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err),
        }
    }

    /// Appends `entry` as one or more new lines, creating the file and its
    /// parent directory if needed.
    pub fn append(&self, entry: &str) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut body = entry.to_string();
        if !body.ends_with('\n') {
            body.push('\n');
        }
        use std::io::Write;
        let mut file = fs::OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(body.as_bytes())
    }

    /// Trims the memory file down to its last `max_lines` lines, returning
    /// the number of lines dropped. A missing file or a file already at or
    /// under the limit is a no-op.
    pub fn compact(&self, max_lines: u32) -> io::Result<usize> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err),
        };

        let lines: Vec<&str> = contents.lines().collect();
        let keep = max_lines as usize;
        if lines.len() <= keep {
            return Ok(0);
        }

        let dropped = lines.len() - keep;
        let mut kept = lines[dropped..].join("\n");
        kept.push('\n');
        fs::write(&self.path, kept)?;
        Ok(dropped)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use super::MemoryStore;

    #[test]
    fn reading_a_store_with_no_file_yet_is_empty_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = MemoryStore::new(dir.path());
        assert_eq!(store.read().expect("reads"), "");
    }

    #[test]
    fn append_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = MemoryStore::new(dir.path());
        store.append("issue-1: learned to prefer small PRs").expect("appends");
        store.append("issue-2: retry loop needs a cap").expect("appends");
        let contents = store.read().expect("reads");
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn compact_keeps_only_the_most_recent_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = MemoryStore::new(dir.path());
        for i in 0..10 {
            store.append(&format!("line {i}")).expect("appends");
        }
        let dropped = store.compact(3).expect("compacts");
        assert_eq!(dropped, 7);
        let contents = store.read().expect("reads");
        assert_eq!(contents, "line 7\nline 8\nline 9\n");
    }

    #[test]
    fn compact_under_the_limit_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = MemoryStore::new(dir.path());
        store.append("only line").expect("appends");
        assert_eq!(store.compact(500).expect("compacts"), 0);
    }
}
