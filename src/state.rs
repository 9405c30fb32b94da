//! Link snapshot persistence.
//!
//! The previous run's link set is the only state this tool keeps between
//! runs. It lives behind the [`LinkStateStore`] trait so the pipeline never
//! touches a concrete path, and tests can substitute an in-memory store.
//!
//! On disk the snapshot is plain UTF-8, one URL per line, no header or
//! footer, replaced wholesale at the end of each run.

use std::collections::HashSet;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tempfile::NamedTempFile;

/// Persistence seam for the known-link snapshot.
///
/// Implementations must treat absent prior state as the empty set, and must
/// replace the stored set wholesale on save. `load(save(S)) == S` as sets.
pub trait LinkStateStore: Send + Sync {
    /// Loads the previous run's link set. Absent state is the empty set.
    fn load(&self) -> Result<HashSet<String>>;

    /// Replaces the stored link set with `links`.
    fn save(&self, links: &HashSet<String>) -> Result<()>;
}

/// Snapshot store backed by a newline-delimited file.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Creates a store over the given snapshot path. The file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStateStore { path: path.into() }
    }

    /// The snapshot path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LinkStateStore for FileStateStore {
    fn load(&self) -> Result<HashSet<String>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            // First run: no snapshot yet
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read link snapshot {}", self.path.display())
                })
            }
        };

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn save(&self, links: &HashSet<String>) -> Result<()> {
        // Write to a temp file in the same directory, then rename over the
        // target: a crash mid-save leaves the previous snapshot intact.
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).with_context(|| {
            format!("failed to create temp file next to {}", self.path.display())
        })?;

        // Sorted lines keep the file deterministic; ordering is not part of
        // the snapshot contract
        let mut lines: Vec<&str> = links.iter().map(String::as_str).collect();
        lines.sort_unstable();
        for line in lines {
            writeln!(tmp, "{line}").with_context(|| {
                format!("failed to write link snapshot {}", self.path.display())
            })?;
        }
        tmp.flush()
            .with_context(|| format!("failed to flush link snapshot {}", self.path.display()))?;

        tmp.persist(&self.path).with_context(|| {
            format!("failed to replace link snapshot {}", self.path.display())
        })?;

        Ok(())
    }
}

/// In-memory snapshot store for tests and embedding.
#[derive(Default)]
pub struct MemoryStateStore {
    links: Mutex<HashSet<String>>,
}

impl MemoryStateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with a prior link set.
    pub fn with_links(links: HashSet<String>) -> Self {
        MemoryStateStore {
            links: Mutex::new(links),
        }
    }
}

impl LinkStateStore for MemoryStateStore {
    fn load(&self) -> Result<HashSet<String>> {
        let links = self
            .links
            .lock()
            .map_err(|e| anyhow!("link state lock poisoned: {e}"))?;
        Ok(links.clone())
    }

    fn save(&self, links: &HashSet<String>) -> Result<()> {
        let mut stored = self
            .links
            .lock()
            .map_err(|e| anyhow!("link state lock poisoned: {e}"))?;
        *stored = links.clone();
        Ok(())
    }
}
