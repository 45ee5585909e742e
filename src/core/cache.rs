//! core::cache
//!
//! Single-slot disk cache for divergence results.
//!
//! # Design
//!
//! The prompt runs on every shell render, so repeated graph searches on an
//! unchanged repository are wasted work. This cache persists the most
//! recent query's result as one line in `.git/prompt-cache`:
//!
//! ```text
//! <head>,<main_or_empty>,<upstream_or_empty>=<ma>,<mb>,<ua>,<ub>
//! ```
//!
//! where `-1` encodes an unknown (too far) count. The key embeds all three
//! tips, so any change to HEAD, the main reference, or the upstream
//! invalidates the record implicitly via key mismatch. There is no TTL and
//! no LRU: a new key simply overwrites the old record.
//!
//! Writes go through a temporary file followed by an atomic rename, so
//! concurrent prompt renders never observe a torn record. The cache is
//! advisory; every failure path (missing file, garbage content, failed
//! write) degrades to recomputation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::types::CommitId;

/// Minimum total commits visited before a result is worth persisting.
/// Cheap queries are recomputed faster than they are read back.
pub const CACHE_COST_THRESHOLD: usize = 10;

/// Name of the cache file inside the git directory.
const CACHE_FILE: &str = "prompt-cache";

/// A deterministic key over the three tips a prompt render depends on.
///
/// Absent references contribute empty segments, so "no upstream" and
/// "upstream at X" produce distinct keys. Matching is exact whole-string
/// equality.
///
/// # Example
///
/// ```
/// use git_prompt::core::cache::CacheKey;
/// use git_prompt::core::types::CommitId;
///
/// let head = CommitId::new("aa".repeat(20)).unwrap();
/// let key = CacheKey::new(&head, None, None);
/// assert_eq!(key.as_str(), format!("{},,", head));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from HEAD plus the optional main and upstream tips.
    pub fn new(head: &CommitId, main: Option<&CommitId>, upstream: Option<&CommitId>) -> Self {
        fn segment(id: Option<&CommitId>) -> &str {
            id.map(CommitId::as_str).unwrap_or("")
        }
        Self(format!(
            "{},{},{}",
            head.as_str(),
            segment(main),
            segment(upstream)
        ))
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Ahead/behind counts for one tracked reference. `None` on both sides
/// means the search gave up within its budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TrackedDivergence {
    pub ahead: Option<usize>,
    pub behind: Option<usize>,
}

impl TrackedDivergence {
    /// Whether a merge-base was found.
    pub fn is_known(&self) -> bool {
        self.ahead.is_some() && self.behind.is_some()
    }
}

/// The cached payload: divergence from the main reference and from the
/// upstream tracking reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachedDivergence {
    pub main: TrackedDivergence,
    pub upstream: TrackedDivergence,
}

/// Single-slot disk-backed divergence cache.
#[derive(Debug)]
pub struct DivergenceCache {
    path: PathBuf,
}

impl DivergenceCache {
    /// Create a cache rooted in the given git directory.
    pub fn in_git_dir(git_dir: &Path) -> Self {
        Self {
            path: git_dir.join(CACHE_FILE),
        }
    }

    /// Create a cache at an explicit file path.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Look up the stored record for `key`.
    ///
    /// Returns `None` on any miss: no file, unreadable file, malformed
    /// content, or key mismatch. The caller recomputes on a miss.
    pub fn lookup(&self, key: &CacheKey) -> Option<CachedDivergence> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let line = contents.lines().next()?;

        let (stored_key, values) = line.split_once('=')?;
        // Exact whole-key equality; a prefix match could alias keys whose
        // trailing segments are empty.
        if stored_key != key.as_str() {
            return None;
        }

        let fields: Vec<&str> = values.split(',').collect();
        if fields.len() != 4 {
            return None;
        }

        let mut parsed = [0i64; 4];
        for (slot, field) in parsed.iter_mut().zip(&fields) {
            *slot = field.trim().parse().ok()?;
        }

        Some(CachedDivergence {
            main: TrackedDivergence {
                ahead: decode(parsed[0]),
                behind: decode(parsed[1]),
            },
            upstream: TrackedDivergence {
                ahead: decode(parsed[2]),
                behind: decode(parsed[3]),
            },
        })
    }

    /// Persist `record` under `key` if the computation was expensive enough.
    ///
    /// `total_cost` is the combined commit-visit count of the searches that
    /// produced the record; cheap results are not worth a disk write and
    /// leave any existing record untouched. Write failures are swallowed:
    /// the prompt still renders from the freshly computed result.
    pub fn store(&self, key: &CacheKey, record: &CachedDivergence, total_cost: usize) {
        if total_cost < CACHE_COST_THRESHOLD {
            return;
        }
        // Best effort; a failed write only costs a recomputation next time.
        let _ = self.write_record(key, record);
    }

    fn write_record(&self, key: &CacheKey, record: &CachedDivergence) -> std::io::Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        writeln!(
            tmp,
            "{}={},{},{},{}",
            key.as_str(),
            encode(record.main.ahead),
            encode(record.main.behind),
            encode(record.upstream.ahead),
            encode(record.upstream.behind),
        )?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}

fn encode(value: Option<usize>) -> i64 {
    value.map(|v| v as i64).unwrap_or(-1)
}

fn decode(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}
