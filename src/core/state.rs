//! core::state
//!
//! Detection of in-progress git operations (rebase, merge, cherry-pick,
//! revert) and their conflict status.
//!
//! # Design
//!
//! Detection is a pure function over on-disk markers: each invocation
//! reconstructs the answer, with no state machine across calls. The marker
//! priority is an explicit ordered table ([`MARKER_TABLE`]) so tests can
//! enumerate and assert the order directly. The first marker found wins;
//! operations are mutually exclusive in a well-formed repository.
//!
//! Conflict detection requires the index. When the index was not loaded
//! (the large-repository path with no active operation), the state falls
//! back to the "continue" labeling. Conflicts can be under-reported in
//! that case; this is a known accuracy trade-off, not a bug.

/// An in-progress repository operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Interactive or merge-backend rebase (`rebase-merge` directory).
    RebaseMerge,
    /// Apply-backend rebase (`rebase-apply` directory).
    RebaseApply,
    /// Merge (`MERGE_HEAD` file).
    Merge,
    /// Cherry-pick (`CHERRY_PICK_HEAD` file).
    CherryPick,
    /// Revert (`REVERT_HEAD` file).
    Revert,
}

impl Operation {
    /// Prompt label for this operation, e.g. `merge:conflict` or
    /// `rebase:continue`.
    pub fn label(&self, has_conflicts: bool) -> &'static str {
        match (self, has_conflicts) {
            (Operation::RebaseMerge | Operation::RebaseApply, true) => "rebase:conflict",
            (Operation::RebaseMerge | Operation::RebaseApply, false) => "rebase:continue",
            (Operation::Merge, true) => "merge:conflict",
            (Operation::Merge, false) => "merge:commit",
            (Operation::CherryPick, true) => "cherrypick:conflict",
            (Operation::CherryPick, false) => "cherrypick:commit",
            (Operation::Revert, true) => "revert:conflict",
            (Operation::Revert, false) => "revert:commit",
        }
    }
}

/// Ordered operation markers, highest priority first.
///
/// Marker names are paths relative to the git directory. Detection walks
/// this table in order and stops at the first hit.
pub const MARKER_TABLE: [(Operation, &str); 5] = [
    (Operation::RebaseMerge, "rebase-merge"),
    (Operation::RebaseApply, "rebase-apply"),
    (Operation::Merge, "MERGE_HEAD"),
    (Operation::CherryPick, "CHERRY_PICK_HEAD"),
    (Operation::Revert, "REVERT_HEAD"),
];

/// Existence checks for operation marker files.
///
/// Implemented by the git doorway; tests substitute an in-memory set.
pub trait OperationMarkers {
    /// Whether the named marker exists in the git directory.
    fn has_marker(&self, name: &str) -> bool;
}

/// Conflict inspection over a loaded index.
pub trait IndexInspector {
    /// Whether any index entry sits at a non-zero merge stage.
    fn has_unmerged_entries(&self) -> bool;
}

/// Detected operation state for one prompt render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct GitState {
    /// The operation in progress, if any.
    pub operation: Option<Operation>,
    /// Whether unmerged index entries exist. Always false when no
    /// operation is in progress or the index was not loaded.
    pub has_conflicts: bool,
}

impl GitState {
    /// Whether any operation is in progress.
    pub fn has_state(&self) -> bool {
        self.operation.is_some()
    }

    /// Prompt label for the current state, if an operation is in progress.
    pub fn label(&self) -> Option<&'static str> {
        self.operation.map(|op| op.label(self.has_conflicts))
    }
}

/// Detect the current operation state from on-disk markers.
///
/// Walks [`MARKER_TABLE`] in priority order. When a marker is found and an
/// index is available, the conflict flag comes from scanning for unmerged
/// entries; without an index the "continue" variant is assumed.
///
/// # Example
///
/// ```
/// use std::collections::HashSet;
/// use git_prompt::core::state::{detect, GitState, IndexInspector, Operation, OperationMarkers};
///
/// struct Markers(HashSet<&'static str>);
/// impl OperationMarkers for Markers {
///     fn has_marker(&self, name: &str) -> bool {
///         self.0.contains(name)
///     }
/// }
/// struct NoConflicts;
/// impl IndexInspector for NoConflicts {
///     fn has_unmerged_entries(&self) -> bool {
///         false
///     }
/// }
///
/// let markers = Markers(HashSet::from(["MERGE_HEAD"]));
/// let state = detect(&markers, Some(&NoConflicts));
/// assert_eq!(state.operation, Some(Operation::Merge));
/// assert_eq!(state.label(), Some("merge:commit"));
/// ```
pub fn detect<M, I>(markers: &M, index: Option<&I>) -> GitState
where
    M: OperationMarkers,
    I: IndexInspector,
{
    for (operation, marker) in MARKER_TABLE {
        if markers.has_marker(marker) {
            let has_conflicts = index.map(IndexInspector::has_unmerged_entries).unwrap_or(false);
            return GitState {
                operation: Some(operation),
                has_conflicts,
            };
        }
    }

    GitState::default()
}
