//! core::status
//!
//! Priority-ordered classification of repository status into a single
//! display color.
//!
//! # Design
//!
//! Classification is a strict priority chain: the first matching rule
//! wins. The order is an explicit table ([`CLASSIFICATION_PRIORITY`])
//! rather than control flow, so tests can enumerate and assert it.
//!
//! Working-tree facts are expensive (they stat files and diff trees), so
//! they are supplied through the lazy [`WorktreeFacts`] trait and only
//! computed when a rule actually needs them. Rules above the
//! large-repository fallback never touch the working tree at all.

use super::context::PromptContext;
use super::state::GitState;

/// The display color for the branch segment of the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusColor {
    /// No changes, nothing staged.
    Clean,
    /// Untracked files only (informational).
    UntrackedOnly,
    /// Staged changes ready to commit.
    Staged,
    /// Unstaged modifications to tracked files.
    Modified,
    /// Unresolved merge conflicts.
    Conflict,
    /// A merge/rebase/cherry-pick/revert is in progress, no conflicts.
    OperationInProgress,
    /// Large repository; status checks skipped for latency.
    LargeRepoFallback,
}

/// Lazily evaluated working-tree and index facts.
///
/// Each method may be expensive; the classifier calls them at most once
/// and only when no higher-priority rule has already matched.
pub trait WorktreeFacts {
    /// Any tracked, non-submodule, fully-merged file whose on-disk state
    /// disagrees with the index after a stat refresh.
    fn has_unstaged_changes(&mut self) -> bool;

    /// Whether the index differs from HEAD's tree.
    ///
    /// Must report true unconditionally when `conflicts_present`: unmerged
    /// entries always mean there is something to resolve and commit, and a
    /// tree comparison can spuriously match HEAD in their presence. When
    /// HEAD cannot be parsed the answer is conservatively false.
    fn has_staged_changes(&mut self, conflicts_present: bool) -> bool;

    /// Any path outside ignore rules that is not tracked.
    fn has_untracked_files(&mut self) -> bool;
}

/// One rule in the classification chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRule {
    /// Index loaded and unmerged entries present.
    Conflicts,
    /// Any operation in progress (without conflicts).
    OperationInProgress,
    /// Repository over the size threshold; skip working-tree checks.
    LargeRepo,
    /// Index unreadable; report clean rather than guess.
    IndexUnreadable,
    /// Tracked files modified but not staged.
    UnstagedChanges,
    /// Index differs from HEAD.
    StagedChanges,
    /// Untracked files present, nothing else.
    UntrackedFiles,
    /// Nothing matched.
    Clean,
}

impl StatusRule {
    /// The color this rule classifies to.
    pub fn color(&self) -> StatusColor {
        match self {
            StatusRule::Conflicts => StatusColor::Conflict,
            StatusRule::OperationInProgress => StatusColor::OperationInProgress,
            StatusRule::LargeRepo => StatusColor::LargeRepoFallback,
            StatusRule::IndexUnreadable => StatusColor::Clean,
            StatusRule::UnstagedChanges => StatusColor::Modified,
            StatusRule::StagedChanges => StatusColor::Staged,
            StatusRule::UntrackedFiles => StatusColor::UntrackedOnly,
            StatusRule::Clean => StatusColor::Clean,
        }
    }

    fn applies(
        &self,
        state: &GitState,
        ctx: &PromptContext,
        facts: &mut impl WorktreeFacts,
    ) -> bool {
        match self {
            StatusRule::Conflicts => ctx.index_loaded && state.has_conflicts,
            StatusRule::OperationInProgress => state.has_state(),
            StatusRule::LargeRepo => ctx.large_repo,
            StatusRule::IndexUnreadable => !ctx.index_loaded,
            StatusRule::UnstagedChanges => facts.has_unstaged_changes(),
            StatusRule::StagedChanges => facts.has_staged_changes(state.has_conflicts),
            StatusRule::UntrackedFiles => facts.has_untracked_files(),
            StatusRule::Clean => true,
        }
    }
}

/// The classification chain, highest priority first.
///
/// Conflicts dominate everything; an in-progress operation beats all
/// working-tree signals; the large-repository fallback and the unreadable
/// index guard cut off the expensive checks below them.
pub const CLASSIFICATION_PRIORITY: [StatusRule; 8] = [
    StatusRule::Conflicts,
    StatusRule::OperationInProgress,
    StatusRule::LargeRepo,
    StatusRule::IndexUnreadable,
    StatusRule::UnstagedChanges,
    StatusRule::StagedChanges,
    StatusRule::UntrackedFiles,
    StatusRule::Clean,
];

/// Classify the repository into a single status color.
///
/// Walks [`CLASSIFICATION_PRIORITY`] and returns the color of the first
/// matching rule. Working-tree facts below a matched rule are never
/// evaluated.
pub fn classify(
    state: &GitState,
    ctx: &PromptContext,
    facts: &mut impl WorktreeFacts,
) -> StatusColor {
    for rule in CLASSIFICATION_PRIORITY {
        if rule.applies(state, ctx, facts) {
            return rule.color();
        }
    }
    // The Clean rule always applies.
    StatusColor::Clean
}
