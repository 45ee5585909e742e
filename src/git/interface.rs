//! git::interface
//!
//! Git interface implementation using git2.
//!
//! The [`Git`] struct is the only way the rest of the crate interacts
//! with a repository. It implements the narrow traits the core consumes
//! ([`CommitGraph`], [`OperationMarkers`], [`IndexInspector`]) and hands
//! out a [`WorktreeInspector`] for the lazy status facts.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants, but most read paths
//! here deliberately return `Option` or a conservative default: a prompt
//! render must degrade, not fail. Only repository opening and HEAD
//! resolution surface errors, because without them there is nothing to
//! render at all.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::divergence::CommitGraph;
use crate::core::state::{IndexInspector, OperationMarkers};
use crate::core::status::WorktreeFacts;
use crate::core::types::{CommitId, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Requested ref does not exist (including an unborn HEAD).
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object id failed validation.
    #[error("invalid commit id: {message}")]
    InvalidCommitId {
        /// Description of the problem
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with the ref being resolved.
    fn from_git2(err: git2::Error, refname: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::UnbornBranch => GitError::RefNotFound {
                refname: refname.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", refname, err.message()),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        GitError::InvalidCommitId {
            message: err.to_string(),
        }
    }
}

/// The Git interface.
///
/// All repository reads flow through this struct. No other module
/// imports `git2`.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        Ok(Self { repo })
    }

    /// Path to the `.git` directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Size of the index file in bytes, if it exists.
    ///
    /// This is the input to the large-repository threshold: a single
    /// stat call, safe at any repository size.
    pub fn index_file_size(&self) -> Option<u64> {
        std::fs::metadata(self.repo.path().join("index"))
            .ok()
            .map(|meta| meta.len())
    }

    /// Whether the index can be loaded.
    pub fn index_loadable(&self) -> bool {
        self.repo.index().is_ok()
    }

    // =========================================================================
    // Ref Resolution
    // =========================================================================

    /// Get the commit HEAD points at.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if HEAD is unborn (new repository)
    pub fn head_id(&self) -> Result<CommitId, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        let oid = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?
            .id();

        CommitId::new(oid.to_string()).map_err(|e| e.into())
    }

    /// Get the current branch shorthand, if HEAD is on a branch.
    ///
    /// Returns `None` when HEAD is detached or unborn.
    pub fn current_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        if head.is_branch() {
            head.shorthand().map(str::to_string)
        } else {
            None
        }
    }

    /// Resolve a ref to the commit it points at, peeling tags.
    ///
    /// Returns `None` for missing refs and non-commit targets.
    pub fn resolve_commit(&self, refname: &str) -> Option<CommitId> {
        let commit = self
            .repo
            .find_reference(refname)
            .ok()?
            .peel_to_commit()
            .ok()?;
        CommitId::new(commit.id().to_string()).ok()
    }

    /// Check if a ref exists.
    pub fn ref_exists(&self, refname: &str) -> bool {
        self.repo.find_reference(refname).is_ok()
    }

    /// Whether any stash entries exist.
    pub fn has_stash(&self) -> bool {
        self.ref_exists("refs/stash")
    }

    // =========================================================================
    // Tracking References
    // =========================================================================

    /// Full ref name of the upstream tracking branch for a local branch,
    /// e.g. `refs/remotes/origin/feature`.
    pub fn upstream_ref(&self, branch: &str) -> Option<String> {
        let refname = format!("refs/heads/{branch}");
        let buf = self.repo.branch_upstream_name(&refname).ok()?;
        buf.as_str().map(str::to_string)
    }

    /// The remote a branch pushes to, falling back to `origin` when none
    /// is configured.
    pub fn branch_remote(&self, branch: &str) -> String {
        let refname = format!("refs/heads/{branch}");
        self.repo
            .branch_upstream_remote(&refname)
            .ok()
            .and_then(|buf| buf.as_str().map(str::to_string))
            .unwrap_or_else(|| "origin".to_string())
    }

    /// Full ref name of the remote's default branch, resolved through the
    /// `refs/remotes/<remote>/HEAD` symbolic ref.
    ///
    /// Returns `None` when the symref is absent or not symbolic, in which
    /// case divergence from the main reference is skipped.
    pub fn remote_default_branch(&self, remote: &str) -> Option<String> {
        let head_ref = format!("refs/remotes/{remote}/HEAD");
        let reference = self.repo.find_reference(&head_ref).ok()?;
        reference.symbolic_target().map(str::to_string)
    }

    /// A tag pointing at the given commit, if any.
    ///
    /// Used as a friendlier name for a detached HEAD. Peels annotated
    /// tags to their target commit.
    pub fn tag_at(&self, id: &CommitId) -> Option<String> {
        let target = git2::Oid::from_str(id.as_str()).ok()?;
        let refs = self.repo.references_glob("refs/tags/*").ok()?;

        for reference in refs.flatten() {
            let points_here = reference
                .peel_to_commit()
                .map(|commit| commit.id() == target)
                .unwrap_or(false);
            if points_here {
                if let Some(name) = reference.shorthand() {
                    return Some(name.to_string());
                }
            }
        }
        None
    }

    /// Borrow a lazy provider of working-tree status facts.
    pub fn worktree(&self) -> WorktreeInspector<'_> {
        WorktreeInspector { git: self }
    }
}

// =============================================================================
// Core Trait Implementations
// =============================================================================

impl CommitGraph for Git {
    /// Parent ids of a commit, or an empty list when the object is
    /// missing or unparsable (that branch of the search dead-ends).
    fn parents(&self, id: &CommitId) -> Vec<CommitId> {
        let oid = match git2::Oid::from_str(id.as_str()) {
            Ok(oid) => oid,
            Err(_) => return Vec::new(),
        };
        let commit = match self.repo.find_commit(oid) {
            Ok(commit) => commit,
            Err(_) => return Vec::new(),
        };

        commit
            .parent_ids()
            .filter_map(|parent| CommitId::new(parent.to_string()).ok())
            .collect()
    }
}

impl OperationMarkers for Git {
    /// Marker files/directories live directly in the git directory
    /// (`MERGE_HEAD`, `rebase-merge`, ...).
    fn has_marker(&self, name: &str) -> bool {
        self.repo.path().join(name).exists()
    }
}

impl IndexInspector for Git {
    fn has_unmerged_entries(&self) -> bool {
        self.repo
            .index()
            .map(|index| index.has_conflicts())
            .unwrap_or(false)
    }
}

/// Lazy working-tree fact provider backed by a repository.
///
/// Each method runs at most one status or diff pass and answers
/// conservatively on error. The classifier calls these only when no
/// higher-priority rule matched, so the expensive scans are skipped for
/// large repositories and during operations.
pub struct WorktreeInspector<'a> {
    git: &'a Git,
}

impl WorktreeInspector<'_> {
    /// Status scan for tracked-file changes, refreshing cached stat data.
    fn tracked_statuses(&self) -> Option<git2::Statuses<'_>> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(false)
            .include_ignored(false)
            .exclude_submodules(true);
        self.git.repo.statuses(Some(&mut opts)).ok()
    }
}

impl WorktreeFacts for WorktreeInspector<'_> {
    fn has_unstaged_changes(&mut self) -> bool {
        let statuses = match self.tracked_statuses() {
            Some(statuses) => statuses,
            None => return false,
        };

        statuses.iter().any(|entry| {
            let status = entry.status();
            // Unmerged entries are the conflict rule's business.
            !status.is_conflicted()
                && (status.is_wt_modified()
                    || status.is_wt_deleted()
                    || status.is_wt_renamed()
                    || status.is_wt_typechange())
        })
    }

    fn has_staged_changes(&mut self, conflicts_present: bool) -> bool {
        // Unmerged entries always count as staged work, and the tree
        // comparison below can spuriously match HEAD while they exist, so
        // this check comes first.
        if conflicts_present {
            return true;
        }

        // Compare the tree the index would produce against HEAD's tree.
        // An unparsable HEAD conservatively reports no staged changes.
        let head_tree = match self.git.repo.head().and_then(|head| head.peel_to_tree()) {
            Ok(tree) => tree,
            Err(_) => return false,
        };

        match self
            .git
            .repo
            .diff_tree_to_index(Some(&head_tree), None, None)
        {
            Ok(diff) => diff.deltas().len() > 0,
            Err(_) => false,
        }
    }

    fn has_untracked_files(&mut self) -> bool {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .include_ignored(false)
            .exclude_submodules(true);

        match self.git.repo.statuses(Some(&mut opts)) {
            Ok(statuses) => statuses.iter().any(|entry| entry.status().is_wt_new()),
            Err(_) => false,
        }
    }
}
