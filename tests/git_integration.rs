//! Integration tests for the Git interface and the core logic on top of it.
//!
//! These tests use real git repositories created via tempfile to verify
//! that the Git interface works correctly with actual git operations.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use git_prompt::core::cache::{CacheKey, CachedDivergence, DivergenceCache, TrackedDivergence};
use git_prompt::core::config::PromptConfig;
use git_prompt::core::divergence::{compute_divergence, CommitGraph, SearchParams};
use git_prompt::core::state::{detect, Operation, OperationMarkers};
use git_prompt::core::status::WorktreeFacts;
use git_prompt::core::types::CommitId;
use git_prompt::engine::build_report;
use git_prompt::git::{Git, GitError};
use git_prompt::ui::output::Verbosity;

/// Test fixture that creates a real git repository.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new test repository with an initial commit on `main`.
    fn new() -> Self {
        let repo = Self::empty();
        repo.commit_file("README.md", "# Test Repo\n", "Initial commit");
        repo
    }

    /// Create a test repository with no commits (unborn HEAD).
    fn empty() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "--initial-branch=main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"]);

        Self { dir }
    }

    /// Get the path to the repository.
    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open a Git interface to this repository.
    fn git(&self) -> Git {
        Git::open(self.path()).expect("failed to open test repo")
    }

    /// Create a file and commit it, returning the new commit id.
    fn commit_file(&self, path: &str, content: &str, message: &str) -> CommitId {
        std::fs::write(self.path().join(path), content).unwrap();
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-m", message]);

        self.git().head_id().unwrap()
    }

    /// Checkout a branch or commit.
    fn checkout(&self, name: &str) {
        run_git(self.path(), &["checkout", name]);
    }

    /// Get HEAD id using git directly.
    fn head_id_raw(&self) -> String {
        let output = Command::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(self.path())
            .output()
            .expect("git rev-parse failed");
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    /// Set up a bare "origin" with the current branch pushed, tracked, and
    /// registered as the remote default. Returns the remote's directory so
    /// it outlives the test.
    fn with_origin(&self) -> TempDir {
        let remote = TempDir::new().expect("failed to create remote dir");
        run_git(remote.path(), &["init", "--bare", "--initial-branch=main"]);

        let url = remote.path().to_str().unwrap().to_string();
        run_git(self.path(), &["remote", "add", "origin", &url]);
        run_git(self.path(), &["push", "-u", "origin", "main"]);
        run_git(self.path(), &["remote", "set-head", "origin", "main"]);
        remote
    }

    /// Start a merge of `branch` that is expected to stop with conflicts.
    fn merge_with_conflicts(&self, branch: &str) {
        let status = Command::new("git")
            .args(["merge", branch])
            .current_dir(self.path())
            .output()
            .expect("git merge failed to run")
            .status;
        assert!(!status.success(), "merge unexpectedly succeeded");
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

// =============================================================================
// Repository Opening Tests
// =============================================================================

#[test]
fn open_valid_repository() {
    let repo = TestRepo::new();
    assert!(Git::open(repo.path()).is_ok());
}

#[test]
fn open_from_subdirectory() {
    let repo = TestRepo::new();
    let subdir = repo.path().join("subdir");
    std::fs::create_dir(&subdir).unwrap();

    assert!(Git::open(&subdir).is_ok());
}

#[test]
fn open_non_repository_fails() {
    let dir = TempDir::new().unwrap();
    let git = Git::open(dir.path());
    assert!(matches!(git, Err(GitError::NotARepo { .. })));
}

// =============================================================================
// HEAD and Ref Resolution Tests
// =============================================================================

#[test]
fn head_id_matches_rev_parse() {
    let repo = TestRepo::new();
    let head = repo.git().head_id().unwrap();
    assert_eq!(head.as_str(), repo.head_id_raw());
}

#[test]
fn unborn_head_is_ref_not_found() {
    let repo = TestRepo::empty();
    let result = repo.git().head_id();
    assert!(matches!(result, Err(GitError::RefNotFound { .. })));
}

#[test]
fn current_branch_on_a_branch() {
    let repo = TestRepo::new();
    assert_eq!(repo.git().current_branch(), Some("main".to_string()));
}

#[test]
fn current_branch_none_when_detached() {
    let repo = TestRepo::new();
    let head = repo.head_id_raw();
    repo.checkout(&head);

    assert_eq!(repo.git().current_branch(), None);
}

#[test]
fn resolve_commit_peels_branch_ref() {
    let repo = TestRepo::new();
    let git = repo.git();

    let resolved = git.resolve_commit("refs/heads/main").unwrap();
    assert_eq!(resolved, git.head_id().unwrap());
    assert_eq!(git.resolve_commit("refs/heads/nope"), None);
}

#[test]
fn stash_detection() {
    let repo = TestRepo::new();
    assert!(!repo.git().has_stash());

    std::fs::write(repo.path().join("README.md"), "changed\n").unwrap();
    run_git(repo.path(), &["stash"]);

    assert!(repo.git().has_stash());
}

#[test]
fn tag_at_detached_head() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["tag", "v1.0"]);
    let head = repo.git().head_id().unwrap();

    assert_eq!(repo.git().tag_at(&head), Some("v1.0".to_string()));

    let untagged = repo.commit_file("next.txt", "x\n", "Next");
    assert_eq!(repo.git().tag_at(&untagged), None);
}

#[test]
fn index_file_size_after_commit() {
    let repo = TestRepo::new();
    let git = repo.git();

    let size = git.index_file_size().expect("index should exist");
    assert!(size > 0);
    assert!(git.index_loadable());
}

// =============================================================================
// Commit Graph Tests
// =============================================================================

#[test]
fn parents_follow_history() {
    let repo = TestRepo::new();
    let first = repo.git().head_id().unwrap();
    let second = repo.commit_file("a.txt", "a\n", "Second");

    let git = repo.git();
    assert_eq!(git.parents(&second), vec![first.clone()]);
    assert_eq!(git.parents(&first), Vec::<CommitId>::new());
}

#[test]
fn parents_of_missing_commit_are_empty() {
    let repo = TestRepo::new();
    let ghost = CommitId::new("ab".repeat(20)).unwrap();
    assert!(repo.git().parents(&ghost).is_empty());
}

// =============================================================================
// Divergence Against Real Repositories
// =============================================================================

#[test]
fn feature_branch_ahead_of_main() {
    let repo = TestRepo::new();
    let main_tip = repo.git().head_id().unwrap();

    run_git(repo.path(), &["checkout", "-b", "feature"]);
    repo.commit_file("f1.txt", "1\n", "Feature 1");
    let feature_tip = repo.commit_file("f2.txt", "2\n", "Feature 2");

    let git = repo.git();
    let result = compute_divergence(&git, &feature_tip, &main_tip, &SearchParams::default());
    assert_eq!(result.ahead, Some(2));
    assert_eq!(result.behind, Some(0));
}

#[test]
fn diverged_branches_report_both_counts() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["checkout", "-b", "feature"]);
    repo.commit_file("f1.txt", "1\n", "Feature 1");
    let feature_tip = repo.commit_file("f2.txt", "2\n", "Feature 2");

    repo.checkout("main");
    let main_tip = repo.commit_file("m1.txt", "m\n", "Main 1");

    let git = repo.git();
    let result = compute_divergence(&git, &feature_tip, &main_tip, &SearchParams::default());
    assert_eq!(result.ahead, Some(2));
    assert_eq!(result.behind, Some(1));
}

#[test]
fn tiny_budget_gives_up_on_real_history() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["checkout", "-b", "feature"]);
    for i in 0..5 {
        repo.commit_file(&format!("f{i}.txt"), "x\n", "Feature");
    }
    let feature_tip = repo.git().head_id().unwrap();

    repo.checkout("main");
    for i in 0..5 {
        repo.commit_file(&format!("m{i}.txt"), "x\n", "Main");
    }
    let main_tip = repo.git().head_id().unwrap();

    let git = repo.git();
    let result = compute_divergence(&git, &feature_tip, &main_tip, &SearchParams::with_max_steps(1));
    assert!(!result.is_known());
}

// =============================================================================
// Operation State Tests
// =============================================================================

#[test]
fn quiet_repository_has_no_state() {
    let repo = TestRepo::new();
    let git = repo.git();
    let state = detect(&git, Some(&git));
    assert!(!state.has_state());
}

#[test]
fn merge_conflict_detected_with_label() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["checkout", "-b", "feature"]);
    repo.commit_file("shared.txt", "feature side\n", "Feature edit");
    repo.checkout("main");
    repo.commit_file("shared.txt", "main side\n", "Main edit");

    repo.merge_with_conflicts("feature");

    let git = repo.git();
    assert!(git.has_marker("MERGE_HEAD"));

    let state = detect(&git, Some(&git));
    assert_eq!(state.operation, Some(Operation::Merge));
    assert!(state.has_conflicts);
    assert_eq!(state.label(), Some("merge:conflict"));
}

// =============================================================================
// Worktree Fact Tests
// =============================================================================

#[test]
fn clean_worktree_reports_no_facts() {
    let repo = TestRepo::new();
    let git = repo.git();
    let mut facts = git.worktree();

    assert!(!facts.has_unstaged_changes());
    assert!(!facts.has_staged_changes(false));
    assert!(!facts.has_untracked_files());
}

#[test]
fn modified_tracked_file_is_unstaged_only() {
    let repo = TestRepo::new();
    std::fs::write(repo.path().join("README.md"), "edited\n").unwrap();

    let git = repo.git();
    let mut facts = git.worktree();
    assert!(facts.has_unstaged_changes());
    assert!(!facts.has_staged_changes(false));
    assert!(!facts.has_untracked_files());
}

#[test]
fn staged_file_is_staged_only() {
    let repo = TestRepo::new();
    std::fs::write(repo.path().join("new.txt"), "staged\n").unwrap();
    run_git(repo.path(), &["add", "new.txt"]);

    let git = repo.git();
    let mut facts = git.worktree();
    assert!(!facts.has_unstaged_changes());
    assert!(facts.has_staged_changes(false));
}

#[test]
fn untracked_file_is_untracked_only() {
    let repo = TestRepo::new();
    std::fs::write(repo.path().join("scratch.txt"), "hi\n").unwrap();

    let git = repo.git();
    let mut facts = git.worktree();
    assert!(!facts.has_unstaged_changes());
    assert!(!facts.has_staged_changes(false));
    assert!(facts.has_untracked_files());
}

// =============================================================================
// Tracking Reference Tests
// =============================================================================

#[test]
fn no_remote_means_no_upstream() {
    let repo = TestRepo::new();
    let git = repo.git();

    assert_eq!(git.upstream_ref("main"), None);
    assert_eq!(git.branch_remote("main"), "origin");
    assert_eq!(git.remote_default_branch("origin"), None);
}

#[test]
fn origin_provides_upstream_and_default_branch() {
    let repo = TestRepo::new();
    let _remote = repo.with_origin();
    let git = repo.git();

    assert_eq!(
        git.upstream_ref("main"),
        Some("refs/remotes/origin/main".to_string())
    );
    assert_eq!(git.branch_remote("main"), "origin");
    assert_eq!(
        git.remote_default_branch("origin"),
        Some("refs/remotes/origin/main".to_string())
    );
    assert_eq!(
        git.resolve_commit("refs/remotes/origin/main"),
        Some(git.head_id().unwrap())
    );
}

// =============================================================================
// Cache-in-Repository Tests
// =============================================================================

#[test]
fn cache_lives_in_git_dir() {
    let repo = TestRepo::new();
    let git = repo.git();
    let head = git.head_id().unwrap();

    let cache = DivergenceCache::in_git_dir(git.git_dir());
    let key = CacheKey::new(&head, None, None);
    let record = CachedDivergence {
        main: TrackedDivergence {
            ahead: Some(4),
            behind: Some(0),
        },
        upstream: TrackedDivergence::default(),
    };

    cache.store(&key, &record, 100);
    assert!(git.git_dir().join("prompt-cache").exists());
    assert_eq!(cache.lookup(&key), Some(record));
}

// =============================================================================
// Engine Report Tests
// =============================================================================

#[test]
fn report_for_clean_branch() {
    let repo = TestRepo::new();
    let git = repo.git();

    let report = build_report(&git, &PromptConfig::default(), Verbosity::Normal)
        .expect("repo with a commit should render");

    assert_eq!(report.branch, "main");
    assert!(!report.detached);
    assert_eq!(report.state_label, None);
    assert!(report.no_upstream);
    assert_eq!(report.main, None);
    assert_eq!(report.upstream, None);
}

#[test]
fn report_for_unborn_head_is_none() {
    let repo = TestRepo::empty();
    let git = repo.git();

    assert!(build_report(&git, &PromptConfig::default(), Verbosity::Normal).is_none());
}

#[test]
fn report_for_detached_head_uses_short_id() {
    let repo = TestRepo::new();
    let head = repo.head_id_raw();
    repo.checkout(&head);

    let git = repo.git();
    let report = build_report(&git, &PromptConfig::default(), Verbosity::Normal).unwrap();

    assert!(report.detached);
    assert_eq!(report.branch, head[..7].to_string());
}

#[test]
fn report_for_detached_head_prefers_tag() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["tag", "v2.0"]);
    let head = repo.head_id_raw();
    repo.checkout(&head);

    let git = repo.git();
    let report = build_report(&git, &PromptConfig::default(), Verbosity::Normal).unwrap();

    assert!(report.detached);
    assert_eq!(report.branch, "v2.0");
}

#[test]
fn report_tracks_upstream_in_sync() {
    let repo = TestRepo::new();
    let _remote = repo.with_origin();
    let git = repo.git();

    let report = build_report(&git, &PromptConfig::default(), Verbosity::Normal).unwrap();

    assert!(!report.no_upstream);
    // Upstream sits at the same tip as the main reference, so only the
    // main indicator is reported.
    assert_eq!(
        report.main,
        Some(TrackedDivergence {
            ahead: Some(0),
            behind: Some(0),
        })
    );
    assert_eq!(report.upstream, None);
}

#[test]
fn report_counts_unpushed_commits() {
    let repo = TestRepo::new();
    let _remote = repo.with_origin();
    repo.commit_file("local.txt", "x\n", "Local only");

    let git = repo.git();
    let report = build_report(&git, &PromptConfig::default(), Verbosity::Normal).unwrap();

    assert_eq!(
        report.main,
        Some(TrackedDivergence {
            ahead: Some(1),
            behind: Some(0),
        })
    );
}
