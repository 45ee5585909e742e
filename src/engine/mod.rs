//! engine
//!
//! Orchestrates one prompt render: gathers repository facts through the
//! git doorway, runs state detection, status classification, and the
//! cached divergence searches, and produces a [`Report`] for the ui
//! layer to format.
//!
//! # Control Flow
//!
//! 1. Resolve HEAD (an unborn HEAD renders nothing).
//! 2. Decide large-repository mode from the index file size.
//! 3. Load the index unless the repository is large; a large repository
//!    still loads it when an operation marker exists, because conflict
//!    status must be accurate during merges and rebases.
//! 4. Detect operation state, then classify the branch color.
//! 5. Compute divergence from the main reference and the upstream,
//!    consulting the single-slot cache first.
//!
//! Every stage degrades gracefully; the engine never fails once a HEAD
//! exists.

use std::time::Instant;

use serde::Serialize;

use crate::core::cache::{CacheKey, CachedDivergence, DivergenceCache, TrackedDivergence};
use crate::core::config::PromptConfig;
use crate::core::context::PromptContext;
use crate::core::divergence::{compute_divergence, SearchParams};
use crate::core::state::{detect, MARKER_TABLE};
use crate::core::status::{classify, StatusColor};
use crate::core::types::CommitId;
use crate::git::Git;
use crate::ui::output::{self, Verbosity};

/// Abbreviation length for detached-HEAD commit ids.
const SHORT_ID_LEN: usize = 7;

/// Everything the ui layer needs to format one prompt.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Branch shorthand, tag name, or abbreviated commit id.
    pub branch: String,
    /// Whether HEAD is detached.
    pub detached: bool,
    /// Branch segment color.
    pub color: StatusColor,
    /// Operation label such as `merge:conflict`, if one is in progress.
    pub state_label: Option<&'static str>,
    /// Whether the in-progress operation has conflicts.
    pub state_conflict: bool,
    /// Whether stash entries exist.
    pub stash: bool,
    /// On a branch with no upstream configured.
    pub no_upstream: bool,
    /// Divergence from the remote's default branch, when one resolves.
    pub main: Option<TrackedDivergence>,
    /// Divergence from the upstream tracking branch, when it resolves
    /// and differs from the main reference.
    pub upstream: Option<TrackedDivergence>,
}

/// Build the prompt report for an opened repository.
///
/// Returns `None` when there is nothing to render (unborn HEAD).
pub fn build_report(git: &Git, config: &PromptConfig, verbosity: Verbosity) -> Option<Report> {
    let head = match git.head_id() {
        Ok(head) => head,
        Err(err) => {
            output::debug(format_args!("no renderable HEAD: {err}"), verbosity);
            return None;
        }
    };

    let large_repo = git
        .index_file_size()
        .is_some_and(|size| size > config.large_repo_size);

    // Index load policy: skip for large repositories, unless an operation
    // is in progress and conflict status matters right now.
    let index_loaded = if !large_repo || has_any_marker(git) {
        git.index_loadable()
    } else {
        false
    };
    if large_repo {
        output::debug(
            format_args!("large repository mode (index loaded: {index_loaded})"),
            verbosity,
        );
    }

    let state = detect(git, index_loaded.then_some(git));

    let ctx = PromptContext {
        head: head.clone(),
        large_repo,
        index_loaded,
    };

    let (branch, detached) = branch_identity(git, &ctx);

    let started = Instant::now();
    let color = classify(&state, &ctx, &mut git.worktree());
    output::debug(
        format_args!("status classification: {:?} in {:.3?}", color, started.elapsed()),
        verbosity,
    );

    let tracking = if detached {
        // Detached HEAD has no tracking relationships.
        TrackingReport::default()
    } else {
        track_divergence(git, &ctx, &branch, config, verbosity)
    };

    Some(Report {
        branch,
        detached,
        color,
        state_label: state.label(),
        state_conflict: state.has_conflicts,
        stash: git.has_stash(),
        no_upstream: tracking.no_upstream,
        main: tracking.main,
        upstream: tracking.upstream,
    })
}

fn has_any_marker(git: &Git) -> bool {
    use crate::core::state::OperationMarkers;
    MARKER_TABLE.iter().any(|(_, marker)| git.has_marker(marker))
}

/// Name the current HEAD: branch shorthand, or for a detached HEAD a tag
/// pointing at it (skipped for large repositories), falling back to the
/// abbreviated commit id.
fn branch_identity(git: &Git, ctx: &PromptContext) -> (String, bool) {
    if let Some(branch) = git.current_branch() {
        return (branch, false);
    }

    let name = if ctx.large_repo {
        None
    } else {
        git.tag_at(&ctx.head)
    };
    let name = name.unwrap_or_else(|| ctx.head.short(SHORT_ID_LEN).to_string());
    (name, true)
}

#[derive(Debug, Default)]
struct TrackingReport {
    no_upstream: bool,
    main: Option<TrackedDivergence>,
    upstream: Option<TrackedDivergence>,
}

/// Resolve the two tracked references and compute (or recall) divergence
/// from each.
fn track_divergence(
    git: &Git,
    ctx: &PromptContext,
    branch: &str,
    config: &PromptConfig,
    verbosity: Verbosity,
) -> TrackingReport {
    let remote = git.branch_remote(branch);
    let main_id = git
        .remote_default_branch(&remote)
        .and_then(|refname| git.resolve_commit(&refname));

    let upstream_ref = git.upstream_ref(branch);
    let upstream_id = upstream_ref
        .as_deref()
        .and_then(|refname| git.resolve_commit(refname));

    // When the upstream sits at the same tip as the main reference, one
    // indicator covers both.
    let upstream_is_main = match (&upstream_id, &main_id) {
        (Some(upstream), Some(main)) => upstream == main,
        _ => false,
    };

    let key = CacheKey::new(&ctx.head, main_id.as_ref(), upstream_id.as_ref());
    let cache = DivergenceCache::in_git_dir(git.git_dir());

    let record = match cache.lookup(&key) {
        Some(record) => {
            output::debug(format_args!("divergence cache hit"), verbosity);
            record
        }
        None => {
            let started = Instant::now();
            // Skip the upstream search when it would duplicate the main one.
            let upstream_target = if upstream_is_main {
                None
            } else {
                upstream_id.as_ref()
            };
            let params = SearchParams::with_max_steps(config.max_traversal);
            let record =
                compute_and_store(git, ctx, &cache, &key, main_id.as_ref(), upstream_target, &params);
            output::debug(
                format_args!("divergence computed in {:.3?}", started.elapsed()),
                verbosity,
            );
            record
        }
    };

    TrackingReport {
        no_upstream: upstream_ref.is_none(),
        main: main_id.map(|_| record.main),
        upstream: (upstream_id.is_some() && !upstream_is_main).then_some(record.upstream),
    }
}

/// Run the up-to-two divergence searches and persist the result when it
/// was expensive enough to be worth caching.
fn compute_and_store(
    git: &Git,
    ctx: &PromptContext,
    cache: &DivergenceCache,
    key: &CacheKey,
    main_id: Option<&CommitId>,
    upstream_id: Option<&CommitId>,
    params: &SearchParams,
) -> CachedDivergence {
    let mut record = CachedDivergence::default();
    let mut total_cost = 0;

    if let Some(main_id) = main_id {
        let result = compute_divergence(git, &ctx.head, main_id, params);
        record.main = TrackedDivergence {
            ahead: result.ahead,
            behind: result.behind,
        };
        total_cost += result.commits_visited;
    }

    if let Some(upstream_id) = upstream_id {
        let result = compute_divergence(git, &ctx.head, upstream_id, params);
        record.upstream = TrackedDivergence {
            ahead: result.ahead,
            behind: result.behind,
        };
        total_cost += result.commits_visited;
    }

    cache.store(key, &record, total_cost);
    record
}
