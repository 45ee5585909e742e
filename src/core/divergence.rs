//! core::divergence
//!
//! Budget-bounded bidirectional BFS over the commit graph.
//!
//! # Architecture
//!
//! Two independent searches run interleaved, one rooted at each tip, each
//! with its own step budget and bounded queue. A shared map records how far
//! every visited commit is from each side. The first commit known to both
//! sides is the merge-base, and its pair of distances is the ahead/behind
//! divergence.
//!
//! The graph itself is abstracted behind [`CommitGraph`] so the search can
//! run against a real repository or an in-memory fixture.
//!
//! # Invariants
//!
//! - Distances never decrease once set: BFS visits nodes in non-decreasing
//!   distance order, so the first write is always minimal.
//! - The search always terminates: each side expands at most `max_steps`
//!   nodes, and queue capacity is fixed.
//! - Overflow and exhaustion are reported as an unknown result, never as
//!   an error.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use super::types::CommitId;

/// Default per-side traversal budget.
pub const DEFAULT_MAX_TRAVERSAL: usize = 1000;

/// Default per-side queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 2048;

/// Read access to the commit graph.
///
/// Implemented by the git doorway for real repositories, and by test
/// fixtures for synthetic histories.
pub trait CommitGraph {
    /// Parent ids of `id`.
    ///
    /// Unreadable or unparsable commits return an empty list; that branch
    /// of the search simply dead-ends rather than erroring.
    fn parents(&self, id: &CommitId) -> Vec<CommitId>;
}

/// Tunable parameters for a divergence search.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// Maximum node expansions per side.
    pub max_steps: usize,
    /// Queue capacity per side. Overflow ends the search with an
    /// unknown result.
    pub queue_capacity: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_TRAVERSAL,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl SearchParams {
    /// Create parameters with a custom step budget and the default queue
    /// capacity.
    pub fn with_max_steps(max_steps: usize) -> Self {
        Self {
            max_steps,
            ..Self::default()
        }
    }
}

/// Result of a divergence search between two commits.
///
/// `ahead` counts commits reachable from the start tip but not the target,
/// `behind` the converse. Both are `None` together when no common ancestor
/// was found within the traversal budget; that means "too far to determine
/// cheaply", not necessarily "unrelated".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivergenceResult {
    /// Commits on the start side only, up to the merge-base.
    pub ahead: Option<usize>,
    /// Commits on the target side only, up to the merge-base.
    pub behind: Option<usize>,
    /// Total commits dequeued. Reported even when the search fails, so
    /// callers can decide whether the result is worth caching.
    pub commits_visited: usize,
}

impl DivergenceResult {
    fn unknown(commits_visited: usize) -> Self {
        Self {
            ahead: None,
            behind: None,
            commits_visited,
        }
    }

    fn found(ahead: usize, behind: usize, commits_visited: usize) -> Self {
        Self {
            ahead: Some(ahead),
            behind: Some(behind),
            commits_visited,
        }
    }

    /// Whether a merge-base was found within budget.
    pub fn is_known(&self) -> bool {
        self.ahead.is_some() && self.behind.is_some()
    }

    /// Whether the two tips are the same or fully merged (0 ahead, 0 behind).
    pub fn in_sync(&self) -> bool {
        self.ahead == Some(0) && self.behind == Some(0)
    }
}

/// Which side of the bidirectional search a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Start,
    Target,
}

const SIDES: [Side; 2] = [Side::Start, Side::Target];

/// Per-commit distances from each side's origin.
///
/// Created lazily on first visit from either side. A field is `None` until
/// that side reaches the commit.
#[derive(Debug, Default, Clone, Copy)]
struct DistanceRecord {
    from_start: Option<usize>,
    from_target: Option<usize>,
}

impl DistanceRecord {
    fn get(&self, side: Side) -> Option<usize> {
        match side {
            Side::Start => self.from_start,
            Side::Target => self.from_target,
        }
    }

    fn get_mut(&mut self, side: Side) -> &mut Option<usize> {
        match side {
            Side::Start => &mut self.from_start,
            Side::Target => &mut self.from_target,
        }
    }

    fn other(&self, side: Side) -> Option<usize> {
        match side {
            Side::Start => self.from_target,
            Side::Target => self.from_start,
        }
    }

    /// Both sides have reached this commit: it is an intersection point.
    fn is_intersection(&self) -> bool {
        self.from_start.is_some() && self.from_target.is_some()
    }
}

/// A queued node: a commit and its distance from this side's origin.
#[derive(Debug, Clone)]
struct SearchNode {
    id: CommitId,
    distance: usize,
}

/// A FIFO queue with a fixed capacity.
///
/// The search treats overflow as a failure ("too far"), so pushing past
/// capacity returns an error instead of growing or panicking.
#[derive(Debug)]
struct BoundedQueue {
    inner: VecDeque<SearchNode>,
    capacity: usize,
}

/// Marker returned when a push would exceed capacity.
struct QueueFull;

impl BoundedQueue {
    fn new(capacity: usize) -> Self {
        Self {
            inner: VecDeque::new(),
            capacity,
        }
    }

    fn push(&mut self, node: SearchNode) -> Result<(), QueueFull> {
        if self.inner.len() >= self.capacity {
            return Err(QueueFull);
        }
        self.inner.push_back(node);
        Ok(())
    }

    fn pop(&mut self) -> Option<SearchNode> {
        self.inner.pop_front()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// One side of the bidirectional search.
#[derive(Debug)]
struct SideState {
    queue: BoundedQueue,
    steps_remaining: usize,
}

impl SideState {
    fn new(params: &SearchParams) -> Self {
        Self {
            queue: BoundedQueue::new(params.queue_capacity),
            steps_remaining: params.max_steps,
        }
    }
}

/// Compute how far two commits have diverged.
///
/// Runs an interleaved bidirectional BFS from `start` and `target` toward
/// their ancestors. Each round processes at most one node from each side,
/// keeping both searches at matched depth so the reported counts reflect
/// the nearest merge-base rather than an artifact of search order.
///
/// Returns the divergence as `(ahead, behind)` along with the number of
/// commits visited. When no common ancestor is found within the budget
/// (or a queue overflows), both counts are `None` and the visit count is
/// still reported for the caching decision.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use git_prompt::core::divergence::{compute_divergence, CommitGraph, SearchParams};
/// use git_prompt::core::types::CommitId;
///
/// struct Fixture(HashMap<CommitId, Vec<CommitId>>);
///
/// impl CommitGraph for Fixture {
///     fn parents(&self, id: &CommitId) -> Vec<CommitId> {
///         self.0.get(id).cloned().unwrap_or_default()
///     }
/// }
///
/// let tip = CommitId::new("aa".repeat(20)).unwrap();
/// let graph = Fixture(HashMap::new());
/// let result = compute_divergence(&graph, &tip, &tip, &SearchParams::default());
/// assert_eq!((result.ahead, result.behind), (Some(0), Some(0)));
/// assert_eq!(result.commits_visited, 0);
/// ```
pub fn compute_divergence(
    graph: &impl CommitGraph,
    start: &CommitId,
    target: &CommitId,
    params: &SearchParams,
) -> DivergenceResult {
    // Identical tips need no traversal.
    if start == target {
        return DivergenceResult::found(0, 0, 0);
    }

    let mut distances: HashMap<CommitId, DistanceRecord> = HashMap::new();
    let mut sides = [SideState::new(params), SideState::new(params)];
    let mut commits_visited = 0usize;

    // Seed both sides at distance zero.
    for (side, origin) in SIDES.into_iter().zip([start, target]) {
        let record = distances.entry(origin.clone()).or_default();
        *record.get_mut(side) = Some(0);

        let state = &mut sides[side as usize];
        if state
            .queue
            .push(SearchNode {
                id: origin.clone(),
                distance: 0,
            })
            .is_err()
        {
            return DivergenceResult::unknown(commits_visited);
        }
    }

    // Strict alternation: one dequeue per side per round. A side drops out
    // when its queue drains or its budget runs dry; the loop ends when
    // neither side can make progress.
    loop {
        let mut made_progress = false;

        for side in SIDES {
            let state = &mut sides[side as usize];
            if state.queue.is_empty() || state.steps_remaining == 0 {
                continue;
            }

            let current = match state.queue.pop() {
                Some(node) => node,
                None => continue,
            };
            made_progress = true;
            commits_visited += 1;

            // Discovered from the opposite side earlier: this node is the
            // intersection point.
            if let Some(record) = distances.get(&current.id) {
                if record.is_intersection() {
                    return DivergenceResult::found(
                        record.from_start.unwrap_or(0),
                        record.from_target.unwrap_or(0),
                        commits_visited,
                    );
                }
            }

            for parent_id in graph.parents(&current.id) {
                let parent_distance = current.distance + 1;

                let record = match distances.entry(parent_id.clone()) {
                    Entry::Occupied(occupied) => occupied.into_mut(),
                    Entry::Vacant(vacant) => vacant.insert(DistanceRecord::default()),
                };

                // First visit from this side only; distances are minimal on
                // first write and never revised.
                if record.get(side).is_some() {
                    continue;
                }
                *record.get_mut(side) = Some(parent_distance);

                // Fast path: completing both fields means the parent is the
                // intersection, without spending a queue slot on it.
                if record.other(side).is_some() {
                    return DivergenceResult::found(
                        record.from_start.unwrap_or(0),
                        record.from_target.unwrap_or(0),
                        commits_visited,
                    );
                }

                let state = &mut sides[side as usize];
                if state.steps_remaining > 0 {
                    if state
                        .queue
                        .push(SearchNode {
                            id: parent_id,
                            distance: parent_distance,
                        })
                        .is_err()
                    {
                        // Overflow is a search failure, not a crash.
                        return DivergenceResult::unknown(commits_visited);
                    }
                    state.steps_remaining -= 1;
                }
            }
        }

        if !made_progress {
            break;
        }
    }

    DivergenceResult::unknown(commits_visited)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory commit graph for tests. Maps each commit to its parents;
    /// commits absent from the map have no parents (roots or unreadable
    /// objects).
    struct FixtureGraph {
        parents: HashMap<CommitId, Vec<CommitId>>,
    }

    impl FixtureGraph {
        fn new() -> Self {
            Self {
                parents: HashMap::new(),
            }
        }

        fn edge(mut self, child: &CommitId, parent: &CommitId) -> Self {
            self.parents
                .entry(child.clone())
                .or_default()
                .push(parent.clone());
            self
        }
    }

    impl CommitGraph for FixtureGraph {
        fn parents(&self, id: &CommitId) -> Vec<CommitId> {
            self.parents.get(id).cloned().unwrap_or_default()
        }
    }

    /// Deterministic synthetic commit id from a small index.
    fn cid(n: usize) -> CommitId {
        CommitId::new(format!("{:040x}", n + 1)).unwrap()
    }

    /// Build a linear chain `chain[0] <- chain[1] <- ... <- chain[len-1]`
    /// (each later commit is a child of the previous one) and return the ids.
    fn linear_chain(len: usize) -> (FixtureGraph, Vec<CommitId>) {
        let ids: Vec<CommitId> = (0..len).map(cid).collect();
        let mut graph = FixtureGraph::new();
        for pair in ids.windows(2) {
            graph = graph.edge(&pair[1], &pair[0]);
        }
        (graph, ids)
    }

    #[test]
    fn identical_tips_are_in_sync_without_traversal() {
        let graph = FixtureGraph::new();
        let tip = cid(0);

        for max_steps in [0, 1, 1000] {
            let result = compute_divergence(
                &graph,
                &tip,
                &tip,
                &SearchParams::with_max_steps(max_steps),
            );
            assert_eq!(result.ahead, Some(0));
            assert_eq!(result.behind, Some(0));
            assert_eq!(result.commits_visited, 0);
        }
    }

    #[test]
    fn linear_history_is_ahead_only() {
        // A <- B <- C; C is two commits ahead of A.
        let (graph, ids) = linear_chain(3);
        let result =
            compute_divergence(&graph, &ids[2], &ids[0], &SearchParams::default());

        assert_eq!(result.ahead, Some(2));
        assert_eq!(result.behind, Some(0));
        assert!(result.commits_visited <= 6);
    }

    #[test]
    fn linear_history_reversed_is_behind_only() {
        let (graph, ids) = linear_chain(3);
        let result =
            compute_divergence(&graph, &ids[0], &ids[2], &SearchParams::default());

        assert_eq!(result.ahead, Some(0));
        assert_eq!(result.behind, Some(2));
    }

    #[test]
    fn symmetric_branches_report_equal_divergence() {
        // Two branches, each three commits past a shared base.
        let base = cid(0);
        let a = [cid(1), cid(2), cid(3)];
        let b = [cid(4), cid(5), cid(6)];
        let graph = FixtureGraph::new()
            .edge(&a[0], &base)
            .edge(&a[1], &a[0])
            .edge(&a[2], &a[1])
            .edge(&b[0], &base)
            .edge(&b[1], &b[0])
            .edge(&b[2], &b[1]);

        let result =
            compute_divergence(&graph, &a[2], &b[2], &SearchParams::with_max_steps(3));
        assert_eq!(result.ahead, Some(3));
        assert_eq!(result.behind, Some(3));
    }

    #[test]
    fn asymmetric_branches_report_both_counts() {
        // One commit on side a, two on side b, off a shared base.
        let base = cid(0);
        let a = cid(1);
        let b = [cid(2), cid(3)];
        let graph = FixtureGraph::new()
            .edge(&a, &base)
            .edge(&b[0], &base)
            .edge(&b[1], &b[0]);

        let result = compute_divergence(&graph, &a, &b[1], &SearchParams::default());
        assert_eq!(result.ahead, Some(1));
        assert_eq!(result.behind, Some(2));
    }

    #[test]
    fn exhausted_budget_reports_unknown_with_visit_count() {
        // Merge-base is five steps from each tip but the budget is one.
        let base = cid(0);
        let mut graph = FixtureGraph::new();
        let mut a_prev = base.clone();
        let mut b_prev = base.clone();
        for i in 0..5 {
            let a_next = cid(1 + i);
            let b_next = cid(10 + i);
            graph = graph.edge(&a_next, &a_prev).edge(&b_next, &b_prev);
            a_prev = a_next;
            b_prev = b_next;
        }

        let result =
            compute_divergence(&graph, &a_prev, &b_prev, &SearchParams::with_max_steps(1));
        assert_eq!(result.ahead, None);
        assert_eq!(result.behind, None);
        assert!(result.commits_visited > 0);
    }

    #[test]
    fn unrelated_histories_report_unknown() {
        // Two chains with no shared commits.
        let (mut graph, a) = linear_chain(3);
        let b: Vec<CommitId> = (100..103).map(cid).collect();
        for pair in b.windows(2) {
            graph = graph.edge(&pair[1], &pair[0]);
        }

        let result = compute_divergence(&graph, &a[2], &b[2], &SearchParams::default());
        assert!(!result.is_known());
    }

    #[test]
    fn missing_commits_are_dead_ends_not_errors() {
        // The target tip is not in the graph at all (unreadable object).
        let (graph, ids) = linear_chain(3);
        let ghost = cid(99);

        let result = compute_divergence(&graph, &ids[2], &ghost, &SearchParams::default());
        assert!(!result.is_known());
        assert!(result.commits_visited > 0);
    }

    #[test]
    fn merge_commits_follow_all_parents() {
        // base <- left, base <- right, merge has parents (left, right).
        // The other tip sits one commit past left.
        let base = cid(0);
        let left = cid(1);
        let right = cid(2);
        let merge = cid(3);
        let tip = cid(4);
        let graph = FixtureGraph::new()
            .edge(&left, &base)
            .edge(&right, &base)
            .edge(&merge, &left)
            .edge(&merge, &right)
            .edge(&tip, &left);

        let result = compute_divergence(&graph, &merge, &tip, &SearchParams::default());
        // Nearest common ancestor is `left`: one step from the merge, one
        // from the tip.
        assert_eq!(result.ahead, Some(1));
        assert_eq!(result.behind, Some(1));
    }

    #[test]
    fn queue_overflow_ends_search_with_unknown() {
        // A commit with many parents overflows a capacity-2 queue.
        let tip = cid(0);
        let far = cid(50);
        let mut graph = FixtureGraph::new();
        for i in 1..10 {
            graph = graph.edge(&tip, &cid(i));
        }

        let params = SearchParams {
            max_steps: 100,
            queue_capacity: 2,
        };
        let result = compute_divergence(&graph, &tip, &far, &params);
        assert!(!result.is_known());
    }

    #[test]
    fn in_sync_helper() {
        let graph = FixtureGraph::new();
        let tip = cid(0);
        let result = compute_divergence(&graph, &tip, &tip, &SearchParams::default());
        assert!(result.in_sync());
        assert!(result.is_known());
    }
}
