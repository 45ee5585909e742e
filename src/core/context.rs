//! core::context
//!
//! Shared read-only facts for one prompt render.

use super::types::CommitId;

/// Facts gathered once at startup and threaded through the detector,
/// classifier, and divergence stages.
#[derive(Debug, Clone)]
pub struct PromptContext {
    /// The commit HEAD currently points at.
    pub head: CommitId,
    /// Whether the repository is over the size threshold. Expensive
    /// working-tree checks are skipped when set.
    pub large_repo: bool,
    /// Whether the index was loaded successfully. Conflict detection and
    /// working-tree classification require it.
    pub index_loaded: bool,
}
