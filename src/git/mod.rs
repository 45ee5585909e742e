//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **only doorway** to Git. All repository reads flow
//! through this interface; no other module imports `git2`, and direct
//! parsing of `.git` internals outside this module is limited to the
//! operation marker existence checks it exposes.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - HEAD, branch, upstream, and remote-HEAD resolution
//! - Commit-graph parent lookup for divergence search
//! - Operation marker and index conflict checks
//! - Working-tree fact providers for status classification
//!
//! # Invariants
//!
//! - The prompt never mutates repository state; this interface is
//!   read-only.
//! - Fact providers degrade to conservative answers on error instead of
//!   propagating failures into the render path.

mod interface;

pub use interface::{Git, GitError, WorktreeInspector};
