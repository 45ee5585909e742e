//! core
//!
//! Domain logic for prompt rendering: divergence search, the result
//! cache, operation-state detection, and status classification.
//!
//! # Architecture
//!
//! Nothing in this module touches git2 or a repository's on-disk layout
//! directly (the cache file and config files are the only disk artifacts
//! it owns). Repository facts arrive through the narrow traits defined
//! here ([`divergence::CommitGraph`], [`state::OperationMarkers`],
//! [`state::IndexInspector`], [`status::WorktreeFacts`]) and are
//! implemented by [`crate::git`].
//!
//! # Invariants
//!
//! - Every failure degrades to a conservative display, never a panic or
//!   process abort.
//! - All state is per-invocation except the divergence cache file.

pub mod cache;
pub mod config;
pub mod context;
pub mod divergence;
pub mod state;
pub mod status;
pub mod types;
