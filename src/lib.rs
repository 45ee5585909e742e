//! git-prompt - Fast colored git repository status for shell prompts
//!
//! A single-binary tool that prints a one-line repository summary for
//! embedding in a shell prompt: branch identity and status color,
//! in-progress operation with conflict detection, and ahead/behind
//! divergence against the remote's default branch and the upstream
//! tracking branch.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses flags, delegates to engine)
//! - [`engine`] - Orchestrates one render: facts → state → color → divergence
//! - [`core`] - Domain logic: divergence search, cache, detection, classification
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - Prompt rendering and diagnostic output
//!
//! # Correctness Invariants
//!
//! 1. The tool never mutates repository state (its cache file excepted)
//! 2. Every failure degrades to a conservative display; the process never
//!    aborts on repository problems
//! 3. Divergence searches always terminate: per-side step budgets and
//!    fixed queue capacities bound the traversal

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
