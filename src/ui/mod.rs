//! ui
//!
//! User-facing formatting: diagnostic output helpers and the prompt
//! renderer itself.

pub mod output;
pub mod render;
