//! ui::render
//!
//! Prompt string assembly.
//!
//! # Output Format
//!
//! ```text
//! [branch] indicators
//! ```
//!
//! The branch segment is colored by status. Indicators follow: detached
//! marker, operation state, stash, no-upstream marker, divergence arrows
//! for the main reference, and parenthesized arrows for the upstream.
//!
//! ANSI sequences are wrapped in `\x01`/`\x02` so readline excludes them
//! from prompt-width calculations; without the guards, long prompts wrap
//! incorrectly in bash.

use std::fmt::Write;

use crate::core::cache::TrackedDivergence;
use crate::core::status::StatusColor;
use crate::engine::Report;

/// ANSI color for commits ahead (should push).
const COLOR_AHEAD: &str = "34";
/// ANSI color for commits behind (should pull).
const COLOR_BEHIND: &str = "33";
/// ANSI color for diverged or too-far states.
const COLOR_DIVERGED: &str = "31";
/// ANSI color for an operation in progress without conflicts.
const COLOR_STATE: &str = "36";
/// ANSI color for an operation with conflicts.
const COLOR_STATE_CONFLICT: &str = "31";
/// ANSI color for the no-upstream marker.
const COLOR_NO_UPSTREAM: &str = "35";

/// The ANSI color code for each status color, matching the branch color
/// legend in the help text.
fn status_code(color: StatusColor) -> &'static str {
    match color {
        StatusColor::Clean => "32",
        StatusColor::UntrackedOnly => "36",
        StatusColor::Staged => "33",
        StatusColor::Modified => "31",
        StatusColor::Conflict => "31",
        StatusColor::OperationInProgress => "33",
        StatusColor::LargeRepoFallback => "37",
    }
}

/// Writes prompt segments, coloring them unless colors are disabled.
struct Painter {
    color: bool,
    buf: String,
}

impl Painter {
    fn new(color: bool) -> Self {
        Self {
            color,
            buf: String::new(),
        }
    }

    /// Append `text` wrapped in a readline-guarded ANSI color.
    fn paint(&mut self, code: &str, text: &str) {
        if self.color {
            // \x01/\x02 tell readline the escapes occupy no columns.
            let _ = write!(self.buf, "\u{1}\u{1b}[01;{code}m\u{2}");
        }
        self.buf.push_str(text);
        if self.color {
            self.buf.push_str("\u{1}\u{1b}[00m\u{2}");
        }
    }

    fn plain(&mut self, text: &str) {
        self.buf.push_str(text);
    }
}

/// Render the full prompt string, including the trailing space that
/// separates it from the shell's own prompt character.
pub fn render_prompt(report: &Report, color: bool) -> String {
    let mut painter = Painter::new(color);

    painter.paint(status_code(report.color), &format!("[{}]", report.branch));

    let indicators = render_indicators(report, color);
    if !indicators.is_empty() {
        painter.plain(" ");
        painter.plain(&indicators);
    }
    painter.plain(" ");

    painter.buf
}

/// Assemble the indicator string: detached marker, operation state,
/// stash, no-upstream marker, then divergence arrows.
fn render_indicators(report: &Report, color: bool) -> String {
    let mut painter = Painter::new(color);

    if report.detached {
        painter.plain("⚡");
    }

    if let Some(label) = report.state_label {
        let code = if report.state_conflict {
            COLOR_STATE_CONFLICT
        } else {
            COLOR_STATE
        };
        painter.paint(code, &format!("[{label}]"));
    }

    if report.stash {
        painter.plain("🎒");
    }

    if report.no_upstream {
        painter.paint(COLOR_NO_UPSTREAM, "○");
    }

    if let Some(main) = &report.main {
        divergence_arrows(&mut painter, main, false);
    }

    if let Some(upstream) = &report.upstream {
        divergence_arrows(&mut painter, upstream, true);
    }

    painter.buf
}

/// Arrows for one tracked reference. Nothing is shown when in sync; the
/// upstream variant is parenthesized to distinguish it from the main
/// reference indicator.
fn divergence_arrows(painter: &mut Painter, tracked: &TrackedDivergence, parens: bool) {
    let (open, close) = if parens { ("(", ")") } else { ("", "") };

    match (tracked.ahead, tracked.behind) {
        (Some(0), Some(0)) => {}
        (Some(ahead), Some(behind)) if ahead > 0 && behind > 0 => {
            painter.paint(COLOR_DIVERGED, &format!("{open}↑{ahead}↓{behind}{close}"));
        }
        (Some(ahead), Some(_)) if ahead > 0 => {
            painter.paint(COLOR_AHEAD, &format!("{open}↑{ahead}{close}"));
        }
        (Some(_), Some(behind)) => {
            painter.paint(COLOR_BEHIND, &format!("{open}↓{behind}{close}"));
        }
        // Searches exhausted without a merge-base: too far to count.
        _ => painter.paint(COLOR_DIVERGED, &format!("{open}↕{close}")),
    }
}
