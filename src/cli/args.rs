//! cli::args
//!
//! Command-line argument definitions using clap derive.

use clap::Parser;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
OUTPUT FORMAT:
    [branch] indicators

BRANCH COLORS:
    Green   - Clean working tree (no changes, nothing staged)
    Cyan    - Untracked files only (informational)
    Yellow  - Staged changes (ready to commit), or operation in progress
    Red     - Unstaged changes or conflicts (need attention)
    Gray    - Large repository (status check skipped for performance)

INDICATORS:
    ⚡        - Detached HEAD
    [state]  - Operation in progress (merge, rebase, cherry-pick, revert);
               red if conflicts present, cyan otherwise
    🎒        - Stashed changes present
    ○        - No upstream configured (magenta)

DIVERGENCE FROM MAIN (shown for feature branches):
    ↑N       - N commits ahead of the remote's default branch (blue)
    ↓N       - N commits behind (yellow)
    ↑N↓M     - Diverged (red)
    ↕        - Too far to count within --max-traversal (red)

UPSTREAM TRACKING (parenthesized, for branches with an upstream):
    (↑N)     - N commits ahead of upstream (ready to push)
    (↓N)     - N commits behind upstream (need to pull)
    (↑N↓M)   - Diverged from upstream
    (↕)      - Too far to count
    Nothing is shown when in sync.

EXAMPLES:
    [main]                - On main, in sync with upstream, clean
    [feature] ○           - On feature, no upstream, clean
    [feature] ↑5↓3        - 5 ahead / 3 behind the default branch
    [feature] ↑10(↑2)     - 10 ahead of main, 2 unpushed to upstream
    [abc123d] ⚡[merge:conflict]  - Detached HEAD, merge with conflicts

PERFORMANCE:
    Repositories with an index over --large-repo-size bytes skip status
    checks and render the branch in gray. Divergence searches visit at
    most --max-traversal commits per side and cache their result in
    .git/prompt-cache.

SHELL INTEGRATION:
    Bash:  PS1='$(git-prompt)\\$ '
    Zsh:   setopt PROMPT_SUBST; PROMPT='$(git-prompt)%% '
    Fish:  function fish_prompt; git-prompt; end";

/// Display colorful git repository status for shell prompts
#[derive(Parser, Debug)]
#[command(name = "git-prompt")]
#[command(version, about, after_help = AFTER_HELP)]
pub struct Cli {
    /// Run as if started in this directory
    #[arg(long, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Show timing and decision tracing on stderr
    #[arg(long)]
    pub debug: bool,

    /// Print machine-readable JSON instead of a prompt string
    #[arg(long)]
    pub json: bool,

    /// Skip global and repository config files (useful for tests)
    #[arg(long)]
    pub local: bool,

    /// Index size threshold in bytes for large-repository detection
    #[arg(long, value_name = "BYTES")]
    pub large_repo_size: Option<u64>,

    /// Maximum commits to traverse per side in divergence calculation
    #[arg(long, value_name = "COMMITS")]
    pub max_traversal: Option<usize>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}
