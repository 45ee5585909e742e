//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line flags
//! - Resolve configuration (defaults, config files, flag overrides)
//! - Delegate to [`crate::engine`] and print its report
//!
//! # Degradation
//!
//! A shell prompt must never break the shell: outside a repository, or
//! with an unborn HEAD, `run` prints nothing and succeeds. Diagnostic
//! output only appears under `--debug`.

pub mod args;

pub use args::Cli;

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::core::config::PromptConfig;
use crate::engine;
use crate::git::Git;
use crate::ui::{output, render};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = output::Verbosity::from_flags(cli.debug);

    let cwd = cli.cwd.clone().unwrap_or_else(|| Path::new(".").to_path_buf());
    let git = match Git::open(&cwd) {
        Ok(git) => git,
        Err(err) => {
            // Not a repository: render nothing.
            output::debug(err, verbosity);
            return Ok(());
        }
    };

    let config = resolve_config(&cli, &git, verbosity);

    let report = match engine::build_report(&git, &config, verbosity) {
        Some(report) => report,
        None => return Ok(()),
    };

    let mut stdout = std::io::stdout().lock();
    if cli.json {
        writeln!(stdout, "{}", serde_json::to_string(&report)?)?;
    } else {
        // No trailing newline: the output is embedded in a prompt.
        write!(stdout, "{}", render::render_prompt(&report, config.color))?;
        stdout.flush()?;
    }

    Ok(())
}

/// Merge configuration: defaults, config files (unless `--local`), then
/// CLI flags on top.
fn resolve_config(cli: &Cli, git: &Git, verbosity: output::Verbosity) -> PromptConfig {
    let mut config = if cli.local {
        PromptConfig::default()
    } else {
        let loaded = PromptConfig::load(Some(git.git_dir()));
        for warning in &loaded.warnings {
            output::warn(
                format_args!("{} ({})", warning.message, warning.path.display()),
                verbosity,
            );
        }
        loaded.config
    };

    if cli.no_color {
        config.color = false;
    }
    if let Some(large_repo_size) = cli.large_repo_size {
        config.large_repo_size = large_repo_size;
    }
    if let Some(max_traversal) = cli.max_traversal {
        config.max_traversal = max_traversal;
    }

    config
}
