//! git-prompt binary entry point.
//!
//! All logic lives in the library; this just invokes the CLI and keeps
//! failures off stdout so a broken invocation never corrupts a prompt.

use std::process::ExitCode;

fn main() -> ExitCode {
    match git_prompt::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            git_prompt::ui::output::error(format_args!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
