//! The `run` and `validate` commands.

use crate::cli::CliBuildLog;
use crate::cli::context::StepContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use indicatif::ProgressBar;
use premerge::error::{Error, Result};
use premerge::orchestrator::run_premerge;
use premerge::params::StepConfig;
use premerge::publish::publish_results;
use premerge::types::ResultStatus;
use std::path::Path;
use std::time::Duration;

/// Run the preliminary merge step.
pub async fn run_step(config_path: &Path, state_path: &Path, build_id: u64) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Opening repositories...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    let context = StepContext::new(config_path, state_path).await;
    spinner.finish_and_clear();
    let mut context = context?;

    println!("{}", context.config.describe().muted());

    let log = CliBuildLog;
    let outcome = run_premerge(
        build_id,
        &context.config.target_branch,
        &context.bindings,
        context.provider.as_ref(),
        &context.configs,
        &context.state,
        &log,
    )
    .await?;

    println!();
    match outcome.aggregate.status() {
        ResultStatus::Success => {
            publish_results(&mut context.state, &outcome);
            context.state.save()?;
            println!(
                "{} {} {} merged",
                check(),
                "Premerge complete:".success(),
                format!("{} repository(ies)", outcome.aggregate.target_hashes().len()).accent()
            );
            if outcome.aggregate.soft_fetch_failures() > 0 {
                println!(
                    "  {}",
                    format!(
                        "{} repository(ies) skipped after fetch failure",
                        outcome.aggregate.soft_fetch_failures()
                    )
                    .warn()
                );
            }
            println!(
                "  {}",
                format!("Published results to {}", context.state.path().display()).muted()
            );
        }
        // A run that merged nothing is a failed step: later pipeline steps
        // expecting published results must not proceed.
        ResultStatus::Skipped => {
            println!("{}", "No merges performed; nothing published.".alert());
            return Err(Error::NothingMerged);
        }
        // Hard failures surface as Err from run_premerge.
        ResultStatus::Failed => {
            println!("{}", "Premerge failed; nothing published.".alert());
        }
    }

    Ok(())
}

/// Validate a step configuration file without touching any repository.
pub fn validate_step(config_path: &Path) -> Result<()> {
    let config = StepConfig::load(config_path)?;
    let invalid = config.validate();

    if invalid.is_empty() {
        println!("{} {}", check(), config.describe());
        println!(
            "  {}",
            format!("{} repository(ies) configured", config.repositories.len()).muted()
        );
        return Ok(());
    }

    for property in &invalid {
        println!("{} {}: {}", "invalid".alert(), property.key.emphasis(), property.reason);
    }
    config.ensure_valid()
}
