use crate::cli::CommonArgs;
use super::{analyze_repositories, output_json, output_ndjson, output_table, summarize};
use anyhow::{bail, Context};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};

pub fn exec(
    common: CommonArgs,
    mut repos: Vec<String>,
    json: bool,
    ndjson: bool,
    inactive_months: u32,
) -> anyhow::Result<()> {
    if repos.is_empty() && common.exports.is_none() {
        let store = common.open_store()?;
        repos = store
            .repositories()
            .context("Failed to list stored repositories")?
            .iter()
            .map(ToString::to_string)
            .collect();
        log::debug!("defaulting to {} stored repositories", repos.len());
    }
    if repos.is_empty() {
        bail!("No repositories given; pass owner/name arguments or set GITHOURS_REPOS");
    }

    let estimator = common.estimator()?;
    let filter = common.filter()?;
    let source = common.open_source()?;

    // Keep stdout clean for machine-readable output.
    let progress = if json || ndjson {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(repos.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30}] {pos}/{len} repositories")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    };

    log::info!("analyzing {} repositories from {}", repos.len(), source.describe());
    let outcomes = analyze_repositories(source.as_ref(), &repos, &filter, &estimator, progress.clone());
    progress.finish_and_clear();

    let summary = summarize(&outcomes, inactive_months, Utc::now())
        .context("Failed to summarize repositories")?;

    if json {
        output_json(&outcomes, &summary, source.as_ref(), &common)?;
    } else if ndjson {
        output_ndjson(&outcomes)?;
    } else {
        output_table(&outcomes, &summary)?;
    }

    Ok(())
}
