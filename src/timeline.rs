use crate::cli::CommonArgs;
use crate::model::{EstimateOutput, WeekRow, WeeklyOutput, WeeklyStats, SCHEMA_VERSION};
use crate::source::{read_export, RepoId};
use crate::weekly::weekly_stats;
use anyhow::{Context, Result};
use chrono::Utc;
use console::style;
use std::path::Path;

pub fn exec(common: CommonArgs, repo: &str, json: bool, ndjson: bool) -> Result<()> {
    let repo: RepoId = repo.parse()?;
    let estimator = common.estimator()?;
    let filter = common.filter()?;
    let source = common.open_source()?;

    let commits = source
        .fetch(&repo, &filter)
        .with_context(|| format!("Failed to load commits for {repo}"))?;
    let stats = weekly_stats(&estimator, &commits);

    if json {
        let output = WeeklyOutput {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            repository: repo.to_string(),
            since: common.since.clone(),
            until: common.until.clone(),
            weeks: rows(&stats),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if ndjson {
        for row in rows(&stats) {
            println!("{}", serde_json::to_string(&row)?);
        }
    } else {
        output_chart(&stats, &common);
    }

    Ok(())
}

/// Runs the estimator straight over an export file, bypassing any source.
pub fn exec_file(common: CommonArgs, file: &Path, json: bool) -> Result<()> {
    let estimator = common.estimator()?;
    let filter = common.filter()?;

    let commits = read_export(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let commits = filter.apply(commits);

    let estimate = estimator.estimate(&commits);
    let stats = weekly_stats(&estimator, &commits);

    if json {
        let output = EstimateOutput {
            version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            file: file.display().to_string(),
            estimate,
            weekly_stats: stats,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", style("Estimate").bold());
    println!("{}", "─".repeat(50));
    println!("Commits: {}", style(estimate.commit_count).cyan());
    println!("Sessions: {}", style(estimate.session_count).cyan());
    println!("Estimated hours: {}", style(format!("{:.2}", estimate.hours)).green());
    println!();
    output_chart(&stats, &common);
    Ok(())
}

fn rows(stats: &WeeklyStats) -> Vec<WeekRow> {
    stats
        .iter()
        .map(|(week, bucket)| WeekRow {
            week: week.clone(),
            bucket: *bucket,
        })
        .collect()
}

fn output_chart(stats: &WeeklyStats, common: &CommonArgs) {
    if stats.is_empty() {
        println!("No data to display");
        return;
    }

    if let (Some(since), Some(until)) = (&common.since, &common.until) {
        println!("Filtering commits from {} to {}", since, until);
    } else if let Some(since) = &common.since {
        println!("Filtering commits since {}", since);
    } else if let Some(until) = &common.until {
        println!("Filtering commits until {}", until);
    }

    let max_hours = stats.values().map(|b| b.hours).fold(0.0_f64, f64::max);
    let max_commits = stats.values().map(|b| b.commit_count).max().unwrap_or(1).max(1);

    println!("{}", style("Weekly Hours").bold());
    println!("{}", "─".repeat(50));

    for (week, bucket) in stats {
        let width = if max_hours > 0.0 {
            ((bucket.hours / max_hours) * 30.0).round() as usize
        } else {
            0
        };
        let commit_char = match (bucket.commit_count * 5) / max_commits {
            0 => " ",
            1 => "▁",
            2 => "▃",
            3 => "▅",
            4 => "▇",
            _ => "█",
        };

        println!(
            "{} {:<30} {} hours: {:>7.2}, sessions: {:>3}, commits: {:>4}",
            week,
            style("█".repeat(width)).green(),
            style(commit_char).blue(),
            bucket.hours,
            bucket.session_count,
            bucket.commit_count
        );
    }

    println!("\n{}", style("Legend").bold());
    println!("  {} hours", style("█").green());
    println!("  {} commits intensity", style("▁▃▅▇█").blue());
}
