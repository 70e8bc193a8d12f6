use crate::cli::CommonArgs;
use crate::model::{AnalysisOutput, PortfolioSummary, RepositoryOutcome, SCHEMA_VERSION};
use crate::source::CommitSource;
use anyhow::Result;
use chrono::Utc;
use console::style;

pub fn output_json(
    outcomes: &[RepositoryOutcome],
    summary: &PortfolioSummary,
    source: &dyn CommitSource,
    common: &CommonArgs,
) -> Result<()> {
    let output = AnalysisOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        source: source.describe(),
        author: common.author.clone(),
        since: common.since.clone(),
        until: common.until.clone(),
        repositories: outcomes.to_vec(),
        summary: summary.clone(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn output_ndjson(outcomes: &[RepositoryOutcome]) -> Result<()> {
    for outcome in outcomes {
        println!("{}", serde_json::to_string(outcome)?);
    }
    Ok(())
}

pub fn output_table(outcomes: &[RepositoryOutcome], summary: &PortfolioSummary) -> Result<()> {
    println!(
        "{:<40} {:>9} {:>8} {:>8} {:<10} {:>11}",
        style("Repository").bold(),
        style("Hours").bold(),
        style("Sessions").bold(),
        style("Commits").bold(),
        style("Activity").bold(),
        style("Last commit").bold()
    );
    println!("{}", "─".repeat(92));

    for outcome in outcomes {
        match outcome {
            RepositoryOutcome::Analyzed(report) => {
                let last = report
                    .last_commit_timestamp
                    .map(|ts| ts.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "{:<40} {:>9.2} {:>8} {:>8} {:<10} {:>11}",
                    report.repository,
                    report.estimated_hours,
                    report.session_count,
                    report.total_commits,
                    report.activity.label(),
                    last
                );
            }
            RepositoryOutcome::Failed { repository, error } => {
                println!("{:<40} {}", repository, style(format!("error: {error}")).red());
            }
        }
    }

    println!("\n{}", style("Summary").bold());
    println!("Projects analyzed: {}", style(summary.total_projects).cyan());
    if summary.failed_projects > 0 {
        println!("Projects failed: {}", style(summary.failed_projects).red());
    }
    println!("Total commits: {}", style(summary.total_commits).cyan());
    println!("Total sessions: {}", style(summary.total_sessions).cyan());
    println!("Estimated hours: {}", style(format!("{:.2}", summary.total_hours)).green());
    println!(
        "Per project: {:.2} hours, {:.2} commits ({:.2} commits/hour)",
        summary.avg_hours_per_project, summary.avg_commits_per_project, summary.commits_per_hour
    );

    for (label, leader) in [
        ("Most productive", &summary.most_productive),
        ("Most active", &summary.most_active),
        ("Most consistent", &summary.most_consistent),
    ] {
        if let Some(name) = leader {
            println!("{label}: {}", style(name).bold());
        }
    }

    if !summary.inactive_projects.is_empty() {
        println!(
            "Inactive for {}+ months: {}",
            summary.inactive_months,
            style(summary.inactive_projects.join(", ")).yellow()
        );
    }

    Ok(())
}
