use crate::error::Result;
use crate::estimate::SessionEstimator;
use crate::model::{ActivityLevel, Commit, CommitSummary, RepositoryOutcome, RepositoryReport};
use crate::source::{CommitFilter, CommitSource, RepoId};
use crate::weekly::weekly_stats;
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;

pub const RECENT_COMMITS: usize = 10;

pub fn analyze_repository(
    source: &dyn CommitSource,
    repo: &RepoId,
    filter: &CommitFilter,
    estimator: &SessionEstimator,
) -> Result<RepositoryReport> {
    let mut commits = source.fetch(repo, filter)?;
    log::debug!("estimating {} commits for {}", commits.len(), repo);

    let estimate = estimator.estimate(&commits);
    let weekly = weekly_stats(estimator, &commits);

    commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let last_commit = commits.first().map(CommitSummary::from);
    let activity = ActivityLevel::classify(commits.len(), window_days(filter, &commits));

    Ok(RepositoryReport {
        repository: repo.to_string(),
        total_commits: estimate.commit_count,
        estimated_hours: estimate.hours,
        session_count: estimate.session_count,
        last_commit_timestamp: last_commit.as_ref().map(|c| c.timestamp),
        last_commit,
        activity,
        weekly_stats: weekly,
        recent_commits: commits.iter().take(RECENT_COMMITS).map(CommitSummary::from).collect(),
    })
}

/// Days covered by the analysis: the filter window when fully bounded,
/// otherwise the span between oldest and newest commit. `newest_first` must
/// be sorted newest first.
fn window_days(filter: &CommitFilter, newest_first: &[Commit]) -> i64 {
    let days = filter.range.span_days().unwrap_or_else(|| {
        match (newest_first.first(), newest_first.last()) {
            (Some(newest), Some(oldest)) => (newest.timestamp - oldest.timestamp).num_days(),
            _ => 0,
        }
    });
    days.max(1)
}

/// Analyzes every repository on the rayon pool. Output order follows input
/// order, and a failure is confined to its own entry.
pub fn analyze_repositories(
    source: &dyn CommitSource,
    repositories: &[String],
    filter: &CommitFilter,
    estimator: &SessionEstimator,
    progress: ProgressBar,
) -> Vec<RepositoryOutcome> {
    repositories
        .par_iter()
        .progress_with(progress)
        .map(|name| {
            let outcome = name
                .parse::<RepoId>()
                .and_then(|repo| analyze_repository(source, &repo, filter, estimator));
            match outcome {
                Ok(report) => RepositoryOutcome::Analyzed(report),
                Err(e) => {
                    log::warn!("analysis of {} failed: {}", name, e);
                    RepositoryOutcome::Failed {
                        repository: name.clone(),
                        error: e.to_string(),
                    }
                }
            }
        })
        .collect()
}
