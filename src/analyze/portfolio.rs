use crate::error::{HoursError, Result};
use crate::model::{PortfolioSummary, RepositoryOutcome, RepositoryReport};
use crate::util::round_hours;
use chrono::{DateTime, Months, Utc};

pub const DEFAULT_INACTIVE_MONTHS: u32 = 3;

/// Totals across analyzed repositories. Failed entries only bump
/// `failed_projects`. A repository is inactive when its newest commit is
/// older than `inactive_months` before `now`; repositories without commits
/// are not listed.
///
/// Averages are over successful repositories. Leaders skip zero scores and
/// keep the earlier repository on ties.
pub fn summarize(
    outcomes: &[RepositoryOutcome],
    inactive_months: u32,
    now: DateTime<Utc>,
) -> Result<PortfolioSummary> {
    let cutoff = now
        .checked_sub_months(Months::new(inactive_months))
        .ok_or_else(|| HoursError::InvalidDate(format!("{inactive_months} months before {now}")))?;

    let mut summary = PortfolioSummary {
        inactive_months,
        ..PortfolioSummary::default()
    };
    let mut hours = 0.0;

    for outcome in outcomes {
        let Some(report) = outcome.report() else {
            summary.failed_projects += 1;
            continue;
        };
        summary.total_projects += 1;
        summary.total_commits += report.total_commits;
        summary.total_sessions += report.session_count;
        hours += report.estimated_hours;

        if report.last_commit_timestamp.is_some_and(|ts| ts < cutoff) {
            summary.inactive_projects.push(report.repository.clone());
        }
    }

    summary.total_hours = round_hours(hours);

    let reports: Vec<&RepositoryReport> = outcomes.iter().filter_map(|o| o.report()).collect();
    if !reports.is_empty() {
        let projects = reports.len() as f64;
        summary.avg_hours_per_project = round_hours(hours / projects);
        summary.avg_commits_per_project = round_hours(summary.total_commits as f64 / projects);
    }
    if hours > 0.0 {
        summary.commits_per_hour = round_hours(summary.total_commits as f64 / hours);
    }
    summary.most_productive = leader(&reports, |r| r.estimated_hours);
    summary.most_active = leader(&reports, |r| r.total_commits as f64);
    summary.most_consistent = leader(&reports, RepositoryReport::consistency);

    Ok(summary)
}

fn leader<F>(reports: &[&RepositoryReport], score: F) -> Option<String>
where
    F: Fn(&RepositoryReport) -> f64,
{
    let mut best: Option<(&RepositoryReport, f64)> = None;
    for &report in reports {
        let value = score(report);
        if value > 0.0 && best.map_or(true, |(_, top)| value > top) {
            best = Some((report, value));
        }
    }
    best.map(|(report, _)| report.repository.clone())
}
