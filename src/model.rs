use crate::error::{HoursError, Result};
use crate::util::parse_date;
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCHEMA_VERSION: u32 = 1;

/// A validated commit. Only `timestamp` takes part in the estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub id: Option<String>,
    pub author: Option<String>,
    pub message: Option<String>,
    pub url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Commit {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            author: None,
            message: None,
            url: None,
            timestamp,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// Commit record as exported by a hosting service, before validation.
///
/// Both the nested shape returned by the hosted commits API and a flat
/// `{ sha, date, author, message, url }` shape are accepted. Unknown fields
/// are ignored so upstream schema additions don't break imports.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCommit {
    Hosted {
        sha: String,
        commit: HostedCommit,
        html_url: Option<String>,
    },
    Flat {
        #[serde(alias = "sha")]
        id: Option<String>,
        #[serde(alias = "timestamp")]
        date: String,
        author: Option<String>,
        message: Option<String>,
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostedCommit {
    pub author: HostedSignature,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostedSignature {
    pub name: Option<String>,
    pub date: String,
}

impl TryFrom<RawCommit> for Commit {
    type Error = HoursError;

    fn try_from(raw: RawCommit) -> Result<Self> {
        let (id, date, author, message, url) = match raw {
            RawCommit::Hosted { sha, commit, html_url } => (
                Some(sha),
                commit.author.date,
                commit.author.name,
                commit.message,
                html_url,
            ),
            RawCommit::Flat { id, date, author, message, url } => (id, date, author, message, url),
        };

        let timestamp = DateTime::parse_from_rfc3339(date.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| HoursError::InvalidTimestamp {
                value: date.clone(),
                reason: e.to_string(),
            })?;

        Ok(Commit {
            id,
            author,
            message,
            url,
            timestamp,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EstimationResult {
    pub hours: f64,
    pub session_count: usize,
    pub commit_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub commit_count: usize,
    pub hours: f64,
    pub session_count: usize,
}

/// Week-start date (`YYYY-MM-DD`) to bucket. Iterates chronologically.
pub type WeeklyStats = BTreeMap<String, WeeklyBucket>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub timestamp: DateTime<Utc>,
    pub id: Option<String>,
    pub message: Option<String>,
    pub url: Option<String>,
}

impl From<&Commit> for CommitSummary {
    fn from(commit: &Commit) -> Self {
        Self {
            timestamp: commit.timestamp,
            id: commit.id.clone(),
            message: commit
                .message
                .as_deref()
                .map(|m| m.lines().next().unwrap_or("").to_string()),
            url: commit.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ActivityLevel {
    /// Classifies commits-per-day, normalized so two commits a day saturates.
    pub fn classify(commit_count: usize, days: i64) -> Self {
        let per_day = commit_count as f64 / days.max(1) as f64;
        let normalized = (per_day / 2.0).min(1.0);
        match normalized {
            n if n <= 0.2 => ActivityLevel::VeryLow,
            n if n <= 0.4 => ActivityLevel::Low,
            n if n <= 0.6 => ActivityLevel::Medium,
            n if n <= 0.8 => ActivityLevel::High,
            _ => ActivityLevel::VeryHigh,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::VeryLow => "Very Low",
            ActivityLevel::Low => "Low",
            ActivityLevel::Medium => "Medium",
            ActivityLevel::High => "High",
            ActivityLevel::VeryHigh => "Very High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryReport {
    pub repository: String,
    pub total_commits: usize,
    pub estimated_hours: f64,
    pub session_count: usize,
    pub last_commit_timestamp: Option<DateTime<Utc>>,
    pub last_commit: Option<CommitSummary>,
    pub activity: ActivityLevel,
    pub weekly_stats: WeeklyStats,
    pub recent_commits: Vec<CommitSummary>,
}

impl RepositoryReport {
    /// Commits per week that saw any commit.
    pub fn consistency(&self) -> f64 {
        if self.weekly_stats.is_empty() {
            return 0.0;
        }
        self.total_commits as f64 / self.weekly_stats.len() as f64
    }
}

/// Result of analyzing one repository. A failure only affects its own entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepositoryOutcome {
    Analyzed(RepositoryReport),
    Failed { repository: String, error: String },
}

impl RepositoryOutcome {
    pub fn repository(&self) -> &str {
        match self {
            RepositoryOutcome::Analyzed(report) => &report.repository,
            RepositoryOutcome::Failed { repository, .. } => repository,
        }
    }

    pub fn report(&self) -> Option<&RepositoryReport> {
        match self {
            RepositoryOutcome::Analyzed(report) => Some(report),
            RepositoryOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_projects: usize,
    pub failed_projects: usize,
    pub total_commits: usize,
    pub total_hours: f64,
    pub total_sessions: usize,
    pub avg_hours_per_project: f64,
    pub avg_commits_per_project: f64,
    pub commits_per_hour: f64,
    pub most_productive: Option<String>,
    pub most_active: Option<String>,
    pub most_consistent: Option<String>,
    pub inactive_months: u32,
    pub inactive_projects: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub author: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub repositories: Vec<RepositoryOutcome>,
    pub summary: PortfolioSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekRow {
    pub week: String,
    #[serde(flatten)]
    pub bucket: WeeklyBucket,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub weeks: Vec<WeekRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub file: String,
    pub estimate: EstimationResult,
    pub weekly_stats: WeeklyStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Resolves user-supplied bounds. A date-only `until` covers that whole day.
    pub fn parse(since: Option<&str>, until: Option<&str>) -> Result<Self> {
        let since_dt = since.map(|s| parse_date(s, false)).transpose()?;
        let until_dt = until.map(|u| parse_date(u, true)).transpose()?;

        if let (Some(s), Some(u)) = (since_dt, until_dt) {
            if s > u {
                return Err(HoursError::InvalidDate(format!(
                    "Invalid range: since ({}) is after until ({})",
                    s, u
                )));
            }
        }

        let mut range = DateRange::new();
        if let Some(s) = since_dt {
            range = range.with_since(s);
        }
        if let Some(u) = until_dt {
            range = range.with_until(u);
        }
        Ok(range)
    }

    /// The last `months` calendar months up to `now`.
    pub fn last_months(months: u32, now: DateTime<Utc>) -> Result<Self> {
        let since = now
            .checked_sub_months(Months::new(months))
            .ok_or_else(|| HoursError::InvalidDate(format!("{months} months before {now}")))?;
        Ok(DateRange::new().with_since(since).with_until(now))
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if timestamp < &since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > &until {
                return false;
            }
        }
        true
    }

    /// Whole days spanned, when both ends are bounded.
    pub fn span_days(&self) -> Option<i64> {
        match (self.since, self.until) {
            (Some(s), Some(u)) => Some((u - s).num_days()),
            _ => None,
        }
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::new()
    }
}
