//! Session-based hours estimation.
//!
//! Commits are sorted and walked once. Consecutive commits no further apart
//! than `max_commit_gap` belong to one session and the time between them is
//! counted as work. Every session also gets a fixed `first_commit_bonus` for
//! the work done before its first commit. Idle time between sessions is not
//! counted.

use crate::error::{HoursError, Result};
use crate::model::{Commit, EstimationResult};
use crate::util::{round_hours, MILLIS_PER_HOUR};
use chrono::{DateTime, Utc};
use std::time::Duration;

pub const DEFAULT_MAX_COMMIT_GAP: Duration = Duration::from_secs(2 * 60 * 60);
pub const DEFAULT_FIRST_COMMIT_BONUS: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorConfig {
    max_commit_gap_ms: i64,
    first_commit_bonus_ms: i64,
}

impl EstimatorConfig {
    /// Rejects a zero `max_commit_gap`, which would put every commit in its
    /// own session. A zero bonus is allowed. Both durations must be whole
    /// milliseconds.
    pub fn new(max_commit_gap: Duration, first_commit_bonus: Duration) -> Result<Self> {
        let max_commit_gap_ms = to_millis("max commit gap", max_commit_gap)?;
        if max_commit_gap_ms == 0 {
            return Err(HoursError::InvalidConfig(
                "max commit gap must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            max_commit_gap_ms,
            first_commit_bonus_ms: to_millis("first commit bonus", first_commit_bonus)?,
        })
    }

    pub fn max_commit_gap(&self) -> Duration {
        Duration::from_millis(self.max_commit_gap_ms as u64)
    }

    pub fn first_commit_bonus(&self) -> Duration {
        Duration::from_millis(self.first_commit_bonus_ms as u64)
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            max_commit_gap_ms: DEFAULT_MAX_COMMIT_GAP.as_millis() as i64,
            first_commit_bonus_ms: DEFAULT_FIRST_COMMIT_BONUS.as_millis() as i64,
        }
    }
}

fn to_millis(name: &str, duration: Duration) -> Result<i64> {
    if duration.subsec_nanos() % 1_000_000 != 0 {
        return Err(HoursError::InvalidConfig(format!(
            "{name} of {duration:?} is not a whole number of milliseconds"
        )));
    }
    i64::try_from(duration.as_millis())
        .map_err(|_| HoursError::InvalidConfig(format!("{name} of {duration:?} is too large")))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionEstimator {
    config: EstimatorConfig,
}

struct Tally {
    millis: i128,
    sessions: usize,
}

impl SessionEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn estimate(&self, commits: &[Commit]) -> EstimationResult {
        self.estimate_timestamps(commits.iter().map(|c| c.timestamp))
    }

    pub fn estimate_timestamps<I>(&self, timestamps: I) -> EstimationResult
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut millis: Vec<i64> = timestamps.into_iter().map(|t| t.timestamp_millis()).collect();
        if millis.is_empty() {
            return EstimationResult::default();
        }
        millis.sort_unstable();

        let bonus = self.config.first_commit_bonus_ms as i128;
        let max_gap = self.config.max_commit_gap_ms;

        let tally = millis.windows(2).fold(
            Tally { millis: bonus, sessions: 1 },
            |tally, pair| {
                let gap = pair[1] - pair[0];
                if gap > max_gap {
                    Tally {
                        millis: tally.millis + bonus,
                        sessions: tally.sessions + 1,
                    }
                } else {
                    Tally {
                        millis: tally.millis + gap as i128,
                        sessions: tally.sessions,
                    }
                }
            },
        );

        EstimationResult {
            hours: round_hours(tally.millis as f64 / MILLIS_PER_HOUR),
            session_count: tally.sessions,
            commit_count: millis.len(),
        }
    }
}
