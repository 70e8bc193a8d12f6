use crate::estimate::SessionEstimator;
use crate::model::{Commit, WeeklyBucket, WeeklyStats};
use crate::util::week_key;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Buckets commits by the UTC Monday of their week and estimates each week
/// on its own.
///
/// A session running across Sunday midnight is split and both halves get
/// the first-commit bonus, so the bucket hours need not add up to the
/// estimate over the whole history. `YYYY-MM-DD` keys sort chronologically.
pub fn weekly_stats(estimator: &SessionEstimator, commits: &[Commit]) -> WeeklyStats {
    let mut weeks: BTreeMap<String, Vec<DateTime<Utc>>> = BTreeMap::new();
    for commit in commits {
        weeks
            .entry(week_key(&commit.timestamp))
            .or_default()
            .push(commit.timestamp);
    }

    weeks
        .into_iter()
        .map(|(week, timestamps)| {
            let commit_count = timestamps.len();
            let estimate = estimator.estimate_timestamps(timestamps);
            (
                week,
                WeeklyBucket {
                    commit_count,
                    hours: estimate.hours,
                    session_count: estimate.session_count,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Commit {
        Commit::at(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
    }

    #[test]
    fn empty_input_has_no_weeks() {
        assert!(weekly_stats(&SessionEstimator::default(), &[]).is_empty());
    }

    #[test]
    fn groups_by_monday_in_chronological_order() {
        let commits = vec![
            at(2024, 1, 10, 10, 0),
            at(2024, 1, 1, 9, 0),
            at(2024, 1, 1, 11, 30),
            at(2024, 1, 3, 14, 0),
        ];
        let stats = weekly_stats(&SessionEstimator::default(), &commits);
        let keys: Vec<&str> = stats.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2024-01-01", "2024-01-08"]);
        assert_eq!(
            stats["2024-01-01"],
            WeeklyBucket { commit_count: 3, hours: 6.5, session_count: 2 }
        );
        assert_eq!(
            stats["2024-01-08"],
            WeeklyBucket { commit_count: 1, hours: 2.0, session_count: 1 }
        );
    }

    #[test]
    fn session_across_week_boundary_is_split() {
        let commits = vec![at(2024, 1, 7, 23, 30), at(2024, 1, 8, 0, 30)];
        let estimator = SessionEstimator::default();

        let whole = estimator.estimate(&commits);
        assert_eq!(whole.hours, 3.0);
        assert_eq!(whole.session_count, 1);

        let stats = weekly_stats(&estimator, &commits);
        let weekly_hours: f64 = stats.values().map(|b| b.hours).sum();
        let weekly_sessions: usize = stats.values().map(|b| b.session_count).sum();
        assert_eq!(weekly_hours, 4.0);
        assert_eq!(weekly_sessions, 2);
    }

    #[test]
    fn offset_timestamps_are_keyed_in_utc() {
        let local_monday = DateTime::parse_from_rfc3339("2024-01-08T01:00:00+02:00")
            .unwrap()
            .with_timezone(&Utc);
        let stats = weekly_stats(&SessionEstimator::default(), &[Commit::at(local_monday)]);
        let keys: Vec<&str> = stats.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2024-01-01"]);
    }

    proptest! {
        #[test]
        fn prop_every_commit_lands_in_one_bucket(offsets in prop::collection::vec(0i64..200_000, 0..80)) {
            let start = Utc.with_ymd_and_hms(2023, 12, 20, 0, 0, 0).unwrap();
            let commits: Vec<Commit> = offsets
                .iter()
                .map(|m| Commit::at(start + Duration::minutes(*m)))
                .collect();
            let stats = weekly_stats(&SessionEstimator::default(), &commits);
            let total: usize = stats.values().map(|b| b.commit_count).sum();
            prop_assert_eq!(total, commits.len());
            for bucket in stats.values() {
                prop_assert!(bucket.commit_count > 0);
                prop_assert!(bucket.session_count >= 1);
            }
        }
    }
}
