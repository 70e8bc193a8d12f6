//! Estimate development hours from commit timestamps.
//!
//! Commits are grouped into coding sessions: runs of commits no further
//! apart than a configurable gap. Each session is credited the time between
//! its commits plus a fixed bonus for the work before its first commit.
//! [`estimate::SessionEstimator`] does this over a whole history and
//! [`weekly::weekly_stats`] repeats it per ISO week. The [`analyze`] module
//! feeds both from a [`source::CommitSource`] for many repositories at once.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use githours::estimate::SessionEstimator;
//! use githours::model::Commit;
//!
//! let commits = vec![
//!     Commit::at(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()),
//!     Commit::at(Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap()),
//! ];
//! let result = SessionEstimator::default().estimate(&commits);
//! assert_eq!(result.hours, 3.5);
//! assert_eq!(result.session_count, 1);
//! ```

pub mod analyze;
pub mod cli;
pub mod error;
pub mod estimate;
pub mod import;
pub mod model;
pub mod source;
pub mod store;
pub mod timeline;
pub mod util;
pub mod weekly;
