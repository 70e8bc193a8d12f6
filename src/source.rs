use crate::error::{HoursError, Result};
use crate::model::{Commit, DateRange, RawCommit};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

fn repo_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9._-]+)/([A-Za-z0-9._-]+)$").expect("static regex is valid")
    })
}

impl FromStr for RepoId {
    type Err = HoursError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let caps = repo_pattern()
            .captures(trimmed)
            .ok_or_else(|| HoursError::InvalidRepository(s.to_string()))?;
        let (owner, name) = (&caps[1], &caps[2]);
        if [owner, name].iter().any(|part| part.chars().all(|c| c == '.')) {
            return Err(HoursError::InvalidRepository(s.to_string()));
        }
        Ok(RepoId {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Upstream filtering applied by sources before commits reach the estimator.
#[derive(Debug, Clone, Default)]
pub struct CommitFilter {
    pub author: Option<String>,
    pub range: DateRange,
}

impl CommitFilter {
    /// Author matches are case-insensitive substrings; commits without an
    /// author never match an author filter.
    pub fn matches(&self, commit: &Commit) -> bool {
        if !self.range.contains(&commit.timestamp) {
            return false;
        }
        match (&self.author, &commit.author) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(wanted), Some(author)) => author.to_lowercase().contains(&wanted.to_lowercase()),
        }
    }

    pub fn apply(&self, commits: Vec<Commit>) -> Vec<Commit> {
        commits.into_iter().filter(|c| self.matches(c)).collect()
    }
}

/// Supplies pre-fetched commits per repository.
///
/// Implementations are shared across the analysis worker pool.
pub trait CommitSource: Send + Sync {
    fn fetch(&self, repo: &RepoId, filter: &CommitFilter) -> Result<Vec<Commit>>;

    fn describe(&self) -> String;
}

/// Parses a JSON array of raw commits. Any bad timestamp fails the whole file.
pub fn read_export(path: &Path) -> Result<Vec<Commit>> {
    let data = std::fs::read_to_string(path)?;
    let raw: Vec<RawCommit> = serde_json::from_str(&data)?;
    raw.into_iter().map(Commit::try_from).collect()
}

/// A directory of exports laid out as `<root>/<owner>/<name>.json`.
pub struct ExportDir {
    root: PathBuf,
}

impl ExportDir {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(HoursError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("export directory {} does not exist", root.display()),
            )));
        }
        Ok(Self { root })
    }

    pub fn path_for(&self, repo: &RepoId) -> PathBuf {
        self.root.join(&repo.owner).join(format!("{}.json", repo.name))
    }
}

impl CommitSource for ExportDir {
    fn fetch(&self, repo: &RepoId, filter: &CommitFilter) -> Result<Vec<Commit>> {
        let path = self.path_for(repo);
        if !path.is_file() {
            return Err(HoursError::RepositoryNotFound(repo.to_string()));
        }
        let commits = read_export(&path)?;
        log::debug!("read {} commits for {} from {}", commits.len(), repo, path.display());
        Ok(filter.apply(commits))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn parses_repo_ids() {
        let repo: RepoId = "rust-lang/rust.vim".parse().unwrap();
        assert_eq!(repo.owner, "rust-lang");
        assert_eq!(repo.name, "rust.vim");
        assert_eq!(repo.to_string(), "rust-lang/rust.vim");
    }

    #[test]
    fn rejects_malformed_repo_ids() {
        for bad in ["", "owner", "owner/", "/name", "a/b/c", "own er/name", "../etc", "./x"] {
            assert!(bad.parse::<RepoId>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn filter_matches_author_case_insensitively() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let filter = CommitFilter {
            author: Some("ADA".to_string()),
            range: DateRange::new(),
        };
        assert!(filter.matches(&Commit::at(ts).with_author("Ada Lovelace")));
        assert!(!filter.matches(&Commit::at(ts).with_author("Grace")));
        assert!(!filter.matches(&Commit::at(ts)));
        assert!(CommitFilter::default().matches(&Commit::at(ts)));
    }

    #[test]
    fn export_dir_reads_and_filters() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("acme")).unwrap();
        std::fs::write(
            dir.path().join("acme/widgets.json"),
            r#"[
                {"sha": "a", "date": "2024-01-01T09:00:00Z", "author": "Ada"},
                {"sha": "b", "date": "2024-02-01T09:00:00Z", "author": "Ada"},
                {"sha": "c", "date": "2024-01-02T09:00:00Z", "author": "Bob"}
            ]"#,
        )
        .unwrap();

        let source = ExportDir::new(dir.path()).unwrap();
        let repo: RepoId = "acme/widgets".parse().unwrap();
        let filter = CommitFilter {
            author: Some("ada".to_string()),
            range: DateRange::parse(None, Some("2024-01-31")).unwrap(),
        };
        let commits = source.fetch(&repo, &filter).unwrap();
        let ids: Vec<_> = commits.iter().filter_map(|c| c.id.as_deref()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn export_dir_reports_missing_repository() {
        let dir = tempdir().unwrap();
        let source = ExportDir::new(dir.path()).unwrap();
        let repo: RepoId = "acme/ghost".parse().unwrap();
        assert!(matches!(
            source.fetch(&repo, &CommitFilter::default()),
            Err(HoursError::RepositoryNotFound(_))
        ));
    }

    #[test]
    fn one_bad_timestamp_fails_the_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"[{"date": "2024-01-01T09:00:00Z"}, {"date": "not a date"}]"#,
        )
        .unwrap();
        assert!(matches!(read_export(&path), Err(HoursError::InvalidTimestamp { .. })));
    }
}
