use crate::error::{HoursError, Result};
use crate::model::{Commit, SCHEMA_VERSION};
use crate::source::{CommitFilter, CommitSource, RepoId};
use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection, ToSql};
use std::path::{Path, PathBuf};

/// SQLite-backed commit store.
///
/// Every call opens its own connection, so one store can serve the whole
/// analysis worker pool without locking.
pub struct CommitStore {
    path: PathBuf,
}

impl CommitStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let store = Self { path };
        let conn = store.connect()?;
        Self::initialize(&conn)?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    fn initialize(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS commits (
                repository TEXT NOT NULL,
                id TEXT,
                author TEXT,
                message TEXT,
                url TEXT,
                timestamp INTEGER NOT NULL,
                UNIQUE (repository, id)
            );
            CREATE INDEX IF NOT EXISTS idx_commits_repository_timestamp
                ON commits(repository, timestamp);
            ",
        )?;
        Self::check_schema_version(conn)
    }

    fn check_schema_version(conn: &Connection) -> Result<()> {
        let user_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if user_version == 0 {
            conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
        } else if user_version != SCHEMA_VERSION as i64 {
            return Err(HoursError::Store(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, user_version
            )));
        }

        Ok(())
    }

    /// Upserts commits for `repo`. Commits with an id replace earlier rows
    /// with the same id; commits without one are always appended.
    pub fn import(&self, repo: &RepoId, commits: &[Commit]) -> Result<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let repository = repo.to_string();

        {
            let mut insert_stmt = tx.prepare(
                "INSERT OR REPLACE INTO commits (repository, id, author, message, url, timestamp)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for commit in commits {
                insert_stmt.execute(params![
                    repository,
                    commit.id,
                    commit.author,
                    commit.message,
                    commit.url,
                    commit.timestamp.timestamp_millis(),
                ])?;
            }
        }

        tx.commit()?;
        log::info!("stored {} commits for {}", commits.len(), repository);
        Ok(commits.len())
    }

    pub fn repositories(&self) -> Result<Vec<RepoId>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT DISTINCT repository FROM commits ORDER BY repository")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        names.iter().map(|name| name.parse()).collect()
    }

    fn has_repository(conn: &Connection, repository: &str) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM commits WHERE repository = ?",
            params![repository],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl CommitSource for CommitStore {
    fn fetch(&self, repo: &RepoId, filter: &CommitFilter) -> Result<Vec<Commit>> {
        let conn = self.connect()?;
        let repository = repo.to_string();
        if !Self::has_repository(&conn, &repository)? {
            return Err(HoursError::RepositoryNotFound(repository));
        }

        let mut query = String::from(
            "SELECT id, author, message, url, timestamp FROM commits WHERE repository = ?",
        );
        let mut to_bind: Vec<Box<dyn ToSql>> = vec![Box::new(repository.clone())];

        if let Some(since) = &filter.range.since {
            query.push_str(" AND timestamp >= ?");
            to_bind.push(Box::new(since.timestamp_millis()));
        }
        if let Some(until) = &filter.range.until {
            query.push_str(" AND timestamp <= ?");
            to_bind.push(Box::new(until.timestamp_millis()));
        }
        query.push_str(" ORDER BY timestamp");

        let mut stmt = conn.prepare(&query)?;
        let bind_refs: Vec<&dyn ToSql> = to_bind.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(bind_refs.as_slice(), |row| {
            let ms: i64 = row.get(4)?;
            let timestamp = Utc.timestamp_millis_opt(ms).single().ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(
                    4,
                    "timestamp".to_string(),
                    rusqlite::types::Type::Integer,
                )
            })?;
            Ok(Commit {
                id: row.get(0)?,
                author: row.get(1)?,
                message: row.get(2)?,
                url: row.get(3)?,
                timestamp,
            })
        })?;

        let commits = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        log::debug!("loaded {} commits for {} from store", commits.len(), repository);

        // Range already applied in SQL.
        let by_author = CommitFilter {
            author: filter.author.clone(),
            ..CommitFilter::default()
        };
        Ok(by_author.apply(commits))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
