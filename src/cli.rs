use crate::estimate::{EstimatorConfig, SessionEstimator};
use crate::model::DateRange;
use crate::source::{CommitFilter, CommitSource, ExportDir};
use crate::store::CommitStore;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STORE_PATH: &str = ".githours/store.db";

#[derive(Parser)]
#[command(name = "githours")]
#[command(about = "Estimate development hours from commit history across repositories")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "Directory of JSON commit exports laid out as <owner>/<name>.json", conflicts_with = "store")]
    pub exports: Option<PathBuf>,

    #[arg(long, help = "Path to commit store database [default: .githours/store.db]")]
    pub store: Option<PathBuf>,

    #[arg(long, env = "GITHOURS_AUTHOR", help = "Only count commits whose author contains this text")]
    pub author: Option<String>,

    #[arg(long, help = "Start from this date (RFC3339, YYYY-MM-DD, or natural language)")]
    pub since: Option<String>,

    #[arg(long, help = "End at this date, inclusive (RFC3339, YYYY-MM-DD, or natural language)")]
    pub until: Option<String>,

    #[arg(long, help = "Only analyze the last N months", conflicts_with_all = ["since", "until"])]
    pub months: Option<u32>,

    #[arg(long, help = "Longest idle gap between commits of one session", value_parser = humantime::parse_duration, default_value = "2h")]
    pub max_commit_gap: Duration,

    #[arg(long, help = "Time credited before the first commit of each session", value_parser = humantime::parse_duration, default_value = "2h")]
    pub first_commit_bonus: Duration,
}

impl CommonArgs {
    pub fn estimator(&self) -> Result<SessionEstimator> {
        let config = EstimatorConfig::new(self.max_commit_gap, self.first_commit_bonus)
            .context("Invalid estimator settings")?;
        Ok(SessionEstimator::new(config))
    }

    pub fn filter(&self) -> Result<CommitFilter> {
        let range = match self.months {
            Some(months) => DateRange::last_months(months, Utc::now()),
            None => DateRange::parse(self.since.as_deref(), self.until.as_deref()),
        }
        .context("Failed to resolve date range")?;

        Ok(CommitFilter {
            author: self.author.clone(),
            range,
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
    }

    pub fn open_store(&self) -> Result<CommitStore> {
        let path = self.store_path();
        CommitStore::open(&path)
            .with_context(|| format!("Failed to open commit store {}", path.display()))
    }

    pub fn open_source(&self) -> Result<Box<dyn CommitSource>> {
        match &self.exports {
            Some(dir) => {
                let source = ExportDir::new(dir)
                    .with_context(|| format!("Failed to open export directory {}", dir.display()))?;
                Ok(Box::new(source))
            }
            None => Ok(Box::new(self.open_store()?)),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate hours for one or more repositories
    Analyze {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(long, help = "Months without commits before a repository counts as inactive", default_value_t = crate::analyze::portfolio::DEFAULT_INACTIVE_MONTHS)]
        inactive_months: u32,

        #[arg(env = "GITHOURS_REPOS", value_delimiter = ',', help = "Repositories as owner/name")]
        repos: Vec<String>,
    },
    /// Week-by-week hours for one repository
    Weekly {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,

        #[arg(help = "Repository as owner/name")]
        repo: String,
    },
    /// Load a JSON commit export into the commit store
    Import {
        #[arg(help = "Repository as owner/name")]
        repo: String,

        #[arg(help = "JSON export file")]
        file: PathBuf,
    },
    /// Estimate hours straight from a JSON commit export
    Estimate {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(help = "JSON export file")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Analyze { json, ndjson, inactive_months, repos } => {
                crate::analyze::exec(self.common, repos, json, ndjson, inactive_months)
            }
            Commands::Weekly { json, ndjson, repo } => {
                crate::timeline::exec(self.common, &repo, json, ndjson)
            }
            Commands::Import { repo, file } => crate::import::exec(self.common, &repo, &file),
            Commands::Estimate { json, file } => crate::timeline::exec_file(self.common, &file, json),
        }
    }
}
