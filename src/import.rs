use crate::cli::CommonArgs;
use crate::source::{read_export, RepoId};
use anyhow::{bail, Context, Result};
use console::style;
use std::path::Path;

pub fn exec(common: CommonArgs, repo: &str, file: &Path) -> Result<()> {
    if common.exports.is_some() {
        bail!("import writes to the commit store; drop --exports");
    }

    let repo: RepoId = repo.parse()?;
    let commits = read_export(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let store = common.open_store()?;
    let stored = store
        .import(&repo, &commits)
        .with_context(|| format!("Failed to import commits for {repo}"))?;

    println!(
        "Imported {} commits for {} into {}",
        style(stored).cyan(),
        style(&repo).bold(),
        store.path().display()
    );
    Ok(())
}
