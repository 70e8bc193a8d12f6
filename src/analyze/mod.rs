pub mod exec;
pub mod output;
pub mod portfolio;
pub mod repository;

pub use exec::exec;
pub use output::{output_json, output_ndjson, output_table};
pub use portfolio::summarize;
pub use repository::{analyze_repositories, analyze_repository, RECENT_COMMITS};
