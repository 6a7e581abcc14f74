//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured glossary store and apply first-run seed data.
//! - Print a deterministic summary for quick local sanity checks.

use glossary_core::{
    core_version, open_store, seed_defaults, HistoryService, SqliteHistoryRepository,
    SqliteTermRepository, StoreConfig, TermListQuery, TermRepository,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("glossary_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = StoreConfig::from_env();
    config.init_logging()?;

    let mut conn = open_store(&config)?;
    seed_defaults(&mut conn)?;

    let term_count = {
        let repo = SqliteTermRepository::try_new(&mut conn)?;
        repo.list_terms(&TermListQuery::default())?.len()
    };
    let history = HistoryService::new(SqliteHistoryRepository::try_new(&conn)?);
    let recent = history.list_recent(None)?;

    info!(
        "event=cli_summary module=cli status=ok terms={} history_rows={}",
        term_count,
        recent.items.len()
    );
    println!("glossary_core version={}", core_version());
    println!("db_path={}", config.db_path.display());
    println!("terms={term_count}");
    println!(
        "recent_history={} (limit {})",
        recent.items.len(),
        recent.applied_limit
    );
    Ok(())
}
