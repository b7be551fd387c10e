use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use crate::cli::flags::{Cli, Command};
use crate::config::{load_config, AppConfig};
use crate::core::output::{
    render_analysis, render_history, render_statistics, write_report, ReportFormat,
};
use crate::core::store::{filter_history, history_statistics, sort_history, HistoryStore};
use crate::core::types::{SortKey, SortOrder};
use crate::pipeline::fallback::classify;
use crate::sources::webhook::WorkflowClient;

pub async fn run(cli: Cli) -> Result<()> {
    let cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Analyze { log, file, offline } => run_analyze(&cfg, log, file, offline).await,
        Command::History {
            sort_by,
            order,
            min_score,
            max_score,
        } => run_history(&cfg, sort_by.into(), order.into(), min_score, max_score),
        Command::Delete { id } => run_delete(&cfg, &id),
        Command::Clear => run_clear(&cfg),
        Command::Stats => run_stats(&cfg),
        Command::Report { format, output } => run_report(&cfg, format.into(), &output),
    }
}

fn open_store(cfg: &AppConfig) -> Result<HistoryStore> {
    Ok(HistoryStore::new(Path::new(&cfg.db_path))?)
}

async fn run_analyze(
    cfg: &AppConfig,
    log: Option<String>,
    file: Option<PathBuf>,
    offline: bool,
) -> Result<()> {
    let log_input = match (log, file) {
        (Some(text), None) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)?,
        (Some(_), Some(_)) => return Err(anyhow!("pass the log inline or via --file, not both")),
        (None, None) => return Err(anyhow!("no log provided; pass it inline or via --file")),
    };
    if log_input.trim().is_empty() {
        return Err(anyhow!("the provided log is empty"));
    }

    let analysis = if offline {
        tracing::info!("offline mode: using the keyword fallback classifier");
        classify(&log_input)
    } else {
        let client = WorkflowClient::new(cfg)?;
        client.analyze(&log_input).await?
    };

    print!("{}", render_analysis(&analysis));

    // mock results never reach the history store
    if !analysis.mock {
        let mut store = open_store(cfg)?;
        match store.save(&analysis, &log_input) {
            Some(entry) => tracing::info!("saved history entry {}", entry.id),
            None => eprintln!("warning: analysis could not be persisted to history"),
        }
    }
    Ok(())
}

fn run_history(
    cfg: &AppConfig,
    sort_key: SortKey,
    order: SortOrder,
    min_score: u8,
    max_score: u8,
) -> Result<()> {
    let store = open_store(cfg)?;
    let entries = store.list();
    let entries = filter_history(&entries, min_score, max_score);
    let entries = sort_history(&entries, sort_key, order);
    print!("{}", render_history(&entries));
    Ok(())
}

fn run_delete(cfg: &AppConfig, id: &str) -> Result<()> {
    let mut store = open_store(cfg)?;
    if !store.delete(id) {
        return Err(anyhow!("failed to persist deletion of entry {}", id));
    }
    println!("deleted {} (no-op if the id was absent)", id);
    Ok(())
}

fn run_clear(cfg: &AppConfig) -> Result<()> {
    let mut store = open_store(cfg)?;
    if !store.clear() {
        return Err(anyhow!("failed to clear history"));
    }
    println!("history cleared");
    Ok(())
}

fn run_stats(cfg: &AppConfig) -> Result<()> {
    let store = open_store(cfg)?;
    let stats = history_statistics(&store.list());
    print!("{}", render_statistics(&stats));
    Ok(())
}

fn run_report(cfg: &AppConfig, format: ReportFormat, output: &Path) -> Result<()> {
    let store = open_store(cfg)?;
    let entries = store.list();
    let stats = history_statistics(&entries);
    write_report(&entries, &stats, format, output)?;
    tracing::info!("report written to {}", output.display());
    Ok(())
}
