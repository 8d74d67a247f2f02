// src/config/options.rs

use std::path::PathBuf;
use clap::Parser;

/// Desktop profitability sidebar for Sim Companies.
///
/// Point it at a saved page snapshot (or a URL to fetch) and it mirrors the
/// sell/production rows it finds there, augmented with live API data.
#[derive(Debug, Clone, Parser)]
#[command(name = "sc_sidekick", version, about)]
pub struct Options {
    /// Local HTML snapshot of a game page to load rows from.
    #[arg(long, value_name = "FILE", conflicts_with = "url")]
    pub page: Option<PathBuf>,

    /// Fetch the page to scrape from a URL instead of a local file.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Realm override for offline snapshots (normally resolved from auth).
    #[arg(long, value_name = "ID")]
    pub realm: Option<i32>,

    /// Log filter, e.g. "info" or "sc_sidekick=debug".
    #[arg(long, default_value = "info")]
    pub log: String,
}
