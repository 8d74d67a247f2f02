// src/main.rs
// Desktop profitability sidebar for Sim Companies.
// Usage:
//   cargo run --release -- --page snapshot.html
//   cargo run --release -- --url https://www.simcompanies.com/market/...

use std::error::Error;
use std::fs;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sc_sidekick::config::options::Options;
use sc_sidekick::core::html;
use sc_sidekick::engine::FetchWorker;
use sc_sidekick::gui;
use sc_sidekick::net::{HttpTransport, Transport};

fn main() -> Result<(), Box<dyn Error>> {
    let options = Options::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&options.log).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let transport = Arc::new(HttpTransport::new()?);

    let page = match (&options.page, &options.url) {
        (Some(path), _) => {
            info!("Init: loading page snapshot from {}", path.display());
            fs::read_to_string(path)?
        }
        (None, Some(url)) => {
            info!("Init: fetching page from {url}");
            transport.get(url)?
        }
        (None, None) => {
            info!("Init: no page given, starting empty");
            String::new()
        }
    };

    let doc = html::parse_document(&page);
    if let Some(realm) = options.realm {
        info!("Init: realm override {realm}");
    }

    let worker = FetchWorker::spawn(transport);

    let native = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1080.0, 720.0]),
        ..Default::default()
    };
    gui::run(doc, worker, options.realm, native)?;
    Ok(())
}
