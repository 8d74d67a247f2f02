// src/config/consts.rs

use std::time::Duration;

// Net config
pub const API_BASE: &str = "https://www.simcompanies.com";
pub const USER_AGENT: &str = "sc_sidekick/0.3";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// Market
/// Cached order books are served without a refetch inside this window.
pub const MARKET_FRESH_WINDOW: Duration = Duration::from_secs(30);
/// Fee the exchange takes on gross sale proceeds.
pub const MARKET_FEE: f64 = 0.04;

// Cashflow
/// Hard ceiling on backward pagination, runaway safeguard.
pub const CASHFLOW_PAGE_CAP: usize = 30;
pub const CASHFLOW_REFRESH_EVERY: Duration = Duration::from_secs(5 * 60);

// Row scraping
/// Bounded ancestor walk when locating the row around an input.
pub const MAX_ROW_WALK: usize = 25;
/// Old page layout wrapper class, tried before the heuristic walk.
pub const LEGACY_ROW_CLASS: &str = "css-mv4qyq";

// Labels the host page renders next to the values we extract.
pub const PROFIT_LABEL: &str = "Profit per unit:";
pub const FINISHES_LABEL: &str = "Finishes:";
pub const LABOR_LABEL: &str = "Labor cost:";

/// The host renders losses in red without a minus sign. A value whose
/// effective text color clears these thresholds is treated as negative.
pub const RED_R_MIN: u8 = 150;
pub const RED_G_MAX: u8 = 100;
pub const RED_B_MAX: u8 = 100;

/// How long to wait for the server-driven labor cost to show up in a
/// production row before falling back to zero.
pub const LABOR_WAIT_TIMEOUT: Duration = Duration::from_secs(3);

// Profit-per-minute classification, inclusive lower bounds.
pub const PPM_EXCELLENT: f64 = 50.0;
pub const PPM_GOOD: f64 = 20.0;
pub const PPM_MEH: f64 = 5.0;
