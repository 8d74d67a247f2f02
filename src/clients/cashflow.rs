// src/clients/cashflow.rs
//
// Transaction feed, paged backwards from a "recent" head by last-item-id
// cursor. Precondition inherited from upstream: the feed is in strictly
// descending datetime order within and across pages. The scan stops at the
// first out-of-window item instead of filtering whole pages, which is only
// correct under that ordering.

use std::time::Instant;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::consts::{API_BASE, CASHFLOW_PAGE_CAP};
use crate::engine::Job;
use crate::net::{NetError, Transport};
use crate::state::{AppState, DayBucket, SalesSummary};

pub const CATEGORY_SALE: &str = "s";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CashflowTx {
    pub id: Option<i64>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub money: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub datetime: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CashflowPage {
    #[serde(default)]
    pub data: Vec<CashflowTx>,
    #[serde(rename = "oldestPulled", default)]
    pub oldest_pulled: bool,
}

/// Local-midnight cutoffs, fixed at load time (ms since epoch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub today_start_ms: i64,
    pub yesterday_start_ms: i64,
}

impl DayWindow {
    pub fn current_local() -> Self {
        let today = Local::now().date_naive();
        let midnight = |d: chrono::NaiveDate| {
            d.and_hms_opt(0, 0, 0)
                .and_then(|naive| Local.from_local_datetime(&naive).earliest())
                .map(|dt| dt.timestamp_millis())
                .unwrap_or_default()
        };
        Self {
            today_start_ms: midnight(today),
            yesterday_start_ms: midnight(today - chrono::Days::new(1)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CashflowSnapshot {
    pub today: DayBucket,
    pub yesterday: DayBucket,
}

fn recent_url() -> String {
    format!("{API_BASE}/api/v2/companies/me/cashflow/recent/")
}

fn page_url(last_id: i64) -> String {
    format!("{API_BASE}/api/v2/companies/me/cashflow/{last_id}/")
}

/// Feed timestamps are ISO datetimes; NaN-equivalent (None) when unparseable.
fn parse_dt_ms(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    // some feeds drop the offset; read those as UTC
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc().timestamp_millis())
}

/// Load guard. `force` bypasses the loaded-once check (periodic refresh) but
/// never the in-flight one.
pub fn ensure(state: &mut AppState, force: bool) -> Option<Job> {
    let cf = &mut state.cashflow;
    if cf.loading {
        return None;
    }
    if cf.loaded && !force {
        return None;
    }
    cf.loading = true;
    cf.error = None;
    Some(Job::Cashflow { window: DayWindow::current_local() })
}

/// Page through the feed, bucketing into today/yesterday, until an item falls
/// off the window, the source reports exhaustion, or the page cap trips.
pub fn collect_window<F>(window: &DayWindow, mut fetch_page: F) -> Result<CashflowSnapshot, NetError>
where
    F: FnMut(Option<i64>) -> Result<CashflowPage, NetError>,
{
    let mut today = Vec::new();
    let mut yesterday = Vec::new();
    let mut cursor: Option<i64> = None;
    let mut pages = 0usize;

    loop {
        if pages >= CASHFLOW_PAGE_CAP {
            debug!("Cashflow: page cap {CASHFLOW_PAGE_CAP} reached, stopping");
            break;
        }
        pages += 1;

        let page = fetch_page(cursor)?;

        let mut hit_older = false;
        for tx in &page.data {
            match parse_dt_ms(&tx.datetime) {
                Some(ms) if ms >= window.today_start_ms => today.push(tx.clone()),
                Some(ms) if ms >= window.yesterday_start_ms => yesterday.push(tx.clone()),
                // older than the window, or a timestamp we can't read:
                // descending order means nothing further can be in-window
                _ => {
                    hit_older = true;
                    break;
                }
            }
        }

        if hit_older || page.oldest_pulled {
            break;
        }
        match page.data.last().and_then(|tx| tx.id) {
            Some(last_id) => cursor = Some(last_id),
            None => break,
        }
    }

    Ok(CashflowSnapshot {
        today: bucket(today),
        yesterday: bucket(yesterday),
    })
}

fn bucket(items: Vec<CashflowTx>) -> DayBucket {
    let summary = summarize(&items);
    DayBucket { items, summary }
}

/// Sales-only rollup; other categories count for nothing here.
pub fn summarize(items: &[CashflowTx]) -> SalesSummary {
    let mut summary = SalesSummary::default();
    for tx in items {
        if tx.category != CATEGORY_SALE {
            continue;
        }
        summary.sales_count += 1;
        summary.sales_money += tx.money;
    }
    summary
}

pub fn run(transport: &dyn Transport, window: DayWindow) -> Result<CashflowSnapshot, NetError> {
    collect_window(&window, |cursor| {
        let url = match cursor {
            None => recent_url(),
            Some(last_id) => page_url(last_id),
        };
        let body = transport.get(&url)?;
        serde_json::from_str(&body).map_err(|e| NetError::Decode(e.to_string()))
    })
}

/// Wholesale snapshot replacement; never merged.
pub fn apply(state: &mut AppState, result: Result<CashflowSnapshot, NetError>, now: Instant) {
    let cf = &mut state.cashflow;
    cf.loading = false;
    match result {
        Ok(snapshot) => {
            cf.today = snapshot.today;
            cf.yesterday = snapshot.yesterday;
            cf.loaded = true;
            cf.last_refresh = Some(now);
            debug!(
                "Cashflow: today={} txs (${:.2} sales), yesterday={} txs",
                cf.today.items.len(),
                cf.today.summary.sales_money,
                cf.yesterday.items.len()
            );
        }
        Err(e) => {
            cf.error = Some(e.to_string());
            warn!("Cashflow: load failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: i64, cat: &str, money: f64, dt: &str) -> CashflowTx {
        CashflowTx {
            id: Some(id),
            category: cat.to_string(),
            money,
            description: String::new(),
            datetime: dt.to_string(),
        }
    }

    #[test]
    fn summary_counts_sales_only() {
        let items = vec![
            tx(1, "s", 100.0, ""),
            tx(2, "b", -40.0, ""),
            tx(3, "s", 50.0, ""),
            tx(4, "w", -10.0, ""),
        ];
        let s = summarize(&items);
        assert_eq!(s.sales_count, 2);
        assert_eq!(s.sales_money, 150.0);
    }

    #[test]
    fn datetime_parsing() {
        assert!(parse_dt_ms("2026-08-30T10:00:00Z").is_some());
        assert!(parse_dt_ms("2026-08-30T10:00:00.123456").is_some());
        assert!(parse_dt_ms("not a date").is_none());
    }

    #[test]
    fn force_respects_in_flight_guard() {
        let mut state = AppState::new();
        assert!(ensure(&mut state, false).is_some());
        assert!(ensure(&mut state, true).is_none()); // in flight
        apply(&mut state, Ok(CashflowSnapshot::default()), Instant::now());
        assert!(ensure(&mut state, false).is_none()); // loaded
        assert!(ensure(&mut state, true).is_some()); // forced refresh
    }
}
