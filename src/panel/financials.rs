// src/panel/financials.rs
//
// Daily sales rollup from the cashflow feed: today's total with per-tx
// average, the most recent transactions, and yesterday's figure for contrast.

use chrono::{DateTime, NaiveDateTime};

use crate::clients::cashflow::CashflowTx;
use crate::core::parse::format_money;
use crate::panel::{kv, RenderCtx};

pub const SECTION_ID: &str = "financials-section";

const MAX_ITEMS_SHOWN: usize = 10;

fn category_label(category: &str) -> &'static str {
    match category {
        "s" => "Sale",
        "b" => "Buy",
        "w" => "Wages",
        _ => "Other",
    }
}

// Same tolerance as the cashflow client: RFC 3339, or offset-less read as-is.
fn time_only(datetime: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(datetime) {
        return dt.format("%H:%M").to_string();
    }
    NaiveDateTime::parse_from_str(datetime, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|n| n.format("%H:%M").to_string())
        .unwrap_or_else(|_| "—".to_string())
}

fn render_items(items: &[CashflowTx]) -> String {
    if items.is_empty() {
        return "<div class=\"scx-muted\">No transactions</div>".to_string();
    }
    let mut out = String::new();
    for tx in items.iter().take(MAX_ITEMS_SHOWN) {
        let desc = if tx.description.is_empty() {
            "Transaction"
        } else {
            tx.description.as_str()
        };
        let sign = if tx.money >= 0.0 { "+" } else { "" };
        out.push_str(&format!(
            "<div class=\"scx-tx\"><div class=\"scx-tx-cat\">{}</div>\
             <div class=\"scx-tx-desc\">{}</div>\
             <div class=\"scx-tx-money\">{}{}</div>\
             <div class=\"scx-tx-time\">{}</div></div>",
            category_label(&tx.category),
            desc,
            sign,
            format_money(tx.money),
            time_only(&tx.datetime)
        ));
    }
    out
}

fn refresh_age(ctx: &RenderCtx) -> String {
    let Some(at) = ctx.state.cashflow.last_refresh else {
        return "never".to_string();
    };
    let ago = ctx.now.saturating_duration_since(at).as_secs();
    if ago < 60 {
        format!("{ago}s ago")
    } else if ago < 3600 {
        format!("{}m ago", ago / 60)
    } else {
        format!("{}h ago", ago / 3600)
    }
}

pub fn render(ctx: &RenderCtx) -> String {
    let cf = &ctx.state.cashflow;

    if cf.loading && !cf.loaded {
        return "<div class=\"scx-muted\">Loading cashflow data...</div>".to_string();
    }
    if let Some(e) = &cf.error {
        return format!("<div class=\"scx-note scx-note-error\">Error: {e}</div>");
    }
    if !cf.loaded {
        return "<div class=\"scx-muted\">No cashflow data available</div>".to_string();
    }

    let today = &cf.today.summary;
    let avg = if today.sales_count > 0 {
        today.sales_money / today.sales_count as f64
    } else {
        0.0
    };

    let mut out = String::new();
    out.push_str("<div class=\"scx-panel\">");
    out.push_str(
        "<div class=\"scx-panel-head\"><div class=\"scx-panel-title\">Today's Sales Summary</div></div>",
    );
    out.push_str(&format!(
        "<div class=\"scx-big\">{}</div>",
        format_money(today.sales_money)
    ));
    out.push_str("<div class=\"scx-grid\">");
    out.push_str(&kv("Transactions", &today.sales_count.to_string()));
    out.push_str(&kv("Avg per TX", &format_money(avg)));
    out.push_str(&kv(
        "Yesterday",
        &format_money(cf.yesterday.summary.sales_money),
    ));
    out.push_str("</div><hr>");

    out.push_str("<div class=\"scx-panel-title\">Recent Transactions</div>");
    out.push_str(&render_items(&cf.today.items));

    out.push_str(&format!(
        "<div class=\"scx-muted\">Last updated: {}</div>",
        refresh_age(ctx)
    ));
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dom::Document;
    use crate::state::AppState;
    use std::time::Instant;

    fn ctx_render(state: &AppState) -> String {
        let doc = Document::new();
        let ctx = RenderCtx {
            state,
            doc: &doc,
            selected_row: None,
            now: Instant::now(),
        };
        render(&ctx)
    }

    #[test]
    fn idle_and_loading_states() {
        let mut state = AppState::new();
        assert!(ctx_render(&state).contains("No cashflow data"));
        state.cashflow.loading = true;
        assert!(ctx_render(&state).contains("Loading cashflow"));
    }

    #[test]
    fn offsetless_datetimes_still_render_a_time() {
        assert_eq!(time_only("2026-08-30T14:05:00Z"), "14:05");
        assert_eq!(time_only("2026-08-30T14:05:00.123456"), "14:05");
        assert_eq!(time_only("not a date"), "—");
    }

    #[test]
    fn summary_renders_totals() {
        let mut state = AppState::new();
        state.cashflow.loaded = true;
        state.cashflow.today.summary.sales_count = 2;
        state.cashflow.today.summary.sales_money = 300.0;
        let html = ctx_render(&state);
        assert!(html.contains("$300.00"));
        assert!(html.contains("$150.00")); // avg per tx
    }
}
