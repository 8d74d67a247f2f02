// src/panel/production.rs
//
// Production cost/sale analysis for the selected production row: material
// breakdown priced off the order books, labor, total and per-unit cost, then
// the fee-adjusted outcome of selling the batch at the current best ask.

use crate::core::parse::format_money;
use crate::metrics::{production_cost, sell_profit, CostBreakdown, SellAnalysis};
use crate::panel::{kv, RenderCtx};
use crate::recipes;

pub const SECTION_ID: &str = "production-section";

const DASH: &str = "—";

fn money_or_dash(x: f64) -> String {
    if x.is_finite() { format_money(x) } else { DASH.into() }
}

fn render_materials(breakdown: &CostBreakdown) -> String {
    if breakdown.materials.is_empty() {
        return "<div class=\"scx-muted\">No materials required</div>".to_string();
    }
    let mut out = String::new();
    for mc in &breakdown.materials {
        out.push_str(&format!(
            "<div class=\"scx-mat\"><div class=\"scx-mat-name\">{}</div>\
             <div class=\"scx-mat-qty\">Qty: {}</div>\
             <div class=\"scx-mat-unit\">{} /unit</div>\
             <div class=\"scx-mat-cost\">{}</div></div>",
            recipes::name_of(mc.id),
            mc.needed,
            money_or_dash(mc.unit_price),
            money_or_dash(mc.cost)
        ));
    }
    out
}

fn render_sale(analysis: &SellAnalysis) -> String {
    if !analysis.profit.is_finite() {
        return "<div class=\"scx-note scx-note-warn\">\
                Cannot calculate profit - missing market prices</div>"
            .to_string();
    }
    let sign = if analysis.profit > 0.0 { "+" } else { "" };
    let mut out = String::new();
    out.push_str(
        "<hr><div class=\"scx-panel-head\"><div class=\"scx-panel-title\">Selling Analysis</div></div>",
    );
    out.push_str("<div class=\"scx-grid\">");
    out.push_str(&kv("Gross Proceeds", &format_money(analysis.gross)));
    out.push_str(&kv("Market Fee (4%)", &format!("-{}", format_money(analysis.fee))));
    out.push_str(&kv("Net Proceeds", &format_money(analysis.net)));
    out.push_str(&kv("Profit", &format!("{sign}{}", format_money(analysis.profit))));
    out.push_str("</div>");
    out.push_str(&format!(
        "<div class=\"scx-margin\"><div class=\"scx-k\">Profit Margin</div>\
         <div class=\"scx-v\">{}%</div></div>",
        if analysis.margin.is_finite() {
            format!("{:.1}", analysis.margin * 100.0)
        } else {
            DASH.into()
        }
    ));
    out
}

pub fn render(ctx: &RenderCtx) -> String {
    let prod = &ctx.state.production;

    let Some(product) = prod.product_id else {
        return "<div class=\"scx-muted\">Click on a production</div>\
                <div class=\"scx-muted\">quantity field to analyze.</div>"
            .to_string();
    };

    let Some(recipe) = recipes::by_product(product) else {
        return "<div class=\"scx-muted\">Recipe not found</div>".to_string();
    };

    if let Some(e) = &prod.error {
        return format!("<div class=\"scx-note scx-note-error\">Error loading prices: {e}</div>");
    }
    let Some(prices) = &prod.prices else {
        return "<div class=\"scx-muted\">Loading prices...</div>".to_string();
    };

    let amount = if prod.quantity > 0.0 { prod.quantity } else { 1.0 };
    let breakdown = production_cost(recipe, amount, prod.labor_cost, prices);

    let mut out = String::new();
    out.push_str("<div class=\"scx-panel\">");
    out.push_str(&format!(
        "<div class=\"scx-name\">{}</div><div class=\"scx-muted\">Qty: {amount}</div>",
        recipe.name
    ));
    out.push_str("<hr><div class=\"scx-panel-head\"><div class=\"scx-panel-title\">Materials Cost</div></div>");
    out.push_str(&render_materials(&breakdown));

    out.push_str("<div class=\"scx-grid\">");
    out.push_str(&kv("Labor", &money_or_dash(breakdown.labor)));
    out.push_str(&kv("Total Production Cost", &money_or_dash(breakdown.total)));
    out.push_str(&kv("Per Unit", &money_or_dash(breakdown.total / amount)));
    out.push_str("</div>");

    match prices.get(&product) {
        Some(&ask) => {
            let analysis = sell_profit(ask, amount, breakdown.total);
            out.push_str(&render_sale(&analysis));
        }
        None => {
            out.push_str(
                "<div class=\"scx-note scx-note-warn\">No market price for this product</div>",
            );
        }
    }
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dom::Document;
    use crate::state::AppState;
    use std::collections::HashMap;
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
    fn empty_and_loading_states() {
        let mut state = AppState::new();
        assert!(ctx_render(&state).contains("Click on a production"));
        state.production.product_id = Some(12);
        assert!(ctx_render(&state).contains("Loading prices"));
    }

    #[test]
    fn full_analysis_renders() {
        let mut state = AppState::new();
        state.production.product_id = Some(12);
        state.production.quantity = 10.0;
        state.production.labor_cost = 3.0;
        state.production.prices = Some(HashMap::from([(12, 10.0), (11, 4.0), (1, 2.0)]));
        let html = ctx_render(&state);
        assert!(html.contains("Petrol"));
        assert!(html.contains("Selling Analysis"));
        // gross 100, fee 4, cost 28, profit 68
        assert!(html.contains("$68.00"));
    }
}
