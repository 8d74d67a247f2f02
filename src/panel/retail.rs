// src/panel/retail.rs
//
// Sale-row profitability panel: rate metrics with a verdict chip, the cost
// basis of held stock, and the live order book next to the user's ask.

use crate::clients::market::cheapest_listing;
use crate::core::parse::{format_money, format_money_rate};
use crate::metrics::{sell_metrics, Band};
use crate::panel::{kv, RenderCtx};
use crate::row;
use crate::state::MarketStatus;

pub const SECTION_ID: &str = "retail-section";

const DASH: &str = "—";

struct InventoryView {
    status: &'static str,
    stock: String,
    cpu: String,
    src: &'static str,
    basis: String,
    note: String,
}

impl InventoryView {
    fn placeholder(status: &'static str, note: String) -> Self {
        Self {
            status,
            stock: DASH.into(),
            cpu: DASH.into(),
            src: DASH,
            basis: DASH.into(),
            note,
        }
    }
}

fn inventory_view(ctx: &RenderCtx, kind: Option<u32>) -> InventoryView {
    let inv = &ctx.state.inventory;
    if inv.loading {
        return InventoryView::placeholder("Loading", String::new());
    }
    if let Some(e) = &inv.error {
        return InventoryView::placeholder("Error", e.clone());
    }
    if !inv.loaded {
        return InventoryView::placeholder("Idle", String::new());
    }

    let line = kind.and_then(|k| inv.by_kind.get(&k));
    let Some(line) = line else {
        let mut v = InventoryView::placeholder("OK", String::new());
        v.stock = "0".into();
        return v;
    };

    let cpu = if line.amount > 0.0 {
        format_money(line.total_cost / line.amount)
    } else {
        DASH.into()
    };
    let produced = line.workers + line.admin + line.materials;
    let src = if line.market_cost > 0.0 && produced > 0.0 {
        "Mixed"
    } else if line.market_cost > 0.0 {
        "Market"
    } else if produced > 0.0 {
        "Produced"
    } else {
        "Unknown"
    };

    InventoryView {
        status: "OK",
        stock: format!("{}", line.amount.floor() as i64),
        cpu,
        src,
        basis: format_money(line.total_cost),
        note: format!(
            "Mix: market {} | produced {}",
            format_money(line.market_cost),
            format_money(produced)
        ),
    }
}

struct MarketPanelView {
    status: &'static str,
    cheapest_price: String,
    cheapest_qty: String,
    you_vs: String,
    note: String,
}

impl MarketPanelView {
    fn placeholder(status: &'static str, note: String) -> Self {
        Self {
            status,
            cheapest_price: DASH.into(),
            cheapest_qty: DASH.into(),
            you_vs: DASH.into(),
            note,
        }
    }
}

fn market_view(ctx: &RenderCtx, product: Option<u32>, your_price: f64) -> MarketPanelView {
    let view = &ctx.state.market.view;

    // a view tagged for some other product is as good as still loading
    if view.product.is_some() && product.is_some() && view.product != product {
        return MarketPanelView::placeholder("Loading", String::new());
    }

    match view.status {
        MarketStatus::Idle => MarketPanelView::placeholder("Idle", String::new()),
        MarketStatus::Loading => MarketPanelView::placeholder("Loading", String::new()),
        MarketStatus::Error => {
            MarketPanelView::placeholder("Error", view.error.clone().unwrap_or_default())
        }
        MarketStatus::Ok => {
            let Some(cheapest) = cheapest_listing(&view.listings) else {
                return MarketPanelView::placeholder("Empty", String::new());
            };
            let delta = your_price - cheapest.price;
            let you_vs = if delta.is_finite() {
                format!("{}{:.2}", if delta > 0.0 { "+" } else { "" }, delta)
            } else {
                DASH.into()
            };
            MarketPanelView {
                status: "OK",
                cheapest_price: format_money(cheapest.price),
                cheapest_qty: cheapest
                    .quantity
                    .map(|q| format!("{q}"))
                    .unwrap_or_else(|| DASH.into()),
                you_vs,
                note: String::new(),
            }
        }
    }
}

fn money_or_dash(x: f64) -> String {
    if x.is_finite() { format_money(x) } else { DASH.into() }
}

pub fn render(ctx: &RenderCtx) -> String {
    let Some(selected) = ctx.selected_row else {
        return "<div class=\"scx-muted\">No item selected</div>\
                <div class=\"scx-muted\">Click Quantity or Price to show stats.</div>"
            .to_string();
    };

    let doc = ctx.doc;
    let name = row::product_name(doc, selected);
    let product = row::extract_product_id(doc, selected);

    let (price, qty) = match row::sell_inputs(doc, selected) {
        Some((p, q)) => (row::read_price(doc, p), row::read_quantity(doc, q)),
        None => (f64::NAN, f64::NAN),
    };
    let m = sell_metrics(
        row::extract_profit_per_unit(doc, selected),
        qty,
        row::extract_finish_seconds(doc, selected),
    );
    let chip = Band::classify(m.profit_per_minute);

    let inv = inventory_view(ctx, product);
    let mv = market_view(ctx, product, price);

    let mut out = String::new();
    out.push_str("<div class=\"scx-panel\">");
    out.push_str(&format!("<div class=\"scx-name\">{name}</div>"));

    out.push_str(&format!(
        "<div class=\"scx-panel-head\"><div class=\"scx-panel-title\">Profit per minute</div>\
         <div class=\"scx-chip {}\">{}</div></div>",
        chip.chip_class(),
        chip.label()
    ));
    out.push_str(&format!(
        "<div class=\"scx-big\">{}</div>",
        if m.profit_per_minute.is_finite() {
            format_money_rate(m.profit_per_minute, "min")
        } else {
            DASH.into()
        }
    ));

    out.push_str("<div class=\"scx-grid\">");
    out.push_str(&kv("Profit/hr", &money_or_dash(m.profit_per_hour)));
    out.push_str(&kv("Net profit", &money_or_dash(m.total_profit)));
    out.push_str(&kv(
        "Time",
        &if m.finish_secs.is_finite() {
            format!("{}s", m.finish_secs.round() as i64)
        } else {
            DASH.into()
        },
    ));
    out.push_str(&kv("Per unit", &money_or_dash(m.profit_per_unit)));
    out.push_str("</div><hr>");

    out.push_str(&format!(
        "<div class=\"scx-panel-head\"><div class=\"scx-panel-title\">Your cost</div>\
         <div class=\"scx-chip scx-chip-na\">{}</div></div>",
        inv.status
    ));
    out.push_str("<div class=\"scx-grid\">");
    out.push_str(&kv("Stock", &inv.stock));
    out.push_str(&kv("Avg cost/unit", &inv.cpu));
    out.push_str(&kv("Source", inv.src));
    out.push_str(&kv("Cost basis", &inv.basis));
    out.push_str("</div>");
    if !inv.note.is_empty() {
        out.push_str(&format!("<div class=\"scx-note\">{}</div>", inv.note));
    }
    out.push_str("<hr>");

    out.push_str(&format!(
        "<div class=\"scx-panel-head\"><div class=\"scx-panel-title\">Market</div>\
         <div class=\"scx-chip scx-chip-na\">{}</div></div>",
        mv.status
    ));
    out.push_str("<div class=\"scx-grid\">");
    out.push_str(&kv("Cheapest", &mv.cheapest_price));
    out.push_str(&kv("Qty", &mv.cheapest_qty));
    out.push_str(&kv("You vs cheap", &mv.you_vs));
    out.push_str("</div>");
    if !mv.note.is_empty() {
        out.push_str(&format!("<div class=\"scx-note\">{}</div>", mv.note));
    }
    out.push_str("</div>");
    out
}
