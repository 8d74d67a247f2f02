// src/row.rs
//
// Locating and reading sale/production rows in the host page tree. The host
// markup has no stable ids, so row detection is an ancestor walk: the legacy
// wrapper class when present, otherwise the smallest ancestor that carries
// the row's characteristic inputs. All extraction is best-effort and answers
// NaN/None rather than erroring; the page owes us nothing.

use crate::config::consts::{
    FINISHES_LABEL, LABOR_LABEL, LEGACY_ROW_CLASS, MAX_ROW_WALK, PROFIT_LABEL,
};
use crate::core::dom::{Document, NodeId};
use crate::core::parse::{
    first_money_token, has_explicit_minus, is_loss_red, parse_duration_secs, parse_number,
};
use crate::core::sanitize::normalize_ws;

pub fn is_sell_input(doc: &Document, id: NodeId) -> bool {
    doc.is_input_named(id, "price") || doc.is_input_named(id, "quantity")
}

pub fn is_amount_input(doc: &Document, id: NodeId) -> bool {
    doc.is_input_named(id, "amount")
}

/// The price/quantity input pair of a sale row.
pub fn sell_inputs(doc: &Document, row: NodeId) -> Option<(NodeId, NodeId)> {
    let price = doc.find_descendant(row, |d, n| d.is_input_named(n, "price"))?;
    let qty = doc.find_descendant(row, |d, n| d.is_input_named(n, "quantity"))?;
    Some((price, qty))
}

fn resource_link(doc: &Document, root: NodeId) -> Option<NodeId> {
    doc.find_descendant(root, |d, n| {
        d.tag(n) == "a"
            && d.attr(n, "href")
                .map(|h| h.contains("/encyclopedia/") && h.contains("/resource/"))
                .unwrap_or(false)
    })
}

/// Row element around an interacted node. The legacy wrapper class wins when
/// an ancestor still carries it; otherwise the walk prefers the smallest
/// ancestor holding both sale inputs plus the resource link, falling back to
/// inputs alone. Bounded, and never past `<body>`.
pub fn sell_row_from_target(doc: &Document, target: NodeId) -> Option<NodeId> {
    let mut cur = Some(target);
    for _ in 0..=MAX_ROW_WALK {
        let Some(n) = cur else { break };
        if doc.has_class(n, LEGACY_ROW_CLASS) {
            return Some(n);
        }
        if doc.tag(n) == "body" {
            break;
        }
        cur = doc.parent(n);
    }

    let mut inputs_only = None;
    let mut cur = Some(target);
    for _ in 0..=MAX_ROW_WALK {
        let Some(n) = cur else { break };
        if !doc.is_text(n) && sell_inputs(doc, n).is_some() {
            if resource_link(doc, n).is_some() {
                return Some(n);
            }
            if inputs_only.is_none() {
                inputs_only = Some(n);
            }
        }
        if doc.tag(n) == "body" {
            break;
        }
        cur = doc.parent(n);
    }
    inputs_only
}

/// Production rows are marked by an `amount` input next to the resource link.
pub fn production_row_from_target(doc: &Document, target: NodeId) -> Option<NodeId> {
    let mut cur = Some(target);
    for _ in 0..=MAX_ROW_WALK {
        let Some(n) = cur else { break };
        if !doc.is_text(n)
            && doc
                .find_descendant(n, |d, m| d.is_input_named(m, "amount"))
                .is_some()
            && resource_link(doc, n).is_some()
        {
            return Some(n);
        }
        if doc.tag(n) == "body" {
            break;
        }
        cur = doc.parent(n);
    }
    None
}

/// Product id from the encyclopedia link: the digits after `/resource/`.
pub fn extract_product_id(doc: &Document, row: NodeId) -> Option<u32> {
    let link = resource_link(doc, row)?;
    let href = doc.attr(link, "href")?;
    let at = href.find("/resource/")? + "/resource/".len();
    let digits: String = href[at..].chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// First element in document order whose text contains `label`. Outermost on
/// purpose: the label and its value often sit in sibling spans, and only the
/// common ancestor's text carries both.
fn label_holder(doc: &Document, row: NodeId, label: &str) -> Option<NodeId> {
    doc.subtree(row)
        .into_iter()
        .find(|&n| !doc.is_text(n) && doc.text_content(n).contains(label))
}

fn text_after_label(doc: &Document, holder: NodeId, label: &str) -> Option<String> {
    let text = normalize_ws(&doc.text_content(holder));
    let at = text.find(label)?;
    Some(text[at + label.len()..].to_string())
}

/// Per-unit profit as the host renders it. The sign comes from an explicit
/// minus or parenthesis when present, else from the red-text heuristic.
/// NaN when the label or the amount is missing.
pub fn extract_profit_per_unit(doc: &Document, row: NodeId) -> f64 {
    let Some(holder) = label_holder(doc, row, PROFIT_LABEL) else {
        return f64::NAN;
    };
    let Some(tail) = text_after_label(doc, holder, PROFIT_LABEL) else {
        return f64::NAN;
    };
    let Some(tok) = first_money_token(&tail) else {
        return f64::NAN;
    };
    let mag = parse_number(&tail[tok.0..tok.1]).abs();
    if has_explicit_minus(&tail, tok) {
        return -mag;
    }

    let needle: String = tail[tok.0..tok.1]
        .trim_start_matches(['-', '\u{2212}', '$'])
        .to_string();
    let red = doc
        .find_descendant(holder, |d, n| d.is_text(n) && d.text_content(n).contains(&needle))
        .and_then(|n| doc.effective_color(n))
        .map(is_loss_red)
        .unwrap_or(false);
    if red { -mag } else { mag }
}

/// Time-to-finish in seconds. A parenthesized duration ("(2h 30m)") wins over
/// the surrounding prose, which tends to hold an absolute timestamp.
pub fn extract_finish_seconds(doc: &Document, row: NodeId) -> f64 {
    let Some(holder) = label_holder(doc, row, FINISHES_LABEL) else {
        return f64::NAN;
    };
    let Some(tail) = text_after_label(doc, holder, FINISHES_LABEL) else {
        return f64::NAN;
    };
    if let (Some(open), Some(close)) = (tail.find('('), tail.rfind(')')) {
        if open < close {
            let inner = parse_duration_secs(&tail[open + 1..close]);
            if inner.is_finite() {
                return inner;
            }
        }
    }
    parse_duration_secs(&tail)
}

/// Labor cost line of a production row. `None` while the host hasn't
/// rendered the label yet (it arrives async); the caller times that out.
pub fn extract_labor_cost(doc: &Document, row: NodeId) -> Option<f64> {
    let holder = label_holder(doc, row, LABOR_LABEL)?;
    let tail = text_after_label(doc, holder, LABOR_LABEL)?;
    let v = parse_number(&tail);
    Some(if v.is_finite() { v } else { 0.0 })
}

/// Display name: the first non-empty `h3` that isn't a column header.
pub fn product_name(doc: &Document, row: NodeId) -> String {
    for n in doc.subtree(row) {
        if doc.tag(n) != "h3" {
            continue;
        }
        let text = normalize_ws(&doc.text_content(n));
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let lower = text.to_ascii_lowercase();
        if lower == "quantity" || lower == "price" {
            continue;
        }
        return text.to_string();
    }
    "Unknown".to_string()
}

pub fn read_price(doc: &Document, input: NodeId) -> f64 {
    parse_number(doc.value(input))
}

pub fn read_quantity(doc: &Document, input: NodeId) -> f64 {
    parse_number(doc.value(input))
}

/// Production amount; anything unusable reads as a single unit.
pub fn read_amount(doc: &Document, input: NodeId) -> f64 {
    let a = parse_number(doc.value(input));
    if a.is_finite() && a > 0.0 { a } else { 1.0 }
}
