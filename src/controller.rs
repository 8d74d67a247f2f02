// src/controller.rs
//
// Orchestration: drains page events, keeps row selections and their change
// subscriptions, decides which fetches are owed, and re-renders the panel
// sections. Rendering is coalesced through a single pending flag, so any
// number of events inside one tick produce at most one render pass.

use std::time::Instant;

use tracing::debug;

use crate::clients::{auth, cashflow, market, warehouse};
use crate::config::consts::{CASHFLOW_REFRESH_EVERY, LABOR_WAIT_TIMEOUT};
use crate::core::dom::{DomEvent, Document, NodeId, ObserverId};
use crate::engine::{Job, Outcome};
use crate::panel::{register_default_sections, RenderCtx, SectionRegistry};
use crate::row;
use crate::state::AppState;

/// Render coalescing: any number of `request` calls collapse into one
/// `take() == true` per tick.
#[derive(Debug, Default)]
pub struct RenderScheduler {
    pending: bool,
}

impl RenderScheduler {
    pub fn request(&mut self) {
        self.pending = true;
    }

    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

struct Selection {
    row: NodeId,
    price_input: NodeId,
    qty_input: NodeId,
    observer: ObserverId,
}

struct LaborWait {
    row: NodeId,
    observer: ObserverId,
    deadline: Instant,
}

pub struct Controller {
    pub state: AppState,
    pub sections: SectionRegistry,
    scheduler: RenderScheduler,
    selection: Option<Selection>,
    production_row: Option<NodeId>,
    labor_wait: Option<LaborWait>,
}

impl Controller {
    pub fn new() -> Self {
        let mut sections = SectionRegistry::new();
        register_default_sections(&mut sections);
        let mut scheduler = RenderScheduler::default();
        // first tick renders the empty states
        scheduler.request();
        Self {
            state: AppState::new(),
            sections,
            scheduler,
            selection: None,
            production_row: None,
            labor_wait: None,
        }
    }

    pub fn selected_row(&self) -> Option<NodeId> {
        self.selection.as_ref().map(|s| s.row)
    }

    pub fn selected_inputs(&self) -> Option<(NodeId, NodeId)> {
        self.selection.as_ref().map(|s| (s.price_input, s.qty_input))
    }

    /// One frame of work: drain events, poll timers, run at most one render
    /// pass. Returns the fetch jobs the caller should hand to the worker.
    pub fn tick(&mut self, doc: &mut Document, now: Instant) -> Vec<Job> {
        for event in doc.take_events() {
            self.handle_event(doc, event, now);
        }

        if self.selection.is_none() {
            self.auto_select_first(doc);
        }

        self.poll(doc, now);

        if self.scheduler.take() {
            self.recompute(doc, now)
        } else {
            Vec::new()
        }
    }

    fn handle_event(&mut self, doc: &mut Document, event: DomEvent, now: Instant) {
        match event {
            DomEvent::Focus(target) => {
                if row::is_sell_input(doc, target) {
                    if let Some(r) = row::sell_row_from_target(doc, target) {
                        self.select_sell_row(doc, r);
                    }
                } else if row::is_amount_input(doc, target) {
                    if let Some(r) = row::production_row_from_target(doc, target) {
                        self.select_production_row(doc, r, now);
                    }
                }
            }
            DomEvent::Input(target) => {
                if let Some(sel) = &self.selection {
                    if target == sel.price_input || target == sel.qty_input {
                        self.scheduler.request();
                    }
                }
                if row::is_amount_input(doc, target) {
                    let r = row::production_row_from_target(doc, target);
                    if r.is_some() && r == self.production_row {
                        self.refresh_production_amount(doc);
                    }
                }
            }
            DomEvent::Mutated(obs) => {
                if self.selection.as_ref().map(|s| s.observer) == Some(obs) {
                    self.scheduler.request();
                }
                if self.labor_wait.as_ref().map(|w| w.observer) == Some(obs) {
                    self.check_labor(doc);
                }
            }
        }
    }

    /// Switch the sale selection. The old subscription is torn down before
    /// the new one attaches; a swapped-out row can't fire anything after
    /// this point.
    fn select_sell_row(&mut self, doc: &mut Document, r: NodeId) {
        if self.selection.as_ref().map(|s| s.row) == Some(r) {
            self.scheduler.request();
            return;
        }
        if let Some(old) = self.selection.take() {
            doc.disconnect(old.observer);
        }
        let Some((price_input, qty_input)) = row::sell_inputs(doc, r) else {
            return;
        };
        let observer = doc.observe(r);
        debug!("Controller: selected sale row {r:?}");
        self.selection = Some(Selection { row: r, price_input, qty_input, observer });

        // new product of interest, the market view follows on next render
        self.scheduler.request();
    }

    fn auto_select_first(&mut self, doc: &mut Document) {
        let root = doc.root();
        let Some(input) = doc.find_descendant(root, |d, n| row::is_sell_input(d, n)) else {
            return;
        };
        if let Some(r) = row::sell_row_from_target(doc, input) {
            self.select_sell_row(doc, r);
        }
    }

    fn select_production_row(&mut self, doc: &mut Document, r: NodeId, now: Instant) {
        if self.production_row != Some(r) {
            if let Some(wait) = self.labor_wait.take() {
                doc.disconnect(wait.observer);
            }
            self.production_row = Some(r);
        }

        let prod = &mut self.state.production;
        prod.product_id = row::extract_product_id(doc, r);
        prod.quantity = amount_of(doc, r);
        // new selection, prices must be re-resolved
        prod.prices = None;
        prod.error = None;
        prod.loading = false;

        match row::extract_labor_cost(doc, r) {
            Some(v) if v > 0.0 => {
                prod.labor_cost = v;
            }
            _ => {
                // labor arrives async from the host; watch the row for it
                prod.labor_cost = 0.0;
                if self.labor_wait.is_none() {
                    let observer = doc.observe(r);
                    self.labor_wait = Some(LaborWait {
                        row: r,
                        observer,
                        deadline: now + LABOR_WAIT_TIMEOUT,
                    });
                }
            }
        }
        self.scheduler.request();
    }

    fn refresh_production_amount(&mut self, doc: &Document) {
        let Some(r) = self.production_row else { return };
        let prod = &mut self.state.production;
        prod.quantity = amount_of(doc, r);
        // the host recomputes labor with the amount
        if let Some(v) = row::extract_labor_cost(doc, r) {
            prod.labor_cost = v;
        }
        self.scheduler.request();
    }

    fn check_labor(&mut self, doc: &mut Document) {
        let Some(wait_row) = self.labor_wait.as_ref().map(|w| w.row) else {
            return;
        };
        if let Some(v) = row::extract_labor_cost(doc, wait_row).filter(|&v| v > 0.0) {
            if let Some(wait) = self.labor_wait.take() {
                doc.disconnect(wait.observer);
            }
            self.state.production.labor_cost = v;
            self.scheduler.request();
        }
    }

    /// Timer-driven work: the labor wait deadline and the periodic cashflow
    /// refresh.
    fn poll(&mut self, doc: &mut Document, now: Instant) {
        if self.labor_wait.as_ref().is_some_and(|w| now >= w.deadline) {
            debug!("Controller: labor cost wait timed out, assuming 0");
            if let Some(wait) = self.labor_wait.take() {
                doc.disconnect(wait.observer);
            }
            self.state.production.labor_cost = 0.0;
            self.scheduler.request();
        }

        let cf = &self.state.cashflow;
        if cf.loaded && !cf.loading {
            if let Some(at) = cf.last_refresh {
                if now.saturating_duration_since(at) >= CASHFLOW_REFRESH_EVERY {
                    self.scheduler.request();
                }
            }
        }
    }

    /// The single render pass: figure out what's owed on the wire, then
    /// re-render every expanded section off the state snapshot.
    fn recompute(&mut self, doc: &Document, now: Instant) -> Vec<Job> {
        let mut jobs = Vec::new();

        jobs.extend(auth::ensure(&mut self.state));
        jobs.extend(warehouse::ensure(&mut self.state));

        let refresh_due = self
            .state
            .cashflow
            .last_refresh
            .map(|at| now.saturating_duration_since(at) >= CASHFLOW_REFRESH_EVERY)
            .unwrap_or(false);
        jobs.extend(cashflow::ensure(&mut self.state, refresh_due));

        if let Some(sel) = &self.selection {
            if let Some(product) = row::extract_product_id(doc, sel.row) {
                jobs.extend(market::ensure_for_product(&mut self.state, product, now));
            }
        }

        if self.state.production.product_id.is_some() && self.labor_wait.is_none() {
            jobs.extend(market::ensure_production_prices(&mut self.state, now));
        }

        let ctx = RenderCtx {
            state: &self.state,
            doc,
            selected_row: self.selection.as_ref().map(|s| s.row),
            now,
        };
        self.sections.update_expanded(&ctx);

        jobs
    }

    /// Fold a finished fetch back into state. Every completion re-renders;
    /// stale-tag filtering happens inside the client `apply` functions.
    pub fn apply_outcome(&mut self, outcome: Outcome, now: Instant) {
        match outcome {
            Outcome::Auth(result) => auth::apply(&mut self.state, result),
            Outcome::Inventory(result) => warehouse::apply(&mut self.state, result),
            Outcome::Market { realm, product, result } => {
                market::apply(&mut self.state, realm, product, result, now)
            }
            Outcome::ProductionPrices { realm, product, result } => {
                market::apply_production_prices(&mut self.state, realm, product, result, now)
            }
            Outcome::Cashflow(result) => cashflow::apply(&mut self.state, result, now),
        }
        self.scheduler.request();
    }

    pub fn toggle_section(&mut self, id: &str, doc: &Document, now: Instant) {
        let ctx = RenderCtx {
            state: &self.state,
            doc,
            selected_row: self.selection.as_ref().map(|s| s.row),
            now,
        };
        self.sections.toggle(id, &ctx);
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

fn amount_of(doc: &Document, r: NodeId) -> f64 {
    match doc.find_descendant(r, |d, n| d.is_input_named(n, "amount")) {
        Some(input) => row::read_amount(doc, input),
        None => 1.0,
    }
}
