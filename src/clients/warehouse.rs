// src/clients/warehouse.rs
//
// Full warehouse snapshot for the authenticated company, rebuilt wholesale
// into a by-kind aggregate. No pagination; the API returns everything.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::consts::API_BASE;
use crate::engine::Job;
use crate::net::{NetError, Transport};
use crate::state::{AppState, InventoryLine};

/// One raw inventory batch as the API reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResource {
    pub kind: Option<u32>,
    #[serde(default)]
    pub amount: f64,
    pub cost: Option<RawCost>,
}

/// Per-batch cost breakdown. Absent components read as zero.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawCost {
    #[serde(default)]
    pub workers: f64,
    #[serde(default)]
    pub admin: f64,
    #[serde(default)]
    pub material1: f64,
    #[serde(default)]
    pub material2: f64,
    #[serde(default)]
    pub material3: f64,
    #[serde(default)]
    pub material4: f64,
    #[serde(default)]
    pub material5: f64,
    #[serde(default)]
    pub market: f64,
}

impl RawCost {
    pub fn materials(&self) -> f64 {
        self.material1 + self.material2 + self.material3 + self.material4 + self.material5
    }

    pub fn total(&self) -> f64 {
        self.workers + self.admin + self.materials() + self.market
    }
}

fn url(company_id: i64) -> String {
    format!("{API_BASE}/api/v3/resources/{company_id}/")
}

/// Load-once guard; silently no-ops until auth has resolved a company id
/// (retried on a later tick once the prerequisite lands).
pub fn ensure(state: &mut AppState) -> Option<Job> {
    let inv = &state.inventory;
    if inv.loaded || inv.loading {
        return None;
    }
    let company_id = state.auth.company_id?;
    state.inventory.loading = true;
    state.inventory.error = None;
    Some(Job::Inventory { company_id })
}

pub fn run(transport: &dyn Transport, company_id: i64) -> Result<Vec<RawResource>, NetError> {
    let body = transport.get(&url(company_id))?;
    serde_json::from_str(&body).map_err(|e| NetError::Decode(e.to_string()))
}

pub fn apply(state: &mut AppState, result: Result<Vec<RawResource>, NetError>) {
    let inv = &mut state.inventory;
    inv.loading = false;
    match result {
        Ok(items) => {
            inv.by_kind = aggregate(&items);
            inv.loaded = true;
            debug!("Inventory: {} batches → {} kinds", items.len(), inv.by_kind.len());
        }
        Err(e) => {
            inv.error = Some(e.to_string());
            warn!("Inventory: load failed: {e}");
        }
    }
}

/// Sum batches per kind. Amounts and every cost component are strictly
/// additive across batches of the same kind.
pub fn aggregate(items: &[RawResource]) -> HashMap<u32, InventoryLine> {
    let mut by_kind: HashMap<u32, InventoryLine> = HashMap::new();
    for item in items {
        let Some(kind) = item.kind else { continue };
        let cost = item.cost.unwrap_or_default();

        let line = by_kind.entry(kind).or_insert_with(|| InventoryLine {
            kind,
            ..Default::default()
        });
        line.amount += item.amount;
        line.total_cost += cost.total();
        line.market_cost += cost.market;
        line.workers += cost.workers;
        line.admin += cost.admin;
        line.materials += cost.materials();
    }
    by_kind
}
