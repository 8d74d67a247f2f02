// src/state.rs
//
// The single shared state the whole overlay works against. Owned by the
// controller and threaded through function signatures; there are no ambient
// singletons. Event handlers and fetch completions mutate it from one thread,
// so nothing here needs locking.

use std::collections::HashMap;
use std::time::Instant;

use crate::clients::cashflow::CashflowTx;
use crate::clients::market::Listing;

/// Company/realm identity, populated once per page lifetime.
#[derive(Debug, Default)]
pub struct AuthState {
    pub company_id: Option<i64>,
    pub realm_id: Option<i32>,
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    /// Realm used as the cache partition key; 0 until auth resolves.
    pub fn realm_or_default(&self) -> i32 {
        self.realm_id.unwrap_or(0)
    }
}

/// Per-kind inventory aggregate. Absence of a kind means zero known
/// inventory, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryLine {
    pub kind: u32,
    pub amount: f64,
    pub total_cost: f64,
    pub market_cost: f64,
    pub workers: f64,
    pub admin: f64,
    pub materials: f64,
}

#[derive(Debug, Default)]
pub struct InventoryState {
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub by_kind: HashMap<u32, InventoryLine>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SalesSummary {
    pub sales_count: u32,
    pub sales_money: f64,
}

#[derive(Debug, Clone, Default)]
pub struct DayBucket {
    pub items: Vec<CashflowTx>,
    pub summary: SalesSummary,
}

#[derive(Debug, Default)]
pub struct CashflowState {
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub today: DayBucket,
    pub yesterday: DayBucket,
    pub last_refresh: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketStatus {
    Idle,
    Loading,
    Ok,
    Error,
}

/// The one market query currently of interest, tagged with the request's
/// `(realm, product)` so late responses for superseded products can be
/// recognized and dropped.
#[derive(Debug)]
pub struct MarketView {
    pub status: MarketStatus,
    pub realm: i32,
    pub product: Option<u32>,
    pub listings: Vec<Listing>,
    pub error: Option<String>,
}

impl Default for MarketView {
    fn default() -> Self {
        Self {
            status: MarketStatus::Idle,
            realm: 0,
            product: None,
            listings: Vec::new(),
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarketEntry {
    pub fetched_at: Instant,
    pub listings: Vec<Listing>,
}

#[derive(Debug, Default)]
pub struct MarketState {
    /// `(realm, product)` → last fetched order book. Stale entries are
    /// overwritten on refetch, never evicted up front.
    pub cache: HashMap<(i32, u32), MarketEntry>,
    pub view: MarketView,
}

/// Production helper scratch state for the currently selected production row.
#[derive(Debug, Default)]
pub struct ProductionState {
    pub product_id: Option<u32>,
    pub quantity: f64,
    pub labor_cost: f64,
    /// Unit prices per product id; `None` until fetched for this selection.
    /// Ids with no market offer are simply absent from the map.
    pub prices: Option<HashMap<u32, f64>>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub auth: AuthState,
    pub inventory: InventoryState,
    pub cashflow: CashflowState,
    pub market: MarketState,
    pub production: ProductionState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
