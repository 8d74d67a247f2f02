// src/clients/market.rs
//
// Order book for one (realm, product) pair, with a short freshness window so
// hammering the same row doesn't hammer the endpoint. The view state carries
// the request's (realm, product) tag; completions are applied only if the tag
// still matches, which is what keeps a slow response for a superseded product
// from clobbering the current one.

use std::collections::HashMap;
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::consts::{API_BASE, MARKET_FRESH_WINDOW};
use crate::engine::Job;
use crate::net::{NetError, Transport};
use crate::recipes;
use crate::state::{AppState, MarketEntry, MarketStatus, MarketView};

/// One order-book entry. The feed delivers listings sorted ascending by
/// price; the cheapest is by definition the first element.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Listing {
    pub price: Option<f64>,
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cheapest {
    pub price: f64,
    pub quantity: Option<f64>,
}

fn url(realm: i32, product: u32) -> String {
    format!("{API_BASE}/api/v3/market/{realm}/{product}/")
}

/// First listing, or None for an empty or malformed book.
pub fn cheapest_listing(listings: &[Listing]) -> Option<Cheapest> {
    let first = listings.first()?;
    let price = first.price.filter(|p| p.is_finite())?;
    Some(Cheapest {
        price,
        quantity: first.quantity.filter(|q| q.is_finite()),
    })
}

fn cached_fresh<'a>(
    state: &'a AppState,
    realm: i32,
    product: u32,
    now: Instant,
) -> Option<&'a MarketEntry> {
    state
        .market
        .cache
        .get(&(realm, product))
        .filter(|e| now.duration_since(e.fetched_at) < MARKET_FRESH_WINDOW)
}

/// Make the view track `product`, fetching only when the cache is stale.
/// A matching in-flight or settled view is left alone (Error included, so a
/// failed fetch isn't retried in a tight render loop).
pub fn ensure_for_product(state: &mut AppState, product: u32, now: Instant) -> Option<Job> {
    let realm = state.auth.realm_or_default();

    let view = &state.market.view;
    if view.product == Some(product) && view.realm == realm && view.status != MarketStatus::Idle {
        return None;
    }

    if let Some(entry) = cached_fresh(state, realm, product, now) {
        let listings = entry.listings.clone();
        state.market.view = MarketView {
            status: MarketStatus::Ok,
            realm,
            product: Some(product),
            listings,
            error: None,
        };
        return None;
    }

    state.market.view = MarketView {
        status: MarketStatus::Loading,
        realm,
        product: Some(product),
        listings: Vec::new(),
        error: None,
    };
    Some(Job::Market { realm, product })
}

pub fn run(transport: &dyn Transport, realm: i32, product: u32) -> Result<Vec<Listing>, NetError> {
    let body = transport.get(&url(realm, product))?;
    serde_json::from_str(&body).map_err(|e| NetError::Decode(e.to_string()))
}

/// Apply a completed fetch. The cache is always refreshed on success; the
/// view only if `(realm, product)` still matches the current interest.
pub fn apply(
    state: &mut AppState,
    realm: i32,
    product: u32,
    result: Result<Vec<Listing>, NetError>,
    now: Instant,
) {
    if let Ok(listings) = &result {
        state.market.cache.insert(
            (realm, product),
            MarketEntry { fetched_at: now, listings: listings.clone() },
        );
    }

    let view = &mut state.market.view;
    if view.product != Some(product) || view.realm != realm {
        debug!("Market: dropping stale response for realm={realm} product={product}");
        return;
    }

    match result {
        Ok(listings) => {
            view.status = MarketStatus::Ok;
            view.listings = listings;
            view.error = None;
        }
        Err(e) => {
            view.status = MarketStatus::Error;
            view.listings = Vec::new();
            view.error = Some(e.to_string());
            warn!("Market: fetch failed for realm={realm} product={product}: {e}");
        }
    }
}

// ----- production price prefetch (same endpoint, shared cache)

/// Unit prices for the selected recipe's product + materials. Only ids whose
/// cache entry is stale go on the wire; if everything is fresh the prices are
/// published synchronously.
pub fn ensure_production_prices(state: &mut AppState, now: Instant) -> Option<Job> {
    let prod = &state.production;
    if prod.loading || prod.prices.is_some() || prod.error.is_some() {
        return None;
    }
    let product = prod.product_id?;
    let recipe = recipes::by_product(product)?;

    let realm = state.auth.realm_or_default();
    let mut ids: Vec<u32> = vec![product];
    ids.extend(recipe.materials.iter().map(|m| m.id));

    let stale: Vec<u32> = ids
        .iter()
        .copied()
        .filter(|&id| cached_fresh(state, realm, id, now).is_none())
        .collect();

    if stale.is_empty() {
        state.production.prices = Some(prices_from_cache(state, realm, &ids, now));
        return None;
    }

    state.production.loading = true;
    Some(Job::ProductionPrices { realm, product, ids: stale })
}

pub fn run_production_prices(
    transport: &dyn Transport,
    realm: i32,
    ids: &[u32],
) -> Result<Vec<(u32, Vec<Listing>)>, NetError> {
    // Strictly sequential; one endpoint, be polite.
    let mut out = Vec::with_capacity(ids.len());
    for &id in ids {
        out.push((id, run(transport, realm, id)?));
    }
    Ok(out)
}

pub fn apply_production_prices(
    state: &mut AppState,
    realm: i32,
    product: u32,
    result: Result<Vec<(u32, Vec<Listing>)>, NetError>,
    now: Instant,
) {
    state.production.loading = false;

    if state.production.product_id != Some(product) {
        debug!("Market: dropping stale price batch for product={product}");
        return;
    }

    match result {
        Ok(books) => {
            for (id, listings) in books {
                state
                    .market
                    .cache
                    .insert((realm, id), MarketEntry { fetched_at: now, listings });
            }
            if let Some(recipe) = recipes::by_product(product) {
                let mut ids: Vec<u32> = vec![product];
                ids.extend(recipe.materials.iter().map(|m| m.id));
                state.production.prices = Some(prices_from_cache(state, realm, &ids, now));
            }
        }
        Err(e) => {
            state.production.error = Some(e.to_string());
            warn!("Market: price batch failed for product={product}: {e}");
        }
    }
}

fn prices_from_cache(
    state: &AppState,
    realm: i32,
    ids: &[u32],
    now: Instant,
) -> HashMap<u32, f64> {
    let mut prices = HashMap::new();
    for &id in ids {
        if let Some(entry) = cached_fresh(state, realm, id, now) {
            if let Some(cheapest) = cheapest_listing(&entry.listings) {
                prices.insert(id, cheapest.price);
            }
        }
    }
    prices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cheapest_is_first_or_none() {
        let listings = vec![
            Listing { price: Some(2.5), quantity: Some(100.0) },
            Listing { price: Some(3.0), quantity: Some(50.0) },
        ];
        let c = cheapest_listing(&listings).unwrap();
        assert_eq!(c.price, 2.5);
        assert_eq!(c.quantity, Some(100.0));

        assert!(cheapest_listing(&[]).is_none());
        assert!(cheapest_listing(&[Listing { price: None, quantity: Some(1.0) }]).is_none());
    }

    #[test]
    fn matching_view_is_left_alone() {
        let mut state = AppState::new();
        let now = Instant::now();
        assert!(matches!(
            ensure_for_product(&mut state, 9, now),
            Some(Job::Market { realm: 0, product: 9 })
        ));
        assert_eq!(state.market.view.status, MarketStatus::Loading);
        // same product while in flight → no second job
        assert!(ensure_for_product(&mut state, 9, now).is_none());
    }

    #[test]
    fn stale_response_does_not_touch_view() {
        let mut state = AppState::new();
        let now = Instant::now();
        ensure_for_product(&mut state, 9, now);
        // interest moves on to product 11
        ensure_for_product(&mut state, 11, now);

        apply(&mut state, 0, 9, Ok(vec![Listing { price: Some(1.0), quantity: None }]), now);
        assert_eq!(state.market.view.product, Some(11));
        assert_eq!(state.market.view.status, MarketStatus::Loading);
        // ...but the cache did learn about product 9
        assert!(state.market.cache.contains_key(&(0, 9)));
    }
}
