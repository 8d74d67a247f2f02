// src/metrics.rs
//
// Pure profitability math over extracted row values. NaN is the "unknown"
// carrier throughout: any NaN input NaN-poisons the derived figures, and the
// band classifier maps NaN to NotAvailable instead of ranking it.

use std::collections::HashMap;

use crate::config::consts::{MARKET_FEE, PPM_EXCELLENT, PPM_GOOD, PPM_MEH};
use crate::recipes::Recipe;

/// Rate metrics for a pending sale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SellMetrics {
    pub profit_per_unit: f64,
    pub quantity: f64,
    pub finish_secs: f64,
    pub total_profit: f64,
    pub profit_per_minute: f64,
    pub profit_per_hour: f64,
}

/// Finish time of zero or unknown, or an overflowed total, yields NaN rates,
/// never infinity.
pub fn sell_metrics(profit_per_unit: f64, quantity: f64, finish_secs: f64) -> SellMetrics {
    let total_profit = profit_per_unit * quantity;
    let per_minute = if total_profit.is_finite() && finish_secs.is_finite() && finish_secs > 0.0 {
        total_profit / (finish_secs / 60.0)
    } else {
        f64::NAN
    };
    SellMetrics {
        profit_per_unit,
        quantity,
        finish_secs,
        total_profit,
        profit_per_minute: per_minute,
        profit_per_hour: per_minute * 60.0,
    }
}

/// Profit-per-minute verdict bands, inclusive lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    NotAvailable,
    Bad,
    Low,
    Meh,
    Good,
    Excellent,
}

impl Band {
    pub fn classify(ppm: f64) -> Self {
        if ppm.is_nan() {
            Band::NotAvailable
        } else if ppm < 0.0 {
            Band::Bad
        } else if ppm >= PPM_EXCELLENT {
            Band::Excellent
        } else if ppm >= PPM_GOOD {
            Band::Good
        } else if ppm >= PPM_MEH {
            Band::Meh
        } else {
            Band::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::NotAvailable => "N/A",
            Band::Bad => "Bad",
            Band::Low => "Low",
            Band::Meh => "Meh",
            Band::Good => "Good",
            Band::Excellent => "Excellent",
        }
    }

    /// CSS class for the verdict chip in rendered markup. The stylesheet has
    /// no dedicated Low chip; Low shares the Meh styling.
    pub fn chip_class(self) -> &'static str {
        match self {
            Band::NotAvailable => "scx-chip-na",
            Band::Bad => "scx-chip-bad",
            Band::Low => "scx-chip-meh",
            Band::Meh => "scx-chip-meh",
            Band::Good => "scx-chip-good",
            Band::Excellent => "scx-chip-excellent",
        }
    }
}

/// One material line of a production cost breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialCost {
    pub id: u32,
    pub per_unit: f64,
    pub needed: f64,
    /// NaN when no market price is known for this material.
    pub unit_price: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    pub amount: f64,
    pub labor: f64,
    pub materials: Vec<MaterialCost>,
    /// NaN whenever any material price is missing.
    pub material_total: f64,
    pub total: f64,
    /// Product ids with no known market price.
    pub missing: Vec<u32>,
}

/// Cost of producing `amount` units of `recipe`, priced from `prices`
/// (product id → unit price). `labor` is the batch total as the host
/// renders it. Missing prices are reported, not guessed.
pub fn production_cost(
    recipe: &Recipe,
    amount: f64,
    labor: f64,
    prices: &HashMap<u32, f64>,
) -> CostBreakdown {
    let mut materials = Vec::with_capacity(recipe.materials.len());
    let mut missing = Vec::new();
    let mut material_total = 0.0;

    for m in &recipe.materials {
        let needed = m.quantity * amount;
        let unit_price = match prices.get(&m.id) {
            Some(&p) => p,
            None => {
                missing.push(m.id);
                f64::NAN
            }
        };
        let cost = unit_price * needed;
        material_total += cost;
        materials.push(MaterialCost {
            id: m.id,
            per_unit: m.quantity,
            needed,
            unit_price,
            cost,
        });
    }

    CostBreakdown {
        amount,
        labor,
        materials,
        material_total,
        total: labor + material_total,
        missing,
    }
}

/// Sale-side economics for a produced batch sold at the current best ask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SellAnalysis {
    pub gross: f64,
    pub fee: f64,
    pub net: f64,
    pub profit: f64,
    /// NaN when the cost basis is zero or unknown.
    pub margin: f64,
}

pub fn sell_profit(unit_price: f64, amount: f64, cost_total: f64) -> SellAnalysis {
    let gross = unit_price * amount;
    let fee = gross * MARKET_FEE;
    let net = gross - fee;
    let profit = net - cost_total;
    let margin = if cost_total.is_finite() && cost_total != 0.0 {
        profit / cost_total
    } else {
        f64::NAN
    };
    SellAnalysis { gross, fee, net, profit, margin }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::Material;

    #[test]
    fn rates_from_finish_time() {
        let m = sell_metrics(2.0, 30.0, 600.0);
        assert_eq!(m.total_profit, 60.0);
        assert_eq!(m.profit_per_minute, 6.0);
        assert_eq!(m.profit_per_hour, 360.0);
    }

    #[test]
    fn zero_duration_rates_are_unknown() {
        let m = sell_metrics(2.0, 30.0, 0.0);
        assert!(m.profit_per_minute.is_nan());
        assert!(m.profit_per_hour.is_nan());
    }

    #[test]
    fn overflowed_total_rates_are_unknown() {
        let m = sell_metrics(f64::MAX, 10.0, 60.0);
        assert!(m.total_profit.is_infinite());
        assert!(m.profit_per_minute.is_nan());
        assert_eq!(Band::classify(m.profit_per_minute), Band::NotAvailable);
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(Band::classify(f64::NAN), Band::NotAvailable);
        assert_eq!(Band::classify(-0.001), Band::Bad);
        assert_eq!(Band::classify(0.0), Band::Low);
        assert_eq!(Band::classify(4.999), Band::Low);
        assert_eq!(Band::classify(5.0), Band::Meh);
        assert_eq!(Band::classify(19.999), Band::Meh);
        assert_eq!(Band::classify(20.0), Band::Good);
        assert_eq!(Band::classify(49.999), Band::Good);
        assert_eq!(Band::classify(50.0), Band::Excellent);
    }

    #[test]
    fn low_chip_shares_meh_styling() {
        assert_eq!(Band::Low.chip_class(), "scx-chip-meh");
        assert_eq!(Band::Meh.chip_class(), "scx-chip-meh");
        assert_ne!(Band::Low.label(), Band::Meh.label());
    }

    fn recipe() -> Recipe {
        Recipe {
            id: 12,
            name: "Petrol".to_string(),
            materials: vec![
                Material { id: 11, quantity: 0.5 },
                Material { id: 1, quantity: 0.25 },
            ],
        }
    }

    #[test]
    fn cost_breakdown_scales_with_amount() {
        let prices = HashMap::from([(11, 4.0), (1, 2.0)]);
        let b = production_cost(&recipe(), 10.0, 3.0, &prices);
        assert_eq!(b.labor, 3.0);
        // 0.5*10*4 + 0.25*10*2
        assert_eq!(b.material_total, 25.0);
        assert_eq!(b.total, 28.0);
        assert!(b.missing.is_empty());
    }

    #[test]
    fn missing_price_poisons_total() {
        let prices = HashMap::from([(11, 4.0)]);
        let b = production_cost(&recipe(), 10.0, 3.0, &prices);
        assert!(b.material_total.is_nan());
        assert!(b.total.is_nan());
        assert_eq!(b.missing, vec![1]);
    }

    #[test]
    fn sale_fee_and_margin() {
        let a = sell_profit(10.0, 10.0, 50.0);
        assert_eq!(a.gross, 100.0);
        assert_eq!(a.fee, 4.0);
        assert_eq!(a.net, 96.0);
        assert_eq!(a.profit, 46.0);
        assert_eq!(a.margin, 0.92);

        assert!(sell_profit(10.0, 10.0, 0.0).margin.is_nan());
        assert!(sell_profit(10.0, 10.0, f64::NAN).margin.is_nan());
    }
}
