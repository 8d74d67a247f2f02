// src/recipes.rs
//
// Static product/recipe table, embedded at build time. Material quantities
// are per unit of output and can be fractional.

use std::sync::OnceLock;

use serde::Deserialize;
use tracing::error;

static RECIPES_JSON: &str = include_str!("../assets/recipes.json");
static RECIPES: OnceLock<Vec<Recipe>> = OnceLock::new();

#[derive(Debug, Clone, Deserialize)]
pub struct Recipe {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub materials: Vec<Material>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Material {
    pub id: u32,
    pub quantity: f64,
}

fn table() -> &'static [Recipe] {
    RECIPES.get_or_init(|| match serde_json::from_str(RECIPES_JSON) {
        Ok(v) => v,
        Err(e) => {
            // embedded asset, can only fail if the file was edited badly
            error!("Recipes: embedded table failed to parse: {e}");
            Vec::new()
        }
    })
}

pub fn by_product(id: u32) -> Option<&'static Recipe> {
    table().iter().find(|r| r.id == id)
}

pub fn name_of(id: u32) -> &'static str {
    by_product(id).map(|r| r.name.as_str()).unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_parses() {
        assert!(!table().is_empty());
    }

    #[test]
    fn lookup_by_product() {
        let r = by_product(30).unwrap();
        assert_eq!(r.name, "Smart phones");
        assert_eq!(r.materials.len(), 4);
        assert!(by_product(9999).is_none());
        assert_eq!(name_of(9999), "Unknown");
    }

    #[test]
    fn materials_reference_known_products() {
        for recipe in table() {
            for m in &recipe.materials {
                assert!(by_product(m.id).is_some(), "recipe {} references unknown {}", recipe.id, m.id);
                assert!(m.quantity > 0.0);
            }
        }
    }
}
