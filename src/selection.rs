// 📝 Selection State - The mutable input to pricing
// Caller-owned value, passed into the pricing engine explicitly. There is no
// global selection singleton; UI reactivity belongs to the consuming layer.

use crate::catalog::{PricingCatalog, PropertyType, Tier, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form signed dollar adjustment, user-authored, not tied to a category.
/// Negative amounts are credits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub name: String,
    pub amount: i64,
}

impl Modifier {
    pub fn new(name: &str, amount: i64) -> Self {
        Modifier {
            name: name.to_string(),
            amount,
        }
    }
}

/// Per-category dollar adjustment, keyed by category id in the selection.
/// Only counted while its category has a tier selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAdjustment {
    pub name: String,
    pub amount: i64,
}

impl CategoryAdjustment {
    pub fn new(name: &str, amount: i64) -> Self {
        CategoryAdjustment {
            name: name.to_string(),
            amount,
        }
    }
}

// ============================================================================
// SELECTION STATE
// ============================================================================

/// Everything a user has chosen on the quote form.
///
/// Tier selections are stored as plain strings so that states saved against
/// an older catalog still deserialize; unknown references are priced as zero
/// rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    /// Category id → chosen tier name (None = nothing selected)
    pub selections: BTreeMap<String, Option<String>>,

    /// Extra id → toggled on
    pub extras: BTreeMap<String, bool>,

    /// Free-form adjustments (credits and surcharges)
    #[serde(default)]
    pub modifiers: Vec<Modifier>,

    /// Category id → per-category adjustment
    #[serde(default)]
    pub adjustments: BTreeMap<String, CategoryAdjustment>,

    /// Home size in square feet
    pub home_size: i64,

    pub property_type: PropertyType,
}

impl SelectionState {
    /// Empty selection for a home of the given size
    pub fn new(home_size: i64, property_type: PropertyType) -> Self {
        SelectionState {
            selections: BTreeMap::new(),
            extras: BTreeMap::new(),
            modifiers: Vec::new(),
            adjustments: BTreeMap::new(),
            home_size,
            property_type,
        }
    }

    /// Fresh selection normalized against a catalog: every category present
    /// (unselected), default-on extras toggled on.
    pub fn for_catalog(catalog: &PricingCatalog, home_size: i64) -> Self {
        let mut state = Self::new(home_size, catalog.property_type);
        state.normalize_against(catalog);
        state
    }

    /// Select a tier for a category (None clears the selection)
    pub fn select(&mut self, category_id: &str, tier: Option<Tier>) {
        self.selections.insert(
            category_id.to_string(),
            tier.map(|t| t.as_str().to_string()),
        );
    }

    pub fn toggle_extra(&mut self, extra_id: &str, on: bool) {
        self.extras.insert(extra_id.to_string(), on);
    }

    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    pub fn set_adjustment(&mut self, category_id: &str, adjustment: CategoryAdjustment) {
        self.adjustments.insert(category_id.to_string(), adjustment);
    }

    /// Ensure every catalog category has a selections entry and every
    /// default-on extra has a toggle. Existing entries are never overwritten;
    /// an extra the user explicitly turned off stays off.
    pub fn normalize_against(&mut self, catalog: &PricingCatalog) {
        for category in &catalog.categories {
            self.selections.entry(category.id.clone()).or_insert(None);
        }

        for extra in &catalog.extras {
            self.extras
                .entry(extra.id.clone())
                .or_insert(extra.default_on);
        }
    }

    /// Validate the payload before pricing.
    ///
    /// Unknown category/tier/extra references are deliberately NOT errors:
    /// saved states must keep rendering a total as the catalog evolves.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        if self.home_size <= 0 {
            errors.push(ValidationError {
                field: "homeSize".to_string(),
                message: format!("Must be a positive square footage, got {}", self.home_size),
                context: "Selection".to_string(),
            });
        }

        for (i, modifier) in self.modifiers.iter().enumerate() {
            if modifier.name.trim().is_empty() {
                errors.push(ValidationError {
                    field: format!("modifiers[{}].name", i),
                    message: "Required field is empty".to_string(),
                    context: "Selection".to_string(),
                });
            }
        }

        for (category_id, adjustment) in &self.adjustments {
            if adjustment.name.trim().is_empty() {
                errors.push(ValidationError {
                    field: format!("adjustments.{}.name", category_id),
                    message: "Required field is empty".to_string(),
                    context: "Selection".to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
