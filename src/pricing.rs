// 💰 Pricing Engine - Size-elastic package pricing
// Pure functions over a catalog and a selection state. No I/O, no internal
// state; unknown references price as zero rather than failing so that stale
// saved states still render a total.

use crate::catalog::{
    Category, Extra, PricingCatalog, Tier, MINIMUM_SIZE_SQFT, REFERENCE_SIZE_SQFT,
};
use crate::selection::SelectionState;
use serde::{Deserialize, Serialize};

/// Flat sales-tax estimate applied to the equipment subtotal
pub const TAX_RATE: f64 = 0.07;

// ============================================================================
// SIZE SCALING
// ============================================================================

/// Price multiplier for a home of `sqft` square feet under elasticity
/// `scale_factor`.
///
/// A zero scale factor is exactly 1.0 regardless of size. Otherwise the
/// multiplier interpolates linearly around the 4000 sqft reference, with
/// homes under 2500 sqft priced as if they were 2500. The output is not
/// bounds-checked: extreme or negative scale factors can produce negative
/// multipliers, which is the caller's responsibility.
pub fn size_multiplier(sqft: f64, scale_factor: f64) -> f64 {
    if scale_factor == 0.0 {
        return 1.0;
    }

    let effective = sqft.max(MINIMUM_SIZE_SQFT);
    let ratio = effective / REFERENCE_SIZE_SQFT;

    1.0 + (ratio - 1.0) * scale_factor
}

/// Quotes display at round-dollar-hundred granularity
fn round_to_hundred(value: f64) -> i64 {
    ((value / 100.0).round() as i64) * 100
}

/// True when a stored tier value means "nothing selected"
fn is_none_tier(tier_name: &str) -> bool {
    tier_name.is_empty() || tier_name == "none"
}

// ============================================================================
// ITEM PRICING
// ============================================================================

/// Price one category at the chosen tier for the given home size.
///
/// Returns 0 for an unselected or unknown tier. Customized categories return
/// their hand-edited price untouched. A fixed-base-tier category skips
/// scaling on its "good" tier only. Everything else scales by the tier's
/// override or the category's coefficient and rounds to the nearest hundred.
pub fn category_price(category: &Category, tier_name: &str, home_size: i64) -> i64 {
    if is_none_tier(tier_name) {
        return 0;
    }

    let Some(offering) = category.tier(tier_name) else {
        return 0;
    };

    if category.is_customized {
        return offering.price;
    }

    let multiplier = if category.base_tier_no_scale && tier_name == Tier::Good.as_str() {
        1.0
    } else {
        let scale = offering.size_scale.unwrap_or(category.size_scale);
        size_multiplier(home_size as f64, scale)
    };

    round_to_hundred(offering.price as f64 * multiplier)
}

/// Price an extra. Flat unless the extra declares its own size scale; there
/// is no catalog-level fallback for extras.
pub fn extra_price(extra: &Extra, home_size: i64) -> i64 {
    match extra.size_scale {
        None => extra.price,
        Some(scale) => {
            round_to_hundred(extra.price as f64 * size_multiplier(home_size as f64, scale))
        }
    }
}

// ============================================================================
// TOTALS
// ============================================================================

/// Aggregate quote figures, all whole dollars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Selected category prices plus their per-category adjustments
    pub subtotal: i64,

    /// Toggled-on extras
    pub extras_total: i64,

    /// Free-form modifiers (may be negative)
    pub modifiers_total: i64,

    /// subtotal + extras + modifiers
    pub equipment_subtotal: i64,

    /// 7% of the equipment subtotal, rounded to the nearest dollar
    pub tax_estimate: i64,

    pub grand_total: i64,

    /// How many categories have a tier selected
    pub selected_count: usize,
}

/// Compute the full quote for a selection against a catalog.
///
/// Never fails: selections referencing categories, tiers, or extras absent
/// from the catalog are silently priced as zero. Modifiers are not clamped,
/// so a large enough credit can drive the grand total negative.
pub fn calculate_total(catalog: &PricingCatalog, selection: &SelectionState) -> Totals {
    let mut subtotal = 0i64;
    let mut selected_count = 0usize;

    for category in &catalog.categories {
        let tier_name = match selection.selections.get(&category.id) {
            Some(Some(tier_name)) if !is_none_tier(tier_name) => tier_name,
            _ => continue,
        };

        selected_count += 1;
        subtotal += category_price(category, tier_name, selection.home_size);

        if let Some(adjustment) = selection.adjustments.get(&category.id) {
            subtotal += adjustment.amount;
        }
    }

    let mut extras_total = 0i64;
    for extra in &catalog.extras {
        if selection.extras.get(&extra.id).copied().unwrap_or(false) {
            extras_total += extra_price(extra, selection.home_size);
        }
    }

    let modifiers_total: i64 = selection.modifiers.iter().map(|m| m.amount).sum();

    let equipment_subtotal = subtotal + extras_total + modifiers_total;
    let tax_estimate = (equipment_subtotal as f64 * TAX_RATE).round() as i64;

    Totals {
        subtotal,
        extras_total,
        modifiers_total,
        equipment_subtotal,
        tax_estimate,
        grand_total: equipment_subtotal + tax_estimate,
        selected_count,
    }
}

// ============================================================================
// DOMINANT TIER
// ============================================================================

/// The tier selected most often across categories, for the quote header
/// ("your Better package").
///
/// Ties break by fixed priority Best > Better > Standard > Good, never by map
/// iteration order. None when nothing is selected.
pub fn dominant_tier(selection: &SelectionState) -> Option<Tier> {
    let mut counts = [0usize; 4];

    for tier_name in selection.selections.values().flatten() {
        if let Some(tier) = Tier::parse(tier_name) {
            counts[tier as usize] += 1;
        }
    }

    let mut winner = None;
    let mut winner_count = 0;

    for tier in Tier::PRIORITY {
        let count = counts[tier as usize];
        if count > winner_count {
            winner_count = count;
            winner = Some(tier);
        }
    }

    winner
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PropertyType, TierOffering};
    use crate::selection::{CategoryAdjustment, Modifier};

    fn networking_category() -> Category {
        Category::new("networking", "Networking", 0.8)
            .with_tier(Tier::Good, TierOffering::new(5700))
            .with_tier(Tier::Standard, TierOffering::new(7400))
            .with_tier(Tier::Better, TierOffering::new(9800))
            .with_tier(Tier::Best, TierOffering::new(13500))
    }

    #[test]
    fn test_size_multiplier_reference_size_is_fixed_point() {
        for scale in [0.0, 0.3, 0.8, 1.0, 2.5, -0.5] {
            assert_eq!(size_multiplier(4000.0, scale), 1.0, "scale {}", scale);
        }
    }

    #[test]
    fn test_size_multiplier_zero_scale_is_size_independent() {
        for sqft in [500.0, 2500.0, 4000.0, 12000.0] {
            assert_eq!(size_multiplier(sqft, 0.0), 1.0);
        }
    }

    #[test]
    fn test_size_multiplier_floor_clamp_at_2500() {
        for scale in [0.5, 1.0, 1.5] {
            assert_eq!(
                size_multiplier(2000.0, scale),
                size_multiplier(2500.0, scale)
            );
            assert_eq!(
                size_multiplier(800.0, scale),
                size_multiplier(2500.0, scale)
            );
        }
    }

    #[test]
    fn test_size_multiplier_monotonic_in_sqft() {
        let sizes = [2500.0, 3000.0, 4000.0, 6000.0, 10000.0];

        for window in sizes.windows(2) {
            assert!(size_multiplier(window[1], 0.8) > size_multiplier(window[0], 0.8));
            assert!(size_multiplier(window[1], -0.5) < size_multiplier(window[0], -0.5));
        }
    }

    #[test]
    fn test_networking_good_at_6000_sqft() {
        // multiplier = 1 + (6000/4000 - 1) * 0.8 = 1.4; 5700 * 1.4 = 7980 → 8000
        let category = networking_category();
        assert!((size_multiplier(6000.0, 0.8) - 1.4).abs() < 1e-9);
        assert_eq!(category_price(&category, "good", 6000), 8000);
    }

    #[test]
    fn test_category_price_is_multiple_of_100() {
        let catalog = PricingCatalog::residential();

        for category in &catalog.categories {
            for tier in Tier::ALL {
                for home_size in [1800, 2500, 3333, 4000, 5750, 9999] {
                    let price = category_price(category, tier.as_str(), home_size);
                    assert_eq!(
                        price % 100,
                        0,
                        "{} {} at {} sqft priced {}",
                        category.id,
                        tier.as_str(),
                        home_size,
                        price
                    );
                }
            }
        }
    }

    #[test]
    fn test_category_price_none_and_unknown_tier() {
        let category = networking_category();
        assert_eq!(category_price(&category, "", 6000), 0);
        assert_eq!(category_price(&category, "none", 6000), 0);
        assert_eq!(category_price(&category, "platinum", 6000), 0);
    }

    #[test]
    fn test_customized_category_is_never_rescaled() {
        let mut category = networking_category();
        category.is_customized = true;
        category.tiers.get_mut("good").unwrap().price = 6150;

        // Hand-edited price comes back untouched at any size
        assert_eq!(category_price(&category, "good", 2500), 6150);
        assert_eq!(category_price(&category, "good", 10000), 6150);
    }

    #[test]
    fn test_fixed_base_tier_skips_scaling_on_good_only() {
        let category = Category::new("security", "Security", 0.5)
            .fixed_base_tier()
            .with_tier(Tier::Good, TierOffering::new(2400))
            .with_tier(Tier::Better, TierOffering::new(5200));

        // Entry tier is a fixed-price minimum even in a huge house
        assert_eq!(category_price(&category, "good", 10000), 2400);

        // Other tiers still scale: 1 + (10000/4000 - 1) * 0.5 = 1.75
        assert_eq!(category_price(&category, "better", 10000), 9100);
    }

    #[test]
    fn test_tier_scale_override_beats_category_scale() {
        let category = Category::new("audio", "Audio", 1.0)
            .with_tier(Tier::Good, TierOffering::new(4800))
            .with_tier(Tier::Best, TierOffering::new(10000).with_scale(0.0));

        // Override of 0 pins the best tier at its base price
        assert_eq!(category_price(&category, "best", 8000), 10000);
        // Unscaled tiers use the category coefficient: 4800 * 2.0 = 9600
        assert_eq!(category_price(&category, "good", 8000), 9600);
    }

    #[test]
    fn test_extra_flat_price_ignores_home_size() {
        let extra = Extra::new("rack", "Equipment Rack", 2200);
        assert_eq!(extra_price(&extra, 2500), 2200);
        assert_eq!(extra_price(&extra, 12000), 2200);
    }

    #[test]
    fn test_extra_with_scale_rounds_to_hundred() {
        let extra = Extra::new("cell-booster", "Cellular Booster", 3600).with_scale(0.5);
        // 1 + (6000/4000 - 1) * 0.5 = 1.25; 3600 * 1.25 = 4500
        assert_eq!(extra_price(&extra, 6000), 4500);
        assert_eq!(extra_price(&extra, 6000) % 100, 0);
    }

    #[test]
    fn test_empty_selection_is_all_zero() {
        let catalog = PricingCatalog::residential();
        let mut selection = SelectionState::for_catalog(&catalog, 6000);
        // for_catalog turns default extras on; clear them for a truly empty quote
        for toggled in selection.extras.values_mut() {
            *toggled = false;
        }

        let totals = calculate_total(&catalog, &selection);
        assert_eq!(totals, Totals::default());
        assert_eq!(totals.selected_count, 0);
    }

    #[test]
    fn test_calculate_total_aggregation() {
        let catalog = PricingCatalog::residential();
        let mut selection = SelectionState::for_catalog(&catalog, 6000);
        for toggled in selection.extras.values_mut() {
            *toggled = false;
        }

        selection.select("networking", Some(Tier::Good)); // 8000 at 6000 sqft
        selection.set_adjustment("networking", CategoryAdjustment::new("Fiber run", 700));
        selection.toggle_extra("rack", true); // flat 2200
        selection.add_modifier(Modifier::new("Builder credit", -1500));

        let totals = calculate_total(&catalog, &selection);

        assert_eq!(totals.selected_count, 1);
        assert_eq!(totals.subtotal, 8700);
        assert_eq!(totals.extras_total, 2200);
        assert_eq!(totals.modifiers_total, -1500);
        assert_eq!(totals.equipment_subtotal, 9400);
        assert_eq!(totals.tax_estimate, 658);
        assert_eq!(totals.grand_total, 10058);
    }

    #[test]
    fn test_adjustment_only_counts_while_category_selected() {
        let catalog = PricingCatalog::residential();
        let mut selection = SelectionState::for_catalog(&catalog, 4000);
        for toggled in selection.extras.values_mut() {
            *toggled = false;
        }

        selection.set_adjustment("networking", CategoryAdjustment::new("Fiber run", 700));

        // No tier chosen → the adjustment is dormant
        let totals = calculate_total(&catalog, &selection);
        assert_eq!(totals.subtotal, 0);

        selection.select("networking", Some(Tier::Good));
        let totals = calculate_total(&catalog, &selection);
        assert_eq!(totals.subtotal, 5700 + 700);
    }

    #[test]
    fn test_tax_estimate_rounds_to_nearest_dollar() {
        let catalog = PricingCatalog::residential();
        let mut selection = SelectionState::for_catalog(&catalog, 4000);
        for toggled in selection.extras.values_mut() {
            *toggled = false;
        }

        // Equipment subtotal of 55 → tax 3.85 → 4, not 0 and not 100.
        // Tax granularity is dollars, unlike category prices' hundreds.
        selection.add_modifier(Modifier::new("Misc part", 55));

        let totals = calculate_total(&catalog, &selection);
        assert_eq!(totals.equipment_subtotal, 55);
        assert_eq!(totals.tax_estimate, 4);
        assert_eq!(
            totals.tax_estimate,
            (totals.equipment_subtotal as f64 * TAX_RATE).round() as i64
        );
        assert_eq!(totals.grand_total, 59);
    }

    #[test]
    fn test_unknown_references_price_as_zero() {
        let catalog = PricingCatalog::residential();
        let mut selection = SelectionState::for_catalog(&catalog, 4000);
        for toggled in selection.extras.values_mut() {
            *toggled = false;
        }

        // Category that was removed from the catalog: ignored entirely
        selection
            .selections
            .insert("retired-category".to_string(), Some("best".to_string()));
        // Tier that no longer exists on a live category: counted, priced zero
        selection
            .selections
            .insert("networking".to_string(), Some("platinum".to_string()));
        // Extra that no longer exists: ignored
        selection.extras.insert("retired-extra".to_string(), true);

        let totals = calculate_total(&catalog, &selection);
        assert_eq!(totals.selected_count, 1);
        assert_eq!(totals.subtotal, 0);
        assert_eq!(totals.extras_total, 0);
        assert_eq!(totals.grand_total, 0);
    }

    #[test]
    fn test_large_credit_drives_grand_total_negative() {
        let catalog = PricingCatalog::residential();
        let mut selection = SelectionState::for_catalog(&catalog, 4000);
        for toggled in selection.extras.values_mut() {
            *toggled = false;
        }

        selection.select("climate", Some(Tier::Good)); // 1600
        selection.add_modifier(Modifier::new("Trade-in credit", -5000));

        // Credits are not clamped; a negative total is legal
        let totals = calculate_total(&catalog, &selection);
        assert_eq!(totals.equipment_subtotal, -3400);
        assert_eq!(totals.tax_estimate, -238);
        assert_eq!(totals.grand_total, -3638);
    }

    #[test]
    fn test_dominant_tier_counts_selections() {
        let mut selection = SelectionState::new(4000, PropertyType::Residential);
        selection.select("networking", Some(Tier::Better));
        selection.select("audio", Some(Tier::Better));
        selection.select("security", Some(Tier::Good));

        assert_eq!(dominant_tier(&selection), Some(Tier::Better));
    }

    #[test]
    fn test_dominant_tier_tie_breaks_by_priority() {
        // One good, one best → Best wins the tie
        let mut selection = SelectionState::new(4000, PropertyType::Residential);
        selection.select("networking", Some(Tier::Good));
        selection.select("audio", Some(Tier::Best));
        assert_eq!(dominant_tier(&selection), Some(Tier::Best));

        // standard vs good → Standard wins
        let mut selection = SelectionState::new(4000, PropertyType::Residential);
        selection.select("networking", Some(Tier::Good));
        selection.select("audio", Some(Tier::Standard));
        assert_eq!(dominant_tier(&selection), Some(Tier::Standard));
    }

    #[test]
    fn test_dominant_tier_empty_selection() {
        let selection = SelectionState::new(4000, PropertyType::Residential);
        assert_eq!(dominant_tier(&selection), None);

        // Unknown tier names don't count toward any tier
        let mut selection = SelectionState::new(4000, PropertyType::Residential);
        selection
            .selections
            .insert("networking".to_string(), Some("platinum".to_string()));
        assert_eq!(dominant_tier(&selection), None);
    }
}
