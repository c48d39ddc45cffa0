// 🗂️ Pricing Catalog - Categories, tiers, and extras
// The catalog is read-only input to the pricing engine. It is validated once
// at load time, never per price computation.

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Catalog reference home size. A price at this square footage is the base price.
pub const REFERENCE_SIZE_SQFT: f64 = 4000.0;

/// Homes below this square footage price as if they were exactly this size.
pub const MINIMUM_SIZE_SQFT: f64 = 2500.0;

// ============================================================================
// PROPERTY TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// Single-family residential home
    Residential,

    /// Condominium unit (smaller footprint, shared infrastructure)
    Condo,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Residential => "residential",
            PropertyType::Condo => "condo",
        }
    }

    pub fn parse(s: &str) -> Option<PropertyType> {
        match s {
            "residential" => Some(PropertyType::Residential),
            "condo" => Some(PropertyType::Condo),
            _ => None,
        }
    }
}

// ============================================================================
// TIER
// ============================================================================

/// Named quality/price level for a category.
///
/// Selections store tier names as plain strings (saved states must survive
/// catalog evolution); this enum exists for the known tiers' labels and for
/// the dominant-tier priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Good,
    Standard,
    Better,
    Best,
}

impl Tier {
    /// All tiers, cheapest first
    pub const ALL: [Tier; 4] = [Tier::Good, Tier::Standard, Tier::Better, Tier::Best];

    /// Tie-break priority for dominant-tier summaries (highest first)
    pub const PRIORITY: [Tier; 4] = [Tier::Best, Tier::Better, Tier::Standard, Tier::Good];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Good => "good",
            Tier::Standard => "standard",
            Tier::Better => "better",
            Tier::Best => "best",
        }
    }

    /// Display label for quote summaries
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Good => "Good",
            Tier::Standard => "Standard",
            Tier::Better => "Better",
            Tier::Best => "Best",
        }
    }

    pub fn parse(s: &str) -> Option<Tier> {
        match s {
            "good" => Some(Tier::Good),
            "standard" => Some(Tier::Standard),
            "better" => Some(Tier::Better),
            "best" => Some(Tier::Best),
            _ => None,
        }
    }
}

// ============================================================================
// TIER OFFERING
// ============================================================================

/// One tier of one category: a base price at the reference home size plus
/// presentation fields. `size_scale` here overrides the category's scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierOffering {
    /// Base price in whole dollars at the 4000 sqft reference size
    pub price: i64,

    /// Per-tier elasticity override (None = use the category's scale)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_scale: Option<f64>,

    /// Short marketing label (presentation only)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,

    /// Feature bullets (presentation only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,

    /// Representative brands (presentation only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub brands: Vec<String>,
}

impl TierOffering {
    pub fn new(price: i64) -> Self {
        TierOffering {
            price,
            size_scale: None,
            label: String::new(),
            features: Vec::new(),
            brands: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.size_scale = Some(scale);
        self
    }

    pub fn with_features(mut self, features: &[&str]) -> Self {
        self.features = features.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_brands(mut self, brands: &[&str]) -> Self {
        self.brands = brands.iter().map(|b| b.to_string()).collect();
        self
    }
}

// ============================================================================
// CATEGORY
// ============================================================================

/// A priced technology subsystem (networking, lighting control, ...).
///
/// `size_scale` is the elasticity coefficient applied around the 4000 sqft
/// reference: 0 = size-independent, 1 = fully proportional, >1 = super-linear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,

    /// Icon for the quote form (presentation only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// How strongly price scales with home square footage
    pub size_scale: f64,

    /// The "good" tier is a fixed-price minimum regardless of house size
    #[serde(default)]
    pub base_tier_no_scale: bool,

    /// Prices were hand-edited by an admin; never re-scale them
    #[serde(default)]
    pub is_customized: bool,

    /// Tier name → offering
    pub tiers: BTreeMap<String, TierOffering>,
}

impl Category {
    pub fn new(id: &str, name: &str, size_scale: f64) -> Self {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            icon: None,
            description: None,
            size_scale,
            base_tier_no_scale: false,
            is_customized: false,
            tiers: BTreeMap::new(),
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn fixed_base_tier(mut self) -> Self {
        self.base_tier_no_scale = true;
        self
    }

    pub fn with_tier(mut self, tier: Tier, offering: TierOffering) -> Self {
        self.tiers.insert(tier.as_str().to_string(), offering);
        self
    }

    /// Look up a tier by name
    pub fn tier(&self, name: &str) -> Option<&TierOffering> {
        self.tiers.get(name)
    }
}

// ============================================================================
// EXTRA
// ============================================================================

/// Boolean-toggle add-on. Flat-priced unless it declares its own size scale;
/// there is no catalog-level scale fallback for extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extra {
    pub id: String,
    pub name: String,
    pub price: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_scale: Option<f64>,

    /// Toggled on by default when a quote is started
    #[serde(default)]
    pub default_on: bool,
}

impl Extra {
    pub fn new(id: &str, name: &str, price: i64) -> Self {
        Extra {
            id: id.to_string(),
            name: name.to_string(),
            price,
            size_scale: None,
            default_on: false,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.size_scale = Some(scale);
        self
    }

    pub fn on_by_default(mut self) -> Self {
        self.default_on = true;
        self
    }
}

// ============================================================================
// PRICING CATALOG
// ============================================================================

/// The set of categories and extras active for one property type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingCatalog {
    pub property_type: PropertyType,
    pub categories: Vec<Category>,
    pub extras: Vec<Extra>,
}

impl PricingCatalog {
    /// Catalog for the given property type
    pub fn for_property(property_type: PropertyType) -> Self {
        match property_type {
            PropertyType::Residential => Self::residential(),
            PropertyType::Condo => Self::condo(),
        }
    }

    /// Load a catalog from a JSON file (admin-edited catalogs)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read catalog file: {:?}", path.as_ref()))?;
        Self::from_json(&content)
    }

    /// Parse a catalog from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse catalog JSON")
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn extra(&self, id: &str) -> Option<&Extra> {
        self.extras.iter().find(|e| e.id == id)
    }

    /// Apply a price sheet, returning how many rows were applied.
    /// Rows referencing unknown items or tiers are skipped, not errors.
    pub fn apply_price_sheet(&mut self, rows: &[PriceSheetRow]) -> usize {
        let mut applied = 0;

        for row in rows {
            match row.item_type.as_str() {
                "category" => {
                    let offering = self
                        .categories
                        .iter_mut()
                        .find(|c| c.id == row.item_id)
                        .and_then(|c| c.tiers.get_mut(&row.tier));

                    if let Some(offering) = offering {
                        offering.price = row.price;
                        applied += 1;
                    }
                }
                "extra" => {
                    if let Some(extra) = self.extras.iter_mut().find(|e| e.id == row.item_id) {
                        extra.price = row.price;
                        applied += 1;
                    }
                }
                _ => {}
            }
        }

        applied
    }

    // ========================================================================
    // DEFAULT CATALOGS
    // ========================================================================

    /// Default single-family residential catalog.
    ///
    /// Prices are whole dollars at the 4000 sqft reference size. The scale
    /// coefficients reflect how much of each subsystem's cost is per-room
    /// hardware versus fixed head-end equipment.
    pub fn residential() -> Self {
        let categories = vec![
            Category::new("networking", "Networking", 0.8)
                .with_icon("📡")
                .with_description("Enterprise wired and wireless network")
                .with_tier(
                    Tier::Good,
                    TierOffering::new(5700)
                        .with_label("Solid coverage")
                        .with_features(&["Gigabit switching", "2 wireless access points"])
                        .with_brands(&["Araknis", "Ubiquiti"]),
                )
                .with_tier(
                    Tier::Standard,
                    TierOffering::new(7400)
                        .with_label("Whole-home coverage")
                        .with_features(&["Gigabit switching", "4 wireless access points"]),
                )
                .with_tier(
                    Tier::Better,
                    TierOffering::new(9800)
                        .with_label("High-density coverage")
                        .with_features(&["10G backbone", "6 wireless access points"]),
                )
                .with_tier(
                    Tier::Best,
                    TierOffering::new(13500)
                        .with_label("Campus-grade")
                        .with_features(&["10G backbone", "Outdoor coverage", "Redundant WAN"])
                        .with_brands(&["Ruckus", "Cisco"]),
                ),
            Category::new("audio", "Whole-Home Audio", 1.0)
                .with_icon("🔊")
                .with_description("Distributed audio in main living areas")
                .with_tier(
                    Tier::Good,
                    TierOffering::new(4800).with_label("4 zones, in-ceiling"),
                )
                .with_tier(
                    Tier::Standard,
                    TierOffering::new(7200).with_label("6 zones, in-ceiling"),
                )
                .with_tier(
                    Tier::Better,
                    TierOffering::new(11400)
                        .with_label("8 zones, performance speakers")
                        .with_brands(&["Sonos", "Episode"]),
                )
                .with_tier(
                    Tier::Best,
                    TierOffering::new(18900)
                        .with_label("Audiophile zones throughout")
                        .with_brands(&["Sonance", "James Loudspeaker"]),
                ),
            // Theater cost is dominated by the room itself, not the house
            Category::new("home-theater", "Home Theater", 0.6)
                .with_icon("🎬")
                .fixed_base_tier()
                .with_tier(
                    Tier::Good,
                    TierOffering::new(8500).with_label("Media room, 5.1 surround"),
                )
                .with_tier(
                    Tier::Standard,
                    TierOffering::new(14000).with_label("Dedicated room, 7.1 surround"),
                )
                .with_tier(
                    Tier::Better,
                    TierOffering::new(24000).with_label("Atmos, projection"),
                )
                .with_tier(
                    Tier::Best,
                    TierOffering::new(45000)
                        .with_label("Reference cinema")
                        .with_features(&["Acoustic treatment", "Laser projection"]),
                ),
            Category::new("lighting", "Lighting Control", 1.2)
                .with_icon("💡")
                .with_description("Scene-based lighting keypads and dimming")
                .with_tier(
                    Tier::Good,
                    TierOffering::new(6200).with_label("Main areas"),
                )
                .with_tier(
                    Tier::Standard,
                    TierOffering::new(9600).with_label("Main areas + exterior"),
                )
                .with_tier(
                    Tier::Better,
                    TierOffering::new(15800)
                        .with_label("Whole home")
                        .with_brands(&["Lutron RadioRA 3"]),
                )
                .with_tier(
                    Tier::Best,
                    TierOffering::new(27500)
                        .with_label("Whole home, centralized panels")
                        .with_brands(&["Lutron HomeWorks"]),
                ),
            Category::new("shades", "Motorized Shades", 1.1)
                .with_icon("🪟")
                .with_tier(
                    Tier::Good,
                    TierOffering::new(5400).with_label("Primary rooms"),
                )
                .with_tier(
                    Tier::Standard,
                    TierOffering::new(8800).with_label("Living areas"),
                )
                .with_tier(
                    Tier::Better,
                    TierOffering::new(14600).with_label("Whole home"),
                )
                .with_tier(
                    Tier::Best,
                    TierOffering::new(23400).with_label("Whole home, drapery tracks"),
                ),
            // Alarm head-end is fixed cost; the entry tier doesn't grow with sqft
            Category::new("security", "Security & Alarm", 0.5)
                .with_icon("🚨")
                .fixed_base_tier()
                .with_tier(
                    Tier::Good,
                    TierOffering::new(2400).with_label("Perimeter doors + keypad"),
                )
                .with_tier(
                    Tier::Standard,
                    TierOffering::new(3600).with_label("Perimeter + glass break"),
                )
                .with_tier(
                    Tier::Better,
                    TierOffering::new(5200).with_label("Full perimeter + motion"),
                )
                .with_tier(
                    Tier::Best,
                    TierOffering::new(7800).with_label("Full coverage, cellular backup"),
                ),
            Category::new("surveillance", "Surveillance", 0.7)
                .with_icon("📷")
                .with_tier(
                    Tier::Good,
                    TierOffering::new(3800).with_label("4 cameras"),
                )
                .with_tier(
                    Tier::Standard,
                    TierOffering::new(5900).with_label("6 cameras + NVR"),
                )
                .with_tier(
                    Tier::Better,
                    TierOffering::new(8700).with_label("8 cameras, analytics"),
                )
                .with_tier(
                    Tier::Best,
                    TierOffering::new(13200).with_label("Full perimeter, analytics"),
                ),
            Category::new("access", "Access Control", 0.3)
                .with_icon("🔑")
                .with_tier(
                    Tier::Good,
                    TierOffering::new(1800).with_label("2 smart locks"),
                )
                .with_tier(
                    Tier::Standard,
                    TierOffering::new(2900).with_label("Locks + video doorbell"),
                )
                .with_tier(
                    Tier::Better,
                    TierOffering::new(4400).with_label("Locks, doorbell, gate"),
                )
                .with_tier(
                    Tier::Best,
                    TierOffering::new(6800).with_label("Full keyless entry"),
                ),
            Category::new("climate", "Climate Control", 0.4)
                .with_icon("🌡️")
                .with_tier(
                    Tier::Good,
                    TierOffering::new(1600).with_label("2 smart thermostats"),
                )
                .with_tier(
                    Tier::Standard,
                    TierOffering::new(2600).with_label("3 zones + sensors"),
                )
                .with_tier(
                    Tier::Better,
                    TierOffering::new(4100).with_label("All zones + sensors"),
                )
                .with_tier(
                    Tier::Best,
                    TierOffering::new(6300).with_label("All zones, integrated control"),
                ),
            Category::new("wiring", "Structured Wiring", 1.0)
                .with_icon("🔌")
                .with_description("Low-voltage prewire and termination")
                .with_tier(
                    Tier::Good,
                    TierOffering::new(4200).with_label("Essential runs"),
                )
                .with_tier(
                    Tier::Standard,
                    TierOffering::new(6400).with_label("Full coverage, Cat6"),
                )
                .with_tier(
                    Tier::Better,
                    TierOffering::new(9200).with_label("Cat6A + conduit"),
                )
                .with_tier(
                    Tier::Best,
                    TierOffering::new(13800).with_label("Cat6A, fiber backbone"),
                ),
        ];

        let extras = vec![
            Extra::new("rack", "Equipment Rack & Cooling", 2200).on_by_default(),
            Extra::new("surge", "Surge Protection & Power", 1800).on_by_default(),
            Extra::new("cell-booster", "Cellular Booster", 3600).with_scale(0.5),
            Extra::new("outdoor-wifi", "Outdoor Wi-Fi", 1500),
            Extra::new("media-storage", "Media Storage Server", 2500),
            Extra::new("service-plan", "First-Year Service Plan", 1200),
        ];

        PricingCatalog {
            property_type: PropertyType::Residential,
            categories,
            extras,
        }
    }

    /// Default condo catalog. Smaller footprints, flatter scaling, and no
    /// structured-wiring or access categories (the building provides those).
    pub fn condo() -> Self {
        let categories = vec![
            Category::new("networking", "Networking", 0.4)
                .with_icon("📡")
                .with_tier(Tier::Good, TierOffering::new(3200).with_label("Unit coverage"))
                .with_tier(Tier::Standard, TierOffering::new(4400).with_label("Full coverage"))
                .with_tier(Tier::Better, TierOffering::new(5900).with_label("High density"))
                .with_tier(Tier::Best, TierOffering::new(8200).with_label("10G backbone")),
            Category::new("audio", "Audio", 0.8)
                .with_icon("🔊")
                .with_tier(Tier::Good, TierOffering::new(3400).with_label("2 zones"))
                .with_tier(Tier::Standard, TierOffering::new(5200).with_label("3 zones"))
                .with_tier(Tier::Better, TierOffering::new(7800).with_label("4 zones"))
                .with_tier(Tier::Best, TierOffering::new(11600).with_label("All rooms")),
            Category::new("media-room", "Media Room", 0.5)
                .with_icon("🎬")
                .fixed_base_tier()
                .with_tier(Tier::Good, TierOffering::new(6200).with_label("Soundbar + display"))
                .with_tier(Tier::Standard, TierOffering::new(9800).with_label("5.1 surround"))
                .with_tier(Tier::Better, TierOffering::new(15400).with_label("7.1 surround"))
                .with_tier(Tier::Best, TierOffering::new(24000).with_label("Atmos")),
            Category::new("lighting", "Lighting Control", 0.9)
                .with_icon("💡")
                .with_tier(Tier::Good, TierOffering::new(3800).with_label("Main areas"))
                .with_tier(Tier::Standard, TierOffering::new(5800).with_label("Most rooms"))
                .with_tier(Tier::Better, TierOffering::new(8600).with_label("Whole unit"))
                .with_tier(Tier::Best, TierOffering::new(12800).with_label("Whole unit + keypads")),
            Category::new("shades", "Motorized Shades", 1.0)
                .with_icon("🪟")
                .with_tier(Tier::Good, TierOffering::new(4100).with_label("Bedrooms"))
                .with_tier(Tier::Standard, TierOffering::new(6400).with_label("Living + bedrooms"))
                .with_tier(Tier::Better, TierOffering::new(9600).with_label("Whole unit"))
                .with_tier(Tier::Best, TierOffering::new(14400).with_label("Whole unit, drapery")),
            Category::new("security", "Security", 0.2)
                .with_icon("🚨")
                .fixed_base_tier()
                .with_tier(Tier::Good, TierOffering::new(1400).with_label("Entry + keypad"))
                .with_tier(Tier::Standard, TierOffering::new(2200).with_label("Entry + glass break"))
                .with_tier(Tier::Better, TierOffering::new(3200).with_label("Full perimeter"))
                .with_tier(Tier::Best, TierOffering::new(4600).with_label("Full coverage")),
            Category::new("climate", "Climate Control", 0.2)
                .with_icon("🌡️")
                .with_tier(Tier::Good, TierOffering::new(900).with_label("1 smart thermostat"))
                .with_tier(Tier::Standard, TierOffering::new(1500).with_label("2 zones"))
                .with_tier(Tier::Better, TierOffering::new(2300).with_label("All zones"))
                .with_tier(Tier::Best, TierOffering::new(3400).with_label("All zones, integrated")),
        ];

        let extras = vec![
            Extra::new("rack", "Equipment Cabinet", 1400).on_by_default(),
            Extra::new("surge", "Surge Protection & Power", 1100).on_by_default(),
            Extra::new("cell-booster", "Cellular Booster", 2400).with_scale(0.3),
            Extra::new("service-plan", "First-Year Service Plan", 900),
        ];

        PricingCatalog {
            property_type: PropertyType::Condo,
            categories,
            extras,
        }
    }
}

// ============================================================================
// PRICE SHEET IMPORT
// ============================================================================

/// One row of an admin price sheet CSV.
///
/// Columns: `Item_Type` (category|extra), `Item_Id`, `Tier` (blank for
/// extras), `Price` (whole dollars at the reference size).
#[derive(Debug, Clone, Deserialize)]
pub struct PriceSheetRow {
    #[serde(rename = "Item_Type")]
    pub item_type: String,

    #[serde(rename = "Item_Id")]
    pub item_id: String,

    #[serde(rename = "Tier")]
    #[serde(default)]
    pub tier: String,

    #[serde(rename = "Price")]
    pub price: i64,
}

/// Load a price sheet CSV from disk
pub fn load_price_sheet<P: AsRef<Path>>(path: P) -> Result<Vec<PriceSheetRow>> {
    let mut rdr = csv::Reader::from_path(path.as_ref())
        .with_context(|| format!("Failed to open price sheet: {:?}", path.as_ref()))?;
    read_price_sheet(&mut rdr)
}

/// Read price sheet rows from any CSV reader
pub fn read_price_sheet<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> Result<Vec<PriceSheetRow>> {
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: PriceSheetRow = result.context("Failed to deserialize price sheet row")?;
        rows.push(row);
    }
    Ok(rows)
}

// ============================================================================
// VALIDATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validates catalog shape once at load time.
pub struct CatalogValidator;

impl CatalogValidator {
    pub fn new() -> Self {
        CatalogValidator
    }

    pub fn validate(&self, catalog: &PricingCatalog) -> ValidationResult {
        let mut errors = Vec::new();
        let mut seen_categories: HashSet<&str> = HashSet::new();
        let mut seen_extras: HashSet<&str> = HashSet::new();

        for category in &catalog.categories {
            let context = if category.id.is_empty() {
                "category".to_string()
            } else {
                format!("category:{}", category.id)
            };

            if category.id.is_empty() {
                errors.push(ValidationError {
                    field: "id".to_string(),
                    message: "Required field is empty".to_string(),
                    context: context.clone(),
                });
            } else if !seen_categories.insert(category.id.as_str()) {
                errors.push(ValidationError {
                    field: "id".to_string(),
                    message: format!("Duplicate category id '{}'", category.id),
                    context: context.clone(),
                });
            }

            if category.name.is_empty() {
                errors.push(ValidationError {
                    field: "name".to_string(),
                    message: "Required field is empty".to_string(),
                    context: context.clone(),
                });
            }

            if !category.size_scale.is_finite() {
                errors.push(ValidationError {
                    field: "sizeScale".to_string(),
                    message: format!("Must be finite, got {}", category.size_scale),
                    context: context.clone(),
                });
            }

            if category.tiers.is_empty() {
                errors.push(ValidationError {
                    field: "tiers".to_string(),
                    message: "Category has no tiers".to_string(),
                    context: context.clone(),
                });
            }

            for (tier_name, offering) in &category.tiers {
                if Tier::parse(tier_name).is_none() {
                    errors.push(ValidationError {
                        field: "tiers".to_string(),
                        message: format!("Unknown tier '{}'", tier_name),
                        context: context.clone(),
                    });
                }

                if offering.price < 0 {
                    errors.push(ValidationError {
                        field: format!("tiers.{}.price", tier_name),
                        message: format!("Must be non-negative, got {}", offering.price),
                        context: context.clone(),
                    });
                }

                if let Some(scale) = offering.size_scale {
                    if !scale.is_finite() {
                        errors.push(ValidationError {
                            field: format!("tiers.{}.sizeScale", tier_name),
                            message: format!("Must be finite, got {}", scale),
                            context: context.clone(),
                        });
                    }
                }
            }
        }

        for extra in &catalog.extras {
            let context = if extra.id.is_empty() {
                "extra".to_string()
            } else {
                format!("extra:{}", extra.id)
            };

            if extra.id.is_empty() {
                errors.push(ValidationError {
                    field: "id".to_string(),
                    message: "Required field is empty".to_string(),
                    context: context.clone(),
                });
            } else if !seen_extras.insert(extra.id.as_str()) {
                errors.push(ValidationError {
                    field: "id".to_string(),
                    message: format!("Duplicate extra id '{}'", extra.id),
                    context: context.clone(),
                });
            }

            if extra.name.is_empty() {
                errors.push(ValidationError {
                    field: "name".to_string(),
                    message: "Required field is empty".to_string(),
                    context: context.clone(),
                });
            }

            if extra.price < 0 {
                errors.push(ValidationError {
                    field: "price".to_string(),
                    message: format!("Must be non-negative, got {}", extra.price),
                    context: context.clone(),
                });
            }

            if let Some(scale) = extra.size_scale {
                if !scale.is_finite() {
                    errors.push(ValidationError {
                        field: "sizeScale".to_string(),
                        message: format!("Must be finite, got {}", scale),
                        context: context.clone(),
                    });
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for CatalogValidator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
