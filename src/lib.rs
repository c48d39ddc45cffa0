// TechQuote - Residential Technology Quoting Core
// Exposes all modules for use in the CLI, consuming services, and tests

pub mod catalog;
pub mod selection;
pub mod pricing;
pub mod versioning;
pub mod share;
pub mod db;

// Re-export commonly used types
pub use catalog::{
    load_price_sheet, read_price_sheet, CatalogValidator, Category, Extra, PriceSheetRow,
    PricingCatalog, PropertyType, Tier, TierOffering, ValidationError, ValidationResult,
    MINIMUM_SIZE_SQFT, REFERENCE_SIZE_SQFT,
};
pub use selection::{CategoryAdjustment, Modifier, SelectionState};
pub use pricing::{
    calculate_total, category_price, dominant_tier, extra_price, size_multiplier, Totals, TAX_RATE,
};
pub use versioning::{
    state_fingerprint, Budget, BudgetState, StoreError, UpdateOutcome, Version,
    CONSOLIDATION_WINDOW_MINUTES,
};
pub use share::{share_token, ShareLink};
pub use db::{
    create_share_link, delete_budget, get_budget, get_share_links, insert_budget, list_budgets,
    record_view, reset_budget_history, resolve_share_link, restore_budget_version,
    save_budget_update, setup_database, update_budget_with_retry, BudgetSummary,
    DEFAULT_RETRY_ATTEMPTS,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
