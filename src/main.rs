use anyhow::{bail, Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use std::env;
use std::path::PathBuf;

use techquote::{
    calculate_total, create_share_link, dominant_tier, get_budget, insert_budget, list_budgets,
    setup_database, Budget, BudgetState, CatalogValidator, Modifier, PricingCatalog, PropertyType,
    SelectionState, Tier,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("init") => run_init(),
        Some("demo") => run_demo(),
        Some("list") => run_list(),
        Some("show") => run_show(args.get(2)),
        Some("history") => run_history(args.get(2)),
        Some("validate") => run_validate(args.get(2)),
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("TechQuote - Residential Technology Quoting");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Usage:");
    println!("  techquote init              Create the quotes database");
    println!("  techquote demo              Build and save a sample quote");
    println!("  techquote list              List saved budgets");
    println!("  techquote show <id>         Show a budget's current quote");
    println!("  techquote history <id>      Show a budget's version history");
    println!("  techquote validate <file>   Validate a catalog JSON file");
}

fn db_path() -> PathBuf {
    env::var("TECHQUOTE_DB")
        .unwrap_or_else(|_| "quotes.db".to_string())
        .into()
}

fn open_database() -> Result<Connection> {
    let path = db_path();
    let conn = Connection::open(&path)
        .with_context(|| format!("Failed to open database at {:?}", path))?;
    setup_database(&conn)?;
    Ok(conn)
}

fn run_init() -> Result<()> {
    println!("🗄️  Initializing quotes database...");
    let _conn = open_database()?;
    println!("✓ Database ready at {:?}", db_path());
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("🏠 TechQuote - Sample Quote");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let conn = open_database()?;

    // 6000 sqft residential build, mid-range package with a builder credit
    let catalog = PricingCatalog::for_property(PropertyType::Residential);
    let mut selection = SelectionState::for_catalog(&catalog, 6000);
    selection.select("networking", Some(Tier::Better));
    selection.select("audio", Some(Tier::Better));
    selection.select("lighting", Some(Tier::Standard));
    selection.select("security", Some(Tier::Good));
    selection.select("wiring", Some(Tier::Better));
    selection.add_modifier(Modifier::new("Builder program credit", -1500));

    selection
        .validate()
        .map_err(|errors| anyhow::anyhow!("Invalid selection: {} problems", errors.len()))?;

    let totals = calculate_total(&catalog, &selection);

    println!("\n📋 Line items ({} sqft):", selection.home_size);
    for category in &catalog.categories {
        if let Some(Some(tier_name)) = selection.selections.get(&category.id) {
            let price = techquote::category_price(category, tier_name, selection.home_size);
            println!("   {:<22} {:<10} ${}", category.name, tier_name, price);
        }
    }
    for extra in &catalog.extras {
        if selection.extras.get(&extra.id).copied().unwrap_or(false) {
            let price = techquote::extra_price(extra, selection.home_size);
            println!("   {:<22} {:<10} ${}", extra.name, "extra", price);
        }
    }

    println!("\n💵 Totals:");
    println!("   Subtotal:            ${}", totals.subtotal);
    println!("   Extras:              ${}", totals.extras_total);
    println!("   Modifiers:           ${}", totals.modifiers_total);
    println!("   Equipment subtotal:  ${}", totals.equipment_subtotal);
    println!("   Tax estimate (7%):   ${}", totals.tax_estimate);
    println!("   Grand total:         ${}", totals.grand_total);

    if let Some(tier) = dominant_tier(&selection) {
        println!("\n⭐ Package level: {}", tier.label());
    }

    let now = Utc::now();
    let budget = Budget::new(
        Some("Sample Client".to_string()),
        None,
        BudgetState::new(selection, totals),
        now,
    );
    insert_budget(&conn, &budget)?;

    let link = create_share_link(&conn, &budget.id, now)?;

    println!("\n✓ Saved budget {}", budget.id);
    println!("✓ Share token: {}", link.token);

    Ok(())
}

fn run_list() -> Result<()> {
    let conn = open_database()?;
    let summaries = list_budgets(&conn)?;

    if summaries.is_empty() {
        println!("No budgets saved yet. Run: techquote demo");
        return Ok(());
    }

    println!("📊 Saved budgets:");
    for summary in summaries {
        println!(
            "   {}  {:<20} {:<12} ${:<9} v{}  👁 {}",
            summary.id,
            summary.client_name.as_deref().unwrap_or("-"),
            summary.property_type,
            summary.grand_total,
            summary.version_count,
            summary.view_count,
        );
    }

    Ok(())
}

fn run_show(budget_id: Option<&String>) -> Result<()> {
    let Some(budget_id) = budget_id else {
        bail!("Usage: techquote show <id>");
    };

    let conn = open_database()?;
    let budget = get_budget(&conn, budget_id)?;
    let totals = &budget.current_state.totals;

    println!("🏠 Budget {}", budget.id);
    if let Some(client) = &budget.client_name {
        println!("   Client: {}", client);
    }
    println!("   Home size: {} sqft", budget.current_state.selection.home_size);
    println!("   Selected categories: {}", totals.selected_count);
    println!("   Equipment subtotal:  ${}", totals.equipment_subtotal);
    println!("   Tax estimate:        ${}", totals.tax_estimate);
    println!("   Grand total:         ${}", totals.grand_total);
    println!("   Views: {}", budget.view_count);

    Ok(())
}

fn run_history(budget_id: Option<&String>) -> Result<()> {
    let Some(budget_id) = budget_id else {
        bail!("Usage: techquote history <id>");
    };

    let conn = open_database()?;
    let budget = get_budget(&conn, budget_id)?;

    println!("⏰ History for budget {}", budget.id);
    for version in &budget.versions {
        let pin_marker = if version.pinned { "📌" } else { "  " };
        println!(
            "   {} v{:<3} {}  ${:<9} {}",
            pin_marker,
            version.version_number,
            version.timestamp.format("%Y-%m-%d %H:%M"),
            version.state.totals.grand_total,
            version.note,
        );
    }

    Ok(())
}

fn run_validate(path: Option<&String>) -> Result<()> {
    let Some(path) = path else {
        bail!("Usage: techquote validate <catalog.json>");
    };

    println!("📐 Validating catalog {}", path);
    let catalog = PricingCatalog::from_file(path)?;

    match CatalogValidator::new().validate(&catalog) {
        Ok(()) => {
            println!(
                "✓ Catalog OK: {} categories, {} extras",
                catalog.categories.len(),
                catalog.extras.len()
            );
            Ok(())
        }
        Err(errors) => {
            println!("❌ Catalog has {} problems:", errors.len());
            for error in &errors {
                println!("   {}", error);
            }
            bail!("Catalog validation failed");
        }
    }
}
