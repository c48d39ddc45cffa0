// 💾 Persistence - SQLite storage for budgets, versions, and share links
// The version policy itself lives in versioning.rs; this layer persists its
// decisions. Version numbering by count-at-read is racy, so the schema
// carries UNIQUE(budget_id, version_number) and racing appends surface as a
// retryable Conflict.

use crate::share::ShareLink;
use crate::versioning::{Budget, BudgetState, StoreError, UpdateOutcome, Version};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;

/// How many fresh-read attempts a conflicted update gets before surfacing
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Storage(format!("Bad timestamp '{}': {}", raw, e)))
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<(), StoreError> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Budgets Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS budgets (
            id TEXT PRIMARY KEY,
            client_name TEXT,
            builder_name TEXT,
            property_type TEXT NOT NULL,
            current_state TEXT NOT NULL,
            view_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Versions Table
    // The unique constraint is the backstop against racing appends: two
    // writers deciding on the same next version number cannot both land.
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS budget_versions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            budget_id TEXT NOT NULL,
            version_number INTEGER NOT NULL,
            timestamp TEXT NOT NULL,
            state TEXT NOT NULL,
            note TEXT NOT NULL,
            pinned INTEGER NOT NULL DEFAULT 0,
            UNIQUE(budget_id, version_number)
        )",
        [],
    )?;

    // ==========================================================================
    // Share Links Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS share_links (
            token TEXT PRIMARY KEY,
            budget_id TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_versions_budget ON budget_versions(budget_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_share_links_budget ON share_links(budget_id)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// BUDGET CRUD
// ============================================================================

pub fn insert_budget(conn: &Connection, budget: &Budget) -> Result<(), StoreError> {
    let current_state_json = serde_json::to_string(&budget.current_state)?;
    let property_type = budget.current_state.selection.property_type.as_str();

    conn.execute(
        "INSERT INTO budgets (
            id, client_name, builder_name, property_type, current_state,
            view_count, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            budget.id,
            budget.client_name,
            budget.builder_name,
            property_type,
            current_state_json,
            budget.view_count,
            budget.created_at.to_rfc3339(),
            budget.updated_at.to_rfc3339(),
        ],
    )?;

    for version in &budget.versions {
        insert_version_row(conn, &budget.id, version)?;
    }

    Ok(())
}

pub fn get_budget(conn: &Connection, budget_id: &str) -> Result<Budget, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, client_name, builder_name, current_state, view_count, created_at, updated_at
         FROM budgets WHERE id = ?1",
    )?;

    let mut rows = stmt.query(params![budget_id])?;
    let Some(row) = rows.next()? else {
        return Err(StoreError::BudgetNotFound(budget_id.to_string()));
    };

    let current_state_json: String = row.get(3)?;
    let created_at_raw: String = row.get(5)?;
    let updated_at_raw: String = row.get(6)?;

    let mut budget = Budget {
        id: row.get(0)?,
        client_name: row.get(1)?,
        builder_name: row.get(2)?,
        current_state: serde_json::from_str(&current_state_json)?,
        versions: Vec::new(),
        view_count: row.get(4)?,
        created_at: parse_timestamp(&created_at_raw)?,
        updated_at: parse_timestamp(&updated_at_raw)?,
    };

    budget.versions = get_versions(conn, budget_id)?;
    Ok(budget)
}

fn get_versions(conn: &Connection, budget_id: &str) -> Result<Vec<Version>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT version_number, timestamp, state, note, pinned
         FROM budget_versions WHERE budget_id = ?1 ORDER BY version_number",
    )?;

    let rows = stmt.query_map(params![budget_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, bool>(4)?,
        ))
    })?;

    let mut versions = Vec::new();
    for row in rows {
        let (version_number, timestamp_raw, state_json, note, pinned) = row?;
        versions.push(Version {
            version_number,
            timestamp: parse_timestamp(&timestamp_raw)?,
            state: serde_json::from_str(&state_json)?,
            note,
            pinned,
        });
    }

    Ok(versions)
}

/// Admin-only physical delete of a budget, its history, and its share links.
pub fn delete_budget(conn: &Connection, budget_id: &str) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM budget_versions WHERE budget_id = ?1",
        params![budget_id],
    )?;
    conn.execute(
        "DELETE FROM share_links WHERE budget_id = ?1",
        params![budget_id],
    )?;

    let deleted = conn.execute("DELETE FROM budgets WHERE id = ?1", params![budget_id])?;
    if deleted == 0 {
        return Err(StoreError::BudgetNotFound(budget_id.to_string()));
    }

    Ok(())
}

/// Listing row for the admin budget index.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub id: String,
    pub client_name: Option<String>,
    pub builder_name: Option<String>,
    pub property_type: String,
    pub grand_total: i64,
    pub version_count: i64,
    pub view_count: i64,
    pub updated_at: DateTime<Utc>,
}

pub fn list_budgets(conn: &Connection) -> Result<Vec<BudgetSummary>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT b.id, b.client_name, b.builder_name, b.property_type, b.current_state,
                b.view_count, b.updated_at,
                (SELECT COUNT(*) FROM budget_versions v WHERE v.budget_id = b.id)
         FROM budgets b ORDER BY b.updated_at DESC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, i64>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, i64>(7)?,
        ))
    })?;

    let mut summaries = Vec::new();
    for row in rows {
        let (id, client_name, builder_name, property_type, state_json, view_count, updated_raw, version_count) =
            row?;
        let state: BudgetState = serde_json::from_str(&state_json)?;

        summaries.push(BudgetSummary {
            id,
            client_name,
            builder_name,
            property_type,
            grand_total: state.totals.grand_total,
            version_count,
            view_count,
            updated_at: parse_timestamp(&updated_raw)?,
        });
    }

    Ok(summaries)
}

/// Bump the view counter, returning the new count.
pub fn record_view(conn: &Connection, budget_id: &str) -> Result<i64, StoreError> {
    let updated = conn.execute(
        "UPDATE budgets SET view_count = view_count + 1 WHERE id = ?1",
        params![budget_id],
    )?;
    if updated == 0 {
        return Err(StoreError::BudgetNotFound(budget_id.to_string()));
    }

    let count = conn.query_row(
        "SELECT view_count FROM budgets WHERE id = ?1",
        params![budget_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ============================================================================
// VERSION PERSISTENCE
// ============================================================================

fn insert_version_row(
    conn: &Connection,
    budget_id: &str,
    version: &Version,
) -> Result<(), StoreError> {
    let state_json = serde_json::to_string(&version.state)?;

    let result = conn.execute(
        "INSERT INTO budget_versions (
            budget_id, version_number, timestamp, state, note, pinned
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            budget_id,
            version.version_number,
            version.timestamp.to_rfc3339(),
            state_json,
            version.note,
            version.pinned,
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(StoreError::Conflict {
                budget_id: budget_id.to_string(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

fn overwrite_version_row(
    conn: &Connection,
    budget_id: &str,
    version: &Version,
) -> Result<(), StoreError> {
    let state_json = serde_json::to_string(&version.state)?;

    let updated = conn.execute(
        "UPDATE budget_versions
         SET timestamp = ?3, state = ?4, note = ?5, pinned = ?6
         WHERE budget_id = ?1 AND version_number = ?2",
        params![
            budget_id,
            version.version_number,
            version.timestamp.to_rfc3339(),
            state_json,
            version.note,
            version.pinned,
        ],
    )?;

    if updated == 0 {
        return Err(StoreError::Storage(format!(
            "Version {} row missing for budget {}",
            version.version_number, budget_id
        )));
    }

    Ok(())
}

fn update_budget_row(conn: &Connection, budget: &Budget) -> Result<(), StoreError> {
    let current_state_json = serde_json::to_string(&budget.current_state)?;

    conn.execute(
        "UPDATE budgets SET current_state = ?2, updated_at = ?3 WHERE id = ?1",
        params![
            budget.id,
            current_state_json,
            budget.updated_at.to_rfc3339(),
        ],
    )?;

    Ok(())
}

/// Persist whatever `apply_update` decided for the latest version.
fn persist_latest(
    conn: &Connection,
    budget: &Budget,
    outcome: &UpdateOutcome,
) -> Result<(), StoreError> {
    let Some(latest) = budget.latest_version() else {
        return Err(StoreError::Storage(format!(
            "Budget {} has no versions",
            budget.id
        )));
    };

    if outcome.created {
        insert_version_row(conn, &budget.id, latest)?;
    } else {
        overwrite_version_row(conn, &budget.id, latest)?;
    }

    update_budget_row(conn, budget)
}

// ============================================================================
// SAVE OPERATIONS
// ============================================================================

/// Read-apply-persist one save. A racing append surfaces as
/// `StoreError::Conflict`; see [`update_budget_with_retry`].
pub fn save_budget_update(
    conn: &Connection,
    budget_id: &str,
    new_state: BudgetState,
    note: Option<&str>,
    pin: bool,
    now: DateTime<Utc>,
) -> Result<UpdateOutcome, StoreError> {
    let mut budget = get_budget(conn, budget_id)?;
    let outcome = budget.apply_update(new_state, note, pin, now)?;

    // Pure no-op without a pin upgrade: nothing to write
    if !outcome.created && !outcome.consolidated && !pin {
        return Ok(outcome);
    }

    persist_latest(conn, &budget, &outcome)?;
    Ok(outcome)
}

/// Save with a bounded fresh-read retry loop on version-number conflicts.
pub fn update_budget_with_retry(
    conn: &Connection,
    budget_id: &str,
    new_state: BudgetState,
    note: Option<&str>,
    pin: bool,
    now: DateTime<Utc>,
    max_attempts: u32,
) -> Result<UpdateOutcome, StoreError> {
    let mut attempt = 0;

    loop {
        match save_budget_update(conn, budget_id, new_state.clone(), note, pin, now) {
            Err(err) if err.is_retryable() && attempt + 1 < max_attempts => {
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Restore a historical version (always an append, pinned).
pub fn restore_budget_version(
    conn: &Connection,
    budget_id: &str,
    version_number: i64,
    now: DateTime<Utc>,
) -> Result<UpdateOutcome, StoreError> {
    let mut budget = get_budget(conn, budget_id)?;
    let outcome = budget.restore(version_number, now)?;
    persist_latest(conn, &budget, &outcome)?;
    Ok(outcome)
}

/// Destructive history reset after catalog customization. Caller must hold
/// an administrative capability; there is no undo.
pub fn reset_budget_history(
    conn: &Connection,
    budget_id: &str,
    new_state: BudgetState,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let mut budget = get_budget(conn, budget_id)?;
    budget.reset_for_customization(new_state, now);

    conn.execute(
        "DELETE FROM budget_versions WHERE budget_id = ?1",
        params![budget_id],
    )?;

    let Some(v1) = budget.latest_version() else {
        return Err(StoreError::Storage(format!(
            "Budget {} has no versions after reset",
            budget_id
        )));
    };
    insert_version_row(conn, budget_id, v1)?;
    update_budget_row(conn, &budget)
}

// ============================================================================
// SHARE LINKS
// ============================================================================

/// Mint a share link and pin the shared snapshot so consolidation can never
/// rewrite what the recipient saw.
pub fn create_share_link(
    conn: &Connection,
    budget_id: &str,
    now: DateTime<Utc>,
) -> Result<ShareLink, StoreError> {
    let mut budget = get_budget(conn, budget_id)?;

    let already_pinned = budget.latest_version().map(|v| v.pinned).unwrap_or(false);
    let outcome =
        budget.apply_update(budget.current_state.clone(), Some("Shared/Emailed"), true, now)?;
    if !already_pinned || outcome.created {
        persist_latest(conn, &budget, &outcome)?;
    }

    let link = ShareLink::new(budget_id, now);
    let result = conn.execute(
        "INSERT INTO share_links (token, budget_id, created_at) VALUES (?1, ?2, ?3)",
        params![link.token, link.budget_id, link.created_at.to_rfc3339()],
    );

    match result {
        Ok(_) => Ok(link),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(StoreError::Conflict {
                budget_id: budget_id.to_string(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolve a share token to its budget, counting the view.
pub fn resolve_share_link(conn: &Connection, token: &str) -> Result<Budget, StoreError> {
    let mut stmt = conn.prepare("SELECT budget_id FROM share_links WHERE token = ?1")?;
    let mut rows = stmt.query(params![token])?;

    let Some(row) = rows.next()? else {
        return Err(StoreError::ShareLinkNotFound(token.to_string()));
    };
    let budget_id: String = row.get(0)?;

    record_view(conn, &budget_id)?;
    get_budget(conn, &budget_id)
}

/// Tokens already minted for a budget.
pub fn get_share_links(conn: &Connection, budget_id: &str) -> Result<Vec<ShareLink>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT token, budget_id, created_at FROM share_links WHERE budget_id = ?1
         ORDER BY created_at",
    )?;

    let rows = stmt.query_map(params![budget_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut links = Vec::new();
    for row in rows {
        let (token, budget_id, created_raw) = row?;
        links.push(ShareLink {
            token,
            budget_id,
            created_at: parse_timestamp(&created_raw)?,
        });
    }

    Ok(links)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PricingCatalog, Tier};
    use crate::pricing::calculate_total;
    use crate::selection::SelectionState;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn state_with_networking(tier: Tier) -> BudgetState {
        let catalog = PricingCatalog::residential();
        let mut selection = SelectionState::for_catalog(&catalog, 6000);
        selection.select("networking", Some(tier));
        let totals = calculate_total(&catalog, &selection);
        BudgetState::new(selection, totals)
    }

    fn seeded(conn: &Connection) -> Budget {
        setup_database(conn).unwrap();
        let budget = Budget::new(
            Some("Meridian".to_string()),
            Some("Hartwell Homes".to_string()),
            state_with_networking(Tier::Good),
            t0(),
        );
        insert_budget(conn, &budget).unwrap();
        budget
    }

    #[test]
    fn test_budget_roundtrip() {
        let conn = Connection::open_in_memory().unwrap();
        let budget = seeded(&conn);

        let loaded = get_budget(&conn, &budget.id).unwrap();

        assert_eq!(loaded.id, budget.id);
        assert_eq!(loaded.client_name, Some("Meridian".to_string()));
        assert_eq!(loaded.version_count(), 1);
        assert_eq!(loaded.current_state, budget.current_state);
        assert!(loaded.latest_version().unwrap().pinned);
    }

    #[test]
    fn test_get_missing_budget_is_not_found() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        match get_budget(&conn, "no-such-budget") {
            Err(StoreError::BudgetNotFound(id)) => assert_eq!(id, "no-such-budget"),
            other => panic!("expected BudgetNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_save_appends_then_consolidates_then_appends() {
        let conn = Connection::open_in_memory().unwrap();
        let budget = seeded(&conn);

        // v1 is pinned: first change appends v2
        let outcome = save_budget_update(
            &conn,
            &budget.id,
            state_with_networking(Tier::Standard),
            None,
            false,
            t0(),
        )
        .unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.version_number, 2);

        // Five minutes later: consolidated into v2
        let outcome = save_budget_update(
            &conn,
            &budget.id,
            state_with_networking(Tier::Better),
            None,
            false,
            t0() + Duration::minutes(5),
        )
        .unwrap();
        assert!(outcome.consolidated);
        assert_eq!(outcome.version_number, 2);

        let loaded = get_budget(&conn, &budget.id).unwrap();
        assert_eq!(loaded.version_count(), 2);
        assert_eq!(
            loaded.current_state.selection.selections.get("networking"),
            Some(&Some("better".to_string()))
        );

        // After the window: append v3
        let outcome = save_budget_update(
            &conn,
            &budget.id,
            state_with_networking(Tier::Best),
            None,
            false,
            t0() + Duration::minutes(25),
        )
        .unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.version_number, 3);
        assert_eq!(get_budget(&conn, &budget.id).unwrap().version_count(), 3);
    }

    #[test]
    fn test_no_op_save_writes_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        let budget = seeded(&conn);

        let outcome = save_budget_update(
            &conn,
            &budget.id,
            budget.current_state.clone(),
            None,
            false,
            t0() + Duration::minutes(3),
        )
        .unwrap();

        assert!(!outcome.created);
        assert!(!outcome.consolidated);

        let loaded = get_budget(&conn, &budget.id).unwrap();
        assert_eq!(loaded.version_count(), 1);
        assert_eq!(loaded.updated_at, t0());
    }

    #[test]
    fn test_racing_append_maps_to_conflict() {
        let conn = Connection::open_in_memory().unwrap();
        let budget = seeded(&conn);

        // Stale reader decides on version 2...
        let mut stale = get_budget(&conn, &budget.id).unwrap();
        let outcome = stale
            .apply_update(state_with_networking(Tier::Standard), None, false, t0())
            .unwrap();
        assert_eq!(outcome.version_number, 2);

        // ...but a competing writer lands version 2 first
        save_budget_update(
            &conn,
            &budget.id,
            state_with_networking(Tier::Better),
            Some("Client revision"),
            true,
            t0(),
        )
        .unwrap();

        let latest = stale.latest_version().unwrap().clone();
        let err = insert_version_row(&conn, &stale.id, &latest).unwrap_err();
        assert!(err.is_retryable());

        // A fresh-read retry lands cleanly (competitor is pinned → append v3)
        let outcome = update_budget_with_retry(
            &conn,
            &budget.id,
            state_with_networking(Tier::Standard),
            None,
            false,
            t0() + Duration::minutes(1),
            DEFAULT_RETRY_ATTEMPTS,
        )
        .unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.version_number, 3);
    }

    #[test]
    fn test_restore_via_store() {
        let conn = Connection::open_in_memory().unwrap();
        let budget = seeded(&conn);

        save_budget_update(
            &conn,
            &budget.id,
            state_with_networking(Tier::Best),
            None,
            false,
            t0(),
        )
        .unwrap();

        let outcome =
            restore_budget_version(&conn, &budget.id, 1, t0() + Duration::minutes(1)).unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.version_number, 3);

        let loaded = get_budget(&conn, &budget.id).unwrap();
        let latest = loaded.latest_version().unwrap();
        assert!(latest.pinned);
        assert_eq!(latest.note, "Restored to version 1");
        assert_eq!(latest.state, loaded.version(1).unwrap().state);

        // Restoring a version that never existed is its own failure
        match restore_budget_version(&conn, &budget.id, 42, t0()) {
            Err(StoreError::VersionNotFound { version_number, .. }) => {
                assert_eq!(version_number, 42)
            }
            other => panic!("expected VersionNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_history_via_store() {
        let conn = Connection::open_in_memory().unwrap();
        let budget = seeded(&conn);

        save_budget_update(
            &conn,
            &budget.id,
            state_with_networking(Tier::Standard),
            None,
            false,
            t0(),
        )
        .unwrap();

        reset_budget_history(
            &conn,
            &budget.id,
            state_with_networking(Tier::Best),
            t0() + Duration::hours(1),
        )
        .unwrap();

        let loaded = get_budget(&conn, &budget.id).unwrap();
        assert_eq!(loaded.version_count(), 1);
        let v1 = loaded.latest_version().unwrap();
        assert_eq!(v1.version_number, 1);
        assert!(v1.pinned);
        assert_eq!(v1.note, "Catalog customized");
    }

    #[test]
    fn test_record_view_increments() {
        let conn = Connection::open_in_memory().unwrap();
        let budget = seeded(&conn);

        assert_eq!(record_view(&conn, &budget.id).unwrap(), 1);
        assert_eq!(record_view(&conn, &budget.id).unwrap(), 2);

        assert!(matches!(
            record_view(&conn, "no-such-budget"),
            Err(StoreError::BudgetNotFound(_))
        ));
    }

    #[test]
    fn test_share_link_roundtrip() {
        let conn = Connection::open_in_memory().unwrap();
        let budget = seeded(&conn);

        // Build an unpinned auto-save so sharing has something to pin
        save_budget_update(
            &conn,
            &budget.id,
            state_with_networking(Tier::Better),
            None,
            false,
            t0(),
        )
        .unwrap();

        let link = create_share_link(&conn, &budget.id, t0() + Duration::minutes(1)).unwrap();
        assert_eq!(link.budget_id, budget.id);

        let loaded = get_budget(&conn, &budget.id).unwrap();
        let latest = loaded.latest_version().unwrap();
        assert!(latest.pinned);
        assert_eq!(latest.note, "Shared/Emailed");

        // Resolving counts a view
        let resolved = resolve_share_link(&conn, &link.token).unwrap();
        assert_eq!(resolved.id, budget.id);
        assert_eq!(resolved.view_count, 1);

        assert!(matches!(
            resolve_share_link(&conn, "deadbeef00"),
            Err(StoreError::ShareLinkNotFound(_))
        ));

        let links = get_share_links(&conn, &budget.id).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].token, link.token);
    }

    #[test]
    fn test_delete_budget_removes_everything() {
        let conn = Connection::open_in_memory().unwrap();
        let budget = seeded(&conn);
        create_share_link(&conn, &budget.id, t0()).unwrap();

        delete_budget(&conn, &budget.id).unwrap();

        assert!(matches!(
            get_budget(&conn, &budget.id),
            Err(StoreError::BudgetNotFound(_))
        ));
        let orphans: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM budget_versions WHERE budget_id = ?1",
                params![budget.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);

        assert!(matches!(
            delete_budget(&conn, &budget.id),
            Err(StoreError::BudgetNotFound(_))
        ));
    }

    #[test]
    fn test_list_budgets_summaries() {
        let conn = Connection::open_in_memory().unwrap();
        let first = seeded(&conn);

        let second = Budget::new(
            Some("Alder Court".to_string()),
            None,
            state_with_networking(Tier::Best),
            t0() + Duration::hours(1),
        );
        insert_budget(&conn, &second).unwrap();

        let summaries = list_budgets(&conn).unwrap();
        assert_eq!(summaries.len(), 2);

        // Most recently updated first
        assert_eq!(summaries[0].id, second.id);
        assert_eq!(summaries[1].id, first.id);
        assert_eq!(summaries[0].property_type, "residential");
        assert_eq!(
            summaries[0].grand_total,
            second.current_state.totals.grand_total
        );
        assert_eq!(summaries[0].version_count, 1);
    }
}
