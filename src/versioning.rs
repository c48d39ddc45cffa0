// ⏰ Budget Version Store - Save policy and history
// A budget's identity is stable; its state is a timeline of versions. Rapid
// auto-saves consolidate into the latest unpinned version inside a 15-minute
// window instead of exploding the history. Pinning (share, explicit note,
// restore) freezes a version; the next save must append.

use crate::pricing::Totals;
use crate::selection::SelectionState;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Saves landing within this window of the latest unpinned version overwrite
/// it in place rather than appending.
pub const CONSOLIDATION_WINDOW_MINUTES: i64 = 15;

pub fn consolidation_window() -> Duration {
    Duration::minutes(CONSOLIDATION_WINDOW_MINUTES)
}

// ============================================================================
// STORE ERRORS
// ============================================================================

#[derive(Debug)]
pub enum StoreError {
    /// Unknown budget id
    BudgetNotFound(String),

    /// Known budget, unknown version number (distinct from BudgetNotFound)
    VersionNotFound {
        budget_id: String,
        version_number: i64,
    },

    /// Unknown share token
    ShareLinkNotFound(String),

    /// Two writers raced on the same version number. Retryable: re-read the
    /// budget and apply the update again.
    Conflict { budget_id: String },

    /// Underlying storage or serialization failure
    Storage(String),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::BudgetNotFound(id) => write!(f, "Budget not found: {}", id),
            StoreError::VersionNotFound {
                budget_id,
                version_number,
            } => write!(
                f,
                "Version {} not found for budget {}",
                version_number, budget_id
            ),
            StoreError::ShareLinkNotFound(token) => write!(f, "Share link not found: {}", token),
            StoreError::Conflict { budget_id } => {
                write!(f, "Concurrent version write on budget {}", budget_id)
            }
            StoreError::Storage(message) => write!(f, "Storage error: {}", message),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

// ============================================================================
// BUDGET STATE
// ============================================================================

/// The snapshot stored in each version: the selection plus its computed
/// totals. Deliberately contains no timestamps, so its fingerprint is stable
/// across re-saves of identical content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetState {
    pub selection: SelectionState,
    pub totals: Totals,
}

impl BudgetState {
    pub fn new(selection: SelectionState, totals: Totals) -> Self {
        BudgetState { selection, totals }
    }
}

/// Content fingerprint of a budget state: canonical JSON (serde_json maps
/// serialize with sorted keys) hashed with SHA-256. Two states are the same
/// save iff their fingerprints match.
pub fn state_fingerprint(state: &BudgetState) -> Result<String, StoreError> {
    let canonical = serde_json::to_value(state)?.to_string();

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// VERSION
// ============================================================================

/// One entry in a budget's history. Immutable once superseded; the latest
/// version may be overwritten in place only while unpinned and inside the
/// consolidation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// 1-based, strictly increasing within a budget
    pub version_number: i64,

    pub timestamp: DateTime<Utc>,

    pub state: BudgetState,

    pub note: String,

    /// Pinned versions are permanent: exempt from consolidation and overwrite
    pub pinned: bool,
}

// ============================================================================
// UPDATE OUTCOME
// ============================================================================

/// What a save did to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    /// A new version was appended
    pub created: bool,

    /// The version now holding the saved state
    pub version_number: i64,

    /// The latest version was overwritten in place
    pub consolidated: bool,
}

// ============================================================================
// BUDGET
// ============================================================================

/// A persisted quote with version history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// Stable identity (UUID) - never changes
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder_name: Option<String>,

    /// Always the most recently saved state, regardless of which history
    /// branch the save took
    pub current_state: BudgetState,

    /// Append-only history
    pub versions: Vec<Version>,

    pub view_count: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// New budget seeded with a single pinned version 1.
    pub fn new(
        client_name: Option<String>,
        builder_name: Option<String>,
        state: BudgetState,
        now: DateTime<Utc>,
    ) -> Self {
        Budget {
            id: uuid::Uuid::new_v4().to_string(),
            client_name,
            builder_name,
            current_state: state.clone(),
            versions: vec![Version {
                version_number: 1,
                timestamp: now,
                state,
                note: "Created".to_string(),
                pinned: true,
            }],
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.last()
    }

    pub fn version(&self, version_number: i64) -> Option<&Version> {
        self.versions
            .iter()
            .find(|v| v.version_number == version_number)
    }

    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Apply a save with an explicit clock (tests drive the window directly).
    ///
    /// Decision order:
    /// 1. Identical state → no-op, except a pin request on an unpinned
    ///    latest version upgrades it in place.
    /// 2. Latest unpinned, inside the consolidation window, no pin requested
    ///    → overwrite the latest version's state and timestamp.
    /// 3. Otherwise append version N+1. Default note "Auto-save", or
    ///    "Shared/Emailed" when pinning without a note.
    pub fn apply_update(
        &mut self,
        new_state: BudgetState,
        note: Option<&str>,
        pin: bool,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, StoreError> {
        let new_fingerprint = state_fingerprint(&new_state)?;

        let (latest_number, latest_pinned, latest_timestamp, latest_fingerprint) = {
            let Some(latest) = self.versions.last() else {
                return Err(StoreError::Storage(format!(
                    "Budget {} has no versions",
                    self.id
                )));
            };
            (
                latest.version_number,
                latest.pinned,
                latest.timestamp,
                state_fingerprint(&latest.state)?,
            )
        };

        // 1. No content change
        if new_fingerprint == latest_fingerprint {
            if pin && !latest_pinned {
                if let Some(latest) = self.versions.last_mut() {
                    latest.pinned = true;
                    if let Some(note) = note {
                        latest.note = note.to_string();
                    }
                }
                self.updated_at = now;
            }

            return Ok(UpdateOutcome {
                created: false,
                version_number: latest_number,
                consolidated: false,
            });
        }

        // 2. Consolidate rapid saves into the latest unpinned version
        let in_window = now - latest_timestamp < consolidation_window();
        if !latest_pinned && in_window && !pin {
            if let Some(latest) = self.versions.last_mut() {
                latest.state = new_state.clone();
                latest.timestamp = now;
                if let Some(note) = note {
                    latest.note = note.to_string();
                }
            }

            self.current_state = new_state;
            self.updated_at = now;

            return Ok(UpdateOutcome {
                created: false,
                version_number: latest_number,
                consolidated: true,
            });
        }

        // 3. Append
        let next_number = latest_number + 1;
        let note = match note {
            Some(note) => note.to_string(),
            None if pin => "Shared/Emailed".to_string(),
            None => "Auto-save".to_string(),
        };

        self.versions.push(Version {
            version_number: next_number,
            timestamp: now,
            state: new_state.clone(),
            note,
            pinned: pin,
        });

        self.current_state = new_state;
        self.updated_at = now;

        Ok(UpdateOutcome {
            created: true,
            version_number: next_number,
            consolidated: false,
        })
    }

    /// Convenience wrapper over [`Budget::apply_update`] using the wall clock.
    pub fn update(
        &mut self,
        new_state: BudgetState,
        note: Option<&str>,
        pin: bool,
    ) -> Result<UpdateOutcome, StoreError> {
        self.apply_update(new_state, note, pin, Utc::now())
    }

    /// Restore a historical version: always an append, never an overwrite,
    /// and the restored version is pinned so it can't be consolidated away.
    pub fn restore(
        &mut self,
        version_number: i64,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome, StoreError> {
        let source = self
            .version(version_number)
            .ok_or_else(|| StoreError::VersionNotFound {
                budget_id: self.id.clone(),
                version_number,
            })?;

        let state = source.state.clone();
        let next_number = self
            .versions
            .last()
            .map(|v| v.version_number)
            .unwrap_or(0)
            + 1;

        self.versions.push(Version {
            version_number: next_number,
            timestamp: now,
            state: state.clone(),
            note: format!("Restored to version {}", version_number),
            pinned: true,
        });

        self.current_state = state;
        self.updated_at = now;

        Ok(UpdateOutcome {
            created: true,
            version_number: next_number,
            consolidated: false,
        })
    }

    /// Destructive reset after an admin customizes the budget's catalog:
    /// wipes the entire history and reseeds a single pinned version 1.
    /// Callers must gate this behind an administrative capability.
    pub fn reset_for_customization(&mut self, new_state: BudgetState, now: DateTime<Utc>) {
        self.versions.clear();
        self.versions.push(Version {
            version_number: 1,
            timestamp: now,
            state: new_state.clone(),
            note: "Catalog customized".to_string(),
            pinned: true,
        });

        self.current_state = new_state;
        self.updated_at = now;
    }

    pub fn record_view(&mut self) {
        self.view_count += 1;
    }
}

// ============================================================================
// TESTS
// ============================================================================
