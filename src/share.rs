// 🔗 Share Links - Short tokens for sharing a quote
// Sharing pins the latest version (note "Shared/Emailed") so the shared
// snapshot can never be consolidated away. Delivery (email) is the caller's
// concern; this module only mints and models the link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of the hex token embedded in share URLs
pub const TOKEN_LENGTH: usize = 10;

/// Deterministic short token for a budget shared at a point in time.
/// SHA-256 over id + timestamp, truncated to hex; collisions are guarded by
/// the storage layer's unique constraint.
pub fn share_token(budget_id: &str, created_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}{}", budget_id, created_at.to_rfc3339()));
    let digest = format!("{:x}", hasher.finalize());
    digest[..TOKEN_LENGTH].to_string()
}

/// A minted share link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub token: String,
    pub budget_id: String,
    pub created_at: DateTime<Utc>,
}

impl ShareLink {
    pub fn new(budget_id: &str, now: DateTime<Utc>) -> Self {
        ShareLink {
            token: share_token(budget_id, now),
            budget_id: budget_id.to_string(),
            created_at: now,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_token_is_stable_and_hex_shaped() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let a = share_token("budget-1", at);
        let b = share_token("budget-1", at);

        assert_eq!(a, b);
        assert_eq!(a.len(), TOKEN_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_token_differs_per_budget_and_time() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 1).unwrap();

        assert_ne!(share_token("budget-1", at), share_token("budget-2", at));
        assert_ne!(share_token("budget-1", at), share_token("budget-1", later));
    }

    #[test]
    fn test_share_link_carries_budget_id() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let link = ShareLink::new("budget-1", at);

        assert_eq!(link.budget_id, "budget-1");
        assert_eq!(link.token, share_token("budget-1", at));
    }
}
