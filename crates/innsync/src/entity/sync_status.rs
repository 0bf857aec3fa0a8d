//! Per-property sync status enum.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of the most recent sync attempt for a property.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum SyncStatus {
    /// Row exists but has never completed a sync.
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    /// Last sync attempt succeeded.
    #[sea_orm(string_value = "ok")]
    Ok,
    /// Last sync attempt failed after retries.
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Pending => write!(f, "pending"),
            SyncStatus::Ok => write!(f, "ok"),
            SyncStatus::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_pending() {
        assert_eq!(SyncStatus::default(), SyncStatus::Pending);
    }

    #[test]
    fn display_outputs_expected_strings() {
        assert_eq!(SyncStatus::Pending.to_string(), "pending");
        assert_eq!(SyncStatus::Ok.to_string(), "ok");
        assert_eq!(SyncStatus::Failed.to_string(), "failed");
    }
}
