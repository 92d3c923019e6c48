//! Plain data records exchanged between devices and with the collaborators
//! that sit around the sync engine (reports, budgets, rule matching).
//!
//! Everything here is serde-only so that clients can depend on it without
//! pulling in the storage stack. JSON field names are camelCase.

use serde::{Deserialize, Serialize};

/// The entity types managed by the sync engine.
///
/// Order of the variants is the order in which entity types are applied
/// during push and import: parents before children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Category,
    AutomationRule,
    Transaction,
    Setting,
    User,
}

impl EntityType {
    /// Apply order for push and import.
    pub const APPLY_ORDER: [EntityType; 5] = [
        Self::Category,
        Self::AutomationRule,
        Self::Transaction,
        Self::Setting,
        Self::User,
    ];

    /// Returns the canonical string stored in the change log.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::AutomationRule => "automation_rule",
            Self::Transaction => "transaction",
            Self::Setting => "setting",
            Self::User => "user",
        }
    }
}

impl TryFrom<&str> for EntityType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "category" => Ok(Self::Category),
            "automation_rule" => Ok(Self::AutomationRule),
            "transaction" => Ok(Self::Transaction),
            "setting" => Ok(Self::Setting),
            "user" => Ok(Self::User),
            other => Err(format!("invalid entity type: {other}")),
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum TransactionStatus {
        Pending,
        Completed,
        Cleared,
    }

    impl TransactionStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Pending => "pending",
                Self::Completed => "completed",
                Self::Cleared => "cleared",
            }
        }
    }

    impl TryFrom<&str> for TransactionStatus {
        type Error = String;

        fn try_from(value: &str) -> Result<Self, Self::Error> {
            match value {
                "pending" => Ok(Self::Pending),
                "completed" => Ok(Self::Completed),
                "cleared" => Ok(Self::Cleared),
                other => Err(format!("invalid transaction status: {other}")),
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum TransactionType {
        Income,
        Expense,
    }

    impl TransactionType {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Income => "income",
                Self::Expense => "expense",
            }
        }
    }

    impl TryFrom<&str> for TransactionType {
        type Error = String;

        fn try_from(value: &str) -> Result<Self, Self::Error> {
            match value {
                "income" => Ok(Self::Income),
                "expense" => Ok(Self::Expense),
                other => Err(format!("invalid transaction type: {other}")),
            }
        }
    }

    /// A ledger line.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Transaction {
        pub id: String,
        /// Booking date, `YYYY-MM-DD` or a full RFC3339 timestamp.
        pub date: String,
        pub description: String,
        #[serde(default)]
        pub category_id: Option<String>,
        pub category_name: String,
        /// Signed amount; expenses are usually negative.
        pub amount: f64,
        pub account: String,
        pub status: TransactionStatus,
        #[serde(rename = "type")]
        pub kind: TransactionType,
        #[serde(default)]
        pub notes: Option<String>,
        pub created_at: String,
        pub updated_at: String,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Category {
        pub id: String,
        pub name: String,
        pub icon: String,
        pub color: String,
        pub monthly_budget: f64,
        pub created_at: String,
        pub updated_at: String,
    }
}

pub mod rule {
    use super::*;

    /// Automation rule. The engine only replicates rules; matching
    /// `pattern` against transactions happens elsewhere.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AutomationRule {
        pub id: String,
        pub name: String,
        pub category_id: String,
        #[serde(rename = "type")]
        pub rule_type: String,
        pub pattern: String,
        pub priority: i64,
        pub is_active: bool,
        #[serde(default)]
        pub description: Option<String>,
        pub created_at: String,
        pub updated_at: String,
    }
}

pub mod setting {
    use super::*;

    /// A household setting. Keyed by `key` instead of an id.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SettingRow {
        pub key: String,
        pub value: serde_json::Value,
        pub updated_at: String,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct User {
        pub id: String,
        pub username: String,
        pub password_hash: String,
        pub must_change_password: bool,
        pub created_at: String,
        pub updated_at: String,
    }
}

pub mod sync {
    use super::*;

    pub use super::category::Category;
    pub use super::rule::AutomationRule;
    pub use super::setting::SettingRow;
    pub use super::transaction::Transaction;
    pub use super::user::User;

    /// Query string of `GET /sync/pull`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PullQuery {
        /// Cursor returned by the previous pull. Absent for a full bootstrap.
        pub cursor: Option<String>,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SyncPullResponse {
        /// Pass back as `cursor` on the next pull.
        pub cursor: String,
        pub transactions: Vec<Transaction>,
        pub categories: Vec<Category>,
        pub rules: Vec<AutomationRule>,
        pub settings: Vec<SettingRow>,
        pub users: Vec<User>,
    }

    /// Dirty rows a device sends. Missing lists are treated as empty.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SyncPushPayload {
        #[serde(default)]
        pub transactions: Vec<Transaction>,
        #[serde(default)]
        pub categories: Vec<Category>,
        #[serde(default)]
        pub rules: Vec<AutomationRule>,
        #[serde(default)]
        pub settings: Vec<SettingRow>,
        #[serde(default)]
        pub users: Vec<User>,
    }

    impl SyncPushPayload {
        /// Total number of records across all entity types.
        pub fn len(&self) -> usize {
            self.transactions.len()
                + self.categories.len()
                + self.rules.len()
                + self.settings.len()
                + self.users.len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    /// Ids (keys for settings) of the records a push applied.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AppliedIds {
        pub transactions: Vec<String>,
        pub categories: Vec<String>,
        pub rules: Vec<String>,
        pub settings: Vec<String>,
        pub users: Vec<String>,
    }

    impl AppliedIds {
        pub fn for_type_mut(&mut self, entity_type: EntityType) -> &mut Vec<String> {
            match entity_type {
                EntityType::Transaction => &mut self.transactions,
                EntityType::Category => &mut self.categories,
                EntityType::AutomationRule => &mut self.rules,
                EntityType::Setting => &mut self.settings,
                EntityType::User => &mut self.users,
            }
        }

        pub fn len(&self) -> usize {
            self.transactions.len()
                + self.categories.len()
                + self.rules.len()
                + self.settings.len()
                + self.users.len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    /// An incoming record that lost against a newer local row.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SyncConflict {
        pub entity_type: EntityType,
        pub entity_id: String,
        pub local_updated_at: String,
        pub incoming_updated_at: String,
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SyncPushResult {
        pub applied: AppliedIds,
        pub conflicts: Vec<SyncConflict>,
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SyncStatus {
        pub last_successful_sync_at: Option<String>,
    }
}

pub mod backup {
    use super::*;

    use super::sync::{AutomationRule, Category, SettingRow, Transaction, User};

    /// The only snapshot format version this crate reads and writes.
    pub const SNAPSHOT_VERSION: u32 = 1;

    /// Full, unfiltered state of every managed table.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BackupSnapshot {
        pub version: u32,
        pub exported_at: String,
        pub transactions: Vec<Transaction>,
        pub categories: Vec<Category>,
        pub rules: Vec<AutomationRule>,
        pub settings: Vec<SettingRow>,
        pub users: Vec<User>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_uses_camel_case_and_type_field() {
        let json = serde_json::json!({
            "id": "t1",
            "date": "2024-01-01",
            "description": "Groceries",
            "categoryId": "c1",
            "categoryName": "Food",
            "amount": -10.5,
            "account": "Checking",
            "status": "cleared",
            "type": "expense",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });
        let tx: transaction::Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(tx.kind, transaction::TransactionType::Expense);
        assert_eq!(tx.status, transaction::TransactionStatus::Cleared);
        assert_eq!(tx.notes, None);

        let back = serde_json::to_value(&tx).unwrap();
        assert_eq!(back["type"], "expense");
        assert_eq!(back["categoryName"], "Food");
    }

    #[test]
    fn push_payload_lists_default_to_empty() {
        let payload: sync::SyncPushPayload =
            serde_json::from_str(r#"{"settings": []}"#).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn entity_type_round_trips_through_str() {
        for entity_type in EntityType::APPLY_ORDER {
            assert_eq!(EntityType::try_from(entity_type.as_str()), Ok(entity_type));
        }
        assert!(EntityType::try_from("budget").is_err());
    }
}
