//! Structural validation of incoming records, push payloads and snapshots.
//!
//! Validation always runs over the whole batch before anything is written:
//! one bad record fails the entire push or import.

use std::collections::HashSet;

use api_types::{
    backup::{BackupSnapshot, SNAPSHOT_VERSION},
    category::Category,
    rule::AutomationRule,
    setting::SettingRow,
    sync::SyncPushPayload,
    transaction::Transaction,
    user::User,
};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{EngineError, ResultEngine, record::SyncRecord};

/// Field-level checks serde cannot express.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Accept only RFC3339 timestamps in UTC with a trailing `Z`
/// (`2024-01-01T00:00:00Z`, `2024-01-01T00:00:00.000Z`).
///
/// Stored stamps are filtered with a string comparison, which only follows
/// time order when every stamp is in UTC.
pub(crate) fn check_timestamp(field: &str, value: &str) -> Result<(), String> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|err| format!("{field} is not an ISO-8601 timestamp ({value}): {err}"))?;
    if !value.ends_with('Z') {
        return Err(format!("{field} must be in UTC with a trailing 'Z' ({value})"));
    }
    Ok(())
}

fn check_required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}

fn check_date(value: &str) -> Result<(), String> {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
    {
        return Ok(());
    }
    Err(format!("date is not a valid date ({value})"))
}

impl Validate for Transaction {
    fn validate(&self) -> Result<(), String> {
        check_required("id", &self.id)?;
        check_date(&self.date)?;
        if let Some(category_id) = &self.category_id {
            check_required("categoryId", category_id)?;
        }
        if !self.amount.is_finite() {
            return Err("amount must be a finite number".to_string());
        }
        check_timestamp("createdAt", &self.created_at)?;
        check_timestamp("updatedAt", &self.updated_at)
    }
}

impl Validate for Category {
    fn validate(&self) -> Result<(), String> {
        check_required("id", &self.id)?;
        check_required("name", &self.name)?;
        if !self.monthly_budget.is_finite() || self.monthly_budget < 0.0 {
            return Err(format!(
                "monthlyBudget must be a number >= 0, got {}",
                self.monthly_budget
            ));
        }
        check_timestamp("createdAt", &self.created_at)?;
        check_timestamp("updatedAt", &self.updated_at)
    }
}

impl Validate for AutomationRule {
    fn validate(&self) -> Result<(), String> {
        check_required("id", &self.id)?;
        check_required("categoryId", &self.category_id)?;
        if self.priority < 0 {
            return Err(format!("priority must be >= 0, got {}", self.priority));
        }
        check_timestamp("createdAt", &self.created_at)?;
        check_timestamp("updatedAt", &self.updated_at)
    }
}

impl Validate for SettingRow {
    fn validate(&self) -> Result<(), String> {
        check_required("key", &self.key)?;
        check_timestamp("updatedAt", &self.updated_at)
    }
}

impl Validate for User {
    fn validate(&self) -> Result<(), String> {
        check_required("id", &self.id)?;
        check_required("username", &self.username)?;
        check_timestamp("createdAt", &self.created_at)?;
        check_timestamp("updatedAt", &self.updated_at)
    }
}

fn validate_list<R: Validate>(label: &str, records: &[R]) -> ResultEngine<()> {
    for (index, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|err| EngineError::Validation(format!("{label}[{index}]: {err}")))?;
    }
    Ok(())
}

fn ensure_unique_keys<R: SyncRecord>(label: &str, records: &[R]) -> ResultEngine<()> {
    let mut seen = HashSet::new();
    for (index, record) in records.iter().enumerate() {
        if !seen.insert(record.key()) {
            return Err(EngineError::Validation(format!(
                "{label}[{index}]: duplicate {} \"{}\"",
                R::ENTITY_TYPE,
                record.key()
            )));
        }
    }
    Ok(())
}

/// Validate every record of a push payload.
pub fn validate_push(payload: &SyncPushPayload) -> ResultEngine<()> {
    validate_list("transactions", &payload.transactions)?;
    validate_list("categories", &payload.categories)?;
    validate_list("rules", &payload.rules)?;
    validate_list("settings", &payload.settings)?;
    validate_list("users", &payload.users)
}

/// Validate a snapshot: version, export time, every record, and unique keys
/// per entity type.
pub fn validate_snapshot(snapshot: &BackupSnapshot) -> ResultEngine<()> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(EngineError::UnsupportedVersion(snapshot.version));
    }
    check_timestamp("exportedAt", &snapshot.exported_at).map_err(EngineError::Validation)?;

    validate_list("transactions", &snapshot.transactions)?;
    validate_list("categories", &snapshot.categories)?;
    validate_list("rules", &snapshot.rules)?;
    validate_list("settings", &snapshot.settings)?;
    validate_list("users", &snapshot.users)?;

    ensure_unique_keys("transactions", &snapshot.transactions)?;
    ensure_unique_keys("categories", &snapshot.categories)?;
    ensure_unique_keys("rules", &snapshot.rules)?;
    ensure_unique_keys("settings", &snapshot.settings)?;
    ensure_unique_keys("users", &snapshot.users)
}

#[derive(Deserialize)]
struct RawPush {
    #[serde(default)]
    transactions: Vec<Value>,
    #[serde(default)]
    categories: Vec<Value>,
    #[serde(default)]
    rules: Vec<Value>,
    #[serde(default)]
    settings: Vec<Value>,
    #[serde(default)]
    users: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    version: u32,
    exported_at: String,
    transactions: Vec<Value>,
    categories: Vec<Value>,
    rules: Vec<Value>,
    settings: Vec<Value>,
    users: Vec<Value>,
}

fn decode_list<R: DeserializeOwned>(label: &str, values: Vec<Value>) -> ResultEngine<Vec<R>> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value)
                .map_err(|err| EngineError::Validation(format!("{label}[{index}]: {err}")))
        })
        .collect()
}

/// Decode an untyped push body. Errors name the offending list and index.
pub fn decode_push(value: Value) -> ResultEngine<SyncPushPayload> {
    let raw: RawPush = serde_json::from_value(value)
        .map_err(|err| EngineError::Validation(format!("push payload: {err}")))?;

    Ok(SyncPushPayload {
        transactions: decode_list("transactions", raw.transactions)?,
        categories: decode_list("categories", raw.categories)?,
        rules: decode_list("rules", raw.rules)?,
        settings: decode_list("settings", raw.settings)?,
        users: decode_list("users", raw.users)?,
    })
}

/// Decode an untyped snapshot document. The version is checked before any
/// record is decoded.
pub fn decode_snapshot(value: Value) -> ResultEngine<BackupSnapshot> {
    if let Some(version) = value.get("version").and_then(Value::as_u64)
        && version != u64::from(SNAPSHOT_VERSION)
    {
        return Err(EngineError::UnsupportedVersion(
            u32::try_from(version).unwrap_or(u32::MAX),
        ));
    }

    let raw: RawSnapshot = serde_json::from_value(value)
        .map_err(|err| EngineError::Validation(format!("snapshot: {err}")))?;

    Ok(BackupSnapshot {
        version: raw.version,
        exported_at: raw.exported_at,
        transactions: decode_list("transactions", raw.transactions)?,
        categories: decode_list("categories", raw.categories)?,
        rules: decode_list("rules", raw.rules)?,
        settings: decode_list("settings", raw.settings)?,
        users: decode_list("users", raw.users)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category_json(id: &str, budget: f64) -> Value {
        json!({
            "id": id,
            "name": "Groceries",
            "icon": "cart",
            "color": "#00ff00",
            "monthlyBudget": budget,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        })
    }

    fn empty_snapshot(version: u32) -> Value {
        json!({
            "version": version,
            "exportedAt": "2024-01-01T00:00:00Z",
            "transactions": [],
            "categories": [],
            "rules": [],
            "settings": [],
            "users": []
        })
    }

    #[test]
    fn timestamps_must_be_rfc3339() {
        assert!(check_timestamp("updatedAt", "2024-01-01T00:00:00Z").is_ok());
        assert!(check_timestamp("updatedAt", "2024-01-01T00:00:00.123Z").is_ok());
        assert!(check_timestamp("updatedAt", "yesterday").is_err());
        assert!(check_timestamp("updatedAt", "2024-01-01").is_err());
    }

    #[test]
    fn timestamps_with_offset_are_rejected() {
        assert!(check_timestamp("updatedAt", "2024-01-01T23:00:00-05:00").is_err());
        assert!(check_timestamp("cursor", "2024-01-01T00:00:00.123+02:00").is_err());
        assert!(check_timestamp("updatedAt", "2024-01-01T00:00:00+00:00").is_err());
        assert!(check_timestamp("updatedAt", "2024-01-01T00:00:00z").is_err());
    }

    #[test]
    fn offset_updated_at_fails_push_validation() {
        let mut category = category_json("c1", 10.0);
        category["updatedAt"] = json!("2024-01-01T23:00:00-05:00");
        let payload = decode_push(json!({ "categories": [category] })).unwrap();
        assert!(matches!(
            validate_push(&payload),
            Err(EngineError::Validation(msg)) if msg.starts_with("categories[0]:")
        ));
    }

    #[test]
    fn decode_push_reports_list_and_index() {
        let body = json!({
            "categories": [category_json("c1", 10.0), {"id": "c2"}]
        });
        let err = decode_push(body).unwrap_err();
        match err {
            EngineError::Validation(msg) => assert!(msg.starts_with("categories[1]:"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_push_rejects_unknown_status() {
        let body = json!({
            "transactions": [{
                "id": "t1",
                "date": "2024-01-01",
                "description": "Coffee",
                "categoryName": "Food",
                "amount": -3.5,
                "account": "Cash",
                "status": "reconciled",
                "type": "expense",
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            }]
        });
        assert!(matches!(
            decode_push(body),
            Err(EngineError::Validation(msg)) if msg.starts_with("transactions[0]:")
        ));
    }

    #[test]
    fn negative_budget_fails_validation() {
        let payload = decode_push(json!({ "categories": [category_json("c1", -1.0)] })).unwrap();
        assert!(matches!(
            validate_push(&payload),
            Err(EngineError::Validation(msg)) if msg.contains("monthlyBudget")
        ));
    }

    #[test]
    fn fractional_priority_fails_decoding() {
        let body = json!({
            "rules": [{
                "id": "r1",
                "name": "Coffee shops",
                "categoryId": "c1",
                "type": "contains",
                "pattern": "coffee",
                "priority": 1.5,
                "isActive": true,
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            }]
        });
        assert!(decode_push(body).is_err());
    }

    #[test]
    fn snapshot_version_is_checked_first() {
        let mut doc = empty_snapshot(2);
        doc["transactions"] = json!([{"garbage": true}]);
        assert_eq!(decode_snapshot(doc), Err(EngineError::UnsupportedVersion(2)));
    }

    #[test]
    fn snapshot_requires_every_list() {
        let mut doc = empty_snapshot(1);
        doc.as_object_mut().unwrap().remove("users");
        assert!(matches!(decode_snapshot(doc), Err(EngineError::Validation(_))));
    }

    #[test]
    fn snapshot_rejects_duplicate_keys() {
        let mut doc = empty_snapshot(1);
        doc["categories"] = json!([category_json("c1", 0.0), category_json("c1", 5.0)]);
        let snapshot = decode_snapshot(doc).unwrap();
        assert!(matches!(
            validate_snapshot(&snapshot),
            Err(EngineError::Validation(msg)) if msg.contains("duplicate")
        ));
    }
}
