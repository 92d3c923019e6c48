#![allow(dead_code)]

use sea_orm::{Database, DatabaseConnection};

use engine::{
    AutomationRule, Category, Engine, SettingRow, Transaction, TransactionStatus, TransactionType,
    User,
};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub fn transaction(id: &str, amount: f64, updated_at: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        date: "2024-01-01".to_string(),
        description: "Groceries".to_string(),
        category_id: None,
        category_name: "Uncategorized".to_string(),
        amount,
        account: "Checking".to_string(),
        status: TransactionStatus::Completed,
        kind: TransactionType::Expense,
        notes: None,
        created_at: "2023-12-01T00:00:00Z".to_string(),
        updated_at: updated_at.to_string(),
    }
}

pub fn category(id: &str, updated_at: &str) -> Category {
    Category {
        id: id.to_string(),
        name: format!("Category {id}"),
        icon: "tag".to_string(),
        color: "#336699".to_string(),
        monthly_budget: 250.0,
        created_at: "2023-12-01T00:00:00Z".to_string(),
        updated_at: updated_at.to_string(),
    }
}

pub fn rule(id: &str, category_id: &str, updated_at: &str) -> AutomationRule {
    AutomationRule {
        id: id.to_string(),
        name: format!("Rule {id}"),
        category_id: category_id.to_string(),
        rule_type: "contains".to_string(),
        pattern: "supermarket".to_string(),
        priority: 1,
        is_active: true,
        description: None,
        created_at: "2023-12-01T00:00:00Z".to_string(),
        updated_at: updated_at.to_string(),
    }
}

pub fn setting(key: &str, value: serde_json::Value, updated_at: &str) -> SettingRow {
    SettingRow {
        key: key.to_string(),
        value,
        updated_at: updated_at.to_string(),
    }
}

pub fn user(id: &str, password_hash: &str, updated_at: &str) -> User {
    User {
        id: id.to_string(),
        username: format!("user-{id}"),
        password_hash: password_hash.to_string(),
        must_change_password: false,
        created_at: "2023-12-01T00:00:00Z".to_string(),
        updated_at: updated_at.to_string(),
    }
}
