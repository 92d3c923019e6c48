mod common;

use common::{category, engine_with_db, rule, setting, transaction, user};
use engine::{
    BackupSnapshot, Category, EngineError, EntityType, SNAPSHOT_VERSION, SyncPushPayload,
    Transaction, decode_snapshot,
};
use serde_json::json;

fn snapshot() -> BackupSnapshot {
    let mut grocery = transaction("t-new", -30.0, "2024-04-01T00:00:00Z");
    grocery.category_id = Some("c-new".to_string());

    BackupSnapshot {
        version: SNAPSHOT_VERSION,
        exported_at: "2024-04-02T00:00:00.000Z".to_string(),
        transactions: vec![grocery],
        categories: vec![category("c-new", "2024-04-01T00:00:00Z")],
        rules: vec![rule("r-new", "c-new", "2024-04-01T00:00:00Z")],
        settings: vec![setting("baseCurrency", json!("CHF"), "2024-04-01T00:00:00Z")],
        users: vec![user("u-new", "hash", "2024-04-01T00:00:00Z")],
    }
}

async fn seed(engine: &engine::Engine) {
    engine
        .push(SyncPushPayload {
            categories: vec![category("c-old", "2024-01-01T00:00:00Z")],
            transactions: vec![transaction("t-old", -1.0, "2024-01-01T00:00:00Z")],
            settings: vec![setting("theme", json!("light"), "2024-01-01T00:00:00Z")],
            ..Default::default()
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn import_replaces_instead_of_merging() {
    let (engine, _db) = engine_with_db().await;
    seed(&engine).await;

    engine.import(snapshot()).await.unwrap();

    let state = engine.pull(None).await.unwrap();
    let tx_ids: Vec<_> = state.transactions.iter().map(|t| t.id.as_str()).collect();
    let category_ids: Vec<_> = state.categories.iter().map(|c| c.id.as_str()).collect();
    let setting_keys: Vec<_> = state.settings.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(tx_ids, vec!["t-new"]);
    assert_eq!(category_ids, vec!["c-new"]);
    assert_eq!(setting_keys, vec!["baseCurrency"]);
    assert_eq!(state.rules.len(), 1);
    assert_eq!(state.users.len(), 1);

    assert_eq!(
        engine
            .change_log_entry(EntityType::Transaction, "t-old")
            .await
            .unwrap(),
        None
    );
    assert!(
        engine
            .change_log_entry(EntityType::Transaction, "t-new")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn export_then_import_reproduces_the_store() {
    let (source, _db) = engine_with_db().await;
    source.import(snapshot()).await.unwrap();
    source
        .save(category("c-extra", "2000-01-01T00:00:00Z"))
        .await
        .unwrap();

    let exported = source.export().await.unwrap();
    assert_eq!(exported.version, SNAPSHOT_VERSION);
    assert_eq!(exported.categories.len(), 2);

    // Through JSON, the way a backup file travels.
    let text = serde_json::to_string(&exported).unwrap();
    let decoded = decode_snapshot(serde_json::from_str(&text).unwrap()).unwrap();

    let (target, _db) = engine_with_db().await;
    seed(&target).await;
    target.import(decoded).await.unwrap();

    let reexported = target.export().await.unwrap();
    assert_eq!(reexported.transactions, exported.transactions);
    assert_eq!(reexported.categories, exported.categories);
    assert_eq!(reexported.rules, exported.rules);
    assert_eq!(reexported.settings, exported.settings);
    assert_eq!(reexported.users, exported.users);
}

#[tokio::test]
async fn unsupported_version_leaves_store_untouched() {
    let (engine, _db) = engine_with_db().await;
    seed(&engine).await;

    let mut future = snapshot();
    future.version = 2;
    let err = engine.import(future).await.unwrap_err();
    assert_eq!(err, EngineError::UnsupportedVersion(2));

    let old: Category = engine.get("c-old").await.unwrap();
    assert_eq!(old.id, "c-old");
    assert!(matches!(
        engine.get::<Category>("c-new").await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn invalid_record_fails_the_whole_import() {
    let (engine, _db) = engine_with_db().await;
    seed(&engine).await;

    let mut broken = snapshot();
    broken.transactions[0].amount = f64::NAN;
    let err = engine.import(broken).await.unwrap_err();
    assert!(err.is_validation());

    let state = engine.pull(None).await.unwrap();
    assert_eq!(state.transactions.len(), 1);
    assert_eq!(state.transactions[0].id, "t-old");
}

#[tokio::test]
async fn duplicate_keys_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let mut doubled = snapshot();
    doubled
        .categories
        .push(category("c-new", "2024-04-03T00:00:00Z"));

    let err = engine.import(doubled).await.unwrap_err();
    match err {
        EngineError::Validation(msg) => assert!(msg.starts_with("categories[1]"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn dangling_reference_rolls_back_import() {
    let (engine, _db) = engine_with_db().await;
    seed(&engine).await;

    let mut dangling = snapshot();
    dangling.transactions[0].category_id = Some("nowhere".to_string());
    let err = engine.import(dangling).await.unwrap_err();
    assert!(matches!(err, EngineError::Database(_)), "{err:?}");

    let old: Transaction = engine.get("t-old").await.unwrap();
    assert_eq!(old.amount, -1.0);
    assert!(
        engine
            .change_log_entry(EntityType::Category, "c-old")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn import_marks_the_store_synced() {
    let (engine, _db) = engine_with_db().await;
    assert_eq!(engine.last_successful_sync_at().await.unwrap(), None);

    engine.import(snapshot()).await.unwrap();
    assert!(engine.last_successful_sync_at().await.unwrap().is_some());
}

#[tokio::test]
async fn empty_snapshot_empties_the_store() {
    let (engine, _db) = engine_with_db().await;
    seed(&engine).await;

    engine
        .import(BackupSnapshot {
            version: SNAPSHOT_VERSION,
            exported_at: "2024-04-02T00:00:00Z".to_string(),
            transactions: vec![],
            categories: vec![],
            rules: vec![],
            settings: vec![],
            users: vec![],
        })
        .await
        .unwrap();

    let exported = engine.export().await.unwrap();
    assert!(exported.transactions.is_empty());
    assert!(exported.categories.is_empty());
    assert!(exported.settings.is_empty());
}

#[tokio::test]
async fn decode_snapshot_requires_every_list() {
    let err = decode_snapshot(json!({
        "version": 1,
        "exportedAt": "2024-04-02T00:00:00Z",
        "transactions": [],
        "categories": [],
        "rules": [],
        "settings": []
    }))
    .unwrap_err();
    assert!(err.is_validation());

    let err = decode_snapshot(json!({ "version": 9 })).unwrap_err();
    assert_eq!(err, EngineError::UnsupportedVersion(9));
}
