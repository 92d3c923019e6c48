use api_types::{
    EntityType,
    backup::{BackupSnapshot, SNAPSHOT_VERSION},
    sync::{AutomationRule, Category, SettingRow, Transaction, User},
};
use sea_orm::{DatabaseTransaction, TransactionTrait};

use crate::{
    EngineError, ResultEngine, change_log, record::SyncRecord, schema::validate_snapshot,
    sync_meta, util::now_timestamp,
};

use super::{
    Engine,
    push::{ApplyOutcome, apply_record},
    with_tx,
};

async fn insert_all<R: SyncRecord>(db_tx: &DatabaseTransaction, records: &[R]) -> ResultEngine<()> {
    for record in records {
        if let ApplyOutcome::Conflict(conflict) = apply_record(db_tx, record).await? {
            return Err(EngineError::Validation(format!(
                "{} \"{}\" appears twice in the snapshot",
                conflict.entity_type, conflict.entity_id
            )));
        }
    }
    Ok(())
}

/// Reverse apply order: children go before the parents they reference.
async fn wipe(db_tx: &DatabaseTransaction) -> ResultEngine<()> {
    change_log::clear(db_tx).await?;
    for entity_type in EntityType::APPLY_ORDER.into_iter().rev() {
        match entity_type {
            EntityType::Category => Category::delete_all(db_tx).await?,
            EntityType::AutomationRule => AutomationRule::delete_all(db_tx).await?,
            EntityType::Transaction => Transaction::delete_all(db_tx).await?,
            EntityType::Setting => SettingRow::delete_all(db_tx).await?,
            EntityType::User => User::delete_all(db_tx).await?,
        };
    }
    Ok(())
}

async fn replace_all(db_tx: &DatabaseTransaction, snapshot: &BackupSnapshot) -> ResultEngine<()> {
    wipe(db_tx).await?;

    for entity_type in EntityType::APPLY_ORDER {
        match entity_type {
            EntityType::Category => insert_all(db_tx, &snapshot.categories).await?,
            EntityType::AutomationRule => insert_all(db_tx, &snapshot.rules).await?,
            EntityType::Transaction => insert_all(db_tx, &snapshot.transactions).await?,
            EntityType::Setting => insert_all(db_tx, &snapshot.settings).await?,
            EntityType::User => insert_all(db_tx, &snapshot.users).await?,
        }
    }

    sync_meta::mark_synced(db_tx, &now_timestamp()).await
}

impl Engine {
    /// Serialize the full state of every managed table.
    pub async fn export(&self) -> ResultEngine<BackupSnapshot> {
        let exported_at = now_timestamp();
        let snapshot: ResultEngine<BackupSnapshot> = with_tx!(self, |db_tx| {
            Ok(BackupSnapshot {
                version: SNAPSHOT_VERSION,
                exported_at,
                transactions: Transaction::changed_since(&db_tx, None).await?,
                categories: Category::changed_since(&db_tx, None).await?,
                rules: AutomationRule::changed_since(&db_tx, None).await?,
                settings: SettingRow::changed_since(&db_tx, None).await?,
                users: User::changed_since(&db_tx, None).await?,
            })
        });
        let snapshot = snapshot?;

        tracing::info!(
            exported_at = %snapshot.exported_at,
            transactions = snapshot.transactions.len(),
            categories = snapshot.categories.len(),
            rules = snapshot.rules.len(),
            settings = snapshot.settings.len(),
            users = snapshot.users.len(),
            "snapshot exported"
        );

        Ok(snapshot)
    }

    /// Replace the whole store with `snapshot`.
    ///
    /// Every managed table, the change log included, is emptied and refilled
    /// inside one transaction, so a failure leaves the previous state intact.
    /// This is a replacement, never a merge.
    pub async fn import(&self, snapshot: BackupSnapshot) -> ResultEngine<()> {
        validate_snapshot(&snapshot)?;

        let result: ResultEngine<()> =
            with_tx!(self, |db_tx| replace_all(&db_tx, &snapshot).await);

        match &result {
            Ok(()) => tracing::info!(
                exported_at = %snapshot.exported_at,
                transactions = snapshot.transactions.len(),
                categories = snapshot.categories.len(),
                rules = snapshot.rules.len(),
                settings = snapshot.settings.len(),
                users = snapshot.users.len(),
                "snapshot imported"
            ),
            Err(err) => tracing::error!("snapshot import rolled back: {err}"),
        }

        result
    }
}
