//! Local write paths used by the domain services of this device.
//!
//! Unlike sync pushes, local writes are stamped here: `updated_at` becomes the
//! current time, or stays at the previous stamp if the clock went backwards.

use api_types::EntityType;
use sea_orm::{DatabaseTransaction, TransactionTrait};

use crate::{
    EngineError, ResultEngine,
    change_log::{self, ChangeLogEntry, record_change},
    record::SyncRecord,
    sync_meta,
    util::next_stamp,
};

use super::{Engine, with_tx};

async fn save_record<R: SyncRecord>(db_tx: &DatabaseTransaction, mut record: R) -> ResultEngine<R> {
    let existing = R::find(db_tx, record.key()).await?;
    record.set_updated_at(next_stamp(existing.as_ref().map(|row| row.updated_at())));
    record.validate().map_err(|err| {
        EngineError::Validation(format!("{} \"{}\": {err}", R::ENTITY_TYPE, record.key()))
    })?;

    if existing.is_none() || !record.update(db_tx).await? {
        record.insert(db_tx).await?;
    }
    record_change(db_tx, R::ENTITY_TYPE, record.key(), record.updated_at()).await?;

    Ok(record)
}

/// The deletion is logged no earlier than the row's last stamp, so the log
/// entry never moves backwards.
async fn delete_record<R: SyncRecord>(db_tx: &DatabaseTransaction, key: &str) -> ResultEngine<bool> {
    let Some(existing) = R::find(db_tx, key).await? else {
        return Ok(false);
    };
    if !R::delete(db_tx, key).await? {
        return Ok(false);
    }
    let deleted_at = next_stamp(Some(existing.updated_at()));
    record_change(db_tx, R::ENTITY_TYPE, key, &deleted_at).await?;
    Ok(true)
}

impl Engine {
    /// Insert or update a record and record the change. Returns the record
    /// with its new `updated_at`.
    pub async fn save<R: SyncRecord>(&self, record: R) -> ResultEngine<R> {
        let saved: ResultEngine<R> = with_tx!(self, |db_tx| save_record(&db_tx, record).await);
        let saved = saved?;
        tracing::debug!(
            entity_type = %R::ENTITY_TYPE,
            entity_id = saved.key(),
            updated_at = saved.updated_at(),
            "record saved"
        );
        Ok(saved)
    }

    /// Delete a record. The change log keeps the deletion time, but peers
    /// only learn about the deletion through a snapshot import.
    pub async fn delete<R: SyncRecord>(&self, key: &str) -> ResultEngine<()> {
        let deleted: ResultEngine<bool> =
            with_tx!(self, |db_tx| delete_record::<R>(&db_tx, key).await);
        if !deleted? {
            return Err(EngineError::KeyNotFound(format!("{} {key}", R::ENTITY_TYPE)));
        }
        tracing::debug!(entity_type = %R::ENTITY_TYPE, entity_id = key, "record deleted");
        Ok(())
    }

    pub async fn get<R: SyncRecord>(&self, key: &str) -> ResultEngine<R> {
        let found: ResultEngine<Option<R>> = with_tx!(self, |db_tx| R::find(&db_tx, key).await);
        found?.ok_or_else(|| EngineError::KeyNotFound(format!("{} {key}", R::ENTITY_TYPE)))
    }

    /// Records of one type changed after `cursor`, oldest first.
    pub async fn changed_since<R: SyncRecord>(&self, cursor: Option<&str>) -> ResultEngine<Vec<R>> {
        with_tx!(self, |db_tx| R::changed_since(&db_tx, cursor).await)
    }

    pub async fn change_log_entry(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> ResultEngine<Option<ChangeLogEntry>> {
        change_log::find(&self.database, entity_type, entity_id).await
    }

    /// When this store last finished a conflict-free push or an import.
    pub async fn last_successful_sync_at(&self) -> ResultEngine<Option<String>> {
        sync_meta::last_synced(&self.database).await
    }
}
