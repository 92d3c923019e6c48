use std::cmp::Ordering;

use api_types::{
    EntityType,
    sync::{SyncConflict, SyncPushPayload, SyncPushResult},
};
use sea_orm::{DatabaseTransaction, TransactionTrait};

use crate::{
    ResultEngine, change_log::record_change, record::SyncRecord, schema::validate_push, sync_meta,
    util::{compare_stamps, now_timestamp},
};

use super::{Engine, with_tx};

/// What happened to one incoming record.
#[derive(Debug)]
pub(super) enum ApplyOutcome {
    Applied,
    Conflict(SyncConflict),
}

/// Last-write-wins apply of a single record.
///
/// Stamps are compared as instants. A local row strictly newer than the
/// incoming one wins and is reported as a
/// conflict. Equal timestamps go to the incoming record, which makes
/// re-pushing the same record a no-op. A row that disappears between the
/// lookup and the update is treated as absent and inserted.
pub(super) async fn apply_record<R: SyncRecord>(
    db_tx: &DatabaseTransaction,
    record: &R,
) -> ResultEngine<ApplyOutcome> {
    match R::find(db_tx, record.key()).await? {
        Some(existing)
            if compare_stamps(existing.updated_at(), record.updated_at()) == Ordering::Greater =>
        {
            return Ok(ApplyOutcome::Conflict(SyncConflict {
                entity_type: R::ENTITY_TYPE,
                entity_id: record.key().to_string(),
                local_updated_at: existing.updated_at().to_string(),
                incoming_updated_at: record.updated_at().to_string(),
            }));
        }
        Some(existing) => {
            record.before_overwrite(&existing);
            if !record.update(db_tx).await? {
                record.insert(db_tx).await?;
            }
        }
        None => record.insert(db_tx).await?,
    }

    record_change(db_tx, R::ENTITY_TYPE, record.key(), record.updated_at()).await?;
    tracing::debug!(
        entity_type = %R::ENTITY_TYPE,
        entity_id = record.key(),
        updated_at = record.updated_at(),
        "record applied"
    );

    Ok(ApplyOutcome::Applied)
}

async fn apply_batch<R: SyncRecord>(
    db_tx: &DatabaseTransaction,
    records: &[R],
    result: &mut SyncPushResult,
) -> ResultEngine<()> {
    for record in records {
        match apply_record(db_tx, record).await? {
            ApplyOutcome::Applied => result
                .applied
                .for_type_mut(R::ENTITY_TYPE)
                .push(record.key().to_string()),
            ApplyOutcome::Conflict(conflict) => {
                tracing::warn!(
                    entity_type = %conflict.entity_type,
                    entity_id = %conflict.entity_id,
                    local_updated_at = %conflict.local_updated_at,
                    incoming_updated_at = %conflict.incoming_updated_at,
                    "incoming record is older than the local row"
                );
                result.conflicts.push(conflict);
            }
        }
    }
    Ok(())
}

/// Parents before children: a transaction may point at a category pushed in
/// the same batch.
async fn apply_payload(
    db_tx: &DatabaseTransaction,
    payload: &SyncPushPayload,
) -> ResultEngine<SyncPushResult> {
    let mut result = SyncPushResult::default();

    for entity_type in EntityType::APPLY_ORDER {
        match entity_type {
            EntityType::Category => apply_batch(db_tx, &payload.categories, &mut result).await?,
            EntityType::AutomationRule => apply_batch(db_tx, &payload.rules, &mut result).await?,
            EntityType::Transaction => {
                apply_batch(db_tx, &payload.transactions, &mut result).await?
            }
            EntityType::Setting => apply_batch(db_tx, &payload.settings, &mut result).await?,
            EntityType::User => apply_batch(db_tx, &payload.users, &mut result).await?,
        }
    }

    if result.conflicts.is_empty() {
        sync_meta::mark_synced(db_tx, &now_timestamp()).await?;
    }

    Ok(result)
}

impl Engine {
    /// Apply a batch of dirty rows from another device.
    ///
    /// The payload is validated as a whole first. All records are then
    /// applied in one transaction: a storage error rolls back every record of
    /// this push, while conflicts are collected and returned. The sync marker
    /// only advances when no record conflicted.
    pub async fn push(&self, payload: SyncPushPayload) -> ResultEngine<SyncPushResult> {
        validate_push(&payload)?;

        let result: ResultEngine<SyncPushResult> =
            with_tx!(self, |db_tx| apply_payload(&db_tx, &payload).await);

        match &result {
            Ok(outcome) => tracing::info!(
                received = payload.len(),
                applied = outcome.applied.len(),
                conflicts = outcome.conflicts.len(),
                "push committed"
            ),
            Err(err) => tracing::error!(received = payload.len(), "push rolled back: {err}"),
        }

        result
    }
}
