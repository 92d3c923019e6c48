//! Change log: one row per `(entity_type, entity_id)` holding the time of the
//! last successful write to that entity.
//!
//! Every write path calls [`record_change`] inside the transaction that
//! performs the write, so the log and the data never diverge. Deletes are
//! recorded too, but they leave no tombstone a peer could pull.

use api_types::EntityType;
use sea_orm::{ActiveValue, DatabaseTransaction, entity::prelude::*, sea_query::OnConflict};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "change_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub entity_type: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub entity_id: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub updated_at: String,
}

impl TryFrom<Model> for ChangeLogEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            entity_type: EntityType::try_from(model.entity_type.as_str())
                .map_err(EngineError::InvalidRow)?,
            entity_id: model.entity_id,
            updated_at: model.updated_at,
        })
    }
}

/// Upsert the change-log entry for one entity.
///
/// Must run in the same transaction as the write it describes.
pub async fn record_change(
    db: &DatabaseTransaction,
    entity_type: EntityType,
    entity_id: &str,
    updated_at: &str,
) -> ResultEngine<()> {
    let entry = ActiveModel {
        entity_type: ActiveValue::Set(entity_type.as_str().to_string()),
        entity_id: ActiveValue::Set(entity_id.to_string()),
        updated_at: ActiveValue::Set(updated_at.to_string()),
    };

    Entity::insert(entry)
        .on_conflict(
            OnConflict::columns([Column::EntityType, Column::EntityId])
                .update_column(Column::UpdatedAt)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

pub(crate) async fn find<C: ConnectionTrait>(
    db: &C,
    entity_type: EntityType,
    entity_id: &str,
) -> ResultEngine<Option<ChangeLogEntry>> {
    Entity::find_by_id((entity_type.as_str().to_string(), entity_id.to_string()))
        .one(db)
        .await?
        .map(ChangeLogEntry::try_from)
        .transpose()
}

pub(crate) async fn clear(db: &DatabaseTransaction) -> ResultEngine<u64> {
    let res = Entity::delete_many().exec(db).await?;
    Ok(res.rows_affected)
}
