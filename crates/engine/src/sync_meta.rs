//! Device-local sync bookkeeping, kept outside the managed tables.

use sea_orm::{ActiveValue, entity::prelude::*, sea_query::OnConflict};

use crate::ResultEngine;

const LAST_SUCCESSFUL_SYNC_AT: &str = "last_successful_sync_at";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sync_meta")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Advance the "last successful sync" marker.
pub(crate) async fn mark_synced<C: ConnectionTrait>(db: &C, at: &str) -> ResultEngine<()> {
    let row = ActiveModel {
        key: ActiveValue::Set(LAST_SUCCESSFUL_SYNC_AT.to_string()),
        value: ActiveValue::Set(at.to_string()),
    };

    Entity::insert(row)
        .on_conflict(
            OnConflict::column(Column::Key)
                .update_column(Column::Value)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

pub(crate) async fn last_synced<C: ConnectionTrait>(db: &C) -> ResultEngine<Option<String>> {
    Ok(Entity::find_by_id(LAST_SUCCESSFUL_SYNC_AT.to_string())
        .one(db)
        .await?
        .map(|row| row.value))
}
