//! Storage contract shared by every replicated record type.
//!
//! Each table module implements [`SyncRecord`] for its plain record through
//! [`impl_sync_record!`], so push, pull, snapshot and the local write paths
//! can be written once and run over all five entity types.

use api_types::EntityType;
use sea_orm::DatabaseTransaction;

use crate::{ResultEngine, schema::Validate};

/// A record type replicated between devices.
///
/// All storage methods take the open [`DatabaseTransaction`] so that a record
/// and its change-log entry are always written together.
#[allow(async_fn_in_trait)]
pub trait SyncRecord: Validate + Clone + Send + Sync + Sized {
    const ENTITY_TYPE: EntityType;

    /// Stable identity: `id`, or `key` for settings.
    fn key(&self) -> &str;

    fn updated_at(&self) -> &str;

    fn set_updated_at(&mut self, updated_at: String);

    /// Called right before an incoming record replaces `existing`.
    fn before_overwrite(&self, _existing: &Self) {}

    async fn find(db: &DatabaseTransaction, key: &str) -> ResultEngine<Option<Self>>;

    /// Rows with `updated_at > cursor` (all rows without a cursor), oldest first.
    async fn changed_since(db: &DatabaseTransaction, cursor: Option<&str>)
    -> ResultEngine<Vec<Self>>;

    async fn insert(&self, db: &DatabaseTransaction) -> ResultEngine<()>;

    /// Overwrites every column of the existing row. Returns `false` when the
    /// row is gone.
    async fn update(&self, db: &DatabaseTransaction) -> ResultEngine<bool>;

    async fn delete(db: &DatabaseTransaction, key: &str) -> ResultEngine<bool>;

    async fn delete_all(db: &DatabaseTransaction) -> ResultEngine<u64>;
}

/// Implements [`SyncRecord`] for a record whose table module (`Entity`,
/// `Column`, `ActiveModel`, `Model`) is in scope at the call site.
///
/// The record needs `From<&Record> for ActiveModel` and
/// `TryFrom<Model, Error = EngineError>`. Extra trait items can be passed in
/// a trailing block.
macro_rules! impl_sync_record {
    ($record:ty, $entity_type:expr, $key:ident, $key_col:expr) => {
        $crate::record::impl_sync_record!($record, $entity_type, $key, $key_col, {});
    };
    ($record:ty, $entity_type:expr, $key:ident, $key_col:expr, { $($extra:tt)* }) => {
        impl $crate::record::SyncRecord for $record {
            const ENTITY_TYPE: api_types::EntityType = $entity_type;

            fn key(&self) -> &str {
                &self.$key
            }

            fn updated_at(&self) -> &str {
                &self.updated_at
            }

            fn set_updated_at(&mut self, updated_at: String) {
                self.updated_at = updated_at;
            }

            $($extra)*

            async fn find(
                db: &sea_orm::DatabaseTransaction,
                key: &str,
            ) -> $crate::ResultEngine<Option<Self>> {
                use sea_orm::EntityTrait;

                Entity::find_by_id(key.to_string())
                    .one(db)
                    .await?
                    .map(<Self as TryFrom<Model>>::try_from)
                    .transpose()
            }

            async fn changed_since(
                db: &sea_orm::DatabaseTransaction,
                cursor: Option<&str>,
            ) -> $crate::ResultEngine<Vec<Self>> {
                use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

                let mut query = Entity::find();
                if let Some(cursor) = cursor {
                    query = query.filter(Column::UpdatedAt.gt(cursor));
                }
                query
                    .order_by_asc(Column::UpdatedAt)
                    .order_by_asc($key_col)
                    .all(db)
                    .await?
                    .into_iter()
                    .map(<Self as TryFrom<Model>>::try_from)
                    .collect()
            }

            async fn insert(&self, db: &sea_orm::DatabaseTransaction) -> $crate::ResultEngine<()> {
                use sea_orm::ActiveModelTrait;

                ActiveModel::from(self).insert(db).await?;
                Ok(())
            }

            async fn update(
                &self,
                db: &sea_orm::DatabaseTransaction,
            ) -> $crate::ResultEngine<bool> {
                use sea_orm::ActiveModelTrait;

                match ActiveModel::from(self).update(db).await {
                    Ok(_) => Ok(true),
                    Err(sea_orm::DbErr::RecordNotUpdated) => Ok(false),
                    Err(err) => Err(err.into()),
                }
            }

            async fn delete(
                db: &sea_orm::DatabaseTransaction,
                key: &str,
            ) -> $crate::ResultEngine<bool> {
                use sea_orm::EntityTrait;

                let res = Entity::delete_by_id(key.to_string()).exec(db).await?;
                Ok(res.rows_affected > 0)
            }

            async fn delete_all(db: &sea_orm::DatabaseTransaction) -> $crate::ResultEngine<u64> {
                use sea_orm::EntityTrait;

                let res = Entity::delete_many().exec(db).await?;
                Ok(res.rows_affected)
            }
        }
    };
}

pub(crate) use impl_sync_record;
