//! Users table.
//!
//! Credentials replicate under the same last-write-wins rule as ledger data.
//! An incoming record that changes `password_hash` or
//! `must_change_password` is logged so a stale device reverting a password
//! change does not go unnoticed.

use api_types::{EntityType, user::User};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, record::impl_sync_record};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub must_change_password: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            id: ActiveValue::Set(user.id.clone()),
            username: ActiveValue::Set(user.username.clone()),
            password_hash: ActiveValue::Set(user.password_hash.clone()),
            must_change_password: ActiveValue::Set(user.must_change_password),
            created_at: ActiveValue::Set(user.created_at.clone()),
            updated_at: ActiveValue::Set(user.updated_at.clone()),
        }
    }
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            username: model.username,
            password_hash: model.password_hash,
            must_change_password: model.must_change_password,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl_sync_record!(User, EntityType::User, id, Column::Id, {
    fn before_overwrite(&self, existing: &Self) {
        if self.password_hash != existing.password_hash
            || self.must_change_password != existing.must_change_password
        {
            tracing::warn!(
                user_id = %self.id,
                local_updated_at = %existing.updated_at,
                incoming_updated_at = %self.updated_at,
                "incoming record overwrites user credentials"
            );
        }
    }
});
