//! Household settings table.
//!
//! Settings are keyed by `key`. The JSON value is stored as text.

use api_types::{EntityType, setting::SettingRow};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, record::impl_sync_record};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SettingRow> for ActiveModel {
    fn from(row: &SettingRow) -> Self {
        Self {
            key: ActiveValue::Set(row.key.clone()),
            value: ActiveValue::Set(row.value.to_string()),
            updated_at: ActiveValue::Set(row.updated_at.clone()),
        }
    }
}

impl TryFrom<Model> for SettingRow {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            value: serde_json::from_str(&model.value)?,
            key: model.key,
            updated_at: model.updated_at,
        })
    }
}

impl_sync_record!(SettingRow, EntityType::Setting, key, Column::Key);
