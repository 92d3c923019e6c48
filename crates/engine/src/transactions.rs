//! Transactions table.
//!
//! A row mirrors one [`Transaction`] record. Status and type are stored as
//! their lowercase wire strings.

use api_types::{
    EntityType,
    transaction::{Transaction, TransactionStatus, TransactionType},
};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, record::impl_sync_record};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub date: String,
    pub description: String,
    pub category_id: Option<String>,
    pub category_name: String,
    pub amount: f64,
    pub account: String,
    pub status: String,
    pub kind: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.clone()),
            date: ActiveValue::Set(tx.date.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            category_id: ActiveValue::Set(tx.category_id.clone()),
            category_name: ActiveValue::Set(tx.category_name.clone()),
            amount: ActiveValue::Set(tx.amount),
            account: ActiveValue::Set(tx.account.clone()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            notes: ActiveValue::Set(tx.notes.clone()),
            created_at: ActiveValue::Set(tx.created_at.clone()),
            updated_at: ActiveValue::Set(tx.updated_at.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            status: TransactionStatus::try_from(model.status.as_str())
                .map_err(EngineError::InvalidRow)?,
            kind: TransactionType::try_from(model.kind.as_str())
                .map_err(EngineError::InvalidRow)?,
            id: model.id,
            date: model.date,
            description: model.description,
            category_id: model.category_id,
            category_name: model.category_name,
            amount: model.amount,
            account: model.account,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl_sync_record!(Transaction, EntityType::Transaction, id, Column::Id);
