//! Categories table.

use api_types::{EntityType, category::Category};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, record::impl_sync_record};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub monthly_budget: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::rules::Entity")]
    Rules,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(category: &Category) -> Self {
        Self {
            id: ActiveValue::Set(category.id.clone()),
            name: ActiveValue::Set(category.name.clone()),
            icon: ActiveValue::Set(category.icon.clone()),
            color: ActiveValue::Set(category.color.clone()),
            monthly_budget: ActiveValue::Set(category.monthly_budget),
            created_at: ActiveValue::Set(category.created_at.clone()),
            updated_at: ActiveValue::Set(category.updated_at.clone()),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            icon: model.icon,
            color: model.color,
            monthly_budget: model.monthly_budget,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl_sync_record!(Category, EntityType::Category, id, Column::Id);
