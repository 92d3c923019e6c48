//! Automation rules table.
//!
//! Only replication lives here; pattern matching is done by the rules
//! collaborator on plain [`AutomationRule`] records.

use api_types::{EntityType, rule::AutomationRule};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, record::impl_sync_record};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "automation_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub category_id: String,
    pub rule_type: String,
    pub pattern: String,
    pub priority: i64,
    pub is_active: bool,
    pub description: Option<String>,
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

impl From<&AutomationRule> for ActiveModel {
    fn from(rule: &AutomationRule) -> Self {
        Self {
            id: ActiveValue::Set(rule.id.clone()),
            name: ActiveValue::Set(rule.name.clone()),
            category_id: ActiveValue::Set(rule.category_id.clone()),
            rule_type: ActiveValue::Set(rule.rule_type.clone()),
            pattern: ActiveValue::Set(rule.pattern.clone()),
            priority: ActiveValue::Set(rule.priority),
            is_active: ActiveValue::Set(rule.is_active),
            description: ActiveValue::Set(rule.description.clone()),
            created_at: ActiveValue::Set(rule.created_at.clone()),
            updated_at: ActiveValue::Set(rule.updated_at.clone()),
        }
    }
}

impl TryFrom<Model> for AutomationRule {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            category_id: model.category_id,
            rule_type: model.rule_type,
            pattern: model.pattern,
            priority: model.priority,
            is_active: model.is_active,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl_sync_record!(AutomationRule, EntityType::AutomationRule, id, Column::Id);
