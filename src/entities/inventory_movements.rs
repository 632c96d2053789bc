use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_movements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub motorcycle_id: i32,
    pub entries: i32,
    pub outputs: i32,
    pub price: Decimal,
    pub comment: String,
    pub movement_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::motorcycles::Entity",
        from = "Column::MotorcycleId",
        to = "super::motorcycles::Column::Id"
    )]
    Motorcycle,
}

impl Related<super::motorcycles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Motorcycle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            entries: Set(0),
            outputs: Set(0),
            comment: Set(String::new()),
            movement_date: Set(chrono::Utc::now().into()),
            ..ActiveModelTrait::default()
        }
    }
}
