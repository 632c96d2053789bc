use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub motorcycle_id: i32,
    pub quantity: i32,
    pub price: Decimal,
    pub client_name: String,
    pub client_address: String,
    pub client_phone: String,
    pub sale_date: DateTimeWithTimeZone,
}

impl Model {
    pub fn total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
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
            sale_date: Set(chrono::Utc::now().into()),
            ..ActiveModelTrait::default()
        }
    }
}
