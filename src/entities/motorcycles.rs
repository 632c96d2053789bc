use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{Set, Unchanged};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "motorcycles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_movements::Entity")]
    InventoryMovements,
    #[sea_orm(has_many = "super::sales::Entity")]
    Sales,
}

impl Related<super::inventory_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryMovements.def()
    }
}

impl Related<super::sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        use chrono::Utc;
        Self {
            created_at: Set(Utc::now().into()),
            ..ActiveModelTrait::default()
        }
    }

    /// Stock can never go below zero, whatever path the write came from.
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let Set(quantity) | Unchanged(quantity) = &self.quantity {
            if *quantity < 0 {
                return Err(DbErr::Custom(format!(
                    "motorcycle quantity cannot be negative (got {quantity})"
                )));
            }
        }
        Ok(self)
    }
}
