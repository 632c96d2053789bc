use crate::config::DatabaseConfig;
use crate::entities::{inventory_movements, motorcycles, sales};
use crate::error::{LedgerError, Result};
use crate::models::{
    day_bounds, Deletion, InventoryRow, LatestMovement, SaleOrder, SaleReceipt, SaleRow,
    StockAdjustment, StockIntake,
};
use crate::storage::{Gateway, LedgerStore};
use crate::{InventoryMovement, Motorcycle};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult,
    IntoActiveModel, QueryFilter, QueryOrder, Set, Value,
};

/// One row per motorcycle, joined with its most recent movement and the units
/// sold across all of its sales.
const INVENTORY_SQL: &str = r#"
    SELECT
        m.id AS id,
        m.name AS name,
        m.quantity AS quantity,
        m.price AS price,
        m.created_at AS created_at,
        im.entries AS entries,
        im.outputs AS outputs,
        im.comment AS comment,
        im.movement_date AS movement_date,
        COALESCE(s.total_sold, 0) AS total_sold
    FROM motorcycles m
    LEFT JOIN inventory_movements im ON im.id = (
        SELECT latest.id
        FROM inventory_movements latest
        WHERE latest.motorcycle_id = m.id
        ORDER BY latest.movement_date DESC, latest.id DESC
        LIMIT 1
    )
    LEFT JOIN (
        SELECT motorcycle_id, SUM(quantity) AS total_sold
        FROM sales
        GROUP BY motorcycle_id
    ) s ON s.motorcycle_id = m.id
    ORDER BY COALESCE(im.movement_date, m.created_at) DESC, m.id DESC
"#;

#[derive(Debug, FromQueryResult)]
struct InventoryRecord {
    name: String,
    quantity: i32,
    price: Decimal,
    created_at: DateTime<FixedOffset>,
    entries: Option<i32>,
    outputs: Option<i32>,
    comment: Option<String>,
    movement_date: Option<DateTime<FixedOffset>>,
    total_sold: i64,
}

impl From<InventoryRecord> for InventoryRow {
    fn from(record: InventoryRecord) -> Self {
        let InventoryRecord {
            name,
            quantity,
            price,
            created_at,
            entries,
            outputs,
            comment,
            movement_date,
            total_sold,
        } = record;

        let latest = movement_date.map(|date| LatestMovement {
            entries: entries.unwrap_or(0),
            outputs: outputs.unwrap_or(0),
            comment: comment.unwrap_or_default(),
            date,
        });

        InventoryRow::reconcile(&name, quantity, price, created_at, latest, total_sold)
    }
}

/// Ledger store backed by SQLite through sea-orm.
#[derive(Debug, Clone)]
pub struct SqlStore {
    gateway: Gateway,
}

impl SqlStore {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        Ok(Self::new(Gateway::connect(config).await?))
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }
}

async fn find_by_name<C>(db: &C, name: &str) -> Result<Motorcycle>
where
    C: ConnectionTrait,
{
    motorcycles::Entity::find()
        .filter(motorcycles::Column::Name.eq(name))
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::MotorcycleNotFound(name.to_string()))
}

async fn take_from_stock<C>(db: &C, motorcycle: Motorcycle, units: i32) -> Result<Motorcycle>
where
    C: ConnectionTrait,
{
    if units > motorcycle.quantity {
        return Err(LedgerError::InsufficientStock {
            name: motorcycle.name,
            requested: units,
            available: motorcycle.quantity,
        });
    }

    let remaining = motorcycle.quantity - units;
    let mut active = motorcycle.into_active_model();
    active.quantity = Set(remaining);
    Ok(active.update(db).await?)
}

#[async_trait]
impl LedgerStore for SqlStore {
    async fn record_intake(&self, intake: &StockIntake) -> Result<InventoryMovement> {
        intake.validate()?;
        let received_at: DateTime<FixedOffset> = intake.received_at.into();
        let txn = self.gateway.begin().await?;

        let existing = motorcycles::Entity::find()
            .filter(motorcycles::Column::Name.eq(intake.name.as_str()))
            .one(&txn)
            .await?;

        let motorcycle = match existing {
            Some(motorcycle) => {
                let quantity = motorcycle
                    .quantity
                    .checked_add(intake.entries)
                    .ok_or_else(|| {
                        LedgerError::InvalidInput(format!(
                            "stock of `{}` would overflow",
                            motorcycle.name
                        ))
                    })?;
                let mut active = motorcycle.into_active_model();
                active.quantity = Set(quantity);
                active.price = Set(intake.price);
                active.update(&txn).await?
            }
            None => {
                motorcycles::ActiveModel {
                    name: Set(intake.name.clone()),
                    quantity: Set(intake.entries),
                    price: Set(intake.price),
                    created_at: Set(received_at),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        let movement = inventory_movements::ActiveModel {
            motorcycle_id: Set(motorcycle.id),
            entries: Set(intake.entries),
            outputs: Set(0),
            price: Set(intake.price),
            comment: Set(intake.comment.clone()),
            movement_date: Set(received_at),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(movement)
    }

    async fn record_adjustment(&self, adjustment: &StockAdjustment) -> Result<InventoryMovement> {
        adjustment.validate()?;
        let txn = self.gateway.begin().await?;

        let motorcycle = find_by_name(&txn, &adjustment.name).await?;
        let motorcycle = take_from_stock(&txn, motorcycle, adjustment.outputs).await?;

        let movement = inventory_movements::ActiveModel {
            motorcycle_id: Set(motorcycle.id),
            entries: Set(0),
            outputs: Set(adjustment.outputs),
            price: Set(motorcycle.price),
            comment: Set(adjustment.comment.clone()),
            movement_date: Set(adjustment.adjusted_at.into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(movement)
    }

    async fn record_sale(&self, order: &SaleOrder) -> Result<SaleReceipt> {
        order.validate()?;
        let txn = self.gateway.begin().await?;

        let motorcycle = find_by_name(&txn, &order.motorcycle).await?;
        let motorcycle = take_from_stock(&txn, motorcycle, order.quantity).await?;

        let sale = sales::ActiveModel {
            motorcycle_id: Set(motorcycle.id),
            quantity: Set(order.quantity),
            price: Set(order.price),
            client_name: Set(order.client.name.clone()),
            client_address: Set(order.client.address.clone()),
            client_phone: Set(order.client.phone.clone()),
            sale_date: Set(order.sold_at.into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(SaleReceipt {
            sale,
            motorcycle: motorcycle.name,
        })
    }

    async fn delete_motorcycle(&self, name: &str) -> Result<Deletion> {
        let gateway = &self.gateway;
        let rows = gateway
            .query(gateway.statement(
                "SELECT id FROM motorcycles WHERE name = ?",
                [Value::from(name)],
            ))
            .await?;
        let motorcycle_id: i32 = match rows.first() {
            Some(row) => row.try_get("", "id")?,
            None => return Err(LedgerError::MotorcycleNotFound(name.to_string())),
        };

        let affected = gateway
            .run_atomic(vec![
                gateway.statement(
                    "DELETE FROM inventory_movements WHERE motorcycle_id = ?",
                    [Value::from(motorcycle_id)],
                ),
                gateway.statement(
                    "DELETE FROM sales WHERE motorcycle_id = ?",
                    [Value::from(motorcycle_id)],
                ),
                gateway.statement(
                    "DELETE FROM motorcycles WHERE id = ?",
                    [Value::from(motorcycle_id)],
                ),
            ])
            .await?;

        Ok(Deletion {
            motorcycle_id,
            movements_removed: affected.first().copied().unwrap_or_default(),
            sales_removed: affected.get(1).copied().unwrap_or_default(),
        })
    }

    async fn motorcycle(&self, name: &str) -> Result<Motorcycle> {
        find_by_name(self.gateway.connection(), name).await
    }

    async fn sale(&self, id: i32) -> Result<SaleReceipt> {
        let found = sales::Entity::find_by_id(id)
            .find_also_related(motorcycles::Entity)
            .one(self.gateway.connection())
            .await?;

        match found {
            Some((sale, Some(motorcycle))) => Ok(SaleReceipt {
                sale,
                motorcycle: motorcycle.name,
            }),
            _ => Err(LedgerError::SaleNotFound(id)),
        }
    }

    async fn inventory(&self) -> Result<Vec<InventoryRow>> {
        let records: Vec<InventoryRecord> = self
            .gateway
            .query_as(self.gateway.statement(INVENTORY_SQL, Vec::new()))
            .await?;
        Ok(records.into_iter().map(InventoryRow::from).collect())
    }

    async fn sales_report(&self, date: Option<NaiveDate>) -> Result<Vec<SaleRow>> {
        let mut query = sales::Entity::find()
            .find_also_related(motorcycles::Entity)
            .order_by_desc(sales::Column::SaleDate)
            .order_by_desc(sales::Column::Id);

        if let Some(day) = date {
            let (start, end) = day_bounds(day);
            query = query
                .filter(sales::Column::SaleDate.gte(start))
                .filter(sales::Column::SaleDate.lt(end));
        }

        let rows = query.all(self.gateway.connection()).await?;
        Ok(rows
            .into_iter()
            .filter_map(|(sale, motorcycle)| {
                motorcycle.map(|motorcycle| SaleRow::new(&sale, &motorcycle.name))
            })
            .collect())
    }
}
