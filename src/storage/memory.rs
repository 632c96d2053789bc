use crate::entities::{inventory_movements, motorcycles, sales};
use crate::error::{LedgerError, Result};
use crate::models::{
    day_bounds, Deletion, InventoryRow, LatestMovement, SaleOrder, SaleReceipt, SaleRow,
    StockAdjustment, StockIntake,
};
use crate::storage::LedgerStore;
use crate::{InventoryMovement, Motorcycle};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    motorcycles: Vec<Motorcycle>,
    movements: Vec<InventoryMovement>,
    sales: Vec<sales::Model>,
    next_motorcycle_id: i32,
    next_movement_id: i32,
    next_sale_id: i32,
}

impl Tables {
    fn position(&self, name: &str) -> Result<usize> {
        self.motorcycles
            .iter()
            .position(|motorcycle| motorcycle.name == name)
            .ok_or_else(|| LedgerError::MotorcycleNotFound(name.to_string()))
    }

    fn name_of(&self, motorcycle_id: i32) -> Option<&str> {
        self.motorcycles
            .iter()
            .find(|motorcycle| motorcycle.id == motorcycle_id)
            .map(|motorcycle| motorcycle.name.as_str())
    }

    fn take_from_stock(&mut self, index: usize, units: i32) -> Result<&Motorcycle> {
        let motorcycle = &mut self.motorcycles[index];
        if units > motorcycle.quantity {
            return Err(LedgerError::InsufficientStock {
                name: motorcycle.name.clone(),
                requested: units,
                available: motorcycle.quantity,
            });
        }
        motorcycle.quantity -= units;
        Ok(motorcycle)
    }

    fn push_movement(&mut self, movement: inventory_movements::Model) -> InventoryMovement {
        self.next_movement_id += 1;
        let movement = InventoryMovement {
            id: self.next_movement_id,
            ..movement
        };
        self.movements.push(movement.clone());
        movement
    }
}

/// In-process ledger store. Every operation runs under one lock, so a failed
/// operation never leaves partial writes behind.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn record_intake(&self, intake: &StockIntake) -> Result<InventoryMovement> {
        intake.validate()?;
        let mut tables = self.lock();
        let received_at: DateTime<FixedOffset> = intake.received_at.into();

        let motorcycle_id = match tables.position(&intake.name) {
            Ok(index) => {
                let motorcycle = &mut tables.motorcycles[index];
                motorcycle.quantity = motorcycle
                    .quantity
                    .checked_add(intake.entries)
                    .ok_or_else(|| {
                        LedgerError::InvalidInput(format!(
                            "stock of `{}` would overflow",
                            motorcycle.name
                        ))
                    })?;
                motorcycle.price = intake.price;
                motorcycle.id
            }
            Err(_) => {
                tables.next_motorcycle_id += 1;
                let id = tables.next_motorcycle_id;
                tables.motorcycles.push(motorcycles::Model {
                    id,
                    name: intake.name.clone(),
                    quantity: intake.entries,
                    price: intake.price,
                    created_at: received_at,
                });
                id
            }
        };

        Ok(tables.push_movement(inventory_movements::Model {
            id: 0,
            motorcycle_id,
            entries: intake.entries,
            outputs: 0,
            price: intake.price,
            comment: intake.comment.clone(),
            movement_date: received_at,
        }))
    }

    async fn record_adjustment(&self, adjustment: &StockAdjustment) -> Result<InventoryMovement> {
        adjustment.validate()?;
        let mut tables = self.lock();

        let index = tables.position(&adjustment.name)?;
        let motorcycle = tables.take_from_stock(index, adjustment.outputs)?;
        let (motorcycle_id, price) = (motorcycle.id, motorcycle.price);

        Ok(tables.push_movement(inventory_movements::Model {
            id: 0,
            motorcycle_id,
            entries: 0,
            outputs: adjustment.outputs,
            price,
            comment: adjustment.comment.clone(),
            movement_date: adjustment.adjusted_at.into(),
        }))
    }

    async fn record_sale(&self, order: &SaleOrder) -> Result<SaleReceipt> {
        order.validate()?;
        let mut tables = self.lock();

        let index = tables.position(&order.motorcycle)?;
        let motorcycle = tables.take_from_stock(index, order.quantity)?;
        let (motorcycle_id, name) = (motorcycle.id, motorcycle.name.clone());

        tables.next_sale_id += 1;
        let sale = sales::Model {
            id: tables.next_sale_id,
            motorcycle_id,
            quantity: order.quantity,
            price: order.price,
            client_name: order.client.name.clone(),
            client_address: order.client.address.clone(),
            client_phone: order.client.phone.clone(),
            sale_date: order.sold_at.into(),
        };
        tables.sales.push(sale.clone());

        Ok(SaleReceipt {
            sale,
            motorcycle: name,
        })
    }

    async fn delete_motorcycle(&self, name: &str) -> Result<Deletion> {
        let mut tables = self.lock();

        let index = tables.position(name)?;
        let motorcycle_id = tables.motorcycles.remove(index).id;

        let movements_before = tables.movements.len();
        tables
            .movements
            .retain(|movement| movement.motorcycle_id != motorcycle_id);
        let sales_before = tables.sales.len();
        tables.sales.retain(|sale| sale.motorcycle_id != motorcycle_id);

        Ok(Deletion {
            motorcycle_id,
            movements_removed: (movements_before - tables.movements.len()) as u64,
            sales_removed: (sales_before - tables.sales.len()) as u64,
        })
    }

    async fn motorcycle(&self, name: &str) -> Result<Motorcycle> {
        let tables = self.lock();
        let index = tables.position(name)?;
        Ok(tables.motorcycles[index].clone())
    }

    async fn sale(&self, id: i32) -> Result<SaleReceipt> {
        let tables = self.lock();
        tables
            .sales
            .iter()
            .find(|sale| sale.id == id)
            .and_then(|sale| {
                tables.name_of(sale.motorcycle_id).map(|name| SaleReceipt {
                    sale: sale.clone(),
                    motorcycle: name.to_string(),
                })
            })
            .ok_or(LedgerError::SaleNotFound(id))
    }

    async fn inventory(&self) -> Result<Vec<InventoryRow>> {
        let tables = self.lock();

        let mut rows: Vec<(i32, InventoryRow)> = tables
            .motorcycles
            .iter()
            .map(|motorcycle| {
                let latest = tables
                    .movements
                    .iter()
                    .filter(|movement| movement.motorcycle_id == motorcycle.id)
                    .max_by_key(|movement| (movement.movement_date, movement.id))
                    .map(|movement| LatestMovement {
                        entries: movement.entries,
                        outputs: movement.outputs,
                        comment: movement.comment.clone(),
                        date: movement.movement_date,
                    });
                let total_sold: i64 = tables
                    .sales
                    .iter()
                    .filter(|sale| sale.motorcycle_id == motorcycle.id)
                    .map(|sale| i64::from(sale.quantity))
                    .sum();

                let row = InventoryRow::reconcile(
                    &motorcycle.name,
                    motorcycle.quantity,
                    motorcycle.price,
                    motorcycle.created_at,
                    latest,
                    total_sold,
                );
                (motorcycle.id, row)
            })
            .collect();

        rows.sort_by(|(a_id, a), (b_id, b)| b.date.cmp(&a.date).then(b_id.cmp(a_id)));
        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }

    async fn sales_report(&self, date: Option<NaiveDate>) -> Result<Vec<SaleRow>> {
        let tables = self.lock();
        let bounds = date.map(day_bounds);

        let mut sales: Vec<&sales::Model> = tables
            .sales
            .iter()
            .filter(|sale| match bounds {
                Some((start, end)) => sale.sale_date >= start && sale.sale_date < end,
                None => true,
            })
            .collect();
        sales.sort_by(|a, b| b.sale_date.cmp(&a.sale_date).then(b.id.cmp(&a.id)));

        Ok(sales
            .into_iter()
            .filter_map(|sale| {
                tables
                    .name_of(sale.motorcycle_id)
                    .map(|name| SaleRow::new(sale, name))
            })
            .collect())
    }
}
