use crate::entities::inventory_movements::Model as InventoryMovement;
use crate::entities::sales::Model as Sale;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock received for a model. Creates the motorcycle on first intake.
#[derive(Debug, Clone, PartialEq)]
pub struct StockIntake {
    pub name: String,
    pub entries: i32,
    pub price: Decimal,
    pub comment: String,
    pub received_at: DateTime<Utc>,
}

impl StockIntake {
    pub fn new(name: impl Into<String>, entries: i32, price: Decimal) -> Self {
        Self {
            name: name.into(),
            entries,
            price,
            comment: String::new(),
            received_at: Utc::now(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_name(&self.name)?;
        if self.entries < 0 {
            return Err(LedgerError::InvalidInput(format!(
                "entries must not be negative (got {})",
                self.entries
            )));
        }
        require_price(self.price)
    }
}

/// Units leaving stock outside the sales flow (damage, corrections).
#[derive(Debug, Clone, PartialEq)]
pub struct StockAdjustment {
    pub name: String,
    pub outputs: i32,
    pub comment: String,
    pub adjusted_at: DateTime<Utc>,
}

impl StockAdjustment {
    pub fn new(name: impl Into<String>, outputs: i32) -> Self {
        Self {
            name: name.into(),
            outputs,
            comment: String::new(),
            adjusted_at: Utc::now(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn at(mut self, adjusted_at: DateTime<Utc>) -> Self {
        self.adjusted_at = adjusted_at;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_name(&self.name)?;
        require_positive("outputs", self.outputs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleOrder {
    pub motorcycle: String,
    pub quantity: i32,
    pub price: Decimal,
    pub client: Client,
    pub sold_at: DateTime<Utc>,
}

impl SaleOrder {
    pub fn new(motorcycle: impl Into<String>, quantity: i32, price: Decimal, client: Client) -> Self {
        Self {
            motorcycle: motorcycle.into(),
            quantity,
            price,
            client,
            sold_at: Utc::now(),
        }
    }

    pub fn at(mut self, sold_at: DateTime<Utc>) -> Self {
        self.sold_at = sold_at;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_name(&self.motorcycle)?;
        require_positive("quantity", self.quantity)?;
        require_price(self.price)?;
        if self.client.name.trim().is_empty() {
            return Err(LedgerError::InvalidInput("client name is required".into()));
        }
        Ok(())
    }
}

fn require_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::InvalidInput("motorcycle name is required".into()));
    }
    Ok(())
}

fn require_positive(field: &str, value: i32) -> Result<()> {
    if value <= 0 {
        return Err(LedgerError::InvalidInput(format!(
            "{field} must be positive (got {value})"
        )));
    }
    Ok(())
}

fn require_price(price: Decimal) -> Result<()> {
    if price.is_sign_negative() {
        return Err(LedgerError::InvalidInput(format!(
            "price must not be negative (got {price})"
        )));
    }
    Ok(())
}

/// A stored sale together with the name of the motorcycle it sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub sale: Sale,
    pub motorcycle: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deletion {
    pub motorcycle_id: i32,
    pub movements_removed: u64,
    pub sales_removed: u64,
}

/// Figures of the most recent movement of a motorcycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestMovement {
    pub entries: i32,
    pub outputs: i32,
    pub comment: String,
    pub date: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub date: DateTime<FixedOffset>,
    pub motorcycle: String,
    pub previous_stock: i64,
    pub entries: i64,
    pub outputs: i64,
    pub price: Decimal,
    pub balance: i64,
    pub comment: String,
}

impl InventoryRow {
    /// Reconciles the current balance against the latest movement and the
    /// units sold so far.
    pub fn reconcile(
        motorcycle: &str,
        balance: i32,
        price: Decimal,
        created_at: DateTime<FixedOffset>,
        latest: Option<LatestMovement>,
        total_sold: i64,
    ) -> Self {
        let (entries, movement_outputs, comment, date) = match latest {
            Some(movement) => (
                i64::from(movement.entries),
                i64::from(movement.outputs),
                movement.comment,
                movement.date,
            ),
            None => (0, 0, String::new(), created_at),
        };
        let balance = i64::from(balance);
        let outputs = movement_outputs + total_sold;

        Self {
            date,
            motorcycle: motorcycle.to_string(),
            previous_stock: previous_stock(balance, entries, outputs),
            entries,
            outputs,
            price,
            balance,
            comment,
        }
    }
}

pub fn previous_stock(balance: i64, entries: i64, outputs: i64) -> i64 {
    balance - entries + outputs
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRow {
    pub id: i32,
    pub date: DateTime<FixedOffset>,
    pub motorcycle: String,
    pub client: String,
    pub quantity: i32,
    pub price: Decimal,
    pub total: Decimal,
}

impl SaleRow {
    pub fn new(sale: &Sale, motorcycle: &str) -> Self {
        Self {
            id: sale.id,
            date: sale.sale_date,
            motorcycle: motorcycle.to_string(),
            client: sale.client_name.clone(),
            quantity: sale.quantity,
            price: sale.price,
            total: sale.total(),
        }
    }
}

/// Half-open UTC range `[start, end)` covering one calendar day.
pub fn day_bounds(day: NaiveDate) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
    let midnight = |date: NaiveDate| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    let start = midnight(day);
    let end = day.succ_opt().map(midnight).unwrap_or(start);
    (start.into(), end.into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    StockReceived(InventoryMovement),
    StockAdjusted(InventoryMovement),
    SaleRecorded(SaleReceipt),
    MotorcycleDeleted(String),
}
