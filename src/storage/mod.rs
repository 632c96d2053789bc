use crate::error::Result;
use crate::models::{
    Deletion, InventoryRow, SaleOrder, SaleReceipt, SaleRow, StockAdjustment, StockIntake,
};
use crate::{InventoryMovement, Motorcycle};
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Upserts the motorcycle by name and appends the intake movement.
    async fn record_intake(&self, intake: &StockIntake) -> Result<InventoryMovement>;
    /// Appends an outputs-only movement and takes the units out of stock.
    async fn record_adjustment(&self, adjustment: &StockAdjustment) -> Result<InventoryMovement>;
    async fn record_sale(&self, order: &SaleOrder) -> Result<SaleReceipt>;
    /// Removes the motorcycle with all of its movements and sales.
    async fn delete_motorcycle(&self, name: &str) -> Result<Deletion>;
    async fn motorcycle(&self, name: &str) -> Result<Motorcycle>;
    async fn sale(&self, id: i32) -> Result<SaleReceipt>;
    async fn inventory(&self) -> Result<Vec<InventoryRow>>;
    async fn sales_report(&self, date: Option<NaiveDate>) -> Result<Vec<SaleRow>>;
}

pub mod gateway;
pub mod memory;
pub mod sql;

pub use gateway::Gateway;
pub use memory::MemoryStore;
pub use sql::SqlStore;
