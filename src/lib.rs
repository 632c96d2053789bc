pub mod config;
pub mod entities;
mod error;
mod models;
pub mod notifications;
pub mod report;
pub mod storage;

pub use entities::inventory_movements::Model as InventoryMovement;
pub use entities::motorcycles::Model as Motorcycle;
pub use error::{LedgerError, Outcome, Result};
pub use models::{
    previous_stock, Client, Deletion, InventoryRow, LatestMovement, LedgerEvent, SaleOrder,
    SaleReceipt, SaleRow, StockAdjustment, StockIntake,
};

use chrono::NaiveDate;
use notifications::NotificationHub;
use storage::LedgerStore;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};

/// Front door of the ledger: runs each operation against the store, logs the
/// outcome and tells subscribers about committed changes.
pub struct Ledger<S: LedgerStore> {
    store: S,
    notifications: NotificationHub,
}

impl<S: LedgerStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            notifications: NotificationHub::new(),
        }
    }

    pub fn subscribe(&self) -> BroadcastStream<LedgerEvent> {
        self.notifications.subscribe()
    }

    pub async fn record_intake(&self, intake: StockIntake) -> Result<InventoryMovement> {
        let movement = self
            .store
            .record_intake(&intake)
            .await
            .inspect_err(|err| warn!(motorcycle = %intake.name, error = %err, "intake rejected"))?;

        info!(
            motorcycle = %intake.name,
            entries = intake.entries,
            price = %intake.price,
            "stock received"
        );
        self.notifications
            .publish(LedgerEvent::StockReceived(movement.clone()));
        Ok(movement)
    }

    pub async fn record_adjustment(&self, adjustment: StockAdjustment) -> Result<InventoryMovement> {
        let movement = self
            .store
            .record_adjustment(&adjustment)
            .await
            .inspect_err(|err| {
                warn!(motorcycle = %adjustment.name, error = %err, "adjustment rejected")
            })?;

        info!(
            motorcycle = %adjustment.name,
            outputs = adjustment.outputs,
            "stock adjusted"
        );
        self.notifications
            .publish(LedgerEvent::StockAdjusted(movement.clone()));
        Ok(movement)
    }

    pub async fn record_sale(&self, order: SaleOrder) -> Result<SaleReceipt> {
        let receipt = self
            .store
            .record_sale(&order)
            .await
            .inspect_err(|err| warn!(motorcycle = %order.motorcycle, error = %err, "sale rejected"))?;

        info!(
            sale_id = receipt.sale.id,
            motorcycle = %receipt.motorcycle,
            quantity = receipt.sale.quantity,
            client = %receipt.sale.client_name,
            "sale recorded"
        );
        self.notifications
            .publish(LedgerEvent::SaleRecorded(receipt.clone()));
        Ok(receipt)
    }

    pub async fn delete_motorcycle(&self, name: &str) -> Result<Deletion> {
        let deletion = self
            .store
            .delete_motorcycle(name)
            .await
            .inspect_err(|err| warn!(motorcycle = %name, error = %err, "delete rejected"))?;

        info!(
            motorcycle = %name,
            movements = deletion.movements_removed,
            sales = deletion.sales_removed,
            "motorcycle deleted"
        );
        self.notifications
            .publish(LedgerEvent::MotorcycleDeleted(name.to_string()));
        Ok(deletion)
    }

    pub async fn motorcycle(&self, name: &str) -> Result<Motorcycle> {
        self.store.motorcycle(name).await
    }

    pub async fn sale(&self, id: i32) -> Result<SaleReceipt> {
        self.store.sale(id).await
    }

    pub async fn inventory(&self) -> Result<Vec<InventoryRow>> {
        self.store.inventory().await
    }

    pub async fn sales_report(&self, date: Option<NaiveDate>) -> Result<Vec<SaleRow>> {
        self.store.sales_report(date).await
    }
}
