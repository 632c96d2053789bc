use crate::models::LedgerEvent;
use tokio::sync::broadcast::{self, Sender};
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 100;

/// Fans ledger changes out to whoever is showing ledger data.
pub struct NotificationHub {
    sender: Sender<LedgerEvent>,
}

impl NotificationHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn sender(&self) -> Sender<LedgerEvent> {
        self.sender.clone()
    }

    pub fn subscribe(&self) -> BroadcastStream<LedgerEvent> {
        BroadcastStream::new(self.sender.subscribe())
    }

    /// Sends to current subscribers. Events are dropped when nobody listens.
    pub fn publish(&self, event: LedgerEvent) {
        if self.sender.send(event).is_err() {
            debug!("no ledger subscribers");
        }
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sales;
    use crate::models::SaleReceipt;
    use chrono::{TimeZone, Utc};
    use futures::StreamExt;
    use rust_decimal_macros::dec;
    use tokio::sync::broadcast::error::TryRecvError;

    fn create_test_receipt(id: i32) -> SaleReceipt {
        SaleReceipt {
            sale: sales::Model {
                id,
                motorcycle_id: 1,
                quantity: 1,
                price: dec!(1200),
                client_name: format!("Client {}", id),
                client_address: String::new(),
                client_phone: String::new(),
                sale_date: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap().into(),
            },
            motorcycle: "Honda125".to_string(),
        }
    }

    #[tokio::test]
    async fn test_notification_hub_creation() {
        let hub = NotificationHub::new();
        assert!(hub.sender.receiver_count() == 0);
    }

    #[tokio::test]
    async fn test_event_broadcasting() {
        let hub = NotificationHub::new();
        let mut receiver1 = hub.sender().subscribe();
        let mut receiver2 = hub.sender().subscribe();

        let receipt = create_test_receipt(1);
        hub.publish(LedgerEvent::SaleRecorded(receipt.clone()));

        let timeout = tokio::time::Duration::from_secs(1);

        for receiver in [&mut receiver1, &mut receiver2] {
            let result = tokio::time::timeout(timeout, receiver.recv()).await;
            assert!(result.is_ok(), "Receiver timed out");
            if let Ok(Ok(LedgerEvent::SaleRecorded(received))) = result {
                assert_eq!(received, receipt);
            } else {
                panic!("Failed to receive SaleRecorded event");
            }
        }
    }

    #[tokio::test]
    async fn test_multiple_events_in_order() {
        let hub = NotificationHub::new();
        let mut stream = hub.subscribe();

        let events = vec![
            LedgerEvent::SaleRecorded(create_test_receipt(1)),
            LedgerEvent::SaleRecorded(create_test_receipt(2)),
            LedgerEvent::MotorcycleDeleted("Honda125".to_string()),
        ];
        for event in events.clone() {
            hub.publish(event);
        }

        let timeout = tokio::time::Duration::from_secs(1);
        for expected_event in events {
            let result = tokio::time::timeout(timeout, stream.next()).await;
            match result {
                Ok(Some(Ok(received))) => assert_eq!(received, expected_event),
                _ => panic!("Failed to receive expected event"),
            }
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let hub = NotificationHub::new();
        hub.publish(LedgerEvent::MotorcycleDeleted("Honda125".to_string()));

        let mut late_receiver = hub.sender().subscribe();
        match late_receiver.try_recv() {
            Err(TryRecvError::Empty) => (),
            other => panic!("Expected empty channel, got {:?}", other),
        }
    }
}
