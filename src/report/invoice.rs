use super::{format_amount, format_date};
use crate::config::Dealer;
use crate::models::{Client, SaleReceipt};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    pub number: i32,
    pub date: DateTime<FixedOffset>,
    pub client: Client,
    pub motorcycle: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
}

impl Invoice {
    pub fn from_receipt(receipt: &SaleReceipt) -> Self {
        let sale = &receipt.sale;
        Self {
            number: sale.id,
            date: sale.sale_date,
            client: Client {
                name: sale.client_name.clone(),
                address: sale.client_address.clone(),
                phone: sale.client_phone.clone(),
            },
            motorcycle: receipt.motorcycle.clone(),
            quantity: sale.quantity,
            unit_price: sale.price,
            total: sale.total(),
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "invoice_{}_{}.txt",
            self.date.format("%Y%m%d_%H%M%S"),
            self.number
        )
    }

    pub fn render(&self, dealer: &Dealer) -> String {
        let currency = &dealer.currency;
        let mut out = format!("{}\n", dealer.name);
        for line in [&dealer.tagline, &dealer.phone, &dealer.address] {
            if !line.is_empty() {
                out.push_str(&format!("{line}\n"));
            }
        }

        out.push_str(&format!(
            "\nINVOICE #{}\nDate: {}\n",
            self.number,
            format_date(&self.date)
        ));
        out.push_str(&format!(
            "\nClient:\n  Name: {}\n  Address: {}\n  Phone: {}\n",
            self.client.name, self.client.address, self.client.phone
        ));
        out.push_str(&format!(
            "\nSale details:\n  Motorcycle: {}\n  Quantity: {}\n  Unit price: {} {currency}\n  Total: {} {currency}\n",
            self.motorcycle,
            self.quantity,
            format_amount(self.unit_price),
            format_amount(self.total)
        ));
        out
    }
}
