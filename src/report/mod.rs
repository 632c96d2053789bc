//! Plain-text rendering of ledger records: the inventory table, the sales
//! report and per-sale invoices.

use crate::config::Dealer;
use crate::models::{InventoryRow, SaleRow};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

mod invoice;
mod table;

pub use invoice::Invoice;
use table::Table;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Two decimals with thousands separators, e.g. `12,400.50`.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}

fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn render_inventory(rows: &[InventoryRow]) -> String {
    let mut table = Table::new([
        "Date",
        "Motorcycle",
        "Previous",
        "Entries",
        "Outputs",
        "Unit price",
        "Balance",
        "Comment",
    ]);
    for row in rows {
        table.push([
            format_date(&row.date),
            row.motorcycle.clone(),
            row.previous_stock.to_string(),
            row.entries.to_string(),
            row.outputs.to_string(),
            format_amount(row.price),
            row.balance.to_string(),
            row.comment.clone(),
        ]);
    }
    table.render()
}

pub fn render_sales_report(date: Option<NaiveDate>, rows: &[SaleRow], dealer: &Dealer) -> String {
    let title = match date {
        Some(day) => format!("Sales report for {}", day.format("%Y-%m-%d")),
        None => "Sales report (all dates)".to_string(),
    };
    let mut out = format!("{}\n{title}\n\n", dealer.name);

    if rows.is_empty() {
        out.push_str("No sales recorded.\n");
        return out;
    }

    let mut table = Table::new(["Date", "Motorcycle", "Client", "Quantity", "Unit price", "Total"]);
    for row in rows {
        table.push([
            format_date(&row.date),
            row.motorcycle.clone(),
            row.client.clone(),
            row.quantity.to_string(),
            format_amount(row.price),
            format_amount(row.total),
        ]);
    }
    out.push_str(&table.render());

    let units: i64 = rows.iter().map(|row| i64::from(row.quantity)).sum();
    let revenue: Decimal = rows.iter().map(|row| row.total).sum();
    out.push_str(&format!(
        "\n{} sale(s), {} unit(s), total {} {}\n",
        rows.len(),
        units,
        format_amount(revenue),
        dealer.currency
    ));
    out
}

pub fn sales_report_file_name(date: Option<NaiveDate>) -> String {
    match date {
        Some(day) => format!("sales_report_{}.txt", day.format("%Y-%m-%d")),
        None => "sales_report_all.txt".to_string(),
    }
}

/// Writes a rendered document into `dir`, creating the directory if needed.
pub fn write_document(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating report directory {}", dir.display()))?;
    let path = dir.join(file_name);
    std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
