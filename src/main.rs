use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use moto_ledger::config::Config;
use moto_ledger::report::{self, Invoice};
use moto_ledger::storage::SqlStore;
use moto_ledger::{Client, Ledger, SaleOrder, StockAdjustment, StockIntake};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "moto-ledger", about = "Stock and sales ledger for a motorcycle dealer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Receive stock, creating the model on first intake
    Intake {
        name: String,
        #[arg(long)]
        entries: i32,
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Record a sale to a client
    Sell {
        name: String,
        #[arg(long)]
        quantity: i32,
        #[arg(long)]
        price: Decimal,
        #[arg(long)]
        client: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Also write the invoice to the report directory
        #[arg(long)]
        invoice: bool,
    },
    /// Take damaged or miscounted units out of stock
    Adjust {
        name: String,
        #[arg(long)]
        outputs: i32,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Delete a model with all of its movements and sales
    Delete { name: String },
    /// Show the reconciled inventory
    Inventory {
        #[arg(long)]
        json: bool,
    },
    /// Show sales, optionally for a single day (YYYY-MM-DD)
    Sales {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
        /// Write the report to the report directory
        #[arg(long, conflicts_with = "json")]
        print: bool,
    },
    /// Write the invoice of a recorded sale
    Invoice { sale_id: i32 },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = SqlStore::connect(&config.database).await?;
    let ledger = Ledger::new(store);

    match cli.command {
        Command::Intake {
            name,
            entries,
            price,
            comment,
        } => {
            let movement = ledger
                .record_intake(StockIntake::new(name.as_str(), entries, price).with_comment(comment))
                .await?;
            println!("Received {} x {} (movement #{})", entries, name, movement.id);
        }
        Command::Sell {
            name,
            quantity,
            price,
            client,
            address,
            phone,
            invoice,
        } => {
            let client = Client::new(client).with_address(address).with_phone(phone);
            let receipt = ledger
                .record_sale(SaleOrder::new(name, quantity, price, client))
                .await?;
            println!(
                "Sale #{} recorded: {} x {} for {}",
                receipt.sale.id,
                receipt.sale.quantity,
                receipt.motorcycle,
                report::format_amount(receipt.sale.total())
            );
            if invoice {
                let invoice = Invoice::from_receipt(&receipt);
                let path = report::write_document(
                    &config.report_dir,
                    &invoice.file_name(),
                    &invoice.render(&config.dealer),
                )?;
                println!("Invoice written to {}", path.display());
            }
        }
        Command::Adjust {
            name,
            outputs,
            comment,
        } => {
            ledger
                .record_adjustment(StockAdjustment::new(name.as_str(), outputs).with_comment(comment))
                .await?;
            println!("Removed {} x {} from stock", outputs, name);
        }
        Command::Delete { name } => {
            let deletion = ledger.delete_motorcycle(&name).await?;
            println!(
                "Deleted {} ({} movement(s), {} sale(s))",
                name, deletion.movements_removed, deletion.sales_removed
            );
        }
        Command::Inventory { json } => {
            let rows = ledger.inventory().await?;
            if json {
                print_json(&rows)?;
            } else {
                print!("{}", report::render_inventory(&rows));
            }
        }
        Command::Sales { date, json, print } => {
            let rows = ledger.sales_report(date).await?;
            if json {
                print_json(&rows)?;
            } else {
                let text = report::render_sales_report(date, &rows, &config.dealer);
                print!("{text}");
                if print {
                    let path = report::write_document(
                        &config.report_dir,
                        &report::sales_report_file_name(date),
                        &text,
                    )?;
                    println!("Report written to {}", path.display());
                }
            }
        }
        Command::Invoice { sale_id } => {
            let receipt = ledger.sale(sale_id).await?;
            let invoice = Invoice::from_receipt(&receipt);
            let path = report::write_document(
                &config.report_dir,
                &invoice.file_name(),
                &invoice.render(&config.dealer),
            )?;
            println!("Invoice written to {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sales_flags() {
        let cli = Cli::try_parse_from(["moto-ledger", "sales", "--date", "2024-01-01", "--print"])
            .unwrap();
        match cli.command {
            Command::Sales { date, json, print } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert!(!json);
                assert!(print);
            }
            _ => panic!("Expected the sales command"),
        }

        assert!(Cli::try_parse_from(["moto-ledger", "sales", "--json", "--print"]).is_err());
    }

    #[test]
    fn test_sell_arguments() {
        let cli = Cli::try_parse_from([
            "moto-ledger",
            "sell",
            "Honda125",
            "--quantity",
            "2",
            "--price",
            "1200.50",
            "--client",
            "Alice",
            "--invoice",
        ])
        .unwrap();
        match cli.command {
            Command::Sell {
                name,
                quantity,
                price,
                client,
                address,
                invoice,
                ..
            } => {
                assert_eq!(name, "Honda125");
                assert_eq!(quantity, 2);
                assert_eq!(price, Decimal::new(120050, 2));
                assert_eq!(client, "Alice");
                assert_eq!(address, "");
                assert!(invoice);
            }
            _ => panic!("Expected the sell command"),
        }
    }
}
