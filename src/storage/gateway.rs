use crate::config::DatabaseConfig;
use crate::error::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction,
    FromQueryResult, QueryResult, Statement, TransactionTrait, Value,
};
use tracing::{debug, error, info};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS motorcycles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        quantity INTEGER NOT NULL DEFAULT 0,
        price REAL NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_movements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        motorcycle_id INTEGER NOT NULL REFERENCES motorcycles (id),
        entries INTEGER NOT NULL DEFAULT 0,
        outputs INTEGER NOT NULL DEFAULT 0,
        price REAL NOT NULL DEFAULT 0,
        comment TEXT NOT NULL DEFAULT '',
        movement_date TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sales (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        motorcycle_id INTEGER NOT NULL REFERENCES motorcycles (id),
        quantity INTEGER NOT NULL,
        price REAL NOT NULL,
        client_name TEXT NOT NULL,
        client_address TEXT NOT NULL DEFAULT '',
        client_phone TEXT NOT NULL DEFAULT '',
        sale_date TEXT NOT NULL
    )
    "#,
];

/// Thin access layer over the relational store. Every call borrows a pooled
/// connection for its own duration only.
#[derive(Debug, Clone)]
pub struct Gateway {
    db: DatabaseConnection,
}

impl Gateway {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .sqlx_logging(false);

        let db = Database::connect(options).await.inspect_err(|err| {
            error!(url = %config.url, error = %err, "failed to open ledger store");
        })?;

        let gateway = Self { db };
        gateway.init_schema().await?;
        info!(url = %config.url, "ledger store ready");

        Ok(gateway)
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Creates the ledger tables when they are missing. Safe to run repeatedly.
    pub async fn init_schema(&self) -> Result<()> {
        for ddl in SCHEMA {
            self.db.execute_unprepared(ddl).await?;
        }
        Ok(())
    }

    pub fn statement<I>(&self, sql: &str, values: I) -> Statement
    where
        I: IntoIterator<Item = Value>,
    {
        Statement::from_sql_and_values(self.db.get_database_backend(), sql, values)
    }

    pub async fn query(&self, statement: Statement) -> Result<Vec<QueryResult>> {
        debug!(sql = %statement.sql, "query");
        Ok(self.db.query_all(statement).await.inspect_err(log_failure)?)
    }

    pub async fn query_as<T>(&self, statement: Statement) -> Result<Vec<T>>
    where
        T: FromQueryResult,
    {
        debug!(sql = %statement.sql, "query");
        Ok(T::find_by_statement(statement)
            .all(&self.db)
            .await
            .inspect_err(log_failure)?)
    }

    /// Runs a single write statement outside any explicit transaction.
    pub async fn update(&self, statement: Statement) -> Result<u64> {
        debug!(sql = %statement.sql, "update");
        let result = self.db.execute(statement).await.inspect_err(log_failure)?;
        Ok(result.rows_affected())
    }

    /// Runs all statements in one transaction and returns the rows affected by
    /// each. Nothing is kept if any of them fails.
    pub async fn run_atomic(&self, statements: Vec<Statement>) -> Result<Vec<u64>> {
        let txn = self.begin().await?;
        let mut affected = Vec::with_capacity(statements.len());

        for statement in statements {
            debug!(sql = %statement.sql, "atomic update");
            let result = txn.execute(statement).await.inspect_err(log_failure)?;
            affected.push(result.rows_affected());
        }

        txn.commit().await.inspect_err(log_failure)?;
        Ok(affected)
    }

    /// Opens a transaction. It rolls back when dropped without `commit`.
    pub async fn begin(&self) -> Result<DatabaseTransaction> {
        Ok(self.db.begin().await.inspect_err(log_failure)?)
    }
}

fn log_failure(err: &sea_orm::DbErr) {
    error!(error = %err, "statement failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    async fn memory_gateway() -> Result<Gateway> {
        Ok(Gateway::connect(&DatabaseConfig::in_memory()).await?)
    }

    async fn count(gateway: &Gateway, table: &str) -> Result<i64> {
        let rows = gateway
            .query(gateway.statement(&format!("SELECT COUNT(*) AS n FROM {table}"), Vec::new()))
            .await?;
        Ok(rows[0].try_get::<i64>("", "n")?)
    }

    fn insert_motorcycle(gateway: &Gateway, name: &str) -> Statement {
        gateway.statement(
            "INSERT INTO motorcycles (name, quantity, price, created_at) VALUES (?, ?, ?, ?)",
            [
                Value::from(name),
                Value::from(1i32),
                Value::from(1000.0f64),
                Value::from("2024-01-01 00:00:00+00:00"),
            ],
        )
    }

    #[tokio::test]
    async fn test_schema_bootstrap_is_idempotent() -> Result<()> {
        let gateway = memory_gateway().await?;
        gateway.init_schema().await?;
        gateway.init_schema().await?;

        for table in ["motorcycles", "inventory_movements", "sales"] {
            assert_eq!(count(&gateway, table).await?, 0);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_query() -> Result<()> {
        let gateway = memory_gateway().await?;

        let affected = gateway
            .update(insert_motorcycle(&gateway, "Honda125"))
            .await?;
        assert_eq!(affected, 1);

        let rows = gateway
            .query(gateway.statement(
                "SELECT name, quantity FROM motorcycles WHERE name = ?",
                [Value::from("Honda125")],
            ))
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].try_get::<String>("", "name")?, "Honda125");
        assert_eq!(rows[0].try_get::<i32>("", "quantity")?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_statement_is_an_error() -> Result<()> {
        let gateway = memory_gateway().await?;

        gateway.update(insert_motorcycle(&gateway, "Honda125")).await?;
        let duplicate = gateway.update(insert_motorcycle(&gateway, "Honda125")).await;
        assert!(duplicate.is_err());

        let missing = gateway
            .query(gateway.statement("SELECT * FROM trucks", Vec::new()))
            .await;
        assert!(missing.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_run_atomic_rolls_back_on_failure() -> Result<()> {
        let gateway = memory_gateway().await?;

        let result = gateway
            .run_atomic(vec![
                insert_motorcycle(&gateway, "Honda125"),
                insert_motorcycle(&gateway, "Honda125"),
            ])
            .await;
        assert!(result.is_err());
        assert_eq!(count(&gateway, "motorcycles").await?, 0);

        let affected = gateway
            .run_atomic(vec![
                insert_motorcycle(&gateway, "Honda125"),
                insert_motorcycle(&gateway, "Yamaha"),
            ])
            .await?;
        assert_eq!(affected, vec![1, 1]);
        assert_eq!(count(&gateway, "motorcycles").await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() -> Result<()> {
        let dir = tempdir()?;
        let config = DatabaseConfig::sqlite_file(dir.path().join("ledger.db"));

        let gateway = Gateway::connect(&config).await?;
        gateway.update(insert_motorcycle(&gateway, "Honda125")).await?;
        gateway.connection().clone().close().await?;

        let reopened = Gateway::connect(&config).await?;
        assert_eq!(count(&reopened, "motorcycles").await?, 1);
        Ok(())
    }
}
