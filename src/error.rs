use sea_orm::DbErr;
use thiserror::Error;
use tracing::warn;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("motorcycle `{0}` not found")]
    MotorcycleNotFound(String),

    #[error("sale #{0} not found")]
    SaleNotFound(i32),

    #[error("insufficient stock for `{name}`: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: i32,
        available: i32,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store failure: {0}")]
    Store(#[from] DbErr),
}

/// Collapses a ledger result into the plain flag/empty surface used by simple
/// callers. The error is logged before it is dropped.
pub trait Outcome<T> {
    fn succeeded(self) -> bool;

    fn or_empty(self) -> T
    where
        T: Default;
}

impl<T> Outcome<T> for Result<T> {
    fn succeeded(self) -> bool {
        match self {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "ledger operation failed");
                false
            }
        }
    }

    fn or_empty(self) -> T
    where
        T: Default,
    {
        self.unwrap_or_else(|err| {
            warn!(error = %err, "ledger query failed");
            T::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded_flags() {
        let ok: Result<i32> = Ok(1);
        assert!(ok.succeeded());

        let err: Result<i32> = Err(LedgerError::MotorcycleNotFound("Yamaha".into()));
        assert!(!err.succeeded());
    }

    #[test]
    fn test_or_empty_discards_errors() {
        let rows: Result<Vec<i32>> = Err(DbErr::Custom("disk full".into()).into());
        assert!(rows.or_empty().is_empty());

        let rows: Result<Vec<i32>> = Ok(vec![1, 2]);
        assert_eq!(rows.or_empty(), vec![1, 2]);
    }

    #[test]
    fn test_error_messages() {
        let err = LedgerError::InsufficientStock {
            name: "Honda125".into(),
            requested: 10,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for `Honda125`: requested 10, available 3"
        );
        assert_eq!(LedgerError::SaleNotFound(4).to_string(), "sale #4 not found");
    }
}
