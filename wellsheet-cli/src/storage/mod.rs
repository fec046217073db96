//! SQLite storage for the well measurement table
//!
//! Every statement runs in its own transaction. What happens when one fails
//! is decided by the [`FailurePolicy`]: the default swallows the error after
//! rolling back, so a bad statement does not abort the rest of a load.

pub mod queries;
pub mod sqlite;

pub use queries::{TablePlan, TotalsPlan};
pub use sqlite::DatabaseConnector;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::sheet::CellValue;

/// A result row, one value per selected column
pub type ResultRow = Vec<CellValue>;

/// How statement failures are surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Roll back, log and carry on
    #[default]
    Lenient,
    /// Roll back and return the error
    Strict,
}

/// Anything that can run SQL statements for a load
#[async_trait]
pub trait QueryExecutor: Send {
    /// Run one statement and return its rows.
    ///
    /// `Ok(None)` means the statement failed and the failure policy
    /// swallowed the error.
    async fn execute(&mut self, statement: &str) -> Result<Option<Vec<ResultRow>>, StorageError>;

    /// Run one parameterized statement for every row, in a single transaction
    async fn execute_batch(
        &mut self,
        statement: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<(), StorageError>;
}

/// Error talking to the database
#[derive(Debug)]
pub enum StorageError {
    /// Opening the database failed
    Connect { database: String, source: sqlx::Error },
    /// A statement (or its transaction) failed
    Statement { statement: String, source: sqlx::Error },
    /// A batch row does not match the statement's placeholders
    Arity {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl StorageError {
    pub(crate) fn statement(statement: &str, source: sqlx::Error) -> Self {
        StorageError::Statement {
            statement: statement.trim().to_string(),
            source,
        }
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Connect { database, source } => {
                write!(f, "Failed to open database '{}': {}", database, source)
            }
            StorageError::Statement { statement, source } => {
                write!(f, "Statement failed ({}): {}", source, statement)
            }
            StorageError::Arity {
                row,
                expected,
                found,
            } => write!(
                f,
                "Row {} has {} values but the statement expects {}",
                row, found, expected
            ),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Connect { source, .. } | StorageError::Statement { source, .. } => {
                Some(source)
            }
            StorageError::Arity { .. } => None,
        }
    }
}
