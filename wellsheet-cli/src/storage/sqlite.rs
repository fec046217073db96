//! sqlx-backed [`QueryExecutor`] over a single SQLite connection

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Connection, Row, Sqlite, Transaction, TypeInfo, ValueRef};

use super::{FailurePolicy, QueryExecutor, ResultRow, StorageError};
use crate::sheet::CellValue;

/// Opens connections to one database
#[derive(Debug, Clone)]
pub struct DatabaseConnector {
    database: String,
    policy: FailurePolicy,
}

impl DatabaseConnector {
    /// `database` is a file path, `:memory:`, or a full `sqlite:` URL
    pub fn new(database: impl Into<String>, policy: FailurePolicy) -> Self {
        Self {
            database: database.into(),
            policy,
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Open a connection. The caller owns it and must [`SqliteStorage::close`] it.
    pub async fn connect(&self) -> Result<SqliteStorage, StorageError> {
        let connect_err = |source| StorageError::Connect {
            database: self.database.clone(),
            source,
        };

        let options = if self.database == ":memory:" || self.database.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(&self.database).map_err(connect_err)?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database)
                .create_if_missing(true)
        };

        let conn = options.connect().await.map_err(connect_err)?;
        log::info!("Connected to database: {}", self.database);

        Ok(SqliteStorage {
            conn,
            policy: self.policy,
        })
    }
}

/// One open connection plus the failure policy it applies
pub struct SqliteStorage {
    conn: SqliteConnection,
    policy: FailurePolicy,
}

impl SqliteStorage {
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Close the connection, logging rather than returning close errors
    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            log::warn!("Failed to close database connection cleanly: {}", e);
        } else {
            log::debug!("Database connection closed");
        }
    }

    /// Apply the failure policy to a statement outcome
    fn settle<T>(&self, statement: &str, outcome: Result<T, StorageError>) -> Result<Option<T>, StorageError> {
        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(e) => match self.policy {
                FailurePolicy::Strict => Err(e),
                FailurePolicy::Lenient => {
                    log::warn!("Rolled back after failure, continuing: {}", e);
                    log::debug!("Failed statement: {}", statement.trim());
                    Ok(None)
                }
            },
        }
    }

    async fn fetch_in_transaction(&mut self, statement: &str) -> Result<Vec<ResultRow>, StorageError> {
        let mut tx = self
            .conn
            .begin()
            .await
            .map_err(|e| StorageError::statement(statement, e))?;

        let fetched = sqlx::query(statement)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| StorageError::statement(statement, e))
            .and_then(|rows| {
                rows.iter()
                    .map(decode_row)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| StorageError::statement(statement, e))
            });

        finish(tx, statement, fetched).await
    }

    async fn batch_in_transaction(
        &mut self,
        statement: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<u64, StorageError> {
        let expected = placeholder_count(statement);
        let mut tx = self
            .conn
            .begin()
            .await
            .map_err(|e| StorageError::statement(statement, e))?;

        let mut affected = 0;
        let mut outcome = Ok(());
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != expected {
                outcome = Err(StorageError::Arity {
                    row: idx,
                    expected,
                    found: row.len(),
                });
                break;
            }

            let query = row
                .iter()
                .fold(sqlx::query(statement), |query, cell| bind_cell(query, cell));
            match query.execute(&mut *tx).await {
                Ok(done) => affected += done.rows_affected(),
                Err(e) => {
                    outcome = Err(StorageError::statement(statement, e));
                    break;
                }
            }
        }

        finish(tx, statement, outcome.map(|()| affected)).await
    }
}

#[async_trait]
impl QueryExecutor for SqliteStorage {
    async fn execute(&mut self, statement: &str) -> Result<Option<Vec<ResultRow>>, StorageError> {
        log::debug!("Executing: {}", statement.trim());
        let outcome = self.fetch_in_transaction(statement).await;
        self.settle(statement, outcome)
    }

    async fn execute_batch(
        &mut self,
        statement: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<(), StorageError> {
        log::debug!("Executing for {} rows: {}", rows.len(), statement.trim());
        let outcome = self.batch_in_transaction(statement, rows).await;
        if let Some(affected) = self.settle(statement, outcome)? {
            log::debug!("{} rows affected", affected);
        }
        Ok(())
    }
}

/// Commit on success, roll back on failure
async fn finish<T>(
    tx: Transaction<'_, Sqlite>,
    statement: &str,
    outcome: Result<T, StorageError>,
) -> Result<T, StorageError> {
    match outcome {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| StorageError::statement(statement, e))?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                log::error!("Rollback failed: {}", rollback);
            }
            Err(e)
        }
    }
}

/// Number of `?` placeholders; our statements never carry `?` in literals
fn placeholder_count(statement: &str) -> usize {
    statement.matches('?').count()
}

fn bind_cell<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    cell: &CellValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match cell {
        CellValue::Empty => query.bind(None::<String>),
        CellValue::Int(v) => query.bind(*v),
        CellValue::Float(v) => query.bind(*v),
        CellValue::Text(s) => query.bind(s.clone()),
        CellValue::Bool(b) => query.bind(*b),
    }
}

/// Decode a row by the storage class SQLite reports for each value
fn decode_row(row: &SqliteRow) -> Result<ResultRow, sqlx::Error> {
    (0..row.len())
        .map(|idx| {
            let kind = {
                let raw = row.try_get_raw(idx)?;
                if raw.is_null() {
                    return Ok(CellValue::Empty);
                }
                raw.type_info().name().to_string()
            };

            Ok(match kind.as_str() {
                "INTEGER" => CellValue::Int(row.try_get::<i64, _>(idx)?),
                "REAL" => CellValue::Float(row.try_get::<f64, _>(idx)?),
                "BLOB" => {
                    let bytes: Vec<u8> = row.try_get(idx)?;
                    CellValue::Text(String::from_utf8_lossy(&bytes).into_owned())
                }
                _ => CellValue::Text(row.try_get::<String, _>(idx)?),
            })
        })
        .collect()
}
