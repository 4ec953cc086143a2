use crate::Error;
use std::{
    fmt::{self, Display, Formatter},
    sync::Arc,
};
use thiserror::Error;

/// An execution error shared by every accessor of a failed result.
#[derive(Debug, Clone)]
pub struct SharedError(Arc<Error>);

impl SharedError {
    pub fn new(error: Error) -> Self {
        Self(Arc::new(error))
    }
    pub fn inner(&self) -> &Error {
        &self.0
    }
    /// Whether both handles refer to the same original error.
    pub fn ptr_eq(&self, other: &SharedError) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Display for SharedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.0)
    }
}

impl std::error::Error for SharedError {}

/// Absent data and failed executions reported by [`crate::RowResult`].
#[derive(Debug, Clone, Error)]
pub enum RowError {
    #[error("The result contains no rows")]
    NoRows,
    #[error("Column `{0}` is not present in the result")]
    MissingColumn(String),
    #[error("Column `{0}` is NULL, read it as an Option to accept it")]
    NullValue(String),
    #[error("Row {index} is out of range, the result has {size} rows")]
    RowOutOfRange { index: usize, size: usize },
    #[error("Expected {expected} values in the row, found {found}")]
    ColumnCount { expected: usize, found: usize },
    #[error("The statement failed: {0}")]
    Execution(SharedError),
}

/// Invalid record declarations detected while deriving a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Table `{table}` declares more than one primary key: {columns:?}")]
    MultiplePrimaryKeys {
        table: &'static str,
        columns: Vec<&'static str>,
    },
    #[error("Table `{table}` declares column `{column}` more than once")]
    DuplicateColumn {
        table: &'static str,
        column: &'static str,
    },
}
