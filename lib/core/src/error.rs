use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Row count mismatch: {matrix} matrix has {rows} rows, catalog has {items} items")]
    RowMismatch {
        matrix: &'static str,
        rows: usize,
        items: usize,
    },

    #[error("Catalog unreadable: {0}")]
    CatalogUnreadable(String),

    #[error("Inference backend error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
