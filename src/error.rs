use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parquet read failed: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow conversion failed: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Keyword matcher failed to compile: {0}")]
    Regex(#[from] regex::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Table '{table}' row {row} has {found} cells, expected {expected}")]
    RowWidth {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Failed to load '{}': {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<ExportError>,
    },
}

impl ExportError {
    /// Wraps an error raised while reading a source table with the offending path.
    pub fn load(path: impl Into<PathBuf>, source: ExportError) -> Self {
        ExportError::Load {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
