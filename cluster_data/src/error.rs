use std::path::PathBuf;

use crate::ClusterId;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failed to rename cluster {label}: {message}")]
    Evaluation { label: ClusterId, message: String },
    #[error("column '{0}' does not exist")]
    MissingColumn(String),
    #[error("file '{}' already exists", .0.display())]
    FileExists(PathBuf),
    #[error("not overwriting '{}'", .0.display())]
    OverwriteDeclined(PathBuf),
    #[error("i/o error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("cannot parse '{value}' in column '{column}', row {row}")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
