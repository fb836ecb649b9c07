//! Input-file errors. Commands wrap these in `anyhow` with file context.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{dataset} export has no header row after skipping {skipped} preamble row(s)")]
    MissingHeader { dataset: String, skipped: usize },

    #[error("{dataset} export has no data rows")]
    Empty { dataset: String },

    #[error("{table} is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("workbook {workbook} has no sheet named '{sheet}'")]
    MissingSheet { workbook: String, sheet: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Workbook(#[from] calamine::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
