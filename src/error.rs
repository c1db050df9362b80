//! Domain errors raised while reading tables and building the layout index.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to access {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to process delimited table {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("column '{column}' missing from {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("malformed position list in column '{column}' on line {line}: {value:?}")]
    StructuredFieldParse {
        line: u64,
        column: String,
        value: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line} of {} has {fields} cells but the header has {columns}", .path.display())]
    RaggedRow {
        path: PathBuf,
        line: u64,
        fields: usize,
        columns: usize,
    },

    #[error("alias '{alias}' declared on line {first_line} is redeclared on line {second_line}")]
    AliasCollision {
        alias: String,
        first_line: u64,
        second_line: u64,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;
