use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    #[error("failed to read maze from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("maze header is missing `{0}`")]
    MissingHeader(&'static str),

    #[error("maze header field `{field}` must be a positive integer up to i32::MAX, got {value:?}")]
    InvalidHeader { field: &'static str, value: String },

    #[error("maze has {found} cells, expected {expected}")]
    Truncated { expected: usize, found: usize },
}
