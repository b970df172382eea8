use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

/// Every failure a dataset adapter or the manifest filter can report.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Bad construction arguments (unknown mode, conflicting transforms, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest line or row that cannot be interpreted. `line` is 1-based.
    #[error("malformed manifest {path} at line {line}: {msg}")]
    ManifestParse {
        path: PathBuf,
        line: u64,
        msg: String,
    },

    #[error("csv error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("image decode error at {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Longest-section selection found no text-valued section.
    #[error("caption at index {index} has no text sections")]
    EmptyCaption { index: usize },

    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        DatasetError::Csv {
            path: path.into(),
            source,
        }
    }
}
