use std::path::PathBuf;

use thiserror::Error;

/// Direction of a single-year cursor move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read dataset {path}: {source}")]
    DatasetLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset row at line {line}: {reason}")]
    DatasetParse { line: usize, reason: String },

    #[error("dataset has no data rows")]
    EmptyDataset,

    #[error("dataset loader thread panicked")]
    LoaderPanicked,

    #[error("year {0} not found in the dataset")]
    YearNotFound(i32),

    #[error("cannot move {direction} past year {year}")]
    YearOutOfRange { year: i32, direction: Direction },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("failed to read settings {path}: {source}")]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings parse error: {0}")]
    SettingsParse(#[from] serde_json::Error),

    #[error("failed to encode frame {frame}: {source}")]
    FrameEncode {
        frame: u64,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Whether the frame loop may continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::YearNotFound(_) | Error::YearOutOfRange { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
