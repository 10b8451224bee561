use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while decoding an EDF/EDF+ file.
#[derive(Debug, Error)]
pub enum EdfError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Signal index {0} out of range")]
    InvalidSignalIndex(usize),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Invalid header size")]
    InvalidHeader,

    #[error("Invalid number of signals: {0}")]
    InvalidSignalCount(i32),

    #[error("Physical min equals physical max")]
    PhysicalMinEqualsMax,

    #[error("Digital min equals digital max")]
    DigitalMinEqualsMax,

    #[error("Channels sampled at different rates ({0:?} Hz), cannot build a single stream")]
    MixedSamplingRates(Vec<f64>),

    #[error("No signals left to decode")]
    NoSignals,
}

pub type Result<T> = std::result::Result<T, EdfError>;

/// Errors surfaced by [`crate::Recording`] construction and queries.
#[derive(Debug, Error)]
pub enum RecordingError {
    #[error(
        "{} must be the parent directory of {name:?} or the full path to it",
        path.display()
    )]
    InvalidLocation { path: PathBuf, name: Option<String> },

    #[error("Subset {subset} not valid. Must be in {valid:?}.")]
    UnsupportedModality {
        subset: String,
        valid: &'static [&'static str],
    },

    #[error("Recording has no loaded data")]
    NotLoaded,

    #[error("Failed to parse EDF file: {0}")]
    Decode(#[from] EdfError),
}
