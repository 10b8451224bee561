//! # EDF recording loader
//!
//! Loads EDF/EDF+ biosignal recordings into memory, separating the
//! electrophysiological channels (EXG: EMG, EEG, EOG, EKG/ECG) from the
//! accelerometer (IMU) channels so that each stream keeps its own sampling
//! rate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use edfrecording::Recording;
//!
//! fn main() -> std::result::Result<(), edfrecording::RecordingError> {
//!     let rec = Recording::open("/data/session1/subject01.edf")?;
//!
//!     // A file that could not be decoded is still returned, without data
//!     let Some(data) = rec.data() else {
//!         eprintln!("{} could not be decoded", rec.filename());
//!         return Ok(());
//!     };
//!
//!     println!("EXG: {:?} @ {} Hz", data.exg.data.dim(), data.exg.sampling_rate);
//!     if let Some(imu) = &data.imu {
//!         println!("IMU: {:?} @ {} Hz", imu.data.dim(), imu.sampling_rate);
//!     }
//!     println!("montage: {:?}, DAU: {:?}, app: {:?}", rec.montage(), rec.dau(), rec.app_ver());
//!
//!     for (onset, description) in &data.annotations {
//!         println!("{onset:>8.3}s  {description}");
//!     }
//!
//!     let emg = rec.get_channels("EMG")?;
//!     println!("EMG columns: {:?}", emg);
//!     Ok(())
//! }
//! ```
//!
//! ## Annotation formats
//!
//! Files written after the acquisition pipeline update carry three metadata
//! annotations (`montageSku: `, `DAU No.: `, `App version: `) and an
//! accelerometer stream sampled at its own rate. Older files carry neither;
//! they load as a single EXG stream with [`EdfFormat::Old`].
//!
//! ## Units
//!
//! Decoded samples are converted to volts from each signal's physical
//! dimension and then multiplied by 1e6, so EXG data is in microvolts.

pub mod error;
pub mod types;
pub mod utils;
pub mod reader;
pub mod decoder;
pub mod location;
pub mod metadata;
pub mod channels;
pub mod config;
pub mod recording;

// Re-export main types for convenience
pub use error::{EdfError, RecordingError, Result};
pub use types::{EdfHeader, FileType, SignalParam, Annotation};
pub use reader::EdfReader;
pub use decoder::{Decoder, EdfDecoder, DecodedEdf, DecodedChannel, Stream};
pub use location::Location;
pub use metadata::EdfFormat;
pub use channels::Modality;
pub use config::LoaderConfig;
pub use recording::{LoadState, Recording, RecordingData, RecordingLoader};

// Important constants
pub const EDFLIB_TIME_DIMENSION: i64 = 10_000_000; // 100 nanoseconds unit
pub const EDFLIB_MAXSIGNALS: usize = 4096;
pub const EDFLIB_ANNOTATION_LABEL: &str = "EDF Annotations";

/// Label of placeholder channels that are never decoded
pub const EXCLUDED_CHANNEL_LABEL: &str = "N.A";
/// Substrings marking system bookkeeping annotations
pub const IGNORED_EVENT_MARKERS: &[&str] = &["File started", "Change mode"];
pub const IMU_CHANNEL_MARKER: &str = "Accelerometer";
pub const MONTAGE_PREFIX: &str = "montageSku: ";
pub const DAU_PREFIX: &str = "DAU No.: ";
pub const APP_VERSION_PREFIX: &str = "App version: ";
/// Volts to microvolts
pub const MICROVOLT_SCALE: f64 = 1e6;

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
