//! The loaded recording and the loader that builds it.

use std::path::Path;

use chrono::NaiveDateTime;
use ndarray::{Array1, Array2};

use crate::channels::{channel_indices, Modality};
use crate::config::LoaderConfig;
use crate::decoder::{Decoder, EdfDecoder, Stream};
use crate::error::{EdfError, RecordingError};
use crate::location::Location;
use crate::metadata::{detect_format, filter_events, EdfFormat};

/// Everything read from a successfully decoded file.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingData {
    /// Electrode channels, microvolts
    pub exg: Stream,
    /// Accelerometer channels; only present in the new annotation format
    pub imu: Option<Stream>,
    /// `(onset_seconds, description)` of user events
    pub annotations: Vec<(f64, String)>,
    pub format: EdfFormat,
    pub start: Option<NaiveDateTime>,
}

/// Whether decoding succeeded. A failed decode is logged and leaves the
/// recording `Unloaded`.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Unloaded,
    Loaded(Box<RecordingData>),
}

/// An EDF recording split into EXG and IMU streams.
///
/// ```no_run
/// use edfrecording::Recording;
///
/// let rec = Recording::open_in("/data/session1", "subject01.edf")?;
/// if let Some(data) = rec.data() {
///     let eeg = rec.get_channels("eeg")?;
///     println!("{} EEG channels at {} Hz", eeg.len(), data.exg.sampling_rate);
/// }
/// # Ok::<(), edfrecording::RecordingError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    location: Location,
    state: LoadState,
}

impl Recording {
    /// Loads the file at `path` with the default loader.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RecordingError> {
        RecordingLoader::new().load(path, None)
    }

    /// Loads `name` from directory `dir` (or `dir` itself if it already ends in `name`).
    pub fn open_in(dir: impl AsRef<Path>, name: &str) -> Result<Self, RecordingError> {
        RecordingLoader::new().load(dir, Some(name))
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn filepath(&self) -> &Path {
        self.location.filepath()
    }

    pub fn filename(&self) -> &str {
        self.location.filename()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, LoadState::Loaded(_))
    }

    pub fn data(&self) -> Option<&RecordingData> {
        match &self.state {
            LoadState::Loaded(data) => Some(data.as_ref()),
            LoadState::Unloaded => None,
        }
    }

    pub fn data_exg(&self) -> Option<&Array2<f64>> {
        self.data().map(|d| &d.exg.data)
    }

    pub fn ts_exg(&self) -> Option<&Array1<f64>> {
        self.data().map(|d| &d.exg.times)
    }

    pub fn fs_exg(&self) -> Option<f64> {
        self.data().map(|d| d.exg.sampling_rate)
    }

    pub fn ch_names_exg(&self) -> Option<&[String]> {
        self.data().map(|d| d.exg.channel_names.as_slice())
    }

    fn imu(&self) -> Option<&Stream> {
        self.data().and_then(|d| d.imu.as_ref())
    }

    pub fn data_imu(&self) -> Option<&Array2<f64>> {
        self.imu().map(|s| &s.data)
    }

    pub fn ts_imu(&self) -> Option<&Array1<f64>> {
        self.imu().map(|s| &s.times)
    }

    pub fn fs_imu(&self) -> Option<f64> {
        self.imu().map(|s| s.sampling_rate)
    }

    pub fn ch_names_imu(&self) -> Option<&[String]> {
        self.imu().map(|s| s.channel_names.as_slice())
    }

    pub fn annotations(&self) -> Option<&[(f64, String)]> {
        self.data().map(|d| d.annotations.as_slice())
    }

    fn format(&self) -> Option<(&str, &str, &str)> {
        match self.data().map(|d| &d.format) {
            Some(EdfFormat::New { montage, dau, app_ver }) => {
                Some((montage.as_str(), dau.as_str(), app_ver.as_str()))
            }
            _ => None,
        }
    }

    pub fn montage(&self) -> Option<&str> {
        self.format().map(|(montage, _, _)| montage)
    }

    pub fn dau(&self) -> Option<&str> {
        self.format().map(|(_, dau, _)| dau)
    }

    pub fn app_ver(&self) -> Option<&str> {
        self.format().map(|(_, _, app_ver)| app_ver)
    }

    /// Column indices of `data_exg` whose channel belongs to `subset`
    /// (`EMG`, `EEG`, `EOG`, `EKG`/`ECG`; case-insensitive).
    pub fn get_channels(&self, subset: &str) -> Result<Vec<usize>, RecordingError> {
        let modality: Modality = subset.parse()?;
        let names = self.ch_names_exg().ok_or(RecordingError::NotLoaded)?;
        Ok(channel_indices(names, modality))
    }
}

/// Builds [`Recording`]s with a given decoder and configuration.
#[derive(Debug, Clone, Default)]
pub struct RecordingLoader<D = EdfDecoder> {
    decoder: D,
    config: LoaderConfig,
}

impl RecordingLoader<EdfDecoder> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: Decoder> RecordingLoader<D> {
    pub fn with_decoder(decoder: D) -> Self {
        RecordingLoader { decoder, config: LoaderConfig::default() }
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Resolves the location and decodes the file.
    ///
    /// Only an unresolvable location is an error; a file that fails to
    /// decode is logged and yields an `Unloaded` recording.
    pub fn load(&self, path: impl AsRef<Path>, name: Option<&str>) -> Result<Recording, RecordingError> {
        let location = Location::resolve(path, name)?;

        let state = match self.read(location.filepath()) {
            Ok(data) => LoadState::Loaded(Box::new(data)),
            Err(e) => {
                log::error!("Failed to parse EDF file {}: {}", location.filepath().display(), e);
                LoadState::Unloaded
            }
        };

        Ok(Recording { location, state })
    }

    /// Like [`load`](Self::load) but decode failures are returned as
    /// [`RecordingError::Decode`].
    pub fn try_load(&self, path: impl AsRef<Path>, name: Option<&str>) -> Result<Recording, RecordingError> {
        let location = Location::resolve(path, name)?;
        let data = self.read(location.filepath())?;
        Ok(Recording { location, state: LoadState::Loaded(Box::new(data)) })
    }

    fn read(&self, path: &Path) -> Result<RecordingData, EdfError> {
        let config = &self.config;
        let decoded = self.decoder.decode(path, &config.excluded_channels)?;

        let annotations = filter_events(&decoded.events(), config);
        let format = detect_format(decoded.annotations.iter().map(|a| a.description.as_str()), config);

        let (exg, imu) = if format.is_new() {
            // 分别解码 EXG 与 IMU，避免不同采样率被统一重采样
            let (imu_names, exg_names): (Vec<String>, Vec<String>) = decoded
                .channel_names()
                .into_iter()
                .partition(|name| config.is_imu_channel(name));

            let exclude = |names: &[String]| -> Vec<String> {
                config.excluded_channels.iter().chain(names).cloned().collect()
            };

            let exg = self
                .decoder
                .decode(path, &exclude(imu_names.as_slice()))?
                .to_stream(config.amplitude_scale)?;

            let imu = if imu_names.is_empty() {
                log::warn!("{}: new annotation format but no IMU channels", path.display());
                None
            } else {
                let stream = self
                    .decoder
                    .decode(path, &exclude(exg_names.as_slice()))?
                    .to_stream(config.amplitude_scale)?;
                Some(stream)
            };

            (exg, imu)
        } else {
            (decoded.to_stream(config.amplitude_scale)?, None)
        };

        log::info!(
            "Loaded {} ({} format): EXG {}x{} @ {} Hz, IMU {}, {} events",
            path.display(),
            if format.is_new() { "new" } else { "old" },
            exg.n_samples(),
            exg.n_channels(),
            exg.sampling_rate,
            imu.as_ref()
                .map(|s| format!("{}x{} @ {} Hz", s.n_samples(), s.n_channels(), s.sampling_rate))
                .unwrap_or_else(|| "none".to_string()),
            annotations.len()
        );

        Ok(RecordingData {
            exg,
            imu,
            annotations,
            format,
            start: decoded.start,
        })
    }
}
