//! Decoding seam between the recording loader and the EDF reader.
//!
//! The loader only relies on [`Decoder::decode`]: open a file, leave out the
//! channels named in `exclude`, and hand back per-channel samples in volts
//! together with the file's annotations.

use std::path::Path;

use chrono::NaiveDateTime;
use ndarray::{Array1, Array2};

use crate::error::{EdfError, Result};
use crate::reader::EdfReader;
use crate::types::Annotation;
use crate::utils::unit_scale;

/// Anything that can decode an EDF file into channels and annotations.
pub trait Decoder {
    fn decode(&self, path: &Path, exclude: &[String]) -> Result<DecodedEdf>;
}

impl<D: Decoder + ?Sized> Decoder for &D {
    fn decode(&self, path: &Path, exclude: &[String]) -> Result<DecodedEdf> {
        (**self).decode(path, exclude)
    }
}

/// [`Decoder`] backed by [`EdfReader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EdfDecoder;

impl Decoder for EdfDecoder {
    fn decode(&self, path: &Path, exclude: &[String]) -> Result<DecodedEdf> {
        let mut reader = EdfReader::open(path)?;
        let header = reader.header().clone();

        let mut channels = Vec::new();
        for (i, signal) in header.signals.iter().enumerate() {
            if exclude.iter().any(|name| *name == signal.label) {
                continue;
            }

            let to_volts = unit_scale(&signal.physical_dimension);
            let samples = reader
                .read_signal(i)?
                .into_iter()
                .map(|v| v * to_volts)
                .collect();

            channels.push(DecodedChannel {
                name: signal.label.clone(),
                sample_rate: signal.sample_rate(header.datarecord_duration),
                samples,
            });
        }

        Ok(DecodedEdf {
            channels,
            annotations: reader.annotations().to_vec(),
            start: header.start_datetime(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedChannel {
    pub name: String,
    /// Hz
    pub sample_rate: f64,
    /// Physical values in volts (non-voltage units are left as stored)
    pub samples: Vec<f64>,
}

/// Result of one decode call.
#[derive(Debug, Clone, Default)]
pub struct DecodedEdf {
    pub channels: Vec<DecodedChannel>,
    pub annotations: Vec<Annotation>,
    pub start: Option<NaiveDateTime>,
}

impl DecodedEdf {
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|ch| ch.name.clone()).collect()
    }

    /// `(onset_seconds, description)` pairs in file order.
    pub fn events(&self) -> Vec<(f64, String)> {
        self.annotations
            .iter()
            .map(|a| (a.onset_seconds(), a.description.clone()))
            .collect()
    }

    /// Assembles the decoded channels into one uniformly sampled stream,
    /// multiplying every sample by `scale`.
    ///
    /// Fails with [`EdfError::MixedSamplingRates`] when the channels do not
    /// share a sampling rate, and with [`EdfError::NoSignals`] when nothing
    /// is left to assemble.
    pub fn to_stream(&self, scale: f64) -> Result<Stream> {
        let first = self.channels.first().ok_or(EdfError::NoSignals)?;
        let sampling_rate = first.sample_rate;

        if self.channels.iter().any(|ch| ch.sample_rate != sampling_rate) {
            let mut rates: Vec<f64> = Vec::new();
            for ch in &self.channels {
                if !rates.contains(&ch.sample_rate) {
                    rates.push(ch.sample_rate);
                }
            }
            return Err(EdfError::MixedSamplingRates(rates));
        }

        // 同一采样率下各通道样本数应一致，以最短者为准
        let n_samples = self.channels.iter().map(|ch| ch.samples.len()).min().unwrap_or(0);
        let data = Array2::from_shape_fn((n_samples, self.channels.len()), |(row, col)| {
            self.channels[col].samples[row] * scale
        });
        let times = Array1::from_iter((0..n_samples).map(|i| i as f64 / sampling_rate));

        Ok(Stream {
            data,
            times,
            sampling_rate,
            channel_names: self.channel_names(),
        })
    }
}

/// A uniformly sampled block of channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    /// rows = samples, columns = channels
    pub data: Array2<f64>,
    /// seconds since recording start, one entry per row of `data`
    pub times: Array1<f64>,
    pub sampling_rate: f64,
    pub channel_names: Vec<String>,
}

impl Stream {
    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_channels(&self) -> usize {
        self.data.ncols()
    }
}
