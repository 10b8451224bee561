// Writes small EDF / EDF+ files for the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub struct FixtureSignal {
    pub label: String,
    pub physical_dimension: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i32,
    pub digital_max: i32,
    pub samples_per_record: usize,
    /// physical values, `samples_per_record * records` of them
    pub samples: Vec<f64>,
}

impl FixtureSignal {
    /// ±3276.7 uV over the full 16-bit range, 0.1 uV per step
    pub fn exg(label: &str, samples_per_record: usize, records: usize, value: impl Fn(usize) -> f64) -> Self {
        FixtureSignal {
            label: label.to_string(),
            physical_dimension: "uV".to_string(),
            physical_min: -3276.8,
            physical_max: 3276.7,
            digital_min: -32768,
            digital_max: 32767,
            samples_per_record,
            samples: (0..samples_per_record * records).map(value).collect(),
        }
    }

    /// ±8 g accelerometer channel
    pub fn accel(label: &str, samples_per_record: usize, records: usize, value: impl Fn(usize) -> f64) -> Self {
        FixtureSignal {
            label: label.to_string(),
            physical_dimension: "g".to_string(),
            physical_min: -8.0,
            physical_max: 8.0,
            digital_min: -32768,
            digital_max: 32767,
            samples_per_record,
            samples: (0..samples_per_record * records).map(value).collect(),
        }
    }

    fn to_digital(&self, physical: f64) -> i16 {
        let bit_value = (self.physical_max - self.physical_min) / (self.digital_max - self.digital_min) as f64;
        let offset = self.physical_max / bit_value - self.digital_max as f64;
        let digital = (physical / bit_value - offset).round() as i32;
        digital.clamp(self.digital_min, self.digital_max) as i16
    }
}

pub struct Fixture {
    pub signals: Vec<FixtureSignal>,
    /// (onset seconds, description), placed in the data record covering the onset
    pub annotations: Vec<(f64, String)>,
    pub records: usize,
    pub edf_plus: bool,
    /// overrides the data record count field
    pub record_count_field: Option<String>,
}

impl Fixture {
    pub fn new(records: usize) -> Self {
        Fixture {
            signals: Vec::new(),
            annotations: Vec::new(),
            records,
            edf_plus: true,
            record_count_field: None,
        }
    }

    pub fn signal(mut self, signal: FixtureSignal) -> Self {
        self.signals.push(signal);
        self
    }

    pub fn annotation(mut self, onset: f64, description: &str) -> Self {
        self.annotations.push((onset, description.to_string()));
        self
    }

    pub fn plain_edf(mut self) -> Self {
        self.edf_plus = false;
        self
    }

    pub fn unknown_record_count(self) -> Self {
        self.record_count_field("-1")
    }

    pub fn record_count_field(mut self, value: &str) -> Self {
        self.record_count_field = Some(value.to_string());
        self
    }

    fn tal_blocks(&self) -> Vec<Vec<u8>> {
        (0..self.records)
            .map(|record| {
                let mut tal = format!("+{}\x14\x14\x00", record).into_bytes();
                for (onset, description) in &self.annotations {
                    let covering = (onset.max(0.0).floor() as usize).min(self.records - 1);
                    if covering == record {
                        let sign = if *onset < 0.0 { "-" } else { "+" };
                        tal.extend_from_slice(format!("{}{}\x14{}\x14\x00", sign, onset.abs(), description).as_bytes());
                    }
                }
                tal
            })
            .collect()
    }

    pub fn write(&self, path: impl AsRef<Path>) {
        let tal_blocks = if self.edf_plus { self.tal_blocks() } else { Vec::new() };
        let tal_bytes = tal_blocks.iter().map(Vec::len).max().unwrap_or(0);
        let tal_samples = (tal_bytes + 1) / 2;

        let total_signals = self.signals.len() + usize::from(self.edf_plus);
        let header_size = (total_signals + 1) * 256;

        let mut out = Vec::new();
        out.extend(field("0", 8));
        out.extend(field("X X X X", 80));
        out.extend(field("Startdate 01-FEB-2021 X X X", 80));
        out.extend(field("01.02.21", 8));
        out.extend(field("10.30.00", 8));
        out.extend(field(&header_size.to_string(), 8));
        out.extend(field(if self.edf_plus { "EDF+C" } else { "" }, 44));
        let record_count = self.record_count_field.clone().unwrap_or_else(|| self.records.to_string());
        out.extend(field(&record_count, 8));
        out.extend(field("1", 8));
        out.extend(field(&total_signals.to_string(), 4));

        // (label, dimension, pmin, pmax, dmin, dmax, samples per record)
        let mut params: Vec<(String, String, String, String, String, String, String)> = self
            .signals
            .iter()
            .map(|s| {
                (
                    s.label.clone(),
                    s.physical_dimension.clone(),
                    s.physical_min.to_string(),
                    s.physical_max.to_string(),
                    s.digital_min.to_string(),
                    s.digital_max.to_string(),
                    s.samples_per_record.to_string(),
                )
            })
            .collect();
        if self.edf_plus {
            params.push((
                "EDF Annotations".to_string(),
                String::new(),
                "-1".to_string(),
                "1".to_string(),
                "-32768".to_string(),
                "32767".to_string(),
                tal_samples.to_string(),
            ));
        }

        for p in &params { out.extend(field(&p.0, 16)); }
        for _ in &params { out.extend(field("", 80)); }
        for p in &params { out.extend(field(&p.1, 8)); }
        for p in &params { out.extend(field(&p.2, 8)); }
        for p in &params { out.extend(field(&p.3, 8)); }
        for p in &params { out.extend(field(&p.4, 8)); }
        for p in &params { out.extend(field(&p.5, 8)); }
        for _ in &params { out.extend(field("", 80)); }
        for p in &params { out.extend(field(&p.6, 8)); }
        for _ in &params { out.extend(field("", 32)); }
        assert_eq!(out.len(), header_size);

        for record in 0..self.records {
            for signal in &self.signals {
                let start = record * signal.samples_per_record;
                for &value in &signal.samples[start..start + signal.samples_per_record] {
                    out.extend_from_slice(&signal.to_digital(value).to_le_bytes());
                }
            }
            if self.edf_plus {
                let mut block = tal_blocks[record].clone();
                block.resize(tal_samples * 2, 0);
                out.extend(block);
            }
        }

        fs::write(path, out).unwrap();
    }
}

fn field(value: &str, width: usize) -> Vec<u8> {
    let mut bytes = value.as_bytes().to_vec();
    bytes.truncate(width);
    bytes.resize(width, b' ');
    bytes
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
