use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::EDFLIB_TIME_DIMENSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Plain EDF, no annotation channel required
    Edf,
    /// EDF+C (continuous)
    EdfPlusContinuous,
    /// EDF+D (discontinuous)
    EdfPlusDiscontinuous,
}

#[derive(Debug, Clone)]
pub struct SignalParam {
    pub label: String,
    pub samples_in_file: i64,
    pub physical_max: f64,
    pub physical_min: f64,
    pub digital_max: i32,
    pub digital_min: i32,
    pub samples_per_record: i32,
    pub physical_dimension: String,
    pub prefilter: String,
    pub transducer: String,
}

impl SignalParam {
    /// 计算物理值转换参数
    pub fn bit_value(&self) -> f64 {
        (self.physical_max - self.physical_min) /
        (self.digital_max - self.digital_min) as f64
    }

    /// 计算偏移量
    pub fn offset(&self) -> f64 {
        self.physical_max / self.bit_value() - self.digital_max as f64
    }

    /// 将数字值转换为物理值
    pub fn to_physical(&self, digital_value: i32) -> f64 {
        self.bit_value() * (self.offset() + digital_value as f64)
    }

    /// Sampling rate in Hz given the data record duration (100 ns units).
    pub fn sample_rate(&self, datarecord_duration: i64) -> f64 {
        self.samples_per_record as f64 * EDFLIB_TIME_DIMENSION as f64 / datarecord_duration as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub onset: i64,           // 开始时间（100纳秒为单位）
    pub duration: i64,        // 持续时间（100纳秒为单位，-1表示未知）
    pub description: String,  // UTF-8描述
}

impl Annotation {
    pub fn onset_seconds(&self) -> f64 {
        self.onset as f64 / EDFLIB_TIME_DIMENSION as f64
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        (self.duration >= 0).then(|| self.duration as f64 / EDFLIB_TIME_DIMENSION as f64)
    }
}

#[derive(Debug, Clone)]
pub struct EdfHeader {
    pub file_type: FileType,
    /// Ordinary signals only, annotation channels are kept out of this list
    pub signals: Vec<SignalParam>,
    pub file_duration: i64,           // 文件持续时间（100纳秒为单位）
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub datarecords_in_file: i64,
    pub datarecord_duration: i64,     // 数据记录持续时间（100纳秒为单位）
    pub patient: String,
    pub recording: String,
}

impl EdfHeader {
    pub fn start_datetime(&self) -> Option<NaiveDateTime> {
        Some(NaiveDateTime::new(self.start_date?, self.start_time?))
    }

    pub fn is_edfplus(&self) -> bool {
        self.file_type != FileType::Edf
    }
}
