use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use chrono::{NaiveDate, NaiveTime};

use crate::types::{EdfHeader, FileType, SignalParam, Annotation};
use crate::error::{EdfError, Result};
use crate::utils::{atoi_nonlocalized, atof_nonlocalized, parse_edf_time, parse_tal_block};
use crate::{EDFLIB_ANNOTATION_LABEL, EDFLIB_MAXSIGNALS};

/// EDF/EDF+ file reader
///
/// Opening a file parses the header and every TAL annotation list; sample
/// data is read on demand per signal. Annotation channels never appear in
/// [`EdfHeader::signals`].
///
/// ```no_run
/// use edfrecording::EdfReader;
///
/// let mut reader = EdfReader::open("recording.edf")?;
/// for (i, signal) in reader.header().signals.clone().iter().enumerate() {
///     let samples = reader.read_signal(i)?;
///     println!("{}: {} samples", signal.label, samples.len());
/// }
/// # Ok::<(), edfrecording::EdfError>(())
/// ```
pub struct EdfReader {
    file: BufReader<File>,
    header: EdfHeader,
    /// 每个普通信号在数据记录中的位置信息
    signal_info: Vec<SignalInfo>,
    /// 当前每个信号的样本位置指针
    sample_positions: Vec<i64>,
    /// 文件的头部大小
    header_size: usize,
    /// 每个数据记录的大小（字节）
    record_size: usize,
    annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Copy)]
struct SignalInfo {
    /// 信号在数据记录中的字节偏移
    buffer_offset: usize,
    samples_per_record: usize,
}

struct ParsedHeader {
    header: EdfHeader,
    signal_info: Vec<SignalInfo>,
    annotation_info: Vec<SignalInfo>,
    header_size: usize,
    record_size: usize,
}

impl EdfReader {
    /// Opens an EDF or EDF+ file, parsing its header and annotations.
    ///
    /// # Errors
    ///
    /// * `EdfError::FileNotFound` - File doesn't exist or can't be opened
    /// * `EdfError::UnsupportedFileType` - Version field is not `0`
    /// * `EdfError::InvalidHeader` - Header size field disagrees with the signal count
    /// * `EdfError::InvalidSignalCount` - Invalid number of signals
    /// * `EdfError::InvalidFormat` - Malformed numeric field or TAL
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)
            .map_err(|e| EdfError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;
        let file_len = file.metadata()?.len();

        let mut reader = BufReader::new(file);

        let parsed = Self::parse_header(&mut reader, file_len)?;
        let sample_positions = vec![0i64; parsed.header.signals.len()];

        let mut edf = EdfReader {
            file: reader,
            header: parsed.header,
            signal_info: parsed.signal_info,
            sample_positions,
            header_size: parsed.header_size,
            record_size: parsed.record_size,
            annotations: Vec::new(),
        };
        edf.annotations = edf.read_annotations(&parsed.annotation_info)?;

        log::debug!(
            "Opened {} ({:?}): {} signals, {} data records, {} annotations",
            path.as_ref().display(),
            edf.header.file_type,
            edf.header.signals.len(),
            edf.header.datarecords_in_file,
            edf.annotations.len()
        );

        Ok(edf)
    }

    pub fn header(&self) -> &EdfHeader {
        &self.header
    }

    /// Annotations of every annotation channel, in file order
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Reads the whole signal as physical values.
    pub fn read_signal(&mut self, signal: usize) -> Result<Vec<f64>> {
        self.rewind(signal)?;
        let count = self.header.signals[signal].samples_in_file.max(0) as usize;
        self.read_physical_samples(signal, count)
    }

    /// Reads up to `count` physical samples from the current position of `signal`.
    pub fn read_physical_samples(&mut self, signal: usize, count: usize) -> Result<Vec<f64>> {
        let digital_samples = self.read_digital_samples(signal, count)?;

        let signal_param = &self.header.signals[signal];
        let physical_samples = digital_samples
            .into_iter()
            .map(|d| signal_param.to_physical(d))
            .collect();

        Ok(physical_samples)
    }

    /// Reads up to `count` raw 16-bit samples, clamped to the signal's digital range.
    pub fn read_digital_samples(&mut self, signal: usize, count: usize) -> Result<Vec<i32>> {
        if signal >= self.header.signals.len() {
            return Err(EdfError::InvalidSignalIndex(signal));
        }

        if count == 0 {
            return Ok(Vec::new());
        }

        let signal_info = self.signal_info[signal];
        let signal_param = &self.header.signals[signal];
        let samples_per_record = signal_info.samples_per_record as i64;

        // 计算可读取的最大样本数
        let available_samples = (signal_param.samples_in_file - self.sample_positions[signal]).max(0) as usize;
        let actual_count = count.min(available_samples);

        let mut samples = Vec::with_capacity(actual_count);
        let mut buf = Vec::new();

        while samples.len() < actual_count {
            let current_pos = self.sample_positions[signal];
            let record_index = current_pos / samples_per_record;
            let sample_in_record = current_pos % samples_per_record;

            let file_offset = self.header_size as u64
                + record_index as u64 * self.record_size as u64
                + signal_info.buffer_offset as u64
                + sample_in_record as u64 * 2; // EDF每个样本2字节

            self.file.seek(SeekFrom::Start(file_offset))?;

            // 计算在当前记录中可以读取的样本数
            let samples_in_current_record = (samples_per_record - sample_in_record) as usize;
            let samples_to_read = (actual_count - samples.len()).min(samples_in_current_record);

            buf.resize(samples_to_read * 2, 0u8);
            self.file.read_exact(&mut buf)?;

            samples.extend(buf.chunks_exact(2).map(|pair| {
                // 转换为有符号16位整数（小端序）
                let digital_value = i16::from_le_bytes([pair[0], pair[1]]) as i32;
                digital_value
                    .max(signal_param.digital_min)
                    .min(signal_param.digital_max)
            }));

            self.sample_positions[signal] = current_pos + samples_to_read as i64;
        }

        Ok(samples)
    }

    /// 将指定信号的位置重置到开头
    pub fn rewind(&mut self, signal: usize) -> Result<()> {
        if signal >= self.header.signals.len() {
            return Err(EdfError::InvalidSignalIndex(signal));
        }
        self.sample_positions[signal] = 0;
        Ok(())
    }

    fn read_annotations(&mut self, annotation_info: &[SignalInfo]) -> Result<Vec<Annotation>> {
        let mut annotations = Vec::new();
        if annotation_info.is_empty() {
            return Ok(annotations);
        }

        let mut block = Vec::new();
        for record in 0..self.header.datarecords_in_file as u64 {
            for info in annotation_info {
                let offset = self.header_size as u64
                    + record * self.record_size as u64
                    + info.buffer_offset as u64;
                self.file.seek(SeekFrom::Start(offset))?;

                block.resize(info.samples_per_record * 2, 0u8);
                self.file.read_exact(&mut block)?;
                annotations.extend(parse_tal_block(&block)?);
            }
        }

        Ok(annotations)
    }

    /// 解析EDF/EDF+文件头部
    fn parse_header(reader: &mut BufReader<File>, file_len: u64) -> Result<ParsedHeader> {
        // 读取主头部（256字节）
        reader.seek(SeekFrom::Start(0))?;
        let mut main_header = vec![0u8; 256];
        reader.read_exact(&mut main_header)?;

        let version = String::from_utf8_lossy(&main_header[0..8]);
        if version.trim() != "0" {
            return Err(EdfError::UnsupportedFileType(format!("Not an EDF file: {:?}", version)));
        }

        // 解析信号数量
        let signals_str = String::from_utf8_lossy(&main_header[252..256]);
        let total_signal_count = atoi_nonlocalized(&signals_str);
        if total_signal_count < 1 || total_signal_count > EDFLIB_MAXSIGNALS as i32 {
            return Err(EdfError::InvalidSignalCount(total_signal_count));
        }

        // 验证头部大小
        let header_size_str = String::from_utf8_lossy(&main_header[184..192]);
        let expected_header_size = (total_signal_count + 1) * 256;
        if atoi_nonlocalized(&header_size_str) != expected_header_size {
            return Err(EdfError::InvalidHeader);
        }
        let header_size = expected_header_size as usize;

        let reserved = String::from_utf8_lossy(&main_header[192..236]);
        let file_type = if reserved.starts_with("EDF+C") {
            FileType::EdfPlusContinuous
        } else if reserved.starts_with("EDF+D") {
            FileType::EdfPlusDiscontinuous
        } else {
            FileType::Edf
        };

        let patient = String::from_utf8_lossy(&main_header[8..88]).trim().to_string();
        let recording = String::from_utf8_lossy(&main_header[88..168]).trim().to_string();

        let date_str = String::from_utf8_lossy(&main_header[168..176]);
        let time_str = String::from_utf8_lossy(&main_header[176..184]);
        let (start_date, start_time) = Self::parse_datetime(&date_str, &time_str);

        let duration_str = String::from_utf8_lossy(&main_header[244..252]);
        let datarecord_duration = parse_edf_time(&duration_str)?;
        if datarecord_duration < 0 {
            return Err(EdfError::InvalidFormat(format!("Negative data record duration {:?}", duration_str)));
        }

        // 读取信号头部信息
        let signal_header_size = total_signal_count as usize * 256;
        let mut signal_header = vec![0u8; signal_header_size];
        reader.read_exact(&mut signal_header)?;

        let (labels_and_params, record_size) =
            Self::parse_signals(&signal_header, total_signal_count as usize)?;
        if record_size == 0 {
            return Err(EdfError::InvalidFormat("Data record size is zero".to_string()));
        }

        // 数据记录数，-1 表示写入未完成，按文件大小推算
        let datarecords_str = String::from_utf8_lossy(&main_header[236..244]);
        let mut datarecords = atoi_nonlocalized(&datarecords_str) as i64;
        if datarecords < 0 {
            datarecords = (file_len.saturating_sub(header_size as u64) / record_size as u64) as i64;
            log::warn!("Data record count unknown, inferred {} from file size", datarecords);
        }

        let expected_len = (datarecords as u64)
            .checked_mul(record_size as u64)
            .and_then(|data_len| data_len.checked_add(header_size as u64))
            .ok_or_else(|| EdfError::InvalidFormat(format!(
                "{} data records of {} bytes exceed any file size", datarecords, record_size
            )))?;
        if file_len < expected_len {
            return Err(EdfError::InvalidFormat(format!(
                "File is {} bytes, header promises {} bytes", file_len, expected_len
            )));
        }

        let mut signals = Vec::new();
        let mut signal_info = Vec::new();
        let mut annotation_info = Vec::new();
        for (mut param, info) in labels_and_params {
            if param.label == EDFLIB_ANNOTATION_LABEL {
                annotation_info.push(info);
                continue;
            }
            if datarecord_duration == 0 {
                return Err(EdfError::InvalidFormat("Zero data record duration with ordinary signals".to_string()));
            }
            param.samples_in_file = info.samples_per_record as i64 * datarecords;
            signals.push(param);
            signal_info.push(info);
        }

        if file_type != FileType::Edf && annotation_info.is_empty() {
            return Err(EdfError::InvalidFormat("EDF+ file without an annotation signal".to_string()));
        }

        let file_duration = datarecord_duration.checked_mul(datarecords).ok_or_else(|| {
            EdfError::InvalidFormat(format!("File duration of {} data records out of range", datarecords))
        })?;

        let header = EdfHeader {
            file_type,
            signals,
            file_duration,
            start_date,
            start_time,
            datarecords_in_file: datarecords,
            datarecord_duration,
            patient,
            recording,
        };

        Ok(ParsedHeader { header, signal_info, annotation_info, header_size, record_size })
    }

    /// 解析日期时间 "dd.mm.yy" / "hh.mm.ss"
    fn parse_datetime(date_str: &str, time_str: &str) -> (Option<NaiveDate>, Option<NaiveTime>) {
        let fields = |s: &str| -> Option<[u32; 3]> {
            let parts: Vec<&str> = s.trim().split('.').collect();
            if parts.len() != 3 {
                return None;
            }
            let mut out = [0u32; 3];
            for (slot, part) in out.iter_mut().zip(parts) {
                *slot = part.trim().parse().ok()?;
            }
            Some(out)
        };

        let start_date = fields(date_str).and_then(|[day, month, yy]| {
            let year = if yy > 84 { 1900 + yy } else { 2000 + yy };
            NaiveDate::from_ymd_opt(year as i32, month, day)
        });
        let start_time = fields(time_str)
            .and_then(|[hour, minute, second]| NaiveTime::from_hms_opt(hour, minute, second));

        if start_date.is_none() || start_time.is_none() {
            log::warn!("Unparseable start date/time {:?} {:?}", date_str, time_str);
        }

        (start_date, start_time)
    }

    /// 解析信号参数，返回每个信号及其在数据记录中的位置和记录总字节数
    fn parse_signals(
        signal_header: &[u8],
        total_signal_count: usize,
    ) -> Result<(Vec<(SignalParam, SignalInfo)>, usize)> {
        let field = |base: usize, width: usize, i: usize| -> String {
            let start = total_signal_count * base + i * width;
            String::from_utf8_lossy(&signal_header[start..start + width]).trim().to_string()
        };

        let mut signals = Vec::with_capacity(total_signal_count);
        let mut buffer_offset = 0;

        for i in 0..total_signal_count {
            let label = field(0, 16, i);
            let transducer = field(16, 80, i);
            let physical_dimension = field(96, 8, i);
            let physical_min = atof_nonlocalized(&field(104, 8, i));
            let physical_max = atof_nonlocalized(&field(112, 8, i));
            let digital_min = atoi_nonlocalized(&field(120, 8, i));
            let digital_max = atoi_nonlocalized(&field(128, 8, i));
            let prefilter = field(136, 80, i);
            let samples_per_record = atoi_nonlocalized(&field(216, 8, i));

            if samples_per_record < 1 {
                return Err(EdfError::InvalidFormat(format!(
                    "Signal {:?} has {} samples per record", label, samples_per_record
                )));
            }

            // 注释信号不需要校验物理/数字范围
            if label != EDFLIB_ANNOTATION_LABEL {
                if physical_min == physical_max {
                    return Err(EdfError::PhysicalMinEqualsMax);
                }
                if digital_min == digital_max {
                    return Err(EdfError::DigitalMinEqualsMax);
                }
            }

            let info = SignalInfo {
                buffer_offset,
                samples_per_record: samples_per_record as usize,
            };

            signals.push((
                SignalParam {
                    label,
                    samples_in_file: 0,
                    physical_max,
                    physical_min,
                    digital_max,
                    digital_min,
                    samples_per_record,
                    physical_dimension,
                    prefilter,
                    transducer,
                },
                info,
            ));

            // 更新缓冲区偏移（每个样本2字节）
            buffer_offset += samples_per_record as usize * 2;
        }

        Ok((signals, buffer_offset))
    }
}
