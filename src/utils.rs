use crate::error::{EdfError, Result};
use crate::types::Annotation;

/// TAL separator between onset and duration
const TAL_DURATION_SEP: u8 = 0x15;
/// TAL separator after the time stamp and after every description
const TAL_TEXT_SEP: u8 = 0x14;

/// 解析EDF时间字符串为100纳秒单位
pub fn parse_edf_time(s: &str) -> Result<i64> {
    let s = s.trim();

    if s.is_empty() {
        return Err(EdfError::InvalidFormat("Empty time string".to_string()));
    }

    // 处理符号
    let (negative, s) = if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    };

    let (integer_part, decimal_part) = match s.split_once('.') {
        Some((integer, decimal)) => (integer, decimal),
        None => (s, ""),
    };
    if integer_part.is_empty() && decimal_part.is_empty() {
        return Err(EdfError::InvalidFormat(format!("No digits in time {:?}", s)));
    }
    // 只接受ASCII数字，之后的切片按字节进行
    if !integer_part.bytes().chain(decimal_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(EdfError::InvalidFormat(format!("Invalid time {:?}", s)));
    }

    let overflow = || EdfError::InvalidFormat(format!("Time {:?} out of range", s));

    let mut value = 0i64;
    if !integer_part.is_empty() {
        value = integer_part
            .parse::<i64>()
            .map_err(|_| overflow())?
            .checked_mul(crate::EDFLIB_TIME_DIMENSION)
            .ok_or_else(overflow)?;
    }

    // 解析小数部分（最多7位精度）
    if !decimal_part.is_empty() {
        let decimal_str = &decimal_part[..decimal_part.len().min(7)];
        let decimal_value: i64 = decimal_str.parse().map_err(|_| overflow())?;
        let scale = 10i64.pow(7 - decimal_str.len() as u32);
        value = value.checked_add(decimal_value * scale).ok_or_else(overflow)?;
    }

    if negative {
        value = -value;
    }

    Ok(value)
}

/// 非本地化的整数解析（避免受系统locale影响）
pub fn atoi_nonlocalized(s: &str) -> i32 {
    let s = s.trim();
    if s.is_empty() {
        return 0;
    }

    s.parse().unwrap_or(0)
}

/// 非本地化的浮点数解析
pub fn atof_nonlocalized(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    s.parse().unwrap_or(0.0)
}

/// Factor converting a signal's physical dimension to volts.
///
/// Dimensions that are not voltages (e.g. `g` on accelerometer channels)
/// are left unscaled.
pub fn unit_scale(physical_dimension: &str) -> f64 {
    match physical_dimension.trim() {
        "V" => 1.0,
        "mV" => 1e-3,
        "uV" | "µV" | "μV" => 1e-6,
        "nV" => 1e-9,
        _ => 1.0,
    }
}

/// Parses the bytes an annotation signal occupies in one data record.
///
/// Every TAL has the form `+onset[\x15duration]\x14text\x14[text\x14...]\x00`.
/// The time-keeping TAL at the start of each record carries an empty text and
/// yields no annotation.
pub fn parse_tal_block(block: &[u8]) -> Result<Vec<Annotation>> {
    let mut annotations = Vec::new();

    for tal in block.split(|&b| b == 0).filter(|tal| !tal.is_empty()) {
        let Some(stamp_end) = tal.iter().position(|&b| b == TAL_TEXT_SEP) else {
            return Err(EdfError::InvalidFormat("TAL without time stamp terminator".to_string()));
        };

        let stamp = &tal[..stamp_end];
        if !matches!(stamp.first(), Some(b'+') | Some(b'-')) {
            return Err(EdfError::InvalidFormat("TAL onset must start with '+' or '-'".to_string()));
        }

        let mut parts = stamp.splitn(2, |&b| b == TAL_DURATION_SEP);
        let onset = parse_edf_time(&String::from_utf8_lossy(parts.next().unwrap_or_default()))?;
        let duration = match parts.next() {
            Some(d) if !d.is_empty() => parse_edf_time(&String::from_utf8_lossy(d))?,
            _ => -1,
        };

        for text in tal[stamp_end + 1..].split(|&b| b == TAL_TEXT_SEP) {
            if text.is_empty() {
                continue;
            }
            annotations.push(Annotation {
                onset,
                duration,
                description: String::from_utf8_lossy(text).into_owned(),
            });
        }
    }

    Ok(annotations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_edf_time() {
        assert_eq!(parse_edf_time("1").unwrap(), 10_000_000);
        assert_eq!(parse_edf_time("1.5").unwrap(), 15_000_000);
        assert_eq!(parse_edf_time("-2.5").unwrap(), -25_000_000);
        assert_eq!(parse_edf_time("+0.0000001").unwrap(), 1);
        assert!(parse_edf_time("abc").is_err());
        assert!(parse_edf_time("+.").is_err());
    }

    #[test]
    fn test_parse_edf_time_rejects_non_ascii_fraction() {
        assert!(matches!(parse_edf_time("+.123456é"), Err(EdfError::InvalidFormat(_))));
        assert!(matches!(parse_edf_time("+1é.5"), Err(EdfError::InvalidFormat(_))));
        assert!(parse_edf_time("++5").is_err());
    }

    #[test]
    fn test_parse_edf_time_out_of_range() {
        assert!(matches!(parse_edf_time("+9999999999999"), Err(EdfError::InvalidFormat(_))));
        assert!(matches!(parse_edf_time("+922337203685.4775808"), Err(EdfError::InvalidFormat(_))));
        assert!(parse_edf_time("99999999999999999999").is_err());
        assert_eq!(parse_edf_time("+922337203685.4775807").unwrap(), i64::MAX);
    }

    #[test]
    fn test_parse_tal_block_with_invalid_onset() {
        assert!(parse_tal_block(b"+.123456\xc3\xa9\x14X\x14\x00").is_err());
        assert!(parse_tal_block(b"+9999999999999\x14Trigger\x14\x00").is_err());
    }

    #[test]
    fn test_unit_scale() {
        assert_eq!(unit_scale("uV"), 1e-6);
        assert_eq!(unit_scale("µV "), 1e-6);
        assert_eq!(unit_scale("mV"), 1e-3);
        assert_eq!(unit_scale("V"), 1.0);
        assert_eq!(unit_scale("g"), 1.0);
    }

    #[test]
    fn test_parse_tal_block_skips_time_keeping() {
        let mut block = b"+0\x14\x14\x00+1.5\x152\x14Sleep stage N1\x14\x00+3\x14A\x14B\x14\x00".to_vec();
        block.resize(120, 0);

        let annotations = parse_tal_block(&block).unwrap();
        assert_eq!(annotations.len(), 3);
        assert_eq!(annotations[0].onset, 15_000_000);
        assert_eq!(annotations[0].duration, 20_000_000);
        assert_eq!(annotations[0].description, "Sleep stage N1");
        assert_eq!(annotations[1].description, "A");
        assert_eq!(annotations[2].description, "B");
        assert_eq!(annotations[2].duration, -1);
    }

    #[test]
    fn test_parse_tal_block_rejects_garbage() {
        assert!(parse_tal_block(b"garbage\x14\x00").is_err());
        assert!(parse_tal_block(b"+1 no terminator\x00").is_err());
        assert!(parse_tal_block(&[0u8; 32]).unwrap().is_empty());
    }
}
