use std::str::FromStr;

use crate::error::RecordingError;

/// Subsets accepted by [`Modality::from_str`], as listed in its error.
pub const VALID_SUBSETS: &[&str] = &["IMU", "ACCELEROMETER", "EMG", "EEG", "EOG", "EKG", "ECG", "EXG"];

/// Physiological modality of an EXG channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    Emg,
    Eeg,
    Eog,
    /// EKG and ECG are the same modality
    Ecg,
}

impl Modality {
    /// Substrings that mark a channel label as this modality
    pub fn markers(self) -> &'static [&'static str] {
        match self {
            Modality::Emg => &["EMG"],
            Modality::Eeg => &["EEG"],
            Modality::Eog => &["EOG"],
            Modality::Ecg => &["EKG", "ECG"],
        }
    }

    pub fn matches(self, channel_name: &str) -> bool {
        self.markers().iter().any(|m| channel_name.contains(m))
    }
}

impl FromStr for Modality {
    type Err = RecordingError;

    fn from_str(subset: &str) -> Result<Self, Self::Err> {
        let subset = subset.to_uppercase();
        match subset.as_str() {
            "EMG" => Ok(Modality::Emg),
            "EEG" => Ok(Modality::Eeg),
            "EOG" => Ok(Modality::Eog),
            "EKG" | "ECG" => Ok(Modality::Ecg),
            _ => Err(RecordingError::UnsupportedModality { subset, valid: VALID_SUBSETS }),
        }
    }
}

/// Column indices of the channels in `names` that belong to `modality`,
/// in channel order.
pub fn channel_indices<S: AsRef<str>>(names: &[S], modality: Modality) -> Vec<usize> {
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| modality.matches(name.as_ref()))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eeg_indices() {
        let names = ["EEG1", "EMG1", "EEG2"];
        assert_eq!(channel_indices(&names, Modality::Eeg), vec![0, 2]);
        assert_eq!(channel_indices(&names, Modality::Emg), vec![1]);
        assert!(channel_indices(&names, Modality::Eog).is_empty());
    }

    #[test]
    fn test_ecg_matches_both_spellings() {
        let names = ["EKG lead", "EMG 3", "ECG II"];
        assert_eq!(channel_indices(&names, Modality::Ecg), vec![0, 2]);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("eeg".parse::<Modality>().unwrap(), Modality::Eeg);
        assert_eq!("Ekg".parse::<Modality>().unwrap(), Modality::Ecg);
        assert_eq!("ecg".parse::<Modality>().unwrap(), Modality::Ecg);
    }

    #[test]
    fn test_unsupported_subset() {
        match "xyz".parse::<Modality>() {
            Err(RecordingError::UnsupportedModality { subset, valid }) => {
                assert_eq!(subset, "XYZ");
                assert!(valid.contains(&"EEG"));
            }
            other => panic!("expected UnsupportedModality, got {:?}", other),
        }
        // listed as valid but not classifiable over EXG channel names
        assert!("IMU".parse::<Modality>().is_err());
    }
}
