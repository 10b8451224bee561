//! Annotation filtering and detection of the annotation-metadata format.
//!
//! Files written after the acquisition pipeline update embed three metadata
//! annotations (`montageSku: `, `DAU No.: `, `App version: `). Older files
//! carry none of them and have no separate IMU stream.

use crate::config::LoaderConfig;

/// Which annotation convention a file follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdfFormat {
    New {
        montage: String,
        dau: String,
        app_ver: String,
    },
    Old,
}

impl EdfFormat {
    pub fn is_new(&self) -> bool {
        matches!(self, EdfFormat::New { .. })
    }
}

/// Keeps user-meaningful events: positive onset and no bookkeeping marker
/// in the description. Source order is preserved.
pub fn filter_events(events: &[(f64, String)], config: &LoaderConfig) -> Vec<(f64, String)> {
    events
        .iter()
        .filter(|(onset, desc)| {
            *onset > 0.0 && !config.ignored_event_markers.iter().any(|m| desc.contains(m.as_str()))
        })
        .cloned()
        .collect()
}

/// Text following `prefix` in the first description that contains it.
pub fn find_prefixed<'a, I>(descriptions: I, prefix: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    descriptions
        .into_iter()
        .find_map(|desc| desc.find(prefix).map(|pos| &desc[pos + prefix.len()..]))
}

/// Looks for all three metadata annotations; any missing one means the old format.
pub fn detect_format<'a, I>(descriptions: I, config: &LoaderConfig) -> EdfFormat
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let lookup = |prefix: &str| find_prefixed(descriptions.clone(), prefix).map(str::to_string);

    match (
        lookup(config.montage_prefix.as_str()),
        lookup(config.dau_prefix.as_str()),
        lookup(config.app_version_prefix.as_str()),
    ) {
        (Some(montage), Some(dau), Some(app_ver)) => EdfFormat::New { montage, dau, app_ver },
        _ => EdfFormat::Old,
    }
}
