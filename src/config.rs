use crate::{
    APP_VERSION_PREFIX, DAU_PREFIX, EXCLUDED_CHANNEL_LABEL, IGNORED_EVENT_MARKERS, IMU_CHANNEL_MARKER,
    MONTAGE_PREFIX, MICROVOLT_SCALE,
};

/// Marker strings and scale factors used while loading a recording.
///
/// `LoaderConfig::default()` matches the files written by the acquisition
/// app; individual fields can be overridden for other devices.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Channel labels dropped from every decode
    pub excluded_channels: Vec<String>,
    /// Annotations whose description contains any of these are bookkeeping, not events
    pub ignored_event_markers: Vec<String>,
    /// Channels whose label contains this marker form the IMU stream
    pub imu_channel_marker: String,
    pub montage_prefix: String,
    pub dau_prefix: String,
    pub app_version_prefix: String,
    /// Multiplier applied to decoded samples (volts) of both streams
    pub amplitude_scale: f64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            excluded_channels: vec![EXCLUDED_CHANNEL_LABEL.to_string()],
            ignored_event_markers: IGNORED_EVENT_MARKERS.iter().map(|m| m.to_string()).collect(),
            imu_channel_marker: IMU_CHANNEL_MARKER.to_string(),
            montage_prefix: MONTAGE_PREFIX.to_string(),
            dau_prefix: DAU_PREFIX.to_string(),
            app_version_prefix: APP_VERSION_PREFIX.to_string(),
            amplitude_scale: MICROVOLT_SCALE,
        }
    }
}

impl LoaderConfig {
    pub fn is_imu_channel(&self, name: &str) -> bool {
        name.contains(&self.imu_channel_marker)
    }
}
