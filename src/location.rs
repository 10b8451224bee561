//! Resolution of a recording's file identity from a path and optional name.

use std::path::{Path, PathBuf};

use crate::error::RecordingError;

/// Where a recording lives. `filename` is always the last component of `filepath`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    filepath: PathBuf,
    filename: String,
}

impl Location {
    /// Resolves `path` (and optionally a file `name`) into a full file path.
    ///
    /// * no name: `path` is the file, stored as given
    /// * name equal to the last component of `path`: `path` is already complete
    /// * `path` is a directory: the name is joined onto it
    /// * anything else is [`RecordingError::InvalidLocation`]
    pub fn resolve(path: impl AsRef<Path>, name: Option<&str>) -> Result<Self, RecordingError> {
        let path = path.as_ref();
        let invalid = || RecordingError::InvalidLocation {
            path: path.to_path_buf(),
            name: name.map(str::to_string),
        };

        let base = path.file_name().map(|n| n.to_string_lossy().into_owned());

        match name {
            None => Ok(Location {
                filepath: path.to_path_buf(),
                filename: base.ok_or_else(invalid)?,
            }),
            Some(name) if base.as_deref() == Some(name) => Ok(Location {
                filepath: path.to_path_buf(),
                filename: name.to_string(),
            }),
            Some(name) if path.is_dir() && is_plain_file_name(name) => Ok(Location {
                filepath: path.join(name),
                filename: name.to_string(),
            }),
            Some(_) => Err(invalid()),
        }
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

/// A single, non-empty path component; otherwise the joined path's last
/// component would not be `name`.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(c)), None) if c == name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_only_uses_base_name() {
        let loc = Location::resolve("/data/session1/rec_01.edf", None).unwrap();
        assert_eq!(loc.filepath(), Path::new("/data/session1/rec_01.edf"));
        assert_eq!(loc.filename(), "rec_01.edf");
    }

    #[test]
    fn test_matching_name_keeps_path() {
        let loc = Location::resolve("/data/rec.edf", Some("rec.edf")).unwrap();
        assert_eq!(loc.filepath(), Path::new("/data/rec.edf"));
        assert_eq!(loc.filename(), "rec.edf");
    }

    #[test]
    fn test_directory_is_joined() {
        let dir = tempfile::tempdir().unwrap();
        let loc = Location::resolve(dir.path(), Some("x.edf")).unwrap();
        assert_eq!(loc.filepath(), dir.path().join("x.edf"));
        assert_eq!(loc.filename(), "x.edf");
    }

    #[test]
    fn test_invalid_combination() {
        let err = Location::resolve("/tmp/nonexistent_dir_for_edfrecording", Some("x.edf")).unwrap_err();
        assert!(matches!(err, RecordingError::InvalidLocation { .. }));
    }

    #[test]
    fn test_nested_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Location::resolve(dir.path(), Some("sub/x.edf")).is_err());
    }

    #[test]
    fn test_path_without_file_name() {
        assert!(Location::resolve("/", None).is_err());
    }
}
