//! # INI-style metadata reader.
//!
//! [`MetadataReader`] loads a host metadata file (flat `[section]` /
//! `key = value` syntax) and answers `get`/`get_float` lookups. The host
//! maintains these files next to the app; the engine itself never writes
//! them.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

/// Errors raised by metadata lookups.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The metadata file could not be read.
    #[error("failed to read metadata file: {0}")]
    Io(#[from] std::io::Error),

    /// The requested section/key pair does not exist.
    #[error("metadata key not found: [{section}] {key}")]
    NotFound {
        /// Section the lookup targeted.
        section: String,
        /// Key the lookup targeted.
        key: String,
    },

    /// The value exists but does not parse as a float.
    #[error("metadata value for [{section}] {key} is not a float: {value:?}")]
    NotAFloat {
        /// Section the lookup targeted.
        section: String,
        /// Key the lookup targeted.
        key: String,
        /// The raw value found.
        value: String,
    },
}

/// Read-only view over one INI-style metadata file.
#[derive(Debug, Clone, Default)]
pub struct MetadataReader {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl MetadataReader {
    /// Loads and parses the metadata file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, MetadataError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(Self::from_str_lossy(&raw))
    }

    /// Parses metadata from an in-memory string.
    ///
    /// Unrecognized lines are skipped; `#` and `;` start comments.
    pub fn from_str_lossy(raw: &str) -> Self {
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut current = String::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = name.trim().to_string();
                sections.entry(current.clone()).or_default();
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                sections
                    .entry(current.clone())
                    .or_default()
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Self { sections }
    }

    /// Returns the value for `key` in `section`.
    pub fn get(&self, section: &str, key: &str) -> Result<&str, MetadataError> {
        self.sections
            .get(section)
            .and_then(|kv| kv.get(key))
            .map(String::as_str)
            .ok_or_else(|| MetadataError::NotFound {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    /// Returns the value for `key` in `section` parsed as a float.
    pub fn get_float(&self, section: &str, key: &str) -> Result<f64, MetadataError> {
        let value = self.get(section, key)?;
        value
            .parse::<f64>()
            .map_err(|_| MetadataError::NotAFloat {
                section: section.to_string(),
                key: key.to_string(),
                value: value.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# host-maintained
[collections/mycollection]
modtime = 1687443190.714475
owner = admin

[views]
; nothing yet
";

    #[test]
    fn get_returns_raw_value() {
        let reader = MetadataReader::from_str_lossy(SAMPLE);
        assert_eq!(
            reader.get("collections/mycollection", "owner").unwrap(),
            "admin"
        );
    }

    #[test]
    fn get_float_parses() {
        let reader = MetadataReader::from_str_lossy(SAMPLE);
        let modtime = reader
            .get_float("collections/mycollection", "modtime")
            .unwrap();
        assert!((modtime - 1687443190.714475).abs() < 1e-6);
    }

    #[test]
    fn missing_key_is_not_found() {
        let reader = MetadataReader::from_str_lossy(SAMPLE);
        assert!(matches!(
            reader.get("views", "modtime"),
            Err(MetadataError::NotFound { .. })
        ));
    }

    #[test]
    fn non_numeric_value_is_not_a_float() {
        let reader = MetadataReader::from_str_lossy(SAMPLE);
        assert!(matches!(
            reader.get_float("collections/mycollection", "owner"),
            Err(MetadataError::NotAFloat { .. })
        ));
    }
}
