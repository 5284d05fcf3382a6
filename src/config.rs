//! # Per-input behavior settings.
//!
//! [`InputSettings`] selects the persistence and event-delivery backends and
//! the scheme flags advertised to the host. The selection flags are read
//! exactly once per invocation — the engine never re-evaluates them mid-run.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use modinput::InputSettings;
//!
//! let mut settings = InputSettings::default();
//! settings.use_kvstore_checkpoint = false;
//! settings.use_hec_event_writer = false;
//! settings.orphan_poll_interval = Duration::from_secs(5);
//!
//! assert!(settings.hec_input_name.is_empty());
//! ```

use std::time::Duration;

use crate::error::ConfigError;

/// Behavior settings for one modular input.
///
/// Controls scheme flags, checkpoint/event-writer backend selection, and the
/// orphan monitor poll cadence.
#[derive(Clone, Debug)]
pub struct InputSettings {
    /// Advertise external (engine-driven) argument validation in the scheme.
    pub use_external_validation: bool,
    /// Advertise single-instance execution in the scheme.
    pub use_single_instance: bool,
    /// Select the remote document-store checkpoint backend; `false` selects
    /// the local file-per-key backend under the host's checkpoint directory.
    pub use_kvstore_checkpoint: bool,
    /// Collection name used by the document-store checkpoint backend.
    pub kvstore_collection: String,
    /// Select the HTTP collector event writer; `false` selects the classic
    /// stdout stream writer.
    pub use_hec_event_writer: bool,
    /// Name of the HTTP collector input to deliver through. Must be set when
    /// [`InputSettings::use_hec_event_writer`] is enabled.
    pub hec_input_name: String,
    /// Interval between parent-liveness checks of the orphan monitor.
    pub orphan_poll_interval: Duration,
}

impl Default for InputSettings {
    /// Provides the default settings:
    /// - `use_external_validation = false`
    /// - `use_single_instance = false`
    /// - `use_kvstore_checkpoint = true`, collection `"modinput_checkpoint"`
    /// - `use_hec_event_writer = true`, collector input name unset
    /// - `orphan_poll_interval = 2s`
    fn default() -> Self {
        Self {
            use_external_validation: false,
            use_single_instance: false,
            use_kvstore_checkpoint: true,
            kvstore_collection: "modinput_checkpoint".to_string(),
            use_hec_event_writer: true,
            hec_input_name: String::new(),
            orphan_poll_interval: Duration::from_secs(2),
        }
    }
}

impl InputSettings {
    /// Checks internal consistency. Called once at engine construction so
    /// misconfiguration fails before any payload is read.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.use_hec_event_writer && self.hec_input_name.trim().is_empty() {
            return Err(ConfigError::MissingHecInputName);
        }
        if self.use_kvstore_checkpoint && self.kvstore_collection.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "kvstore_collection",
            });
        }
        Ok(())
    }
}
