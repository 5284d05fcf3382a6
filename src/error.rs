//! Error types crossing the engine boundary.
//!
//! This module defines the errors that user code exchanges with the
//! lifecycle engine:
//!
//! - [`ConfigError`] — the input was assembled with missing or inconsistent
//!   required configuration; raised at engine construction, never mid-run.
//! - [`RunError`] — errors escaping the user-supplied run operation; the
//!   engine catches them at the boundary, logs once, and converts them to a
//!   nonzero exit code.
//! - [`ValidationError`] — errors raised by the user-supplied validation
//!   operation; serialized into the host's `<error>` document.
//!
//! Backend-specific failures keep their own types
//! ([`CheckpointError`](crate::CheckpointError),
//! [`EventWriteError`](crate::EventWriteError)) and are *not* unified here;
//! `RunError` only wraps them for propagation out of `do_run`.

use thiserror::Error;

use crate::checkpoint::CheckpointError;
use crate::writers::EventWriteError;

/// # Errors detectable when assembling an input or engine.
///
/// These are programming/configuration mistakes: a required identity field
/// left empty, or a writer selected without the configuration it needs.
/// They surface from [`Engine::new`](crate::Engine::new) and the
/// [`FnInput`](crate::FnInput) builder, before any payload is read.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required identity field (app/name/title/description) is empty.
    #[error("required input field is empty: {field}")]
    MissingField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The HTTP collector writer is selected but no collector input name is set.
    #[error("hec_input_name must be set when use_hec_event_writer is enabled")]
    MissingHecInputName,
}

/// # Errors escaping the user-supplied run operation.
///
/// `do_run` returns this type; the engine never lets it propagate to the
/// host beyond a log record and exit code 1. Backend failures are wrapped
/// as-is so callers can still match on the backend-specific kind.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunError {
    /// A checkpoint backend operation failed.
    #[error("checkpoint failure: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// Event delivery or sink construction failed.
    #[error("event delivery failure: {0}")]
    Event(#[from] EventWriteError),

    /// The run operation failed for a reason of its own.
    #[error("input failed: {error}")]
    Failed {
        /// Human-readable failure description.
        error: String,
    },
}

impl RunError {
    /// Wraps an arbitrary failure message.
    pub fn failed(error: impl Into<String>) -> Self {
        RunError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use modinput::RunError;
    ///
    /// let err = RunError::failed("boom");
    /// assert_eq!(err.as_label(), "run_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::Checkpoint(_) => "run_checkpoint",
            RunError::Event(_) => "run_event_delivery",
            RunError::Failed { .. } => "run_failed",
        }
    }
}

/// # Error raised by the user-supplied validation operation.
///
/// The message is what the host shows to the operator: the engine writes it
/// verbatim (XML-escaped) into `<error><message>…</message></error>` on
/// standard error.
///
/// # Example
/// ```
/// use modinput::ValidationError;
///
/// let err = ValidationError::new("interval must be positive");
/// assert_eq!(err.to_string(), "interval must be positive");
/// ```
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Creates a validation error with the given operator-facing message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
