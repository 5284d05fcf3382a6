//! # Event delivery to the collection endpoint.
//!
//! Collected data leaves the input as [`Event`]s through the
//! [`EventWriter`] trait. Two backends exist:
//!
//! - [`HecEventWriter`] — posts JSON envelopes to the host's HTTP event
//!   collector; constructed against a named collector input.
//! - [`ClassicEventWriter`] — writes the XML event envelope to the
//!   process's standard output, the host's legacy ingestion path. It has no
//!   construction failure mode.
//!
//! The engine picks a backend once per invocation. When the HTTP collector
//! is preferred but the named input is unavailable (missing, or the
//! credential lacks permission), and only then, the engine logs one warning
//! and substitutes the classic writer. Any other construction failure
//! aborts the run.
//!
//! Whichever backend is built, the engine releases it exactly once during
//! cleanup; [`EventWriter::close`] is idempotent and a closed writer
//! rejects further writes with [`EventWriteError::Closed`].

mod classic;
mod event;
mod hec;
mod retry;

pub use classic::ClassicEventWriter;
pub use event::Event;
pub use hec::HecEventWriter;
pub use retry::RetryPolicy;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by event writers.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EventWriteError {
    /// The named collector input cannot be used: it does not exist or the
    /// session credential lacks permission. This is the only construction
    /// failure that triggers the classic fallback.
    #[error("collector input {name:?} is unavailable (status {status})")]
    Unavailable {
        /// The collector input name that was requested.
        name: String,
        /// The management API status that rejected it.
        status: reqwest::StatusCode,
    },

    /// The HTTP request could not be completed.
    #[error("transport failure: {0}")]
    Http(#[from] reqwest::Error),

    /// The collector answered with an unexpected status.
    #[error("unexpected status {status} from collector")]
    Status {
        /// The response status.
        status: reqwest::StatusCode,
    },

    /// Writing to the underlying stream failed.
    #[error("stream write failure: {0}")]
    Io(#[from] std::io::Error),

    /// The writer was already closed.
    #[error("event writer is closed")]
    Closed,
}

impl EventWriteError {
    /// `true` for the one failure class that may fall back to the classic
    /// writer.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, EventWriteError::Unavailable { .. })
    }
}

/// Uniform surface over one event delivery backend.
#[async_trait]
pub trait EventWriter: Send + Sync {
    /// Stable backend name for logs.
    fn name(&self) -> &'static str;

    /// Delivers one event. Errors indicate the event was not accepted.
    async fn write(&self, event: Event) -> Result<(), EventWriteError>;

    /// Releases the writer. Idempotent; later `write` calls fail with
    /// [`EventWriteError::Closed`].
    async fn close(&self);
}
