//! Classic stream event writer.
//!
//! The legacy ingestion path: events are wrapped in the host's XML
//! envelope and written to the process's standard output, which the host
//! tails. There is nothing to construct and nothing that can refuse us,
//! which is exactly why this writer is the fallback when the HTTP
//! collector is unavailable.

use std::io::Write;

use async_trait::async_trait;
use quick_xml::escape::escape;
use tokio::sync::Mutex;

use super::{Event, EventWriteError, EventWriter};

/// Event writer emitting the XML event envelope on a byte stream.
pub struct ClassicEventWriter {
    out: Mutex<Option<Box<dyn Write + Send>>>,
}

impl ClassicEventWriter {
    /// Creates a writer bound to the process's standard output.
    pub fn new() -> Self {
        Self::with_output(Box::new(std::io::stdout()))
    }

    /// Creates a writer bound to an arbitrary stream (tests, capture).
    pub fn with_output(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(Some(out)),
        }
    }

    fn envelope(event: &Event) -> String {
        let mut doc = String::from("<stream><event");
        if let Some(stanza) = &event.stanza {
            doc.push_str(&format!(" stanza=\"{}\"", escape(stanza.as_str())));
        }
        doc.push('>');
        if let Some(time) = event.time {
            doc.push_str(&format!("<time>{time:.3}</time>"));
        }
        if let Some(index) = &event.index {
            doc.push_str(&format!("<index>{}</index>", escape(index.as_str())));
        }
        if let Some(host) = &event.host {
            doc.push_str(&format!("<host>{}</host>", escape(host.as_str())));
        }
        if let Some(source) = &event.source {
            doc.push_str(&format!("<source>{}</source>", escape(source.as_str())));
        }
        if let Some(sourcetype) = &event.sourcetype {
            doc.push_str(&format!(
                "<sourcetype>{}</sourcetype>",
                escape(sourcetype.as_str())
            ));
        }
        doc.push_str(&format!("<data>{}</data>", escape(&event.data_text())));
        doc.push_str("</event></stream>\n");
        doc
    }
}

impl Default for ClassicEventWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventWriter for ClassicEventWriter {
    fn name(&self) -> &'static str {
        "classic"
    }

    async fn write(&self, event: Event) -> Result<(), EventWriteError> {
        let mut guard = self.out.lock().await;
        let out = guard.as_mut().ok_or(EventWriteError::Closed)?;
        out.write_all(Self::envelope(&event).as_bytes())?;
        out.flush()?;
        Ok(())
    }

    async fn close(&self) {
        if let Some(mut out) = self.out.lock().await.take() {
            // A failing flush at release time must not overturn the run's
            // exit status; record it and move on.
            if let Err(e) = out.flush() {
                tracing::warn!(error = %e, "flush during writer close failed");
            }
        }
    }
}
