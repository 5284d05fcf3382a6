//! # Per-invocation run context.
//!
//! [`RunContext`] is what `do_run` sees of the engine: the immutable
//! [`HostMetadata`] snapshot, lazily-built checkpoint and event-writer
//! capabilities, and the teardown/orphan registration hooks.
//!
//! ## Capability rules
//! - Backends are selected **once** from the settings captured at context
//!   construction and memoized for the whole invocation — repeated
//!   accessor calls return the same handle, never a reconstruction.
//! - The event writer is the only capability with a fallback: if the HTTP
//!   collector input is unavailable, the classic stream writer is
//!   substituted with a single warning. Any other construction failure
//!   propagates to the caller.
//! - The engine — not user code — releases the capabilities when the run
//!   operation returns, on success and failure alike.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::checkpoint::{
    CheckpointError, Checkpointer, FileCheckpointer, KvStoreCheckpointer,
};
use crate::config::InputSettings;
use crate::core::orphan::OrphanMonitor;
use crate::core::shutdown;
use crate::inputs::HostMetadata;
use crate::writers::{ClassicEventWriter, EventWriteError, EventWriter, HecEventWriter};

/// Engine-owned state handed to the user run operation.
pub struct RunContext {
    metadata: HostMetadata,
    app: String,
    settings: InputSettings,
    checkpointer: OnceCell<Arc<dyn Checkpointer>>,
    event_writer: OnceCell<Arc<dyn EventWriter>>,
    orphan: OrphanMonitor,
}

impl RunContext {
    pub(crate) fn new(metadata: HostMetadata, app: String, settings: InputSettings) -> Self {
        let orphan = OrphanMonitor::new(settings.orphan_poll_interval);
        Self {
            metadata,
            app,
            settings,
            checkpointer: OnceCell::new(),
            event_writer: OnceCell::new(),
            orphan,
        }
    }

    /// The host metadata snapshot for this invocation.
    pub fn metadata(&self) -> &HostMetadata {
        &self.metadata
    }

    /// The checkpoint capability, built on first access.
    ///
    /// Backend selection follows
    /// [`InputSettings::use_kvstore_checkpoint`] and is stable for the
    /// invocation. Construction and operation failures are backend-specific
    /// — see [`CheckpointError`].
    pub async fn checkpointer(&self) -> Result<&Arc<dyn Checkpointer>, CheckpointError> {
        self.checkpointer
            .get_or_try_init(|| async {
                let handle: Arc<dyn Checkpointer> = if self.settings.use_kvstore_checkpoint {
                    Arc::new(KvStoreCheckpointer::new(
                        self.settings.kvstore_collection.clone(),
                        self.metadata.session_key(),
                        &self.app,
                        self.metadata.server_scheme(),
                        self.metadata.server_host(),
                        self.metadata.server_port(),
                    )?)
                } else {
                    Arc::new(FileCheckpointer::new(self.metadata.checkpoint_dir()))
                };
                Ok(handle)
            })
            .await
    }

    /// The event delivery capability, built on first access.
    ///
    /// When the HTTP collector is preferred and its named input is
    /// unavailable, the classic stream writer is substituted after one
    /// warning; every other construction failure propagates.
    pub async fn event_writer(&self) -> Result<&Arc<dyn EventWriter>, EventWriteError> {
        self.event_writer
            .get_or_try_init(|| async {
                if !self.settings.use_hec_event_writer {
                    return Ok(Arc::new(ClassicEventWriter::new()) as Arc<dyn EventWriter>);
                }
                match HecEventWriter::create(
                    &self.settings.hec_input_name,
                    self.metadata.session_key(),
                    self.metadata.server_scheme(),
                    self.metadata.server_host(),
                    self.metadata.server_port(),
                )
                .await
                {
                    Ok(writer) => Ok(Arc::new(writer) as Arc<dyn EventWriter>),
                    Err(e) if e.is_unavailable() => {
                        tracing::warn!(
                            error = %e,
                            "collector writer unavailable, falling back to the classic stream writer"
                        );
                        Ok(Arc::new(ClassicEventWriter::new()) as Arc<dyn EventWriter>)
                    }
                    Err(e) => Err(e),
                }
            })
            .await
    }

    /// Registers the process teardown callback (last registration wins).
    ///
    /// See [`shutdown::register_teardown_handler`]. The callback must not
    /// block; set a flag or cancel a token that the run loop observes.
    pub fn register_teardown_handler<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        shutdown::register_teardown_handler(handler);
    }

    /// Starts the orphan monitor with `handler` as its callback.
    ///
    /// Idempotent: a monitor already running for this invocation keeps its
    /// original callback.
    pub fn register_orphan_handler<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.orphan.start(handler);
    }

    /// The invocation's orphan monitor.
    pub fn orphan_monitor(&self) -> &OrphanMonitor {
        &self.orphan
    }

    /// Releases everything this invocation lazily acquired: closes the
    /// event writer if one was built and stops the orphan monitor if it
    /// was started. Called exactly once by the engine, regardless of the
    /// run outcome.
    pub(crate) async fn release(&self) {
        if let Some(writer) = self.event_writer.get() {
            writer.close().await;
        }
        self.orphan.stop();
    }
}
