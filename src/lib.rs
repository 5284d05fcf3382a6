//! # modinput
//!
//! **modinput** is the execution lifecycle engine for host-orchestrated
//! modular data inputs.
//!
//! A modular input is a long-running collection plugin that a host
//! orchestrator launches as a subprocess. The host drives the process
//! through three argv modes and a structured stdin payload; the plugin
//! answers with a scheme document, a validation verdict, or a stream of
//! collected events — plus a meaningful exit code. This crate owns all of
//! that protocol so input authors only write collection logic.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!              host orchestrator
//!        argv + stdin XML │       ▲ exit code, stdout/stderr
//!                         ▼       │
//! ┌───────────────────────────────────────────────────────────┐
//! │  Engine (mode dispatch, payload decoding, exit codes)     │
//! │     │                                                     │
//! │     ├─ Scheme mode ──► Scheme/Argument ──► stdout XML     │
//! │     ├─ Validate mode ─► Input::do_validation              │
//! │     └─ Run mode ─────► RunContext ─► Input::do_run        │
//! └─────────┬──────────────────┬──────────────┬───────────────┘
//!           ▼                  ▼              ▼
//!   Checkpointer         EventWriter     OrphanMonitor + signal routing
//!   (kvstore | file)     (hec | classic,  (background poll, teardown
//!    chosen once          one-shot         callback, both released on
//!    per invocation)      fallback)        cleanup)
//! ```
//!
//! ### Run lifecycle
//! ```text
//! Engine::execute()
//!   ├─► parse argv ─► Run | Scheme | ValidateArgs | invalid(exit 1)
//!   └─► Run:
//!        ├─► decode stdin into HostMetadata + InputSpecSet
//!        ├─► build RunContext (capabilities stay lazy)
//!        ├─► Input::do_run(ctx, inputs)        (may run for hours)
//!        │      ctx.checkpointer()  — memoized backend handle
//!        │      ctx.event_writer()  — memoized, hec→classic fallback
//!        │      ctx.register_teardown_handler(…)
//!        │      ctx.register_orphan_handler(…)
//!        ├─► ctx.release()                      (always: close writer,
//!        │                                       stop orphan monitor)
//!        └─► exit 0 on Ok, exit 1 on Err (error logged, never raised)
//! ```
//!
//! ## Features
//! | Area              | Description                                                        | Key types / traits                      |
//! |-------------------|--------------------------------------------------------------------|-----------------------------------------|
//! | **Input API**     | Implement the input as a trait or assemble it from closures.       | [`Input`], [`FnInput`]                  |
//! | **Lifecycle**     | Mode dispatch, payload decoding, documented exit codes.            | [`Engine`], [`EngineIo`]                |
//! | **Checkpoints**   | Durable key→value progress behind a uniform interface.             | [`Checkpointer`], [`KvStoreCheckpointer`], [`FileCheckpointer`] |
//! | **Event delivery**| Collector delivery with a documented fallback path.                | [`EventWriter`], [`HecEventWriter`], [`ClassicEventWriter`] |
//! | **Shutdown**      | Teardown signal routing and orphan detection.                      | [`register_teardown_handler`], [`OrphanMonitor`] |
//! | **Scheme**        | Declarative configuration surface for the host UI.                 | [`Scheme`], [`Argument`]                |
//!
//! ## Example
//! ```no_run
//! use modinput::{Engine, Event, FnInput, InputSettings, RunError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let input = FnInput::builder(
//!         "ta_demo",
//!         "demo",
//!         "Demo input",
//!         "Collects demo records on an interval",
//!     )
//!     .settings(InputSettings {
//!         use_kvstore_checkpoint: false,
//!         use_hec_event_writer: false,
//!         ..InputSettings::default()
//!     })
//!     .run(|ctx, inputs| async move {
//!         let checkpoints = ctx.checkpointer().await?;
//!         let writer = ctx.event_writer().await?;
//!
//!         for (name, stanza) in &inputs {
//!             let cursor = checkpoints.get(name).await?;
//!             let record = format!("stanza={name} cursor={cursor:?}");
//!             writer
//!                 .write(Event::new(record).with_stanza(stanza.name()))
//!                 .await?;
//!             checkpoints
//!                 .save(name, serde_json::json!({"done": true}))
//!                 .await?;
//!         }
//!         Ok::<(), RunError>(())
//!     })?;
//!
//!     let engine = Engine::new(input)?;
//!     std::process::exit(engine.execute().await);
//! }
//! ```

mod checkpoint;
mod config;
mod core;
mod error;
mod inputs;
mod metadata;
pub mod net_utils;
mod scheme;
mod writers;

// ---- Public re-exports ----

pub use checkpoint::{
    CheckpointError, Checkpointer, FileCheckpointError, FileCheckpointer, KvStoreCheckpointer,
    KvStoreError, OWNER_ANY,
};
pub use config::InputSettings;
pub use crate::core::{
    notify_teardown, register_teardown_handler, Engine, EngineIo, InvalidInvocation,
    InvocationMode, OrphanMonitor, RunContext,
};
pub use error::{ConfigError, RunError, ValidationError};
pub use inputs::{
    DefinitionError, FnInput, FnInputBuilder, HostMetadata, Input, InputDefinition, InputSpecSet,
    Stanza, ValidationDefinition, ValidationRequest,
};
pub use metadata::{MetadataError, MetadataReader};
pub use scheme::{Argument, DataType, ParseDataTypeError, Scheme};
pub use writers::{
    ClassicEventWriter, Event, EventWriteError, EventWriter, HecEventWriter, RetryPolicy,
};
