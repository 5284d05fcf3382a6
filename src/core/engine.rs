//! # Engine: drives one modular-input invocation end to end.
//!
//! The [`Engine`] owns mode dispatch, payload decoding, capability
//! wiring, and the documented exit codes. User logic only ever sees the
//! [`RunContext`] and the parsed payload.
//!
//! ## Lifecycle
//! ```text
//! argv ──► InvocationMode::from_args
//!            │
//!            ├─ Run ──────────► stdin ─► InputDefinition::parse
//!            │                     │
//!            │                     ├─ parse error ─► log ─► exit 1
//!            │                     └─ ok ─► RunContext ─► do_run(ctx, inputs)
//!            │                               │
//!            │                               ▼ (always, success or failure)
//!            │                         ctx.release():
//!            │                           close event writer if built
//!            │                           stop orphan monitor if started
//!            │                               │
//!            │                               ├─ Ok  ─► log ─► exit 0
//!            │                               └─ Err ─► log ─► exit 1
//!            │
//!            ├─ Scheme ────────► Scheme::to_xml ─► stdout ─► exit 0
//!            │                   (no metadata, checkpoint, writer, monitor)
//!            │
//!            ├─ ValidateArgs ──► stdin ─► ValidationDefinition::parse
//!            │                     └─► do_validation(metadata, request)
//!            │                           ├─ Ok  ─► exit 0 (stderr silent)
//!            │                           └─ Err ─► stderr <error><message>…
//!            │                                     ─► exit 1
//!            │
//!            └─ invalid ───────► log ─► exit 1 (nothing touched)
//! ```
//!
//! ## Rules
//! - RunMode cleanup is unconditional: whatever `do_run` returns — or even
//!   if it panics — the event writer is closed and the orphan monitor is
//!   stopped exactly once.
//! - User errors are swallowed at this boundary: one log record, one exit
//!   code, never a crash visible to the host.
//! - SchemeMode touches no invocation state at all.
//!
//! ## Example
//! ```no_run
//! use modinput::{Engine, FnInput, InputSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let input = FnInput::builder("ta_demo", "demo", "Demo input", "Collects demo records")
//!         .settings(InputSettings {
//!             use_kvstore_checkpoint: false,
//!             use_hec_event_writer: false,
//!             ..InputSettings::default()
//!         })
//!         .run(|ctx, inputs| async move {
//!             let writer = ctx.event_writer().await?;
//!             for (name, _stanza) in &inputs {
//!                 writer
//!                     .write(modinput::Event::new(format!("collected from {name}")))
//!                     .await?;
//!             }
//!             Ok(())
//!         })?;
//!
//!     let engine = Engine::new(input)?;
//!     std::process::exit(engine.execute().await);
//! }
//! ```

use std::io::{Read, Write};
use std::sync::Arc;

use quick_xml::escape::escape;

use crate::config::InputSettings;
use crate::core::context::RunContext;
use crate::core::mode::InvocationMode;
use crate::error::ConfigError;
use crate::inputs::{Input, InputDefinition, ValidationDefinition};
use crate::scheme::Scheme;

/// The byte streams one invocation talks to.
///
/// Production code uses [`EngineIo::process`]; tests inject buffers to
/// observe the documented stream outputs.
pub struct EngineIo {
    /// Where the host's payload is read from.
    pub stdin: Box<dyn Read + Send>,
    /// Where the scheme document and classic events go.
    pub stdout: Box<dyn Write + Send>,
    /// Where the validation error document goes.
    pub stderr: Box<dyn Write + Send>,
}

impl EngineIo {
    /// Binds to the real process streams.
    pub fn process() -> Self {
        Self {
            stdin: Box::new(std::io::stdin()),
            stdout: Box::new(std::io::stdout()),
            stderr: Box::new(std::io::stderr()),
        }
    }
}

/// Drives one invocation of a modular input.
pub struct Engine<T: Input> {
    input: Arc<T>,
    settings: InputSettings,
}

impl<T: Input> Engine<T> {
    /// Wraps `input`, checking its identity fields and settings once so
    /// misconfiguration surfaces here instead of deep in execution.
    pub fn new(input: T) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("app", input.app()),
            ("name", input.name()),
            ("title", input.title()),
            ("description", input.description()),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField { field });
            }
        }
        let settings = input.settings();
        settings.validate()?;

        Ok(Self {
            input: Arc::new(input),
            settings,
        })
    }

    /// Executes against the real process arguments and streams, returning
    /// the process exit status (0 success, 1 any failure).
    pub async fn execute(&self) -> i32 {
        let args: Vec<String> = std::env::args().collect();
        self.execute_with(&args, EngineIo::process()).await
    }

    /// Executes with injected arguments and streams.
    pub async fn execute_with(&self, args: &[String], mut io: EngineIo) -> i32 {
        match InvocationMode::from_args(args) {
            Ok(InvocationMode::Run) => self.run_mode(&mut io).await,
            Ok(InvocationMode::Scheme) => self.scheme_mode(&mut io),
            Ok(InvocationMode::ValidateArgs) => self.validate_mode(&mut io).await,
            Err(e) => {
                tracing::error!(input = self.input.name(), error = %e, "invalid invocation");
                1
            }
        }
    }

    async fn run_mode(&self, io: &mut EngineIo) -> i32 {
        let mut payload = String::new();
        if let Err(e) = io.stdin.read_to_string(&mut payload) {
            tracing::error!(input = self.input.name(), error = %e, "failed to read input definition");
            return 1;
        }
        let (metadata, inputs) = match InputDefinition::parse(&payload) {
            Ok(definition) => (definition.metadata, definition.inputs),
            Err(e) => {
                tracing::error!(input = self.input.name(), error = %e, "malformed input definition");
                return 1;
            }
        };

        let ctx = Arc::new(RunContext::new(
            metadata,
            self.input.app().to_string(),
            self.settings.clone(),
        ));

        // Run on a spawned task so even a panic comes back as a value and
        // the cleanup below cannot be skipped.
        let input = Arc::clone(&self.input);
        let run_ctx = Arc::clone(&ctx);
        let outcome = tokio::spawn(async move { input.do_run(run_ctx, inputs).await }).await;

        ctx.release().await;

        match outcome {
            Ok(Ok(())) => {
                tracing::info!(input = self.input.title(), "modular input exited normally");
                0
            }
            Ok(Err(e)) => {
                tracing::error!(
                    input = self.input.name(),
                    error = %e,
                    label = e.as_label(),
                    "modular input exited with error"
                );
                1
            }
            Err(e) => {
                tracing::error!(input = self.input.name(), error = %e, "run operation panicked");
                1
            }
        }
    }

    fn scheme_mode(&self, io: &mut EngineIo) -> i32 {
        let mut scheme = Scheme::new(self.input.title(), self.input.description());
        scheme.use_external_validation = self.settings.use_external_validation;
        scheme.use_single_instance = self.settings.use_single_instance;
        for argument in self.input.extra_arguments() {
            scheme.add_argument(argument);
        }

        let xml = match scheme.to_xml() {
            Ok(xml) => xml,
            Err(e) => {
                tracing::error!(input = self.input.name(), error = %e, "failed to serialize scheme");
                return 1;
            }
        };
        if let Err(e) = io
            .stdout
            .write_all(xml.as_bytes())
            .and_then(|()| io.stdout.flush())
        {
            tracing::error!(input = self.input.name(), error = %e, "failed to emit scheme");
            return 1;
        }
        0
    }

    async fn validate_mode(&self, io: &mut EngineIo) -> i32 {
        let mut payload = String::new();
        if let Err(e) = io.stdin.read_to_string(&mut payload) {
            tracing::error!(input = self.input.name(), error = %e, "failed to read validation definition");
            return self.reject_validation(io, &e.to_string());
        }

        let message = match ValidationDefinition::parse(&payload) {
            Ok(definition) => {
                match self
                    .input
                    .do_validation(&definition.metadata, &definition.request)
                    .await
                {
                    Ok(()) => return 0,
                    Err(e) => e.to_string(),
                }
            }
            Err(e) => e.to_string(),
        };

        tracing::error!(input = self.input.name(), error = %message, "argument validation failed");
        self.reject_validation(io, &message)
    }

    /// Writes the `<error>` document the host expects on a rejected
    /// validation. Always returns 1.
    fn reject_validation(&self, io: &mut EngineIo, message: &str) -> i32 {
        let doc = format!("<error><message>{}</message></error>", escape(message));
        if let Err(e) = io
            .stderr
            .write_all(doc.as_bytes())
            .and_then(|()| io.stderr.flush())
        {
            tracing::error!(input = self.input.name(), error = %e, "failed to emit validation error");
        }
        1
    }
}
