//! # The modular input seam.
//!
//! [`Input`] is what plugin authors implement. The required methods carry
//! the input's identity (app, name, title, description); the provided
//! methods are the optional hooks: behavior settings, extra scheme
//! arguments, and argument validation. Only `do_run` is mandatory beyond
//! identity — the engine supplies sane defaults for everything else.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::InputSettings;
use crate::core::RunContext;
use crate::error::{RunError, ValidationError};
use crate::inputs::definition::{HostMetadata, InputSpecSet, ValidationRequest};
use crate::scheme::Argument;

/// # A host-orchestrated modular input.
///
/// The engine owns the process lifecycle; the implementation owns the
/// collection logic. `do_run` receives a [`RunContext`] exposing the
/// metadata snapshot, the checkpoint and event-writer capabilities, and
/// the teardown/orphan registration hooks.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use modinput::{Input, InputSettings, InputSpecSet, RunContext, RunError};
///
/// struct DemoInput;
///
/// #[async_trait]
/// impl Input for DemoInput {
///     fn app(&self) -> &str { "ta_demo" }
///     fn name(&self) -> &str { "demo" }
///     fn title(&self) -> &str { "Demo input" }
///     fn description(&self) -> &str { "Collects demo records" }
///
///     fn settings(&self) -> InputSettings {
///         InputSettings {
///             use_kvstore_checkpoint: false,
///             use_hec_event_writer: false,
///             ..InputSettings::default()
///         }
///     }
///
///     async fn do_run(
///         &self,
///         _ctx: Arc<RunContext>,
///         inputs: InputSpecSet,
///     ) -> Result<(), RunError> {
///         for (name, stanza) in &inputs {
///             let _ = (name, stanza.param("interval"));
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Input: Send + Sync + 'static {
    /// App namespace the input belongs to.
    fn app(&self) -> &str;

    /// Stable input name (the stanza kind).
    fn name(&self) -> &str;

    /// Scheme title shown by the host.
    fn title(&self) -> &str;

    /// Scheme description shown by the host.
    fn description(&self) -> &str;

    /// Behavior settings; the default selects the document-store
    /// checkpoint and the HTTP collector writer.
    fn settings(&self) -> InputSettings {
        InputSettings::default()
    }

    /// Extra scheme arguments beyond the host's built-ins. Emission
    /// preserves the returned order.
    fn extra_arguments(&self) -> Vec<Argument> {
        Vec::new()
    }

    /// Validates a proposed parameter set in ValidateArgs mode.
    ///
    /// The default accepts everything. Returning an error rejects the
    /// configuration; its message is surfaced to the operator.
    async fn do_validation(
        &self,
        metadata: &HostMetadata,
        request: &ValidationRequest,
    ) -> Result<(), ValidationError> {
        let _ = (metadata, request);
        Ok(())
    }

    /// Runs the input until collection is done or teardown is requested.
    ///
    /// Invoked exactly once per RunMode invocation with the parsed stanza
    /// set. May run for as long as it needs; honor teardown and orphan
    /// callbacks to exit promptly when asked.
    async fn do_run(&self, ctx: Arc<RunContext>, inputs: InputSpecSet) -> Result<(), RunError>;
}
