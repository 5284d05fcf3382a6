//! # Closure-assembled input (`FnInput`)
//!
//! [`FnInput`] builds a complete [`Input`] from closures instead of a
//! dedicated type: the run callback is mandatory, validation and extra
//! arguments are optional. Identity fields are checked for presence when
//! the builder finalizes, so a half-configured input cannot reach the
//! engine.
//!
//! ## Example
//! ```
//! use modinput::{Argument, FnInput, InputSettings, ValidationError};
//!
//! let input = FnInput::builder("ta_demo", "demo", "Demo input", "Collects demo records")
//!     .settings(InputSettings {
//!         use_kvstore_checkpoint: false,
//!         use_hec_event_writer: false,
//!         ..InputSettings::default()
//!     })
//!     .arguments(vec![Argument::new("interval")])
//!     .validate(|_metadata, request| {
//!         match request.parameter("interval") {
//!             Some(v) if v.parse::<u64>().is_ok() => Ok(()),
//!             _ => Err(ValidationError::new("interval must be a positive integer")),
//!         }
//!     })
//!     .run(|_ctx, _inputs| async move { Ok(()) })
//!     .unwrap();
//!
//! assert_eq!(modinput::Input::name(&input), "demo");
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::InputSettings;
use crate::core::RunContext;
use crate::error::{ConfigError, RunError, ValidationError};
use crate::inputs::definition::{HostMetadata, InputSpecSet, ValidationRequest};
use crate::inputs::input::Input;
use crate::scheme::Argument;

type RunFuture = Pin<Box<dyn Future<Output = Result<(), RunError>> + Send>>;
type RunFn = Box<dyn Fn(Arc<RunContext>, InputSpecSet) -> RunFuture + Send + Sync>;
type ValidateFn =
    Box<dyn Fn(&HostMetadata, &ValidationRequest) -> Result<(), ValidationError> + Send + Sync>;

/// Function-backed input implementation.
///
/// Assembled via [`FnInput::builder`]; each `do_run` call produces a fresh
/// future from the stored closure.
pub struct FnInput {
    app: String,
    name: String,
    title: String,
    description: String,
    settings: InputSettings,
    arguments: Vec<Argument>,
    run: RunFn,
    validate: Option<ValidateFn>,
}

impl FnInput {
    /// Starts a builder carrying the input's identity.
    pub fn builder(
        app: impl Into<String>,
        name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> FnInputBuilder {
        FnInputBuilder {
            app: app.into(),
            name: name.into(),
            title: title.into(),
            description: description.into(),
            settings: InputSettings::default(),
            arguments: Vec::new(),
            validate: None,
        }
    }
}

/// Builder for [`FnInput`]; finalized by [`FnInputBuilder::run`].
pub struct FnInputBuilder {
    app: String,
    name: String,
    title: String,
    description: String,
    settings: InputSettings,
    arguments: Vec<Argument>,
    validate: Option<ValidateFn>,
}

impl FnInputBuilder {
    /// Replaces the behavior settings.
    pub fn settings(mut self, settings: InputSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the extra scheme arguments.
    pub fn arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Installs a validation callback for ValidateArgs mode.
    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&HostMetadata, &ValidationRequest) -> Result<(), ValidationError>
            + Send
            + Sync
            + 'static,
    {
        self.validate = Some(Box::new(validate));
        self
    }

    /// Installs the run callback and finalizes the input.
    ///
    /// Fails with [`ConfigError::MissingField`] if any identity field is
    /// empty.
    pub fn run<F, Fut>(self, run: F) -> Result<FnInput, ConfigError>
    where
        F: Fn(Arc<RunContext>, InputSpecSet) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), RunError>> + Send + 'static,
    {
        for (field, value) in [
            ("app", &self.app),
            ("name", &self.name),
            ("title", &self.title),
            ("description", &self.description),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField { field });
            }
        }

        Ok(FnInput {
            app: self.app,
            name: self.name,
            title: self.title,
            description: self.description,
            settings: self.settings,
            arguments: self.arguments,
            run: Box::new(move |ctx, inputs| Box::pin(run(ctx, inputs))),
            validate: self.validate,
        })
    }
}

#[async_trait]
impl Input for FnInput {
    fn app(&self) -> &str {
        &self.app
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn settings(&self) -> InputSettings {
        self.settings.clone()
    }

    fn extra_arguments(&self) -> Vec<Argument> {
        self.arguments.clone()
    }

    async fn do_validation(
        &self,
        metadata: &HostMetadata,
        request: &ValidationRequest,
    ) -> Result<(), ValidationError> {
        match &self.validate {
            Some(validate) => validate(metadata, request),
            None => Ok(()),
        }
    }

    async fn do_run(&self, ctx: Arc<RunContext>, inputs: InputSpecSet) -> Result<(), RunError> {
        (self.run)(ctx, inputs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_empty_identity_fields() {
        let result = FnInput::builder("ta_demo", "demo", "  ", "desc")
            .run(|_ctx, _inputs| async move { Ok(()) });
        assert!(matches!(
            result,
            Err(ConfigError::MissingField { field: "title" })
        ));
    }

    #[tokio::test]
    async fn validation_defaults_to_success() {
        let input = FnInput::builder("ta_demo", "demo", "Demo", "desc")
            .run(|_ctx, _inputs| async move { Ok(()) })
            .unwrap();

        let definition = crate::inputs::definition::ValidationDefinition::parse(
            r#"<items>
  <server_host>h</server_host>
  <server_uri>https://127.0.0.1:8089</server_uri>
  <session_key>k</session_key>
  <checkpoint_dir>/tmp/ckpt</checkpoint_dir>
</items>"#,
        )
        .unwrap();

        assert!(input
            .do_validation(&definition.metadata, &definition.request)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn validate_callback_is_honored() {
        let input = FnInput::builder("ta_demo", "demo", "Demo", "desc")
            .validate(|_m, _r| Err(ValidationError::new("nope")))
            .run(|_ctx, _inputs| async move { Ok(()) })
            .unwrap();

        let definition = crate::inputs::definition::ValidationDefinition::parse(
            r#"<items>
  <server_host>h</server_host>
  <server_uri>https://127.0.0.1:8089</server_uri>
  <session_key>k</session_key>
  <checkpoint_dir>/tmp/ckpt</checkpoint_dir>
</items>"#,
        )
        .unwrap();

        let err = input
            .do_validation(&definition.metadata, &definition.request)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}
