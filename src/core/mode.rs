//! # Invocation mode dispatch.
//!
//! The host orchestrator invokes the input executable in one of three
//! modes, selected by the first process argument:
//!
//! | argv                      | mode                              |
//! |---------------------------|-----------------------------------|
//! | *(none)*                  | [`InvocationMode::Run`]           |
//! | `--scheme`                | [`InvocationMode::Scheme`]        |
//! | `--validate-arguments`    | [`InvocationMode::ValidateArgs`]  |
//!
//! Flag matching is case-insensitive. Anything else is an invalid
//! invocation and the process must exit nonzero without touching any
//! resources.

use thiserror::Error;

/// The three documented invocation modes of a modular input executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// No arguments: read the input definition from stdin and run.
    Run,
    /// `--scheme`: emit the scheme XML to stdout and exit.
    Scheme,
    /// `--validate-arguments`: read a validation request from stdin.
    ValidateArgs,
}

/// The process was invoked with arguments matching no documented mode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid invocation arguments: {args:?}")]
pub struct InvalidInvocation {
    /// The offending arguments (argv[1..]).
    pub args: Vec<String>,
}

impl InvocationMode {
    /// Derives the mode from the full argument vector (including argv[0]).
    ///
    /// Only the first argument participates in mode selection; the host
    /// never passes more.
    pub fn from_args(args: &[String]) -> Result<Self, InvalidInvocation> {
        match args.get(1) {
            None => Ok(InvocationMode::Run),
            Some(flag) if flag.eq_ignore_ascii_case("--scheme") => Ok(InvocationMode::Scheme),
            Some(flag) if flag.eq_ignore_ascii_case("--validate-arguments") => {
                Ok(InvocationMode::ValidateArgs)
            }
            Some(_) => Err(InvalidInvocation {
                args: args[1..].to_vec(),
            }),
        }
    }
}
