//! Adapters Module
//!
//! Contains the `PolicyEngine` trait, the narrow contract the benchmark loop
//! consumes, and its implementations.
//!
//! The loop never looks inside a prepared query or a result set: prepared
//! queries are an associated type owned by the engine, and result sets are
//! only required to be serializable so they can be displayed.

pub mod rego;

use crate::session::Session;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub use rego::RegoEngine;

/// Which engine call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStage {
    /// Turning a session into a prepared query
    Compile,
    /// Converting an input document into the engine's representation
    Input,
    /// Evaluating a prepared query
    Evaluate,
}

impl fmt::Display for EngineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineStage::Compile => write!(f, "compile"),
            EngineStage::Input => write!(f, "input"),
            EngineStage::Evaluate => write!(f, "evaluate"),
        }
    }
}

/// Failure reported by the engine. Displays exactly the engine's message;
/// the failing call is kept in `stage`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    /// Which call failed
    pub stage: EngineStage,
    /// Engine-provided message
    pub message: String,
}

impl EngineError {
    /// Create an engine error.
    pub fn new(stage: EngineStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Policy evaluation engine contract.
///
/// All calls are synchronous and may be repeated any number of times.
/// `evaluate` takes the prepared query mutably because engines commonly
/// stage the input inside it; the benchmark loop never shares a prepared
/// query across threads.
///
/// # Example
///
/// ```rust
/// use policy_profile::adapters::{EngineError, PolicyEngine};
/// use policy_profile::session::Session;
///
/// struct Echo;
///
/// impl PolicyEngine for Echo {
///     type Prepared = String;
///     type Input = serde_json::Value;
///     type Output = serde_json::Value;
///
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     fn compile(&self, session: &Session) -> Result<String, EngineError> {
///         Ok(session.expression().to_string())
///     }
///
///     fn prepare_input(
///         &self,
///         document: Option<&serde_json::Value>,
///     ) -> Result<serde_json::Value, EngineError> {
///         Ok(document.cloned().unwrap_or(serde_json::Value::Null))
///     }
///
///     fn evaluate(
///         &self,
///         _query: &mut String,
///         input: &serde_json::Value,
///     ) -> Result<serde_json::Value, EngineError> {
///         Ok(input.clone())
///     }
/// }
/// ```
pub trait PolicyEngine {
    /// Compiled, ready-to-evaluate query bound to one session.
    type Prepared;
    /// Engine representation of an input document.
    type Input;
    /// Result set, opaque to the loop.
    type Output: Serialize;

    /// Short engine identifier used in reports.
    fn name(&self) -> &str;

    /// Compile the session's policy sources, data and query.
    fn compile(&self, session: &Session) -> Result<Self::Prepared, EngineError>;

    /// Convert an input document. `None` means no input was supplied.
    fn prepare_input(
        &self,
        document: Option<&serde_json::Value>,
    ) -> Result<Self::Input, EngineError>;

    /// Evaluate a prepared query against an input.
    fn evaluate(
        &self,
        query: &mut Self::Prepared,
        input: &Self::Input,
    ) -> Result<Self::Output, EngineError>;
}
