//! Benchmark sessions.
//!
//! A [`Session`] bundles everything the engine needs to produce one prepared
//! query: named policy sources, an optional data document, the evaluation
//! [`Target`] (a query expression or a rule path) and an optional input
//! document. Sessions are assembled with
//! [`SessionBuilder`] and never change once built.

pub mod loader;

use crate::{Error, Result};

use serde_json::{Map, Value};
use std::path::Path;

pub use loader::{load_session, SessionSpec};

/// A named policy source fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySource {
    /// Compilation unit name, usually the file path
    pub name: String,
    /// Policy source text
    pub text: String,
}

/// What the engine is asked to evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A query expression, parsed on every evaluation
    Query(String),
    /// A rule path such as `data.example.allow`
    Rule(String),
}

impl Target {
    /// The expression or rule path text.
    pub fn expression(&self) -> &str {
        match self {
            Target::Query(text) | Target::Rule(text) => text,
        }
    }

    /// `"query"` or `"rule"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Query(_) => "query",
            Target::Rule(_) => "rule",
        }
    }
}

/// Immutable inputs for one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    policy_sources: Vec<PolicySource>,
    external_data: Option<Value>,
    target: Target,
    input: Option<Value>,
}

impl Session {
    /// Create a session builder.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Policy sources in the order they were supplied.
    pub fn policy_sources(&self) -> &[PolicySource] {
        &self.policy_sources
    }

    /// Merged data document, if any data file was supplied.
    pub fn external_data(&self) -> Option<&Value> {
        self.external_data.as_ref()
    }

    /// The evaluation target.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The target's expression or rule path text.
    pub fn expression(&self) -> &str {
        self.target.expression()
    }

    /// The input document, if one was supplied.
    pub fn input(&self) -> Option<&Value> {
        self.input.as_ref()
    }
}

/// Structured document encodings recognized by file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.json`
    Json,
    /// `.yaml` or `.yml`
    Yaml,
}

impl DocumentFormat {
    /// Detect the format from a file name suffix.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }

    /// Decode a document in this format.
    pub fn parse(self, text: &str) -> std::result::Result<Value, String> {
        match self {
            DocumentFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// How a `--data` item is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A structured data document merged into the store
    Data(DocumentFormat),
    /// Policy source text keyed by its path
    Policy,
}

impl SourceKind {
    /// Classify a data-designated item by its suffix alone.
    pub fn classify(path: &Path) -> Self {
        match DocumentFormat::from_path(path) {
            Some(format) => SourceKind::Data(format),
            None => SourceKind::Policy,
        }
    }
}

/// Builder for [`Session`].
#[derive(Debug, Default)]
pub struct SessionBuilder {
    policy_sources: Vec<PolicySource>,
    external_data: Option<Map<String, Value>>,
    targets: Vec<Target>,
    input: Option<Value>,
}

impl SessionBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a policy source. Names must be unique.
    pub fn with_policy(mut self, name: impl Into<String>, text: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if self.policy_sources.iter().any(|p| p.name == name) {
            return Err(Error::DuplicatePolicy { name });
        }
        self.policy_sources.push(PolicySource {
            name,
            text: text.into(),
        });
        Ok(self)
    }

    /// Merge a decoded data document into the store.
    ///
    /// Top-level keys replace those of earlier documents. The document root
    /// must be an object.
    pub fn with_data(mut self, origin: &str, document: Value) -> Result<Self> {
        let Value::Object(entries) = document else {
            return Err(Error::malformed_data(origin, "document root must be an object"));
        };
        self.external_data
            .get_or_insert_with(Map::new)
            .extend(entries);
        Ok(self)
    }

    /// Set the input document.
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    /// Add a query expression. Exactly one query or rule is required by
    /// [`build`](Self::build).
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.targets.push(Target::Query(query.into()));
        self
    }

    /// Add a rule path. Counts toward the same single-target requirement as
    /// [`with_query`](Self::with_query).
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.targets.push(Target::Rule(rule.into()));
        self
    }

    /// Check that exactly one non-blank query or rule was supplied.
    pub fn check_arity(&self) -> Result<()> {
        let count = self
            .targets
            .iter()
            .filter(|t| !t.expression().trim().is_empty())
            .count();
        if count != 1 {
            return Err(Error::query_arity(count));
        }
        Ok(())
    }

    /// Build the session.
    pub fn build(self) -> Result<Session> {
        self.check_arity()?;
        let target = self
            .targets
            .into_iter()
            .find(|t| !t.expression().trim().is_empty())
            .ok_or_else(|| Error::query_arity(0))?;

        Ok(Session {
            policy_sources: self.policy_sources,
            external_data: self.external_data.map(Value::Object),
            target,
            input: self.input,
        })
    }
}
