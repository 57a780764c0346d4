//! Rego engine adapter backed by `regorus`.

use super::{EngineError, EngineStage, PolicyEngine};
use crate::session::{Session, Target};

use regorus::{Engine, QueryResults, Value};
use serde::Serialize;

/// A regorus engine loaded with one session's policies and data.
pub struct PreparedRego {
    engine: Engine,
    target: Target,
}

/// Result of one evaluation: query results, or the value of a rule.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RegoOutput {
    /// Bindings and expression values of a query
    Query(QueryResults),
    /// Value the rule evaluated to
    Rule(Value),
}

/// [`PolicyEngine`] implementation for Rego policies.
#[derive(Debug, Clone, Default)]
pub struct RegoEngine {
    enable_tracing: bool,
}

impl RegoEngine {
    /// Create a new adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable regorus print/trace collection during evaluation.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

fn engine_error(stage: EngineStage, err: anyhow::Error) -> EngineError {
    EngineError::new(stage, format!("{err:#}"))
}

fn to_rego_value(stage: EngineStage, document: &serde_json::Value) -> Result<Value, EngineError> {
    let json = serde_json::to_string(document).map_err(|e| EngineError::new(stage, e.to_string()))?;
    Value::from_json_str(&json).map_err(|e| engine_error(stage, e))
}

impl PolicyEngine for RegoEngine {
    type Prepared = PreparedRego;
    type Input = Value;
    type Output = RegoOutput;

    fn name(&self) -> &str {
        "regorus"
    }

    fn compile(&self, session: &Session) -> Result<PreparedRego, EngineError> {
        let mut engine = Engine::new();

        for source in session.policy_sources() {
            engine
                .add_policy(source.name.clone(), source.text.clone())
                .map_err(|e| engine_error(EngineStage::Compile, e))?;
        }

        if let Some(data) = session.external_data() {
            let data = to_rego_value(EngineStage::Compile, data)?;
            engine
                .add_data(data)
                .map_err(|e| engine_error(EngineStage::Compile, e))?;
        }

        Ok(PreparedRego {
            engine,
            target: session.target().clone(),
        })
    }

    fn prepare_input(&self, document: Option<&serde_json::Value>) -> Result<Value, EngineError> {
        match document {
            Some(document) => to_rego_value(EngineStage::Input, document),
            None => Ok(Value::new_object()),
        }
    }

    fn evaluate(&self, query: &mut PreparedRego, input: &Value) -> Result<RegoOutput, EngineError> {
        query.engine.set_input(input.clone());
        let output = match &query.target {
            Target::Query(text) => query
                .engine
                .eval_query(text.clone(), self.enable_tracing)
                .map(RegoOutput::Query),
            Target::Rule(path) => query.engine.eval_rule(path.clone()).map(RegoOutput::Rule),
        };
        output.map_err(|e| engine_error(EngineStage::Evaluate, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EXAMPLE: &str = r#"package example

default allow = false

allow {
    input.x == 1
}
"#;

    fn contains_bool(value: &serde_json::Value, wanted: bool) -> bool {
        match value {
            serde_json::Value::Bool(b) => *b == wanted,
            serde_json::Value::Array(items) => items.iter().any(|v| contains_bool(v, wanted)),
            serde_json::Value::Object(map) => map.values().any(|v| contains_bool(v, wanted)),
            _ => false,
        }
    }

    fn example_session() -> Session {
        Session::builder()
            .with_policy("example.rego", EXAMPLE)
            .unwrap()
            .with_input(json!({"x": 1}))
            .with_query("data.example.allow")
            .build()
            .unwrap()
    }

    #[test]
    fn test_evaluate_example_policy() {
        let engine = RegoEngine::new();
        let session = example_session();
        let mut prepared = engine.compile(&session).unwrap();
        let input = engine.prepare_input(session.input()).unwrap();

        let results = engine.evaluate(&mut prepared, &input).unwrap();
        let rendered = serde_json::to_value(&results).unwrap();
        assert!(contains_bool(&rendered, true));
    }

    #[test]
    fn test_input_changes_result() {
        let engine = RegoEngine::new();
        let session = example_session();
        let mut prepared = engine.compile(&session).unwrap();
        let input = engine.prepare_input(Some(&json!({"x": 2}))).unwrap();

        let results = engine.evaluate(&mut prepared, &input).unwrap();
        let rendered = serde_json::to_value(&results).unwrap();
        assert!(contains_bool(&rendered, false));
        assert!(!contains_bool(&rendered, true));
    }

    #[test]
    fn test_data_document_queryable() {
        let engine = RegoEngine::new();
        let session = Session::builder()
            .with_data("data.json", json!({"limits": {"max": 7}}))
            .unwrap()
            .with_query("data.limits.max == 7")
            .build()
            .unwrap();
        let mut prepared = engine.compile(&session).unwrap();
        let input = engine.prepare_input(None).unwrap();

        let results = engine.evaluate(&mut prepared, &input).unwrap();
        assert!(contains_bool(&serde_json::to_value(&results).unwrap(), true));
    }

    #[test]
    fn test_tracing_enabled_evaluates() {
        let engine = RegoEngine::new().with_tracing(true);
        let session = example_session();
        let mut prepared = engine.compile(&session).unwrap();
        let input = engine.prepare_input(session.input()).unwrap();

        assert!(engine.evaluate(&mut prepared, &input).is_ok());
    }

    #[test]
    fn test_rule_evaluates_to_value() {
        let engine = RegoEngine::new();
        let session = Session::builder()
            .with_policy("example.rego", EXAMPLE)
            .unwrap()
            .with_input(json!({"x": 1}))
            .with_rule("data.example.allow")
            .build()
            .unwrap();
        let mut prepared = engine.compile(&session).unwrap();

        let input = engine.prepare_input(session.input()).unwrap();
        let output = engine.evaluate(&mut prepared, &input).unwrap();
        assert!(matches!(output, RegoOutput::Rule(_)));
        assert_eq!(serde_json::to_value(&output).unwrap(), json!(true));

        let other = engine.prepare_input(Some(&json!({"x": 3}))).unwrap();
        let output = engine.evaluate(&mut prepared, &other).unwrap();
        assert_eq!(serde_json::to_value(&output).unwrap(), json!(false));
    }

    #[test]
    fn test_compile_error_reported() {
        let engine = RegoEngine::new();
        let session = Session::builder()
            .with_policy("broken.rego", "package broken\n\nallow {{{\n")
            .unwrap()
            .with_query("data.broken.allow")
            .build()
            .unwrap();

        let err = engine.compile(&session).err().unwrap();
        assert_eq!(err.stage, EngineStage::Compile);
        assert!(!err.message.is_empty());
    }
}
