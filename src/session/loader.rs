//! Session loading from the file system.
//!
//! Reads the designated files, decodes structured documents and hands
//! everything to [`SessionBuilder`]. Nothing here is timed.

use super::{DocumentFormat, Session, SessionBuilder, SourceKind};
use crate::{Error, Result};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files and queries designated on the command line.
#[derive(Debug, Clone, Default)]
pub struct SessionSpec {
    /// Policy sources and data documents, classified by suffix
    pub data: Vec<PathBuf>,
    /// Optional input document
    pub input: Option<PathBuf>,
    /// Query expressions
    pub queries: Vec<String>,
    /// Rule path; together with `queries`, exactly one target must be non-empty
    pub rule: Option<String>,
}

/// Load a session from the designated files.
pub async fn load_session(spec: &SessionSpec) -> Result<Session> {
    let mut builder = SessionBuilder::new();

    for path in &spec.data {
        let origin = path.display().to_string();
        let contents = read_file(path).await?;

        builder = match SourceKind::classify(path) {
            SourceKind::Data(format) => {
                debug!(path = %origin, ?format, "merging data document");
                let document = format
                    .parse(&contents)
                    .map_err(|e| Error::malformed_data(&origin, e))?;
                builder.with_data(&origin, document)?
            }
            SourceKind::Policy => {
                debug!(path = %origin, bytes = contents.len(), "adding policy source");
                builder.with_policy(origin, contents)?
            }
        };
    }

    for query in &spec.queries {
        builder = builder.with_query(query.clone());
    }
    if let Some(rule) = &spec.rule {
        builder = builder.with_rule(rule.clone());
    }
    builder.check_arity()?;

    if let Some(path) = &spec.input {
        builder = builder.with_input(load_input(path).await?);
    }

    let session = builder.build()?;
    info!(
        policies = session.policy_sources().len(),
        data = session.external_data().is_some(),
        input = session.input().is_some(),
        target = session.target().kind(),
        expression = session.expression(),
        "Session loaded"
    );
    Ok(session)
}

async fn load_input(path: &Path) -> Result<serde_json::Value> {
    let origin = path.display().to_string();
    let contents = read_file(path).await?;
    // Input documents without a recognized suffix are read as JSON.
    let format = DocumentFormat::from_path(path).unwrap_or(DocumentFormat::Json);
    format
        .parse(&contents)
        .map_err(|e| Error::malformed_input(origin, e))
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::read(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_full_session() {
        let dir = TempDir::new().unwrap();
        let policy = write(&dir, "example.rego", "package example\n\ndefault allow = true\n");
        let data = write(&dir, "data.json", r#"{"roles": {"alice": "admin"}}"#);
        let more = write(&dir, "more.yaml", "limits:\n  max: 3\n");
        let input = write(&dir, "input.json", r#"{"x": 1}"#);

        let spec = SessionSpec {
            data: vec![policy.clone(), data, more],
            input: Some(input),
            queries: vec!["data.example.allow".to_string()],
            rule: None,
        };
        let session = load_session(&spec).await.unwrap();

        assert_eq!(session.policy_sources().len(), 1);
        assert_eq!(session.policy_sources()[0].name, policy.display().to_string());
        assert_eq!(
            session.external_data(),
            Some(&json!({"roles": {"alice": "admin"}, "limits": {"max": 3}}))
        );
        assert_eq!(session.input(), Some(&json!({"x": 1})));
        assert_eq!(session.expression(), "data.example.allow");
    }

    #[tokio::test]
    async fn test_no_policies_is_valid() {
        let spec = SessionSpec {
            queries: vec!["1 + 1 == 2".to_string()],
            ..Default::default()
        };
        let session = load_session(&spec).await.unwrap();
        assert!(session.policy_sources().is_empty());
        assert!(session.input().is_none());
    }

    #[tokio::test]
    async fn test_malformed_data() {
        let dir = TempDir::new().unwrap();
        let data = write(&dir, "broken.json", "{\"a\": ");
        let spec = SessionSpec {
            data: vec![data],
            queries: vec!["data.a".to_string()],
            ..Default::default()
        };
        let err = load_session(&spec).await.unwrap_err();
        assert!(matches!(err, Error::MalformedData { .. }));
        assert_eq!(err.category(), "input");
    }

    #[tokio::test]
    async fn test_malformed_input() {
        let dir = TempDir::new().unwrap();
        let input = write(&dir, "input.json", "[1, 2");
        let spec = SessionSpec {
            input: Some(input),
            queries: vec!["input".to_string()],
            ..Default::default()
        };
        let err = load_session(&spec).await.unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let spec = SessionSpec {
            data: vec![dir.path().join("absent.rego")],
            queries: vec!["data.x".to_string()],
            ..Default::default()
        };
        let err = load_session(&spec).await.unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[tokio::test]
    async fn test_query_arity() {
        let none = load_session(&SessionSpec::default()).await.unwrap_err();
        assert!(matches!(none, Error::QueryArity { count: 0 }));

        let spec = SessionSpec {
            queries: vec!["data.a".to_string(), "data.b".to_string()],
            ..Default::default()
        };
        let two = load_session(&spec).await.unwrap_err();
        assert!(matches!(two, Error::QueryArity { count: 2 }));
    }

    #[tokio::test]
    async fn test_arity_reported_before_input() {
        let dir = TempDir::new().unwrap();
        let input = write(&dir, "input.json", "{\"x\": ");
        let spec = SessionSpec {
            input: Some(input),
            queries: vec!["data.a".to_string(), "data.b".to_string()],
            ..Default::default()
        };
        let err = load_session(&spec).await.unwrap_err();
        assert!(matches!(err, Error::QueryArity { count: 2 }));
    }

    #[tokio::test]
    async fn test_rule_counts_as_target() {
        let rule_only = SessionSpec {
            rule: Some("data.example.allow".to_string()),
            ..Default::default()
        };
        let session = load_session(&rule_only).await.unwrap();
        assert_eq!(session.target().kind(), "rule");

        let both = SessionSpec {
            queries: vec!["data.example.allow".to_string()],
            rule: Some("data.example.allow".to_string()),
            ..Default::default()
        };
        let err = load_session(&both).await.unwrap_err();
        assert!(matches!(err, Error::QueryArity { count: 2 }));
    }
}
