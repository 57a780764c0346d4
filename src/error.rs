//! Error types for the profiler.
//!
//! Every error belongs to one class of the taxonomy reported by
//! [`Error::category`], so the CLI can tag messages before display.

use thiserror::Error;

use crate::adapters::EngineError;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the profiler.
#[derive(Error, Debug)]
pub enum Error {
    /// The iteration count was missing or zero
    #[error("num-iterations must be specified and greater than zero")]
    IterationsRequired,

    /// Zero or more than one query or rule was supplied
    #[error("exactly 1 query or rule must be specified, got {count}")]
    QueryArity {
        /// Number of non-empty queries and rules supplied
        count: usize,
    },

    /// Two policy sources share the same name
    #[error("duplicate policy source: {name}")]
    DuplicatePolicy {
        /// The repeated name
        name: String,
    },

    /// A data document could not be decoded
    #[error("malformed data document {path}: {message}")]
    MalformedData {
        /// Path of the data document
        path: String,
        /// Decoder message
        message: String,
    },

    /// The input document could not be decoded
    #[error("malformed input document {path}: {message}")]
    MalformedInput {
        /// Path of the input document
        path: String,
        /// Decoder message
        message: String,
    },

    /// A designated file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that failed
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A report or result could not be written
    #[error("failed to write {path}: {source}")]
    Write {
        /// Path that failed
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serialization of a result set or report failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Compilation or evaluation failure reported by the engine
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Internal error (unexpected condition)
    #[error("Internal error: {message}")]
    Internal {
        /// Detailed error message
        message: String,
    },
}

impl Error {
    /// Create a query arity error.
    pub fn query_arity(count: usize) -> Self {
        Error::QueryArity { count }
    }

    /// Create a malformed data error.
    pub fn malformed_data(path: impl Into<String>, message: impl ToString) -> Self {
        Error::MalformedData {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed input error.
    pub fn malformed_input(path: impl Into<String>, message: impl ToString) -> Self {
        Error::MalformedInput {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a read error.
    pub fn read(path: impl Into<String>, source: std::io::Error) -> Self {
        Error::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a write error.
    pub fn write(path: impl Into<String>, source: std::io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Get the taxonomy class of this error.
    pub fn category(&self) -> &'static str {
        match self {
            Error::IterationsRequired | Error::QueryArity { .. } | Error::DuplicatePolicy { .. } => {
                "configuration"
            }
            Error::MalformedData { .. } | Error::MalformedInput { .. } | Error::Read { .. } => {
                "input"
            }
            Error::Write { .. } | Error::Serialization(_) => "output",
            Error::Engine(_) => "engine",
            Error::Internal { .. } => "internal",
        }
    }

    /// Process exit status for this error. Configuration mistakes share the
    /// usage-error status clap uses.
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            "configuration" => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::EngineStage;

    #[test]
    fn test_error_categories() {
        assert_eq!(Error::IterationsRequired.category(), "configuration");
        assert_eq!(Error::query_arity(2).category(), "configuration");
        assert_eq!(Error::malformed_data("d.json", "eof").category(), "input");
        assert_eq!(Error::malformed_input("i.json", "eof").category(), "input");
        let engine = EngineError::new(EngineStage::Compile, "rego_parse_error");
        assert_eq!(Error::from(engine).category(), "engine");
        let write = Error::write("out/report.json", std::io::Error::other("read-only"));
        assert_eq!(write.category(), "output");
        assert_eq!(Error::internal("subscriber").category(), "internal");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::IterationsRequired.exit_code(), 2);
        assert_eq!(Error::malformed_input("i.json", "eof").exit_code(), 1);
        let engine = EngineError::new(EngineStage::Evaluate, "boom");
        assert_eq!(Error::from(engine).exit_code(), 1);
    }

    #[test]
    fn test_engine_message_forwarded() {
        let err = Error::from(EngineError::new(EngineStage::Compile, "var x is unsafe"));
        assert_eq!(err.to_string(), "var x is unsafe");
    }

    #[test]
    fn test_error_display() {
        let err = Error::query_arity(0);
        assert_eq!(err.to_string(), "exactly 1 query or rule must be specified, got 0");
    }
}
