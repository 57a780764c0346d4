//! Run configuration.

use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// How the prepared query is obtained for each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Prepare once before timing; each iteration times evaluation only.
    #[default]
    Cached,
    /// Prepare anew in every iteration; timing covers preparation and evaluation.
    Fresh,
}

impl Mode {
    /// Map the `--fresh-query` flag onto a mode.
    pub fn from_fresh_flag(fresh: bool) -> Self {
        if fresh {
            Mode::Fresh
        } else {
            Mode::Cached
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Cached => write!(f, "cached"),
            Mode::Fresh => write!(f, "fresh"),
        }
    }
}

/// Validated benchmark run configuration.
///
/// The iteration count is guaranteed positive, so the aggregate mean is
/// always well defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    iterations: NonZeroUsize,
    mode: Mode,
    show_output: bool,
}

impl RunConfig {
    /// Create a configuration. A missing or zero iteration count is rejected.
    pub fn new(iterations: Option<usize>) -> Result<Self> {
        let iterations = iterations
            .and_then(NonZeroUsize::new)
            .ok_or(Error::IterationsRequired)?;

        Ok(Self {
            iterations,
            mode: Mode::default(),
            show_output: false,
        })
    }

    /// Select the preparation mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Retain and display the final iteration's result set.
    pub fn with_show_output(mut self, show_output: bool) -> Self {
        self.show_output = show_output;
        self
    }

    /// Number of timed iterations.
    pub fn iterations(&self) -> usize {
        self.iterations.get()
    }

    /// Preparation mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the final result set is retained for display.
    pub fn show_output(&self) -> bool {
        self.show_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterations_required() {
        assert!(matches!(RunConfig::new(None), Err(Error::IterationsRequired)));
        assert!(matches!(RunConfig::new(Some(0)), Err(Error::IterationsRequired)));
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::new(Some(10)).unwrap();
        assert_eq!(config.iterations(), 10);
        assert_eq!(config.mode(), Mode::Cached);
        assert!(!config.show_output());
    }

    #[test]
    fn test_builder_overrides() {
        let config = RunConfig::new(Some(3))
            .unwrap()
            .with_mode(Mode::from_fresh_flag(true))
            .with_show_output(true);
        assert_eq!(config.mode(), Mode::Fresh);
        assert!(config.show_output());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Cached.to_string(), "cached");
        assert_eq!(Mode::Fresh.to_string(), "fresh");
        assert_eq!(serde_json::to_string(&Mode::Fresh).unwrap(), "\"fresh\"");
    }
}
