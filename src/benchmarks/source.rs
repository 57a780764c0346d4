//! Query sources: where each iteration gets its prepared query from.
//!
//! The loop treats both strategies the same way. [`Cached`] compiles once
//! when constructed, outside any timed region, and hands out the same query
//! every iteration. [`Fresh`] compiles on every request, so the compile cost
//! lands inside the iteration's timed window.

use crate::adapters::{EngineError, PolicyEngine};
use crate::config::Mode;
use crate::session::Session;

/// Supplies an evaluable query for each iteration.
pub trait QuerySource<E: PolicyEngine> {
    /// The mode this source implements.
    fn mode(&self) -> Mode;

    /// Get the prepared query for the next evaluation.
    fn next_query(&mut self, engine: &E) -> Result<&mut E::Prepared, EngineError>;

    /// Drop any per-iteration state. Called outside the timed region so
    /// teardown of a discarded query is never measured.
    fn release(&mut self) {}
}

/// One prepared query reused for the whole run.
pub struct Cached<E: PolicyEngine> {
    prepared: E::Prepared,
}

impl<E: PolicyEngine> Cached<E> {
    /// Compile the session once.
    pub fn prepare(engine: &E, session: &Session) -> Result<Self, EngineError> {
        Ok(Self {
            prepared: engine.compile(session)?,
        })
    }
}

impl<E: PolicyEngine> QuerySource<E> for Cached<E> {
    fn mode(&self) -> Mode {
        Mode::Cached
    }

    fn next_query(&mut self, _engine: &E) -> Result<&mut E::Prepared, EngineError> {
        Ok(&mut self.prepared)
    }
}

/// A newly compiled query for every request.
pub struct Fresh<'s, E: PolicyEngine> {
    session: &'s Session,
    current: Option<E::Prepared>,
}

impl<'s, E: PolicyEngine> Fresh<'s, E> {
    /// Create a source that recompiles `session` on every request.
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            current: None,
        }
    }
}

impl<E: PolicyEngine> QuerySource<E> for Fresh<'_, E> {
    fn mode(&self) -> Mode {
        Mode::Fresh
    }

    fn next_query(&mut self, engine: &E) -> Result<&mut E::Prepared, EngineError> {
        let prepared = engine.compile(self.session)?;
        Ok(self.current.insert(prepared))
    }

    fn release(&mut self) {
        self.current = None;
    }
}
