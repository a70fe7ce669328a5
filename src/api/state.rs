//! Application state for the Promotion Allocation Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::ports::memory::{MemoryAuditSink, MemoryLedger};

/// Shared application state.
///
/// Contains the loaded scale configuration, the step increment ledger that
/// makes repeated increments for a period no-ops, and the audit sink that
/// keeps every run's outcome.
#[derive(Clone)]
pub struct AppState {
    /// The loaded scale configuration.
    config: Arc<ConfigLoader>,
    ledger: Arc<Mutex<MemoryLedger>>,
    audit: Arc<Mutex<MemoryAuditSink>>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
            ledger: Arc::new(Mutex::new(MemoryLedger::new())),
            audit: Arc::new(Mutex::new(MemoryAuditSink::default())),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Locks the step increment ledger.
    pub fn ledger(&self) -> EngineResult<MutexGuard<'_, MemoryLedger>> {
        self.ledger.lock().map_err(|_| poisoned("increment ledger"))
    }

    /// Locks the audit sink.
    pub fn audit(&self) -> EngineResult<MutexGuard<'_, MemoryAuditSink>> {
        self.audit.lock().map_err(|_| poisoned("audit sink"))
    }
}

fn poisoned(collaborator: &str) -> EngineError {
    EngineError::CollaboratorError {
        collaborator: collaborator.to_string(),
        message: "lock poisoned".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_ledger() {
        use crate::ports::IncrementLedger;

        let state = AppState::new(ConfigLoader::load("./config/conraiss").unwrap());
        let clone = state.clone();

        clone.ledger().unwrap().commit_period("2025", &[]).unwrap();
        assert!(state.ledger().unwrap().is_period_processed("2025").unwrap());
        assert_eq!(Arc::strong_count(&state.ledger), 2);
    }
}
