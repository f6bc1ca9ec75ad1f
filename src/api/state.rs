//! Application state for the Reimbursement Engine API.

use std::sync::Arc;

use crate::engine::ReimbursementEngine;

/// Shared application state.
///
/// Holds the engine and, through it, the immutable policy snapshot every
/// request calculates with.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<ReimbursementEngine>,
}

impl AppState {
    /// Creates a new application state around an engine.
    pub fn new(engine: ReimbursementEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Returns a reference to the engine.
    pub fn engine(&self) -> &ReimbursementEngine {
        &self.engine
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
    fn test_clones_share_engine() {
        let state = AppState::new(ReimbursementEngine::builtin().unwrap());
        let other = state.clone();
        assert!(std::ptr::eq(state.engine(), other.engine()));
    }
}
