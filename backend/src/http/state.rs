//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::Environment;
use crate::db::repository::FullRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Controls whether internal error messages reach clients
    pub environment: Environment,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, environment: Environment) -> Self {
        Self {
            repository,
            environment,
        }
    }
}
