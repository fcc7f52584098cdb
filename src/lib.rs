//! Crate entrypoint wiring together configuration, the user store, and APIs.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod validation;

use config::AppConfig;
use db::UserStore;

use std::sync::Arc;

/// Complete application dependencies shared across handlers.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn UserStore>) -> Self {
        Self { config, store }
    }
}

/// Arc-wrapped version of `AppState` passed into Axum extensions.
pub type SharedState = Arc<AppState>;
