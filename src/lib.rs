use config::Config;
use std::sync::Arc;

use cache::GlucoseStore;

pub mod cache;
pub mod common;
pub mod config;
pub mod error;
pub mod librelink;
pub mod middleware;
pub mod nightscout;
pub mod router;
pub mod routes;
pub mod scheduler;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<GlucoseStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<GlucoseStore>) -> Self {
        Self { config, store }
    }
}
