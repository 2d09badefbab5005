pub mod config;
pub mod error;
pub mod gateway;
pub mod queries;
pub mod routes;
pub mod store;

use std::sync::Arc;

use config::Config;
use gateway::directory::SessionDirectory;
use gateway::fanout::VoteBroadcast;
use store::Store;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub directory: Arc<SessionDirectory>,
    pub broadcast: Arc<VoteBroadcast>,
}
