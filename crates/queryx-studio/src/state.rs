use crate::config::StudioConfig;
use queryx_client::Client;
use std::sync::Arc;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<Client>,
    pub config: StudioConfig,
}

impl AppState {
    pub fn new(config: StudioConfig) -> queryx_client::Result<Self> {
        let client = Client::new(config.client_config())?;
        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }
}
