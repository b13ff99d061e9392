use std::sync::Arc;

use eyre::Result;

use crate::{config::RelayConfig, osmand::OsmAndClient};

/// Application state shared across webhook handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub osmand: OsmAndClient,
}

impl AppState {
    /// Create a new AppState instance
    pub fn new(config: Arc<RelayConfig>) -> Result<Self> {
        let osmand = OsmAndClient::new(&config.traccar_osmand_url)?;
        Ok(Self { config, osmand })
    }
}
