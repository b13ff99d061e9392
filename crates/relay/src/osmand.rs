use eyre::{Result as EyreResult, WrapErr};
use reqwest::{redirect::Policy, Client, ClientBuilder};
use tracing::info;

use crate::{
    config::parse_base_url,
    error::{RelayError, Result},
    position::PositionParams,
};

/// Path of the OsmAnd position endpoint, relative to the Traccar base URL
pub const POSITIONS_PATH: &str = "/api/positions";

/// Idle keep-alive connections kept per Traccar host
const MAX_IDLE_PER_HOST: usize = 10;

/// Client for the Traccar OsmAnd protocol
#[derive(Debug, Clone)]
pub struct OsmAndClient {
    client: Client,
    positions_url: String,
}

impl OsmAndClient {
    /// Create a client for the given Traccar base URL.
    ///
    /// Redirects are not followed, so each report is exactly one request.
    pub fn new(base_url: &str) -> EyreResult<Self> {
        parse_base_url(base_url)?;

        let client = ClientBuilder::new()
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .redirect(Policy::none())
            .build()
            .wrap_err("Failed to create HTTP client")?;

        let positions_url = format!("{}{}", base_url.trim_end_matches('/'), POSITIONS_PATH);
        Ok(Self { client, positions_url })
    }

    pub fn positions_url(&self) -> &str {
        &self.positions_url
    }

    /// Send one position report. Any status outside 2xx is an error.
    pub async fn send_position(&self, params: &PositionParams) -> Result<()> {
        info!(url = %self.positions_url, params = %params, "Forwarding position to Traccar");

        let response = self
            .client
            .get(&self.positions_url)
            .query(&params.to_query())
            .send()
            .await
            .map_err(|source| RelayError::Forward { url: self.positions_url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::ForwardStatus { url: self.positions_url.clone(), status });
        }

        Ok(())
    }
}
