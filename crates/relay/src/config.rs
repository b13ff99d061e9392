use std::net::SocketAddr;

use clap::{Args, Parser};
use eyre::{bail, eyre, Result};
use url::Url;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_KEY_LONGITUDE: &str = "longitude";
pub const DEFAULT_KEY_LATITUDE: &str = "latitude";
pub const DEFAULT_KEY_BATTERY: &str = "battery";

/// Process-wide relay configuration, read once at start-up from the
/// environment (or the equivalent command line flags).
#[derive(Debug, Clone, Parser)]
#[command(name = "ttn-osmand-relay")]
#[command(about = "Forward TTN uplink webhooks to a Traccar OsmAnd endpoint", long_about = None)]
pub struct RelayConfig {
    /// Base URL of the Traccar server receiving OsmAnd position updates
    #[arg(long, env = "TRACCAR_OSMAND_URL")]
    pub traccar_osmand_url: String,

    /// Username TTN must present on the webhook
    #[arg(long, env = "TTN_WEBHOOK_USERNAME")]
    pub ttn_webhook_username: String,

    /// Password TTN must present on the webhook
    #[arg(long, env = "TTN_WEBHOOK_PASSWORD", hide_env_values = true)]
    pub ttn_webhook_password: String,

    #[command(flatten)]
    pub payload_keys: PayloadKeys,

    /// Socket address the webhook server binds to
    #[arg(long, env = "RELAY_LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,
}

/// Names of the decoded payload fields holding telemetry values.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct PayloadKeys {
    /// Decoded payload key carrying the longitude
    #[arg(
        long = "payload-key-longitude",
        env = "PAYLOAD_KEY_LONGITUDE",
        default_value = DEFAULT_KEY_LONGITUDE
    )]
    pub longitude: String,

    /// Decoded payload key carrying the latitude
    #[arg(
        long = "payload-key-latitude",
        env = "PAYLOAD_KEY_LATITUDE",
        default_value = DEFAULT_KEY_LATITUDE
    )]
    pub latitude: String,

    /// Decoded payload key carrying the battery level
    #[arg(
        long = "payload-key-battery",
        env = "PAYLOAD_KEY_BATTERY",
        default_value = DEFAULT_KEY_BATTERY
    )]
    pub battery: String,
}

impl Default for PayloadKeys {
    fn default() -> Self {
        Self {
            longitude: DEFAULT_KEY_LONGITUDE.to_string(),
            latitude: DEFAULT_KEY_LATITUDE.to_string(),
            battery: DEFAULT_KEY_BATTERY.to_string(),
        }
    }
}

impl RelayConfig {
    /// Build a configuration with default payload keys and listen address
    pub fn new(
        traccar_osmand_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            traccar_osmand_url: traccar_osmand_url.into(),
            ttn_webhook_username: username.into(),
            ttn_webhook_password: password.into(),
            payload_keys: PayloadKeys::default(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.ttn_webhook_username.is_empty() || self.ttn_webhook_password.is_empty() {
            bail!("TTN_WEBHOOK_USERNAME and TTN_WEBHOOK_PASSWORD must be set");
        }

        parse_base_url(&self.traccar_osmand_url)
            .map_err(|e| eyre!("Invalid TRACCAR_OSMAND_URL: {}", e))?;

        let keys = &self.payload_keys;
        if keys.longitude.is_empty() || keys.latitude.is_empty() || keys.battery.is_empty() {
            bail!("Payload keys must not be empty");
        }

        Ok(())
    }
}

/// Parse the Traccar base URL
///
/// # Errors
///
/// Returns an error if:
/// - The URL is empty or cannot be parsed
/// - The scheme is neither `http` nor `https`
/// - The URL has no host
pub fn parse_base_url(url: &str) -> Result<Url> {
    if url.is_empty() {
        bail!("URL must be set");
    }

    let parsed = Url::parse(url).map_err(|e| eyre!("Failed to parse URL '{url}': {e}"))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("URL '{url}' must use the http or https scheme");
    }

    if parsed.host_str().is_none() {
        bail!("URL '{url}' has no host");
    }

    Ok(parsed)
}
