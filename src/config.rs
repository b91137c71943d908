use std::env;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_DEVICE_NAME: &str = "ATMOTUBE";
const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 10;
const DEFAULT_HTTP_BIND_ADDR: &str = "0.0.0.0:8092";

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Advertised local name of the sensor, compared after trimming
    pub device_name: String,
    pub scan_timeout: Duration,
    pub http_bind_addr: SocketAddr,
}

impl MonitorConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup, defaults for missing keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let device_name = lookup("ATMOTUBE_NAME")
            .map(|name| name.trim().to_string())
            .unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_string());
        if device_name.is_empty() {
            return Err("ATMOTUBE_NAME must not be empty".into());
        }

        let scan_timeout_secs = match lookup("SCAN_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("Invalid SCAN_TIMEOUT_SECS '{}': {}", raw, e))?,
            None => DEFAULT_SCAN_TIMEOUT_SECS,
        };
        if scan_timeout_secs == 0 {
            return Err("SCAN_TIMEOUT_SECS must be greater than zero".into());
        }

        let bind_raw = lookup("HTTP_BIND_ADDR").unwrap_or_else(|| DEFAULT_HTTP_BIND_ADDR.to_string());
        let http_bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid HTTP_BIND_ADDR '{}': {}", bind_raw, e))?;

        Ok(MonitorConfig {
            device_name,
            scan_timeout: Duration::from_secs(scan_timeout_secs),
            http_bind_addr,
        })
    }
}
