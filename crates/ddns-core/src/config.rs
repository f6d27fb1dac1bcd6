//! Configuration types for the DDNS updater
//!
//! The binary parses flags into these structures; nothing in the library
//! reads process-wide state.

use std::time::Duration;

/// Default file name for the persisted state, relative to the working directory
pub const DEFAULT_STATE_FILE: &str = "cloudflare-ddns-saved.json";

/// Default WAN IP service (returns the bare IP as the whole body)
pub const DEFAULT_WAN_IP_SOURCE: &str = "http://icanhazip.com";

/// Timeout applied independently to every remote call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// What a single run updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    /// Name of the zone holding every host below (e.g. "example.com")
    pub zone_name: String,

    /// Host names to update, in order
    pub hosts: Vec<String>,
}

impl UpdaterConfig {
    /// Create a configuration for `zone_name` with no hosts yet
    pub fn new(zone_name: impl Into<String>) -> Self {
        Self {
            zone_name: zone_name.into(),
            hosts: Vec::new(),
        }
    }

    /// Append a host name
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.hosts.push(host.into());
        self
    }

    /// Append several host names, keeping their order
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts.extend(hosts.into_iter().map(Into::into));
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone_name.trim().is_empty() {
            return Err(crate::Error::config("Zone name cannot be empty"));
        }

        if self.hosts.is_empty() {
            return Err(crate::Error::config("At least one host is required"));
        }

        if self.hosts.iter().any(|h| h.trim().is_empty()) {
            return Err(crate::Error::config("Host names cannot be empty"));
        }

        Ok(())
    }
}
