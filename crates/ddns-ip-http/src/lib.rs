// # HTTP IP Source
//
// This crate provides the WAN IP source for the DDNS updater.
//
// ## Architecture
//
// Issues one GET to a "what is my IP" service whose entire response body
// is the caller's address, e.g.:
//
// - http://icanhazip.com
// - http://ipinfo.io/ip
// - http://checkip.amazonaws.com/
//
// The trimmed body must be four dot-separated groups of 1-3 digits. This
// is a sanity check on the shape only; octet values are not range-checked.

use ddns_core::config::{DEFAULT_WAN_IP_SOURCE, REQUEST_TIMEOUT};
use ddns_core::error::{excerpt, in_operation};
use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

/// Characters of an unexpected body echoed into the error message
const BODY_EXCERPT_CHARS: usize = 25;

/// HTTP-based WAN IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL returning the bare IP as plain text
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create a source using the default service
    pub fn with_default_url() -> Result<Self> {
        Self::new(DEFAULT_WAN_IP_SOURCE)
    }

    /// Fetch current IP from HTTP service
    async fn fetch_ip(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::resolution(format!("Request to {} failed: {}", self.url, e)))?;

        let body = response
            .text()
            .await
            .map_err(|e| {
                Error::resolution(format!("Failed to read response from {}: {}", self.url, e))
            })?;

        let ip = body.trim();
        if !looks_like_ipv4(ip) {
            return Err(Error::resolution(format!(
                "Response from {} does not look like an IP address: {}",
                self.url,
                excerpt(ip, BODY_EXCERPT_CHARS)
            )));
        }

        Ok(ip.to_string())
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        let ip = in_operation("fetch WAN IP", self.fetch_ip()).await?;
        tracing::debug!("{} reported WAN IP {}", self.url, ip);
        Ok(ip)
    }

    fn source_name(&self) -> &str {
        &self.url
    }
}

/// Whether `text` is exactly four dot-separated groups of 1-3 ASCII digits
pub fn looks_like_ipv4(text: &str) -> bool {
    let mut groups = 0;
    for group in text.split('.') {
        groups += 1;
        if groups > 4 || group.is_empty() || group.len() > 3 {
            return false;
        }
        if !group.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    groups == 4
}
