// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `DnsProvider`.
//
// ## Behavior
//
// - One HTTP request per trait call, each with a 10 second timeout
// - No retries, no caching; every error propagates to the engine
// - Authentication with the account e-mail and global API key headers
// - The API key never appears in logs or `Debug` output
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=A&name=...`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::REQUEST_TIMEOUT;
use ddns_core::error::{excerpt, in_operation};
use ddns_core::traits::{DnsProvider, HostRecord, UpdateRequest};
use ddns_core::{Error, Result};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Characters of an unparseable body echoed into error messages
const BODY_EXCERPT_CHARS: usize = 200;

/// Envelope shared by every Cloudflare API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: T,
}

/// Error part of an envelope, read only from non-success responses
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    errors: Vec<ApiErrorRecord>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorRecord {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ZoneEntry {
    #[serde(default)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct StoredRecord {
    #[serde(default)]
    content: String,
}

/// Cloudflare DNS provider
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API key.
#[derive(Clone)]
pub struct CloudflareProvider {
    /// HTTP client for API requests
    client: reqwest::Client,

    /// API base URL, without trailing slash
    api_base: String,

    /// Authentication and content-type headers sent on every call
    /// ⚠️ Contains the API key; NEVER log this value
    headers: HeaderMap,

    /// Account e-mail, kept for Debug output
    account: String,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_base", &self.api_base)
            .field("account", &self.account)
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider against the public API
    ///
    /// # Parameters
    ///
    /// - `account`: Cloudflare account e-mail (`X-Auth-Email`)
    /// - `api_key`: Global API key (`X-Auth-Key`)
    pub fn new(account: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_api_base(account, api_key, CLOUDFLARE_API_BASE)
    }

    /// Create a provider talking to `api_base` instead of the public API
    pub fn with_api_base(
        account: impl Into<String>,
        api_key: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self> {
        let account = account.into();
        let api_key = api_key.into();

        if account.is_empty() {
            return Err(Error::config("Cloudflare account cannot be empty"));
        }
        if api_key.is_empty() {
            return Err(Error::config("Cloudflare API key cannot be empty"));
        }

        let mut headers = HeaderMap::new();
        headers.insert("X-Auth-Email", header_value("account", &account)?);
        let mut key = header_value("API key", &api_key)?;
        key.set_sensitive(true);
        headers.insert("X-Auth-Key", key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            headers,
            account,
        })
    }

    /// Send `request` and decode the `result` of a successful response
    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let parsed: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            Error::response_parse(format!(
                "{}. Response: {}",
                e,
                excerpt(&body, BODY_EXCERPT_CHARS)
            ))
        })?;

        Ok(parsed.result)
    }

    async fn get_zone_id(&self, zone_name: &str) -> Result<String> {
        tracing::debug!("Looking up zone ID for zone: {}", zone_name);

        let request = self
            .client
            .get(format!("{}/zones", self.api_base))
            .query(&[("name", zone_name)]);
        let zones: Vec<ZoneEntry> = self.execute(request).await?;

        match zones.into_iter().next() {
            Some(zone) if !zone.id.is_empty() => Ok(zone.id),
            _ => Err(Error::ZoneNotFound(zone_name.to_string())),
        }
    }

    async fn get_host_record(&self, zone_id: &str, host_name: &str) -> Result<HostRecord> {
        tracing::debug!("Looking up A record for host: {}", host_name);

        let request = self
            .client
            .get(format!("{}/zones/{}/dns_records", self.api_base, zone_id))
            .query(&[("type", "A"), ("name", host_name)]);
        let records: Vec<HostRecord> = self.execute(request).await?;

        match records.into_iter().next() {
            Some(record) if !record.id.is_empty() => Ok(record),
            _ => Err(Error::HostNotFound(host_name.to_string())),
        }
    }

    async fn put_record(
        &self,
        zone_id: &str,
        record_id: &str,
        update: &UpdateRequest,
    ) -> Result<()> {
        tracing::debug!(
            "Sending update for {}: content={} ttl={} proxied={}",
            update.name,
            update.content,
            update.ttl,
            update.proxied
        );

        let request = self
            .client
            .put(format!(
                "{}/zones/{}/dns_records/{}",
                self.api_base, zone_id, record_id
            ))
            .json(update);
        let stored: StoredRecord = self.execute(request).await?;

        if stored.content.is_empty() {
            return Err(Error::UpdateResponseMalformed(format!(
                "no content echoed for {}",
                update.name
            )));
        }

        // Check IP on response matches submit
        if stored.content != update.content {
            return Err(Error::UpdateVerification {
                host: update.name.clone(),
                submitted: update.content.clone(),
                stored: stored.content,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn resolve_zone_id(&self, zone_name: &str) -> Result<String> {
        in_operation("resolve_zone_id", self.get_zone_id(zone_name)).await
    }

    async fn resolve_host_record(&self, zone_id: &str, host_name: &str) -> Result<HostRecord> {
        in_operation(
            "resolve_host_record",
            self.get_host_record(zone_id, host_name),
        )
        .await
    }

    async fn submit_update(
        &self,
        zone_id: &str,
        record_id: &str,
        request: &UpdateRequest,
    ) -> Result<()> {
        in_operation(
            "submit_update",
            self.put_record(zone_id, record_id, request),
        )
        .await
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

fn header_value(what: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::config(format!("Cloudflare {} contains invalid characters", what)))
}

/// Summarize the error list of a failed response, falling back to the raw body
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed
            .errors
            .iter()
            .map(|e| format!("{} (code {})", e.message, e.code))
            .collect::<Vec<_>>()
            .join("; "),
        _ => excerpt(body, BODY_EXCERPT_CHARS).to_string(),
    }
}
