// # DNS Provider Trait
//
// Defines the three remote operations the updater needs from a DNS
// provider: find the zone, find a host's A record, and replace its content.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, UpdateRequest};
//
// let zone_id = provider.resolve_zone_id("example.com").await?;
// let record = provider.resolve_host_record(&zone_id, "home.example.com").await?;
// let request = UpdateRequest::for_record("home.example.com", "1.2.3.4", &record);
// provider.submit_update(&zone_id, &record.id, &request).await?;
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The provider's live A record for one host
///
/// Fetched fresh on every run. `ttl` and `proxied` are echoed back
/// unchanged on update so manual edits made at the provider survive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Provider record identifier (empty when the provider omitted it)
    #[serde(default)]
    pub id: String,
    /// Time-to-live in seconds (1 means "automatic" at Cloudflare)
    pub ttl: u32,
    /// Whether traffic is routed through the provider's proxy
    #[serde(default)]
    pub proxied: bool,
}

/// Outbound payload replacing the content of an A record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Always "A"
    #[serde(rename = "type")]
    pub record_type: String,
    /// Host name of the record
    pub name: String,
    /// New IPv4 address
    pub content: String,
    /// Copied from the fetched record
    pub ttl: u32,
    /// Copied from the fetched record
    pub proxied: bool,
}

impl UpdateRequest {
    /// Build the update for `host`, carrying over the record's ttl and proxied flag
    pub fn for_record(host: impl Into<String>, ip: impl Into<String>, record: &HostRecord) -> Self {
        Self {
            record_type: "A".to_string(),
            name: host.into(),
            content: ip.into(),
            ttl: record.ttl,
            proxied: record.proxied,
        }
    }
}

/// Trait for DNS provider implementations
///
/// Each method is a single authenticated request with its own timeout.
/// Providers must not retry, cache, or decide whether an update is
/// needed; all of that belongs to `DdnsEngine`.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Resolve the identifier of the zone called `zone_name`
    ///
    /// Only the first match is used. Fails with `ZoneNotFound` when the
    /// provider returns no zone or an empty identifier.
    async fn resolve_zone_id(&self, zone_name: &str) -> Result<String, crate::Error>;

    /// Resolve the A record called `host_name` inside `zone_id`
    ///
    /// Only the first match is used. Fails with `HostNotFound` when the
    /// provider returns no record or an empty identifier.
    async fn resolve_host_record(
        &self,
        zone_id: &str,
        host_name: &str,
    ) -> Result<HostRecord, crate::Error>;

    /// Replace the record `record_id` in `zone_id` with `request`
    ///
    /// Succeeds only when the provider echoes back exactly the submitted
    /// content. An empty echo is `UpdateResponseMalformed`, a different
    /// one is `UpdateVerification`.
    async fn submit_update(
        &self,
        zone_id: &str,
        record_id: &str,
        request: &UpdateRequest,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_copies_record_flags() {
        let record = HostRecord {
            id: "rec2".to_string(),
            ttl: 300,
            proxied: true,
        };

        let request = UpdateRequest::for_record("nas", "1.2.3.5", &record);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "type": "A",
                "name": "nas",
                "content": "1.2.3.5",
                "ttl": 300,
                "proxied": true,
            })
        );
    }

    #[test]
    fn host_record_defaults_proxied_to_false() {
        let record: HostRecord =
            serde_json::from_str(r#"{"id":"rec1","ttl":1,"name":"home"}"#).unwrap();
        assert_eq!(
            record,
            HostRecord {
                id: "rec1".to_string(),
                ttl: 1,
                proxied: false,
            }
        );
    }

    #[test]
    fn host_record_without_id_has_empty_id() {
        let record: HostRecord = serde_json::from_str(r#"{"ttl":120}"#).unwrap();
        assert!(record.id.is_empty());
        assert_eq!(record.ttl, 120);
    }
}
