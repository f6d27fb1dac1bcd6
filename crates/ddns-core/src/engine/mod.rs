//! Core DDNS engine
//!
//! The DdnsEngine performs one complete check-and-update cycle:
//! - Resolve the current WAN IP via IpSource
//! - Compare it with the last applied IP from StateStore
//! - Update every configured host via DnsProvider
//! - Persist the new state only after every host succeeded
//!
//! ## Flow
//!
//! ```text
//! IpSource::current ──► StateStore::load ──► unchanged? ──yes──► done
//!                                                │
//!                                                no
//!                                                ▼
//!                         DnsProvider::resolve_zone_id (skipped if cached)
//!                                                │
//!                           for each host, in order:
//!                             DnsProvider::resolve_host_record
//!                             DnsProvider::submit_update
//!                                                │
//!                                                ▼
//!                                       StateStore::save
//! ```
//!
//! Any failure aborts the cycle immediately. Because the state is written
//! last, a partial failure leaves the previous baseline in place and the
//! next run retries every host.

use crate::config::UpdaterConfig;
use crate::error::Result;
use crate::traits::{DnsProvider, IpSource, PersistedState, StateStore, UpdateRequest};
use tracing::{debug, info};

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The WAN IP matched the persisted one; no provider calls were made
    Unchanged {
        /// The current (and persisted) IP
        ip: String,
    },

    /// Every configured host now points at `new_ip`
    Updated {
        /// Persisted IP before this run (empty on first run)
        previous_ip: String,
        /// IP submitted to every host
        new_ip: String,
        /// Hosts updated, in order
        hosts: Vec<String>,
    },
}

/// Core DDNS engine
///
/// Construct once per process with explicit collaborators and call
/// [`DdnsEngine::run_once`]. Scheduling and retries are left to whatever
/// invokes the process.
pub struct DdnsEngine {
    /// Source of the current WAN IP
    ip_source: Box<dyn IpSource>,

    /// DNS provider for resolving and updating records
    provider: Box<dyn DnsProvider>,

    /// State store for change detection and the cached zone ID
    state_store: Box<dyn StateStore>,

    /// Zone and hosts to manage
    config: UpdaterConfig,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// Fails with `Error::Config` if `config` does not name a zone and at
    /// least one host.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        state_store: Box<dyn StateStore>,
        config: UpdaterConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            provider,
            state_store,
            config,
        })
    }

    /// Run one check-and-update cycle
    ///
    /// # Returns
    ///
    /// - `Ok(RunOutcome)`: The IP was unchanged, or every host was updated
    ///   and the new state persisted
    /// - `Err(Error)`: The first failure, annotated with the stage name;
    ///   persisted state is untouched
    pub async fn run_once(&self) -> Result<RunOutcome> {
        let ip = self
            .ip_source
            .current()
            .await
            .map_err(|e| e.in_operation("resolve current IP"))?;
        debug!("WAN IP is: {} (from {})", ip, self.ip_source.source_name());

        let saved = self
            .state_store
            .load()
            .await
            .map_err(|e| e.in_operation("load state"))?;

        if ip == saved.last_known_ip {
            info!("IP address unchanged - nothing to do.");
            return Ok(RunOutcome::Unchanged { ip });
        }

        info!(
            "New IP address or IP address changed: {:?} -> {}",
            saved.last_known_ip, ip
        );

        let zone_id = if saved.has_zone_id() {
            debug!("Using cached zone ID: {}", saved.zone_id);
            saved.zone_id.clone()
        } else {
            debug!("Getting zone ID for zone: {}", self.config.zone_name);
            let zone_id = self
                .provider
                .resolve_zone_id(&self.config.zone_name)
                .await
                .map_err(|e| e.in_operation("resolve zone"))?;
            debug!("Zone ID is: {}", zone_id);
            zone_id
        };

        for host in &self.config.hosts {
            self.update_host(&zone_id, host, &ip)
                .await
                .map_err(|e| e.in_operation(format!("update host {}", host)))?;
        }

        let state = PersistedState::new(ip.clone(), zone_id);
        self.state_store
            .save(&state)
            .await
            .map_err(|e| e.in_operation("persist state"))?;

        info!(
            "IP address update complete: {} host(s) now point at {}",
            self.config.hosts.len(),
            ip
        );

        Ok(RunOutcome::Updated {
            previous_ip: saved.last_known_ip,
            new_ip: ip,
            hosts: self.config.hosts.clone(),
        })
    }

    /// Update a single host
    ///
    /// The record is always fetched fresh so the submitted ttl/proxied
    /// reflect the provider's live values.
    async fn update_host(&self, zone_id: &str, host: &str, ip: &str) -> Result<()> {
        debug!("Updating IP for host: {}", host);

        let record = self.provider.resolve_host_record(zone_id, host).await?;
        debug!(
            "Host record for {}: id={} ttl={} proxied={}",
            host, record.id, record.ttl, record.proxied
        );

        let request = UpdateRequest::for_record(host, ip, &record);
        self.provider
            .submit_update(zone_id, &record.id, &request)
            .await?;

        info!("Updated {} -> {} via {}", host, ip, self.provider.provider_name());
        Ok(())
    }
}
