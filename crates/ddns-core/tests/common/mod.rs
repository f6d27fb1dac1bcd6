//! Test doubles and common utilities for engine contract tests
//!
//! Every double is `Clone` with its bookkeeping behind `Arc`, so a test
//! can box one clone into the engine and keep another to inspect calls.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    DnsProvider, HostRecord, IpSource, PersistedState, StateStore, UpdateRequest,
};
use ddns_core::{DdnsEngine, UpdaterConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IP source returning a fixed answer
#[derive(Clone)]
pub struct StaticIpSource {
    ip: Option<String>,
    call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(ip: &str) -> Self {
        Self {
            ip: Some(ip.to_string()),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose every call fails with a transport error
    pub fn unreachable() -> Self {
        Self {
            ip: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.ip
            .clone()
            .ok_or_else(|| Error::resolution("connection refused"))
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

/// One submitted update as seen by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedUpdate {
    pub zone_id: String,
    pub record_id: String,
    pub request: UpdateRequest,
}

#[derive(Default)]
struct ProviderInner {
    zone_id: String,
    records: HashMap<String, HostRecord>,
    fail_update_for: Option<String>,
    echo_override: Option<String>,
    zone_calls: AtomicUsize,
    record_calls: AtomicUsize,
    submitted: Mutex<Vec<SubmittedUpdate>>,
}

/// A scripted DnsProvider that records every call
#[derive(Clone)]
pub struct MockDnsProvider {
    inner: Arc<ProviderInner>,
}

impl MockDnsProvider {
    pub fn builder(zone_id: &str) -> MockDnsProviderBuilder {
        MockDnsProviderBuilder {
            inner: ProviderInner {
                zone_id: zone_id.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn zone_call_count(&self) -> usize {
        self.inner.zone_calls.load(Ordering::SeqCst)
    }

    pub fn record_call_count(&self) -> usize {
        self.inner.record_calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<SubmittedUpdate> {
        self.inner.submitted.lock().unwrap().clone()
    }

    /// Total number of calls of any kind
    pub fn total_calls(&self) -> usize {
        self.zone_call_count() + self.record_call_count() + self.submitted().len()
    }
}

pub struct MockDnsProviderBuilder {
    inner: ProviderInner,
}

impl MockDnsProviderBuilder {
    pub fn record(mut self, host: &str, id: &str, ttl: u32, proxied: bool) -> Self {
        self.inner.records.insert(
            host.to_string(),
            HostRecord {
                id: id.to_string(),
                ttl,
                proxied,
            },
        );
        self
    }

    /// Make `submit_update` for `host` fail with a transport error
    pub fn fail_update_for(mut self, host: &str) -> Self {
        self.inner.fail_update_for = Some(host.to_string());
        self
    }

    /// Make the provider echo `content` instead of the submitted IP
    pub fn echo(mut self, content: &str) -> Self {
        self.inner.echo_override = Some(content.to_string());
        self
    }

    pub fn build(self) -> MockDnsProvider {
        MockDnsProvider {
            inner: Arc::new(self.inner),
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn resolve_zone_id(&self, zone_name: &str) -> Result<String> {
        self.inner.zone_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.zone_id.is_empty() {
            return Err(Error::ZoneNotFound(zone_name.to_string()));
        }
        Ok(self.inner.zone_id.clone())
    }

    async fn resolve_host_record(&self, _zone_id: &str, host_name: &str) -> Result<HostRecord> {
        self.inner.record_calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .records
            .get(host_name)
            .cloned()
            .ok_or_else(|| Error::HostNotFound(host_name.to_string()))
    }

    async fn submit_update(
        &self,
        zone_id: &str,
        record_id: &str,
        request: &UpdateRequest,
    ) -> Result<()> {
        self.inner.submitted.lock().unwrap().push(SubmittedUpdate {
            zone_id: zone_id.to_string(),
            record_id: record_id.to_string(),
            request: request.clone(),
        });

        if self.inner.fail_update_for.as_deref() == Some(request.name.as_str()) {
            return Err(Error::transport("timed out"));
        }

        let stored = self
            .inner
            .echo_override
            .clone()
            .unwrap_or_else(|| request.content.clone());
        if stored != request.content {
            return Err(Error::UpdateVerification {
                host: request.name.clone(),
                submitted: request.content.clone(),
                stored,
            });
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// An in-memory StateStore that counts loads and saves
#[derive(Clone, Default)]
pub struct MockStateStore {
    state: Arc<Mutex<PersistedState>>,
    load_count: Arc<AtomicUsize>,
    save_count: Arc<AtomicUsize>,
}

impl MockStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(ip: &str, zone_id: &str) -> Self {
        let store = Self::new();
        *store.state.lock().unwrap() = PersistedState::new(ip, zone_id);
        store
    }

    pub fn current(&self) -> PersistedState {
        self.state.lock().unwrap().clone()
    }

    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StateStore for MockStateStore {
    async fn load(&self) -> Result<PersistedState> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.current())
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        self.save_count.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap() = state.clone();
        Ok(())
    }
}

/// Build an engine over clones of the given doubles
pub fn engine_with(
    ip_source: &StaticIpSource,
    provider: &MockDnsProvider,
    state: &impl StateStoreClone,
    hosts: &[&str],
) -> DdnsEngine {
    let config = UpdaterConfig::new("example.com").with_hosts(hosts.iter().copied());
    DdnsEngine::new(
        Box::new(ip_source.clone()),
        Box::new(provider.clone()),
        state.boxed(),
        config,
    )
    .expect("engine construction succeeds")
}

/// Lets `engine_with` accept both the mock and the real file store
pub trait StateStoreClone {
    fn boxed(&self) -> Box<dyn StateStore>;
}

impl<T: StateStore + Clone + 'static> StateStoreClone for T {
    fn boxed(&self) -> Box<dyn StateStore> {
        Box::new(self.clone())
    }
}
