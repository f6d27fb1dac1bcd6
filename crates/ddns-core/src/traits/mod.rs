//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces the engine is driven through.
//!
//! - [`IpSource`]: Discover the current WAN IP
//! - [`DnsProvider`]: Resolve and update records via a provider API
//! - [`StateStore`]: Persist the last applied IP and cached zone ID

pub mod dns_provider;
pub mod ip_source;
pub mod state_store;

pub use dns_provider::{DnsProvider, HostRecord, UpdateRequest};
pub use ip_source::IpSource;
pub use state_store::{PersistedState, StateStore};
