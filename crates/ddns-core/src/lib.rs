// # ddns-core
//
// Core library for the one-shot dynamic DNS updater.
//
// ## Architecture Overview
//
// - **IpSource**: Trait for discovering the current WAN IP
// - **DnsProvider**: Trait for resolving zones/records and submitting updates
// - **StateStore**: Trait for the persisted last-IP / zone-ID record
// - **DdnsEngine**: Runs one check-and-update cycle over the three
//
// ## Design Principles
//
// 1. **Explicit wiring**: Collaborators and configuration are passed to
//    the engine constructor; nothing is read from global state
// 2. **Fail fast**: Every error aborts the run; the external scheduler is
//    the retry mechanism
// 3. **Persist last**: State is written only after every host succeeded

pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::UpdaterConfig;
pub use engine::{DdnsEngine, RunOutcome};
pub use error::{Error, Result};
pub use state::FileStateStore;
pub use traits::{DnsProvider, HostRecord, IpSource, PersistedState, StateStore, UpdateRequest};
