// # State Store Trait
//
// Defines the interface for the small record that makes runs cheap and
// idempotent: the last IP successfully pushed to every host, and the
// cached zone identifier.
//
// ## File Format
//
// ```json
// { "ip": "1.2.3.4", "zoneID": "023e105f4ecef8ad9ca31a8372d0c353" }
// ```
//
// Deleting the file forces a full re-resolution on the next run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// State carried between runs
///
/// Missing fields deserialize as empty strings, which is also the
/// first-run value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    /// IP applied to every configured host by the last successful run
    #[serde(rename = "ip", default)]
    pub last_known_ip: String,

    /// Zone identifier resolved by a previous run (empty if unresolved)
    #[serde(rename = "zoneID", default)]
    pub zone_id: String,
}

impl PersistedState {
    /// Create a state record
    pub fn new(last_known_ip: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self {
            last_known_ip: last_known_ip.into(),
            zone_id: zone_id.into(),
        }
    }

    /// Whether a zone identifier has been cached
    pub fn has_zone_id(&self) -> bool {
        !self.zone_id.is_empty()
    }
}

/// Trait for state store implementations
///
/// `load` is called once at the start of a run and `save` at most once at
/// the end, only after every host update succeeded.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the persisted state
    ///
    /// # Returns
    ///
    /// - `Ok(PersistedState)`: The stored state, or the default when
    ///   nothing has been stored yet
    /// - `Err(Error)`: `StateCorrupt` when stored data cannot be parsed
    async fn load(&self) -> Result<PersistedState, crate::Error>;

    /// Replace the persisted state with `state`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Durably written
    /// - `Err(Error)`: `StatePersist` on any write failure
    async fn save(&self, state: &PersistedState) -> Result<(), crate::Error>;
}
