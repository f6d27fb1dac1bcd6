// # IP Source Trait
//
// Defines the interface for discovering the caller's current WAN IP.
//
// ## Implementations
//
// - Plain-text HTTP service: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let ip = source.current().await?;
//     println!("WAN IP is {}", ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for IP source implementations
///
/// A source is queried exactly once per run. It performs no caching and
/// no retries: a failure aborts the run and the next scheduled invocation
/// tries again.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current WAN IPv4 address as its dotted-quad text
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The address, already trimmed and shape-checked
    /// - `Err(Error)`: `Resolution` when the request fails, times out, or
    ///   the answer does not look like an IPv4 address
    async fn current(&self) -> Result<String, crate::Error>;

    /// Short name of the source for logging
    fn source_name(&self) -> &str;
}
