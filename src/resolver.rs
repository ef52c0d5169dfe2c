use std::net::IpAddr;

use thiserror::Error;

/// Hostname resolution failed for this cycle.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to resolve {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },
}

/// Turns a hostname into the addresses currently advertised for it.
///
/// Implementations return addresses in the order the naming system hands them
/// out and keep duplicates. They never retry; the monitor tries again on the
/// next tick.
#[allow(async_fn_in_trait)]
pub trait Resolve {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError>;
}

/// Resolver backed by the platform's `getaddrinfo` through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        // The port is required by the API but irrelevant to the answer.
        let addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|source| ResolveError::Lookup {
                host: host.to_string(),
                source,
            })?;
        Ok(addrs.map(|sock| sock.ip()).collect())
    }
}
