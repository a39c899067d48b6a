//! Probe module for link reachability checks.
//!
//! A probe never fails its caller: every transport error is downgraded to an
//! unreachable [`ProbeOutcome`] by [`outcome_from_reply`].

mod batch;
mod ping;

pub use batch::*;
pub use ping::*;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("host unreachable: {0}")]
    Unreachable(String),
    #[error("command failed: {0}")]
    Command(String),
}

/// Reply from one successful ping.
///
/// `rtt_ms` is `None` when the target answered but no round-trip time could
/// be parsed from the transport output; the target still counts as reachable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PingReply {
    pub rtt_ms: Option<f64>,
}

/// Result of probing one address, as exposed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub alive: bool,
    /// Round-trip latency in milliseconds; null when down or unparsed.
    pub latency: Option<f64>,
    /// Packet loss percentage, 0 or 100 in the single-packet model.
    pub loss: u8,
}

impl ProbeOutcome {
    pub fn unreachable() -> Self {
        Self {
            alive: false,
            latency: None,
            loss: 100,
        }
    }
}

/// A single reachability probe against one address within a bounded timeout.
#[async_trait]
pub trait Pinger: Send + Sync {
    async fn ping(&self, address: &str, timeout: Duration) -> Result<PingReply, ProbeError>;
}

/// Map a transport result onto a [`ProbeOutcome`].
///
/// The only place a probe failure is interpreted: timeouts, unreachable
/// hosts, and malformed addresses all become `{alive: false, loss: 100}`
/// rather than propagating an error.
pub fn outcome_from_reply(result: Result<PingReply, ProbeError>) -> ProbeOutcome {
    match result {
        Ok(reply) => ProbeOutcome {
            alive: true,
            latency: reply.rtt_ms,
            loss: 0,
        },
        Err(_) => ProbeOutcome::unreachable(),
    }
}
