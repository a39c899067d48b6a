//! Batched fan-out of ping probes with a bounded concurrency ceiling.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use super::{outcome_from_reply, Pinger, ProbeOutcome};

/// Default number of probes allowed in flight at once.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Fans a set of addresses out to a [`Pinger`] in fixed-size batches.
///
/// Batches run strictly in sequence; all probes inside one batch run
/// concurrently and the next batch starts only once every probe in the
/// current one has resolved. Peak concurrent ping processes are therefore
/// bounded by the batch size.
pub struct BulkProber {
    pinger: Arc<dyn Pinger>,
    batch_size: usize,
    timeout: Duration,
}

impl BulkProber {
    pub fn new(pinger: Arc<dyn Pinger>, batch_size: usize, timeout: Duration) -> Self {
        Self {
            pinger,
            batch_size: batch_size.max(1),
            timeout,
        }
    }

    /// Probe an inventory-derived address set.
    ///
    /// Duplicates are collapsed and entries that are not dotted-quad IPv4
    /// addresses are silently excluded before any probe is issued; excluded
    /// entries never appear in the output map.
    pub async fn sweep(&self, addresses: &[String]) -> HashMap<String, ProbeOutcome> {
        self.ping_batched(dedupe_ipv4(addresses)).await
    }

    /// Probe exactly the requested addresses, with no format filter.
    ///
    /// A malformed address simply probes as unreachable, so every requested
    /// address has an entry in the output.
    pub async fn on_demand(&self, addresses: &[String]) -> HashMap<String, ProbeOutcome> {
        let mut seen = HashSet::new();
        let requested: Vec<String> = addresses
            .iter()
            .filter(|a| seen.insert(a.as_str()))
            .cloned()
            .collect();
        self.ping_batched(requested).await
    }

    async fn ping_batched(&self, addresses: Vec<String>) -> HashMap<String, ProbeOutcome> {
        let mut results = HashMap::with_capacity(addresses.len());
        if addresses.is_empty() {
            return results;
        }

        tracing::info!("Running ping sweep over {} addresses", addresses.len());

        for batch in addresses.chunks(self.batch_size) {
            let probes = batch.iter().map(|addr| self.probe_one(addr));
            for (addr, outcome) in join_all(probes).await {
                results.insert(addr, outcome);
            }
        }

        results
    }

    async fn probe_one(&self, address: &str) -> (String, ProbeOutcome) {
        // Stagger probe starts inside a batch to avoid a thundering herd
        let jitter = rand::random::<u64>() % 100;
        tokio::time::sleep(Duration::from_millis(jitter)).await;

        let reply = self.pinger.ping(address, self.timeout).await;
        (address.to_string(), outcome_from_reply(reply))
    }
}

/// De-duplicate preserving first-seen order, keeping only dotted-quad IPv4.
fn dedupe_ipv4(addresses: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    addresses
        .iter()
        .filter(|a| a.parse::<Ipv4Addr>().is_ok())
        .filter(|a| seen.insert(a.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{PingReply, ProbeError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Pinger that answers from a scripted set of reachable addresses.
    struct FakePinger {
        alive: HashSet<String>,
        calls: AtomicUsize,
    }

    impl FakePinger {
        fn new(alive: &[&str]) -> Self {
            Self {
                alive: alive.iter().map(|a| a.to_string()).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Pinger for FakePinger {
        async fn ping(&self, address: &str, timeout: Duration) -> Result<PingReply, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.alive.contains(address) {
                Ok(PingReply { rtt_ms: Some(5.0) })
            } else {
                Err(ProbeError::Timeout(timeout))
            }
        }
    }

    fn prober(pinger: Arc<FakePinger>, batch_size: usize) -> BulkProber {
        BulkProber::new(pinger, batch_size, Duration::from_secs(1))
    }

    fn addrs(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_input_probes_nothing() {
        let pinger = Arc::new(FakePinger::new(&[]));
        let results = prober(pinger.clone(), 50).sweep(&[]).await;
        assert!(results.is_empty());
        assert_eq!(pinger.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sweep_filters_and_dedupes() {
        let pinger = Arc::new(FakePinger::new(&["10.0.0.1"]));
        let input = addrs(&["10.0.0.1", "10.0.0.1", "not-an-ip", "300.1.1.1", ""]);
        let results = prober(pinger.clone(), 50).sweep(&input).await;

        assert_eq!(results.len(), 1);
        assert!(results["10.0.0.1"].alive);
        assert!(!results.contains_key("not-an-ip"));
        assert!(!results.contains_key("300.1.1.1"));
        assert_eq!(pinger.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_every_address_appears_exactly_once() {
        let pinger = Arc::new(FakePinger::new(&[]));
        let input: Vec<String> = (0..120).map(|i| format!("10.1.{}.{}", i / 250, i % 250)).collect();
        let results = prober(pinger.clone(), 50).sweep(&input).await;

        assert_eq!(results.len(), 120);
        for addr in &input {
            assert!(results.contains_key(addr), "missing {}", addr);
        }
        assert_eq!(pinger.calls.load(Ordering::SeqCst), 120);
    }

    #[tokio::test]
    async fn test_unreachable_outcomes_are_recorded() {
        let pinger = Arc::new(FakePinger::new(&["192.168.0.1"]));
        let input = addrs(&["192.168.0.1", "192.168.0.2"]);
        let results = prober(pinger, 50).sweep(&input).await;

        assert!(results["192.168.0.1"].alive);
        assert_eq!(results["192.168.0.2"], ProbeOutcome::unreachable());
    }

    #[tokio::test]
    async fn test_on_demand_keeps_malformed_addresses() {
        let pinger = Arc::new(FakePinger::new(&[]));
        let input = addrs(&["definitely-not-an-ip", "10.9.9.9"]);
        let results = prober(pinger, 50).on_demand(&input).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results["definitely-not-an-ip"], ProbeOutcome::unreachable());
        assert_eq!(results["10.9.9.9"], ProbeOutcome::unreachable());
    }
}
