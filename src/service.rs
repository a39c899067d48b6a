//! Status service: the full diagnosis pass and its caching policy.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::cache::StatusCache;
use crate::diagnose::{group_by_pop, GroupedStatus};
use crate::inventory::{collect_addresses, InventoryError, InventorySource};
use crate::probe::{BulkProber, ProbeOutcome};

/// Errors a status request can surface to the caller.
///
/// Probe failures never appear here; they are folded into outcomes.
#[derive(Error, Debug)]
pub enum StatusError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Orchestrates inventory fetch, ping sweep, diagnosis, and caching.
pub struct StatusService {
    inventory: Arc<dyn InventorySource>,
    prober: BulkProber,
    cache: StatusCache,
    refresh: Mutex<()>,
}

impl StatusService {
    pub fn new(inventory: Arc<dyn InventorySource>, prober: BulkProber, cache: StatusCache) -> Self {
        Self {
            inventory,
            prober,
            cache,
            refresh: Mutex::new(()),
        }
    }

    /// Grouped link status, served from cache when fresh.
    ///
    /// A failed pass falls back on the last cached result when one exists;
    /// the caller only sees an error before the first successful pass.
    pub async fn link_status(&self) -> Result<GroupedStatus, StatusError> {
        if let Some(cached) = self.cache.fresh().await {
            tracing::debug!("Serving link status from cache");
            return Ok(cached);
        }

        // One refresh at a time; a caller that waited here re-checks the
        // cache because the earlier caller usually just filled it.
        let _guard = self.refresh.lock().await;
        if let Some(cached) = self.cache.fresh().await {
            return Ok(cached);
        }

        match self.run_pass().await {
            Ok(status) => {
                self.cache.store(status.clone()).await;
                Ok(status)
            }
            Err(e) => {
                if let Some(stale) = self.cache.any().await {
                    tracing::warn!("Diagnosis pass failed, serving stale cache: {}", e);
                    return Ok(stale);
                }
                Err(e)
            }
        }
    }

    /// Probe exactly the requested addresses, bypassing the cache.
    pub async fn on_demand_ping(&self, addresses: &[String]) -> HashMap<String, ProbeOutcome> {
        self.prober.on_demand(addresses).await
    }

    async fn run_pass(&self) -> Result<GroupedStatus, StatusError> {
        let inventory = self.inventory.fetch().await?;
        if inventory.is_empty() {
            tracing::info!("Inventory is empty, nothing to probe");
            return Ok(GroupedStatus::new());
        }

        let addresses = collect_addresses(&inventory);
        let outcomes = self.prober.sweep(&addresses).await;
        Ok(group_by_pop(&inventory, &outcomes))
    }
}
