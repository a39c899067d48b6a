//! Diagnosis engine: derives one health verdict per link from probe outcomes.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::inventory::Link;
use crate::probe::ProbeOutcome;

/// Grouping key for links whose inventory row has no POP name.
pub const UNKNOWN_POP: &str = "Unknown POP";

/// Health verdict for one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkStatus {
    Up,
    Down,
    Critical,
}

/// First unreachable hop along the client -> base -> gateway chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailedHop {
    Client,
    Base,
    Gateway,
}

/// Derived verdict for one link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub status: LinkStatus,
    pub color: &'static str,
    pub message: &'static str,
    /// Client-hop round-trip time in milliseconds; null when the client is
    /// down or the time was not parsed.
    pub latency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_hop: Option<FailedHop>,
}

/// A link enriched with its diagnosis, as served to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkReport {
    #[serde(flatten)]
    pub link: Link,
    pub diagnosis: Diagnosis,
}

/// Grouped status output: POP name -> links at that POP, in inventory order.
pub type GroupedStatus = BTreeMap<String, Vec<LinkReport>>;

/// Apply the hop-priority decision table to one link.
///
/// Evaluated strictly top-down; the first reachable hop decides the verdict
/// and exactly one branch fires. An address missing from the inventory row
/// or from the outcome map counts as unreachable for that hop.
pub fn diagnose(link: &Link, outcomes: &HashMap<String, ProbeOutcome>) -> Diagnosis {
    let client_alive = hop_alive(outcomes, &link.client_ip);
    let base_alive = hop_alive(outcomes, &link.base_ip);
    let gateway_alive = hop_alive(outcomes, &link.gateway_ip);

    // Latency always reflects the client hop, whichever branch fires.
    let latency = outcomes.get(&link.client_ip).and_then(|o| o.latency);

    let (status, color, message, failed_hop) = if client_alive {
        (LinkStatus::Up, "green", "Link Operational", None)
    } else if base_alive {
        (
            LinkStatus::Down,
            "orange",
            "Base up, Client down",
            Some(FailedHop::Client),
        )
    } else if gateway_alive {
        (
            LinkStatus::Critical,
            "red",
            "Base Station down",
            Some(FailedHop::Base),
        )
    } else {
        (
            LinkStatus::Down,
            "red",
            "Gateway/Backhaul down",
            Some(FailedHop::Gateway),
        )
    };

    Diagnosis {
        status,
        color,
        message,
        latency,
        failed_hop,
    }
}

/// Diagnose every link and group the reports by POP name.
pub fn group_by_pop(inventory: &[Link], outcomes: &HashMap<String, ProbeOutcome>) -> GroupedStatus {
    let mut grouped = GroupedStatus::new();

    for link in inventory {
        let diagnosis = diagnose(link, outcomes);
        let pop = if link.pop_name.is_empty() {
            UNKNOWN_POP.to_string()
        } else {
            link.pop_name.clone()
        };

        grouped.entry(pop).or_default().push(LinkReport {
            link: link.clone(),
            diagnosis,
        });
    }

    grouped
}

fn hop_alive(outcomes: &HashMap<String, ProbeOutcome>, address: &str) -> bool {
    outcomes.get(address).map(|o| o.alive).unwrap_or(false)
}
