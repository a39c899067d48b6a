//! Inventory model types.

use serde::{Deserialize, Serialize};

/// One radio link row from the inventory sheet.
///
/// Field names follow the spreadsheet columns so records pass through the
/// API unchanged. Address fields hold a dotted-quad string or a placeholder
/// (empty / "N/A"); placeholders are filtered out before probing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "Link_ID")]
    pub link_id: String,
    #[serde(rename = "POP_Name")]
    pub pop_name: String,
    #[serde(rename = "BTS_Name")]
    pub bts_name: String,
    #[serde(rename = "Client_Name")]
    pub client_name: String,
    #[serde(rename = "Client_IP")]
    pub client_ip: String,
    #[serde(rename = "Base_IP")]
    pub base_ip: String,
    #[serde(rename = "Gateway_IP")]
    pub gateway_ip: String,
    #[serde(rename = "Loopback_IP")]
    pub loopback_ip: String,
    #[serde(rename = "Location")]
    pub location: String,
}

impl Link {
    /// The four probeable hop addresses, in chain order.
    pub fn addresses(&self) -> [&str; 4] {
        [
            &self.client_ip,
            &self.base_ip,
            &self.gateway_ip,
            &self.loopback_ip,
        ]
    }
}

/// Every hop address referenced by the inventory, duplicates included.
///
/// De-duplication and format filtering happen in the prober.
pub fn collect_addresses(inventory: &[Link]) -> Vec<String> {
    inventory
        .iter()
        .flat_map(|link| link.addresses())
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .collect()
}
