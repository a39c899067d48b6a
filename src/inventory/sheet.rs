//! Spreadsheet-backed inventory source.
//!
//! Fetches link rows from the Google Sheets values endpoint and maps them
//! positionally onto [`Link`] records.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::Link;
use crate::config::SheetConfig;

/// Inventory retrieval errors.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("inventory request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("inventory source rejected the request: HTTP {0}")]
    Status(u16),
    #[error("sheet id is not configured")]
    MissingSheetId,
}

/// Source of the current link inventory.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Fetch the current inventory snapshot.
    ///
    /// An empty sheet yields an empty vector, not an error.
    async fn fetch(&self) -> Result<Vec<Link>, InventoryError>;
}

/// Response shape of the Sheets `values.get` endpoint.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Inventory backed by a Google Sheets worksheet.
pub struct SheetSource {
    client: reqwest::Client,
    config: SheetConfig,
}

impl SheetSource {
    pub fn new(config: SheetConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl InventorySource for SheetSource {
    async fn fetch(&self) -> Result<Vec<Link>, InventoryError> {
        if self.config.sheet_id.is_empty() {
            return Err(InventoryError::MissingSheetId);
        }

        let url = format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}",
            self.config.sheet_id, self.config.range
        );

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InventoryError::Status(response.status().as_u16()));
        }

        let range: ValueRange = response.json().await?;
        let inventory: Vec<Link> = range.values.iter().map(|row| link_from_row(row)).collect();

        tracing::info!("Fetched {} inventory rows", inventory.len());
        Ok(inventory)
    }
}

/// Map one sheet row onto a [`Link`], positionally.
///
/// Missing or empty trailing cells fall back to the sheet's placeholder
/// values. The POP name stays empty when absent; the grouping step applies
/// the "Unknown POP" sentinel.
fn link_from_row(row: &[String]) -> Link {
    let cell = |index: usize, default: &str| {
        row.get(index)
            .map(String::as_str)
            .filter(|c| !c.is_empty())
            .unwrap_or(default)
            .to_string()
    };

    Link {
        link_id: cell(0, "N/A"),
        pop_name: cell(1, ""),
        bts_name: cell(2, "Unknown"),
        client_name: cell(3, "Unknown"),
        client_ip: cell(4, ""),
        base_ip: cell(5, ""),
        gateway_ip: cell(6, ""),
        loopback_ip: cell(7, ""),
        location: cell(8, "Unknown"),
    }
}
