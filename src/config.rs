//! Configuration module for linkwatch.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;

use crate::probe::DEFAULT_BATCH_SIZE;

/// Spreadsheet settings for the inventory source.
#[derive(Debug, Clone)]
pub struct SheetConfig {
    /// Google Sheets document id holding the link inventory.
    pub sheet_id: String,
    /// Worksheet range to read, header row excluded.
    pub range: String,
    /// API key sent with the values request.
    pub api_key: String,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the web server (default: 8080)
    pub http_port: u16,
    pub sheet: SheetConfig,
    /// Age at which a cached status pass expires (default: 60 seconds)
    pub cache_seconds: u64,
    /// Probes allowed in flight at once (default: 50)
    pub batch_size: usize,
    /// Per-probe timeout in seconds (default: 1)
    pub ping_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            sheet: SheetConfig {
                sheet_id: String::new(),
                range: "RADIO_LINKS!A2:I".to_string(),
                api_key: String::new(),
            },
            cache_seconds: 60,
            batch_size: DEFAULT_BATCH_SIZE,
            ping_timeout_secs: 1,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LINKWATCH_HTTP_PORT`: HTTP port (default: 8080)
    /// - `LINKWATCH_SHEET_ID`: inventory spreadsheet id (required)
    /// - `LINKWATCH_SHEET_RANGE`: worksheet range (default: "RADIO_LINKS!A2:I")
    /// - `LINKWATCH_SHEET_API_KEY`: Sheets API key
    /// - `LINKWATCH_CACHE_SECONDS`: cache window (default: 60)
    /// - `LINKWATCH_BATCH_SIZE`: concurrent probe ceiling (default: 50)
    /// - `LINKWATCH_PING_TIMEOUT_SECS`: per-probe timeout (default: 1)
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(port_str) = env::var("LINKWATCH_HTTP_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.http_port = port;
            }
        }

        if let Ok(sheet_id) = env::var("LINKWATCH_SHEET_ID") {
            cfg.sheet.sheet_id = sheet_id;
        }

        if let Ok(range) = env::var("LINKWATCH_SHEET_RANGE") {
            cfg.sheet.range = range;
        }

        if let Ok(api_key) = env::var("LINKWATCH_SHEET_API_KEY") {
            cfg.sheet.api_key = api_key;
        }

        if let Ok(secs_str) = env::var("LINKWATCH_CACHE_SECONDS") {
            if let Ok(secs) = secs_str.parse() {
                cfg.cache_seconds = secs;
            }
        }

        if let Ok(size_str) = env::var("LINKWATCH_BATCH_SIZE") {
            if let Ok(size) = size_str.parse() {
                cfg.batch_size = size;
            }
        }

        if let Ok(secs_str) = env::var("LINKWATCH_PING_TIMEOUT_SECS") {
            if let Ok(secs) = secs_str.parse() {
                cfg.ping_timeout_secs = secs;
            }
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.sheet.range, "RADIO_LINKS!A2:I");
        assert_eq!(cfg.cache_seconds, 60);
        assert_eq!(cfg.batch_size, 50);
        assert_eq!(cfg.ping_timeout_secs, 1);
    }
}
