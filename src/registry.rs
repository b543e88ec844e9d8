//! Online module registry: reserved device names
//!
//! The update distribution system publishes a consolidated index of every
//! device module it knows about. Before publishing locally, the first field
//! of each line is treated as a reserved name that local module directories
//! must not collide with. The registry is read-only for this tool and the
//! fetch degrades gracefully: on any failure the run continues with an empty
//! reserved-name set and a warning.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;

/// Registry access configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// URL of the published index (semicolon-delimited lines).
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Fetch timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_registry_url() -> String {
    "https://updates.modstamp.dev/Updates.csv".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Parse the registry body: one reserved name per line, first
/// semicolon-delimited field. The rest of each line is opaque. Lines may be
/// terminated by LF, CRLF, or a bare CR (the index format).
pub fn parse_reserved_list(body: &str) -> HashSet<String> {
    body.split(['\r', '\n'])
        .filter_map(|line| line.split(';').next())
        .map(str::to_string)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Fetch the reserved-name list from the registry.
///
/// Never fails the run: any network or HTTP error yields an empty set and a
/// warning, leaving the collision check toothless for this run only.
pub fn fetch_reserved_names(config: &RegistryConfig) -> HashSet<String> {
    match fetch_body(config) {
        Ok(body) => parse_reserved_list(&body),
        Err(e) => {
            warn!(
                url = %config.url,
                error = %e,
                "Could not load the online module list; continuing without \
                 reserved-name checking. Make sure no local module directory \
                 shares its name with a published device module."
            );
            HashSet::new()
        }
    }
}

fn fetch_body(config: &RegistryConfig) -> Result<String, String> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("failed to create async runtime: {}", e))?;

    runtime.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {}", e))?;

        let response = client
            .get(&config.url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?
            .error_for_status()
            .map_err(|e| format!("server error: {}", e))?;

        response
            .text()
            .await
            .map_err(|e| format!("failed to read body: {}", e))
    })
}
