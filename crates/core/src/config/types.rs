use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::acquisition::AcquisitionConfig;
use crate::audit::AuditConfig;
use crate::services::{AccountsConfig, FuelPricesConfig, MailboxConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub accounts: AccountsConfig,
    #[serde(default)]
    pub fuel_prices: FuelPricesConfig,
    #[serde(default)]
    pub mailbox: MailboxConfig,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub accounts: SanitizedAccountsConfig,
    pub fuel_prices: FuelPricesConfig,
    pub mailbox: MailboxConfig,
    pub acquisition: AcquisitionConfig,
    pub audit: AuditConfig,
}

/// Sanitized account API config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAccountsConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
    pub app_version: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            accounts: SanitizedAccountsConfig {
                base_url: config.accounts.base_url.clone(),
                api_key_configured: config
                    .accounts
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
                timeout_secs: config.accounts.timeout_secs,
                app_version: config.accounts.app_version.clone(),
            },
            fuel_prices: config.fuel_prices.clone(),
            mailbox: config.mailbox.clone(),
            acquisition: config.acquisition.clone(),
            audit: config.audit.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_server_section() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.acquisition.max_attempts, 10);
        assert_eq!(config.acquisition.poll_interval_ms, 2000);
        assert_eq!(config.acquisition.lock_in_litres, 150);
        assert_eq!(config.mailbox.domains.len(), 3);
        assert_eq!(config.fuel_prices.region, "All");
        assert_eq!(config.audit.capacity, 1000);
        assert!(config.accounts.api_key.is_none());
    }

    #[test]
    fn test_deserialize_full_sections() {
        let toml = r#"
[accounts]
base_url = "http://localhost:9000/api"
api_key = "secret"
timeout_secs = 5

[fuel_prices]
url = "http://localhost:9001/prices.json"
region = "NSW"

[mailbox]
base_url = "http://localhost:9002/"
domains = ["example.test"]
code_pattern = "code: ([0-9]+)"

[acquisition]
max_attempts = 3
poll_interval_ms = 100
lock_in_litres = 60
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.accounts.base_url, "http://localhost:9000/api");
        assert_eq!(config.accounts.api_key.as_deref(), Some("secret"));
        assert_eq!(config.accounts.timeout_secs, 5);
        assert_eq!(config.fuel_prices.region, "NSW");
        assert_eq!(config.mailbox.domains, vec!["example.test".to_string()]);
        assert_eq!(config.mailbox.code_pattern, "code: ([0-9]+)");
        assert_eq!(config.acquisition.max_attempts, 3);
        assert_eq!(config.acquisition.poll_interval_ms, 100);
        assert_eq!(config.acquisition.lock_in_litres, 60);
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let mut config = Config::default();
        config.accounts.api_key = Some("secret-key".to_string());

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.accounts.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));
    }

    #[test]
    fn test_sanitized_config_empty_key_not_configured() {
        let mut config = Config::default();
        config.accounts.api_key = Some(String::new());

        let sanitized = SanitizedConfig::from(&config);
        assert!(!sanitized.accounts.api_key_configured);
        assert_eq!(sanitized.server.port, 8080);
    }
}
