use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use crate::blockchain::transfer_fetcher::validate_address;
use crate::error::ConfigError;

/// Probe configuration, passed explicitly to `Probe::new`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub rpc: RpcConfig,
    pub blockscout: BlockscoutConfig,
    pub probe: ProbeSettings,
    pub logging: LoggingConfig,
}

/// Chain JSON-RPC node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// RPC endpoint URL
    pub url: String,
}

/// Blockscout explorer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockscoutConfig {
    /// Explorer base URL; the GraphQL endpoint is `{url}/graphql`
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// How many blocks Blockscout may trail the chain tip
    pub max_blocks_behind: u64,
    /// Token contract whose transfers are probed
    pub test_token_address: Option<String>,
    /// Restrict probed transfers to this sender
    pub test_user_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "https://forno.celo.org".to_string(),
        }
    }
}

impl Default for BlockscoutConfig {
    fn default() -> Self {
        Self {
            url: "https://rc1-blockscout.celo-testnet.org/mainnet".to_string(),
        }
    }
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            max_blocks_behind: 3,
            // cUSD on Celo mainnet
            test_token_address: Some("0x765DE816845861e75A25fCA122bb6898B8B1282a".to_string()),
            test_user_address: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ProbeConfig {
    /// Load configuration from file and environment variables.
    /// Environment variables take precedence over file values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_path(&Self::default_path())
    }

    /// `$CONFIG_FILE`, or `config.toml` in the working directory
    pub fn default_path() -> String {
        env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string())
    }

    /// Same as `load`, reading the TOML file at `config_path` if it exists
    pub fn load_with_path(config_path: &str) -> Result<Self, ConfigError> {
        let config = Self::load_layers(config_path)?;
        config.validate()?;
        Ok(config)
    }

    /// File and environment layers without validation, so that later layers
    /// can still replace a bad value
    pub fn load_layers(config_path: &str) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(config_path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults when absent
    pub fn load_from_file(config_path: &str) -> Result<Self, ConfigError> {
        if !Path::new(config_path).exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .map_err(|source| ConfigError::Io {
                path: config_path.to_string(),
                source,
            })?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::Parsing(e.to_string()))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = env::var("RPC_URL") {
            self.rpc.url = url;
        }
        if let Ok(url) = env::var("BLOCKSCOUT_URL") {
            self.blockscout.url = url;
        }
        if let Ok(max_blocks_behind) = env::var("MAX_BLOCKS_BEHIND") {
            self.probe.max_blocks_behind = max_blocks_behind.parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "MAX_BLOCKS_BEHIND".to_string(),
                    value: max_blocks_behind,
                })?;
        }
        if let Ok(token_address) = env::var("TEST_TOKEN_ADDRESS") {
            self.probe.test_token_address = Some(token_address);
        }
        if let Ok(user_address) = env::var("TEST_USER_ADDRESS") {
            self.probe.test_user_address = Some(user_address);
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        for url in [&self.rpc.url, &self.blockscout.url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }

        if self.probe.max_blocks_behind == 0 || self.probe.max_blocks_behind > 1000 {
            return Err(ConfigError::InvalidValue {
                key: "probe.max_blocks_behind".to_string(),
                value: self.probe.max_blocks_behind.to_string(),
            });
        }

        let addresses = [
            ("probe.test_token_address", &self.probe.test_token_address),
            ("probe.test_user_address", &self.probe.test_user_address),
        ];
        for (key, address) in addresses {
            if let Some(address) = address {
                if !address.starts_with("0x") || validate_address(address).is_err() {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: address.clone(),
                    });
                }
            }
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                value: self.logging.level.clone(),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                value: self.logging.format.clone(),
            });
        }

        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample_config() -> Result<String, ConfigError> {
        toml::to_string_pretty(&Self::default())
            .map_err(|e| ConfigError::Parsing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::NamedTempFile;

    const ENV_KEYS: &[&str] = &[
        "RPC_URL",
        "BLOCKSCOUT_URL",
        "MAX_BLOCKS_BEHIND",
        "TEST_TOKEN_ADDRESS",
        "TEST_USER_ADDRESS",
        "LOG_LEVEL",
        "LOG_FORMAT",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = ProbeConfig::default();
        assert_eq!(config.rpc.url, "https://forno.celo.org");
        assert_eq!(config.blockscout.url, "https://rc1-blockscout.celo-testnet.org/mainnet");
        assert_eq!(config.probe.max_blocks_behind, 3);
        assert!(config.probe.test_user_address.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ProbeConfig::default();
        config.rpc.url = "invalid-url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        config = ProbeConfig::default();
        config.blockscout.url = "ftp://explorer".to_string();
        assert!(config.validate().is_err());

        config = ProbeConfig::default();
        config.probe.max_blocks_behind = 0;
        assert!(config.validate().is_err());

        config = ProbeConfig::default();
        config.probe.test_user_address = Some("0x1234".to_string());
        assert!(config.validate().is_err());

        config = ProbeConfig::default();
        config.probe.test_token_address = None;
        assert!(config.validate().is_ok());

        config = ProbeConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("RPC_URL", "https://test-rpc.com/");
        env::set_var("BLOCKSCOUT_URL", "https://test-explorer.com");
        env::set_var("MAX_BLOCKS_BEHIND", "5");
        env::set_var("TEST_USER_ADDRESS", "0xf977814e90da44bfa03b6295a0616a897441acec");
        env::set_var("LOG_LEVEL", "debug");

        let mut config = ProbeConfig::default();
        config.apply_env_overrides().unwrap();

        assert_eq!(config.rpc.url, "https://test-rpc.com/");
        assert_eq!(config.blockscout.url, "https://test-explorer.com");
        assert_eq!(config.probe.max_blocks_behind, 5);
        assert_eq!(
            config.probe.test_user_address.as_deref(),
            Some("0xf977814e90da44bfa03b6295a0616a897441acec")
        );
        assert_eq!(config.logging.level, "debug");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_values() {
        clear_env();
        env::set_var("MAX_BLOCKS_BEHIND", "three");

        let mut config = ProbeConfig::default();
        let result = config.apply_env_overrides();

        assert!(matches!(result.unwrap_err(), ConfigError::InvalidValue { .. }));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_file_loading() {
        clear_env();
        let config_content = r#"
[rpc]
url = "https://custom-rpc.com/"

[blockscout]
url = "https://custom-explorer.com"

[probe]
max_blocks_behind = 7
test_token_address = "0x1234567890123456789012345678901234567890"

[logging]
level = "warn"
format = "json"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut temp_file, config_content.as_bytes()).unwrap();

        let config = ProbeConfig::load_with_path(temp_file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.rpc.url, "https://custom-rpc.com/");
        assert_eq!(config.blockscout.url, "https://custom-explorer.com");
        assert_eq!(config.probe.max_blocks_behind, 7);
        assert_eq!(
            config.probe.test_token_address.as_deref(),
            Some("0x1234567890123456789012345678901234567890")
        );
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    #[serial]
    fn test_partial_config_file_keeps_defaults() {
        clear_env();
        let mut temp_file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut temp_file, b"[probe]\nmax_blocks_behind = 10\n").unwrap();

        let config = ProbeConfig::load_with_path(temp_file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.probe.max_blocks_behind, 10);
        assert_eq!(config.rpc.url, "https://forno.celo.org");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    #[serial]
    fn test_missing_config_file_uses_defaults() {
        clear_env();
        let config = ProbeConfig::load_with_path("/nonexistent/probe-config.toml").unwrap();
        assert_eq!(config.probe.max_blocks_behind, 3);
    }

    #[test]
    fn test_unreadable_config_file() {
        // A directory exists but cannot be read as a file
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();

        match ProbeConfig::load_from_file(path) {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_generate_sample_config() {
        let sample = ProbeConfig::generate_sample_config().unwrap();
        assert!(sample.contains("[rpc]"));
        assert!(sample.contains("[blockscout]"));
        assert!(sample.contains("[probe]"));
        assert!(sample.contains("[logging]"));

        let parsed: ProbeConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.probe.max_blocks_behind, 3);
    }
}
