use clap::Parser;
use crate::config::ProbeConfig;
use crate::error::Result;

/// Command line flags. Anything set here overrides the config file and environment.
#[derive(Parser, Debug, Default)]
#[command(name = "blockscout-probe")]
#[command(about = "Checks that Blockscout has indexed a recent token transfer seen on the chain")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file (defaults to $CONFIG_FILE or ./config.toml)
    #[arg(long)]
    pub config: Option<String>,

    /// Chain JSON-RPC endpoint
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Blockscout base URL
    #[arg(long)]
    pub blockscout_url: Option<String>,

    /// Blocks Blockscout may trail the chain tip
    #[arg(long)]
    pub max_blocks_behind: Option<u64>,

    /// Token contract whose transfers are probed
    #[arg(long)]
    pub test_token_address: Option<String>,

    /// Only probe transfers sent by this address
    #[arg(long)]
    pub test_user_address: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long)]
    pub log_format: Option<String>,
}

impl Cli {
    /// Load file and environment configuration, then apply these flags on top
    pub fn load_config(&self) -> Result<ProbeConfig> {
        let path = self.config.clone().unwrap_or_else(ProbeConfig::default_path);
        let mut config = ProbeConfig::load_layers(&path)?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut ProbeConfig) {
        if let Some(url) = &self.rpc_url {
            config.rpc.url = url.clone();
        }
        if let Some(url) = &self.blockscout_url {
            config.blockscout.url = url.clone();
        }
        if let Some(max_blocks_behind) = self.max_blocks_behind {
            config.probe.max_blocks_behind = max_blocks_behind;
        }
        if let Some(address) = &self.test_token_address {
            config.probe.test_token_address = Some(address.clone());
        }
        if let Some(address) = &self.test_user_address {
            config.probe.test_user_address = Some(address.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
    }
}
