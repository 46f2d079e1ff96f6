pub mod blockchain;
pub mod cli;
pub mod config;
pub mod error;
pub mod explorer;
pub mod logging;
pub mod models;
pub mod probe;

pub use blockchain::{RpcClient, TransferLogFetcher};
pub use cli::Cli;
pub use config::{ProbeConfig, RpcConfig, BlockscoutConfig, ProbeSettings, LoggingConfig};
pub use error::{ProbeError, Result};
pub use explorer::BlockscoutClient;
pub use logging::{LogContext, ErrorLogger, MetricsLogger, PerformanceMonitor, init_logging};
pub use probe::{Probe, ProbeOutcome, response_includes_transfer, run_probe, EXIT_OK, EXIT_STALE, EXIT_PROBE_FAILED};
