use thiserror::Error;

/// Main error type for the Blockscout lag probe.
///
/// A `ProbeError` means the probe could not run to completion. A probe that ran
/// and found the explorer behind is reported through `ProbeOutcome` instead.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Explorer error: {0}")]
    Explorer(#[from] ExplorerError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No transfer logs found in blocks {from_block}..={to_block}")]
    NoTransferLogs { from_block: u64, to_block: u64 },
}

/// JSON-RPC node errors
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("RPC method error: code={code}, message={message}")]
    Method { code: i32, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Blockscout GraphQL errors
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("GraphQL errors: {0}")]
    GraphQl(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parsing failed: {0}")]
    Parsing(String),

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
}

/// Errors raised while decoding an `eth_getLogs` entry into a transfer
#[derive(Error, Debug)]
pub enum LogDecodeError {
    #[error("Invalid log format: {0}")]
    InvalidLog(String),

    #[error("Invalid address format: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),

    #[error("Invalid hex value: {0}")]
    InvalidHex(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The probe is misconfigured and will never run
    Critical,
    /// A dependency (RPC node or explorer) is unreachable or broken
    High,
    /// A dependency answered with something unexpected
    Medium,
    /// Nothing to compare against this run
    Low,
}

impl ProbeError {
    /// Get the severity level of an error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ProbeError::Config(_) => ErrorSeverity::Critical,

            ProbeError::Rpc(RpcError::Http(_)) => ErrorSeverity::High,
            ProbeError::Rpc(RpcError::Status { .. }) => ErrorSeverity::High,
            ProbeError::Explorer(ExplorerError::Http(_)) => ErrorSeverity::High,
            ProbeError::Explorer(ExplorerError::Status { .. }) => ErrorSeverity::High,

            ProbeError::Rpc(_) => ErrorSeverity::Medium,
            ProbeError::Explorer(_) => ErrorSeverity::Medium,

            ProbeError::NoTransferLogs { .. } => ErrorSeverity::Low,
        }
    }

    /// Short machine-readable tag used in structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::Rpc(_) => "rpc",
            ProbeError::Explorer(ExplorerError::MalformedResponse(_)) => "explorer_malformed_response",
            ProbeError::Explorer(ExplorerError::GraphQl(_)) => "explorer_graphql",
            ProbeError::Explorer(_) => "explorer",
            ProbeError::Config(_) => "config",
            ProbeError::NoTransferLogs { .. } => "no_transfer_logs",
        }
    }
}
