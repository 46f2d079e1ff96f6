use blockscout_lag_probe::{
    init_logging, run_probe, Cli, ErrorLogger, LogContext, LoggingConfig, EXIT_PROBE_FAILED,
};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            // Logging is configured from the config we failed to load
            if init_logging(&LoggingConfig::default()).is_err() {
                eprintln!("Invalid configuration: {}", e);
            }
            ErrorLogger::log_error(&e, Some(LogContext::new("main", "load_config")));
            std::process::exit(EXIT_PROBE_FAILED);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(EXIT_PROBE_FAILED);
    }

    let context = LogContext::new("main", "probe")
        .with_metadata("rpc_url", serde_json::json!(config.rpc.url))
        .with_metadata("blockscout_url", serde_json::json!(config.blockscout.url))
        .with_metadata("max_blocks_behind", serde_json::json!(config.probe.max_blocks_behind));
    context.info("Starting Blockscout lag probe");

    match run_probe(config).await {
        Ok(outcome) => match serde_json::to_string(&outcome) {
            Ok(line) => {
                println!("{}", line);
                std::process::exit(outcome.exit_code());
            }
            Err(e) => {
                context.error(&format!("Failed to serialize outcome: {}", e));
                std::process::exit(EXIT_PROBE_FAILED);
            }
        },
        Err(e) => {
            ErrorLogger::log_error(&e, Some(context));
            std::process::exit(EXIT_PROBE_FAILED);
        }
    }
}
