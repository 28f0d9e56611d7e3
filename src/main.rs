// Main

mod amf;
mod error;
mod log;
mod rtmp;
mod server;
mod session;
mod utils;

use std::sync::Arc;

use log::{LogConfig, Logger};
use server::{run_server, RtmpServerConfiguration, RtmpServerStatus};
use tokio::sync::Mutex;
use utils::get_env_bool;

/// Main function
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load .env
    let _ = dotenvy::dotenv();

    // Initialize logger

    let logger = Logger::new(LogConfig {
        prefix: "".to_string(),
        error_enabled: get_env_bool("LOG_ERROR", true),
        warning_enabled: get_env_bool("LOG_WARNING", true),
        info_enabled: get_env_bool("LOG_INFO", true),
        debug_enabled: get_env_bool("LOG_DEBUG", false),
        trace_enabled: get_env_bool("LOG_TRACE", get_env_bool("LOG_DEBUG", false)),
    });

    // Initialize server status

    let server_status = Arc::new(Mutex::new(RtmpServerStatus::new()));

    // Print version

    const VERSION: &str = env!("CARGO_PKG_VERSION");

    logger.log_info(&format!("RTMP Server (Rust Implementation) ({VERSION})"));

    // Load configuration

    let server_config = match RtmpServerConfiguration::load_from_env(&logger) {
        Ok(c) => Arc::new(c),
        Err(_) => {
            std::process::exit(1);
        }
    };

    // Run server

    run_server(logger, server_config, server_status).await;

    // End of main

    Ok(())
}
