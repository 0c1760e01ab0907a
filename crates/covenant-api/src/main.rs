//! `covenant-server` binary entrypoint.
//!
//! Loads configuration from environment variables and starts the gRPC server.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use anyhow::Result;

use covenant_api::config::Config;
use covenant_api::server::Server;
use covenant_core::{LogFormat, init_logging};

fn choose_log_format(config: &Config) -> LogFormat {
    if config.debug {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(choose_log_format(&config));

    let server = Server::from_config(config).await?;
    server.serve().await?;
    Ok(())
}
