//! webharvest-mcp - MCP server for web scraping
//!
//! This binary provides an MCP server that exposes web-scraping tools
//! (content extraction, site-link harvesting) to AI assistants.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use webharvest_mcp::McpServer;

/// MCP server for web scraping and site-link harvesting.
#[derive(Parser, Debug)]
#[command(name = "webharvest-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run in stdio mode (standard MCP transport).
    #[arg(long, default_value = "true")]
    stdio: bool,

    /// WebDriver endpoint used by the rendered-page tools.
    #[arg(long, default_value = "http://localhost:4444")]
    webdriver_url: String,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Log to stderr (not stdout, which is used for MCP protocol)
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        "Starting {} v{}",
        webharvest_mcp::server::SERVER_NAME,
        webharvest_mcp::server::SERVER_VERSION
    );
    tracing::info!("Rendered-page tools will use WebDriver at {}", args.webdriver_url);

    let server = McpServer::new(&args.webdriver_url);

    if args.stdio {
        match server.run_stdio().await {
            Ok(()) => {
                tracing::info!("Server exited cleanly");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!("Server error: {}", e);
                ExitCode::FAILURE
            }
        }
    } else {
        tracing::error!("Only stdio mode is currently supported");
        ExitCode::FAILURE
    }
}
