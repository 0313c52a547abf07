/// Main entry point for the touch MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use touch_mcp_server::{ServerConfig, TouchServer};

/// Command line arguments for the touch MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory to create files in when the caller gives no destPath
    /// (overrides DEFAULT_TOUCH_PATH)
    #[arg(long)]
    default_path: Option<PathBuf>,

    /// Path of the diagnostic log file
    /// If not provided, uses touch-mcp-server.log in the home directory
    #[arg(long, conflicts_with = "no_log")]
    log_file: Option<PathBuf>,

    /// Do not write the diagnostic log file
    #[arg(long)]
    no_log: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("touch_mcp_server={}", log_level))
        .with_writer(std::io::stderr) // stdout carries the protocol
        .init();

    info!("Starting touch MCP server");

    let mut config = ServerConfig::from_env()
        .with_default_touch_path(args.default_path)
        .with_log_file(args.log_file);
    if args.no_log {
        config = config.without_log_file();
    }

    match &config.log_file {
        Some(path) => info!("Writing diagnostic log to {}", path.display()),
        None => info!("Diagnostic log disabled"),
    }

    let result = TouchServer::new(config).run().await;

    // Printed regardless of the log filter; stdout belongs to the protocol.
    eprintln!("touch-mcp-server: exiting");
    result?;

    info!("Touch MCP server shutdown complete");
    Ok(())
}
