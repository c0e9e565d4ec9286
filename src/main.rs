//! Clinic Reports
//!
//! An MCP server generating PDF reports from the clinic REST API.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

mod api;
mod build_info;
mod config;
mod error;
mod mcp;
mod models;
mod report;
mod tools;

use config::Config;
use mcp::ClinicReportsService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("clinic_reports=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    // Resolve configuration once
    let config = Config::from_env();
    eprintln!("Clinic API: {}", config.api_base_url);
    eprintln!("Reports directory: {}", config.reports_dir.display());

    // Ensure output directory exists
    std::fs::create_dir_all(&config.reports_dir)?;

    // Create the report service
    let service = ClinicReportsService::new(config);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
