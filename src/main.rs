use anyhow::Result;
use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use astronomy_buddy::formatters::format_night_report;
use astronomy_buddy::http::{create_router, AppState};
use astronomy_buddy::service::Astronomy;
use astronomy_buddy::sources::{AstronomyApi, Nominatim, SevenTimer, UpstreamClient};
use astronomy_buddy::{AppConfig, ViewingPlanner};

#[derive(Parser)]
#[command(name = "astronomy-buddy", about = "Tonight's observing plan for a location")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// HTTP API (default)
    Serve,
    /// MCP over stdio
    Mcp,
    /// Print tonight's plan for the configured location and exit
    Tonight {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn build_planner(config: &AppConfig) -> Result<ViewingPlanner> {
    // Missing credentials fail here, before anything goes upstream
    let credentials = config.credentials()?;
    let http = UpstreamClient::new(config.request_timeout())?;

    Ok(ViewingPlanner::new(
        Arc::new(AstronomyApi::new(http.clone(), credentials)),
        Arc::new(SevenTimer::new(http.clone())),
        Arc::new(Nominatim::new(http)),
        config.request_timeout(),
    ))
}

async fn serve_http(config: &AppConfig, planner: ViewingPlanner) -> Result<()> {
    let app = create_router(AppState {
        planner,
        defaults: config.request_defaults(),
    });

    let address = config.server_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Astronomy Buddy API running on {}", address);
    tracing::info!(
        "Example: http://{}/viewing-data?latitude=47.6062&longitude=-122.3321&elevation=50",
        address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, closing server");
        })
        .await?;
    Ok(())
}

async fn serve_mcp(config: &AppConfig, planner: ViewingPlanner) -> Result<()> {
    tracing::info!("Starting MCP astronomy server");

    let astronomy = Astronomy::new(planner, config.request_defaults());
    let server = astronomy.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;
    Ok(())
}

async fn print_tonight(config: &AppConfig, planner: ViewingPlanner, json: bool) -> Result<()> {
    let request = config.default_request()?;
    let report = planner.get_viewing_data(&request).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_night_report(&report));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("astronomy_buddy={0},tower_http={0}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let planner = build_planner(&config)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve_http(&config, planner).await?,
        Commands::Mcp => serve_mcp(&config, planner).await?,
        Commands::Tonight { json } => print_tonight(&config, planner, json).await?,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
