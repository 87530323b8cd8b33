use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use slizzai::cli::{format_run_summary, Args};
use slizzai::config::{load_config, ServerConfig};
use slizzai::provenance::{digital_signature, sign_file, FALLBACK_CODE};
use slizzai::runtime::Coordinator;
use slizzai::server::{create_router, AppState};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter())),
        )
        .init();

    let config = load_config(&args.config);
    let server_config = args.server_config(&config.server);
    let asset = args.asset_path(&config).to_string();
    let coordinator = Coordinator::new(config);

    // Every failure is reported through the log; the exit status stays 0.
    if args.serve {
        if let Err(e) = serve(coordinator, &server_config).await {
            error!("Server error: {:#}", e);
        }
        return;
    }

    let results = coordinator.run(&asset).await;

    let signature = match std::env::current_exe() {
        Ok(path) => sign_file(&path),
        Err(e) => {
            error!("Could not locate executable for digital signature: {}", e);
            digital_signature(FALLBACK_CODE.as_bytes())
        }
    };

    let build = coordinator.build_info();
    info!("Prototype Serial Number: {}", build.serial_number);
    info!("Digital Signature: {}", signature);

    println!("{}", format_run_summary(&results, build, &signature));
}

async fn serve(coordinator: Coordinator, server: &ServerConfig) -> anyhow::Result<()> {
    let addr = server.socket_addr();
    let app = create_router(AppState::new(coordinator), server.max_concurrent);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Server listening on {}", addr);
    info!("Endpoints:");
    info!("  GET  /health           - Health check");
    info!("  GET  /status           - Build info and cache statistics");
    info!("  POST /v1/pipeline/run  - Import and process an asset");

    axum::serve(listener, app).await.context("Server stopped")?;
    Ok(())
}
