use hatim_gateway::config::ProcessEnv;
use hatim_gateway::lifecycle::{bootstrap, Shutdown};
use hatim_gateway::observability::{logging, BootstrapLogger};
use hatim_gateway::routing::UpstreamRouteLoader;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Variables already in the environment take precedence over .env.
    let _ = dotenvy::dotenv();

    logging::init_tracing();

    let logger = BootstrapLogger::in_working_dir();
    logger.install_panic_hook();

    tracing::info!("hatim-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let loader = UpstreamRouteLoader::from_env(&ProcessEnv);
    let server = bootstrap(&ProcessEnv, &loader, &logger)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    if let Err(e) = server.run(server_shutdown).await {
        logger.log(format!("fatal: {e}"));
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
