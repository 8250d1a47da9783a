use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = handover_hub::Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen = %cfg.listen,
        static_dir = %cfg.static_dir.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<none>".into()),
        loglevel = %cfg.loglevel
    );

    let storage = handover_hub::Storage::connect(&cfg.database_url).await?;

    let state = handover_hub::router::HubState::new(storage);
    state.authenticator.bootstrap_admin(&cfg.admin_password).await?;

    let app = handover_hub::router::hub_router_with_static(state, cfg.static_dir.as_deref());

    let listener = TcpListener::bind(&cfg.listen).await?;
    info!("HTTP server listening on {}", cfg.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
