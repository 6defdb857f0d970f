use actix_web::{web, HttpServer};
use anyhow::Context;
use sigil_api::app::{create_app, AppState};
use sigil_api::telemetry::init_tracing;
use sigil_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(&config.logging);

    tracing::info!(
        environment = %config.environment,
        event = "server_starting",
        "Starting Sigil API server"
    );

    // Keys must be usable before the server accepts requests.
    let services =
        sigil_infra::initialize(&config.jwt).context("failed to initialize signing keys")?;
    let state = web::Data::new(AppState::from_services(&services));

    let bind_address = config.server.bind_address();
    tracing::info!(
        bind_address = %bind_address,
        key_directory = %config.jwt.key_directory,
        event = "server_binding",
        "Server will bind to {}",
        bind_address
    );

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await
        .context("server terminated with an error")
}
