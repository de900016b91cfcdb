use std::{sync::Arc, time::Duration};

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::{info, warn};

use hl_api::{config::load_config, create_app, telemetry::init_tracing, AppState};
use hl_core::services::{AuthService, AuthSettings};
use hl_infra::{build_collaborators, build_stores};

const MAIL_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("loading configuration")?;
    init_tracing(&config.logging);

    info!(
        environment = %config.environment,
        storage = ?config.storage,
        "Starting Heallink auth server"
    );

    let backends = build_stores(&config).await.context("connecting storage")?;
    let collaborators = build_collaborators(&config).context("building collaborators")?;
    let (auth, mail_worker) = AuthService::assemble(
        backends.stores.clone(),
        collaborators,
        AuthSettings::from(&config),
    )
    .context("assembling auth services")?;

    let auth = Arc::new(auth);
    let state = web::Data::new(AppState::new(auth.clone(), backends));

    let bind_address = config.server.bind_address();
    info!(%bind_address, "Listening");

    let server_config = config.clone();
    let app_state = state.clone();
    let mut server = HttpServer::new(move || create_app(app_state.clone(), &server_config));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    server
        .bind(&bind_address)
        .with_context(|| format!("binding {}", bind_address))?
        .run()
        .await?;

    info!("Server stopped, draining mail outbox");
    auth.flush_mail().await;
    state.backends.close().await;
    drop(state);
    drop(auth);
    if tokio::time::timeout(MAIL_DRAIN_TIMEOUT, mail_worker).await.is_err() {
        warn!("Mail worker did not stop in time");
    }
    Ok(())
}
