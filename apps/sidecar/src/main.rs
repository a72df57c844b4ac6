//! # Quotalink Sidecar
//!
//! HTTP front end for the linked rate-limit decision engine.

use std::io;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use quotalink_infra::Engine;
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    let engine_config = config.load_engine_config().map_err(startup_failure)?;
    let engine = Engine::from_config(&engine_config, config.shards).map_err(startup_failure)?;

    tracing::info!(
        contexts = engine.registry().len(),
        shards = config.shards,
        sweep_seconds = engine_config.sweep_interval.as_secs_f64(),
        "Decision engine ready"
    );

    let sweeper = engine
        .sweeper(engine_config.sweep_interval)
        .map_err(startup_failure)?;

    let state = AppState::new(std::sync::Arc::new(engine));

    // The sweeper only starts once the listener is bound.
    let server = bind_server(state, &config.host, config.port)?;

    tracing::info!(
        "Starting Quotalink sidecar on {}:{}",
        config.host,
        config.port
    );

    let sweeper = sweeper.start();
    let result = server.await;

    sweeper.stop().await;
    tracing::info!("Quotalink sidecar stopped");

    result
}

fn bind_server(state: AppState, host: &str, port: u16) -> io::Result<Server> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((host, port))
    .map_err(|e| {
        tracing::error!(error = %e, host, port, "Bind failed");
        e
    })?;

    Ok(server.run())
}

fn startup_failure(err: impl std::error::Error + Send + Sync + 'static) -> io::Error {
    tracing::error!(error = %err, "Startup failed");
    io::Error::new(io::ErrorKind::InvalidInput, err)
}
