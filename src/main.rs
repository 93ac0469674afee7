use std::io;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use potato_classifier::config::DEFAULT_LOG_FILTER;
use potato_classifier::handlers;
use potato_classifier::{AppState, Config};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = Config::parse();
    info!("Starting potato classifier v{}", env!("CARGO_PKG_VERSION"));

    let state = match AppState::from_config(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            error!("startup failed: {}", e);
            return Err(io::Error::new(io::ErrorKind::Other, e));
        }
    };

    let (host, port) = config.bind_addr();
    let origins = config.allowed_origins.clone();
    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(handlers::cors(&origins))
            .wrap(Logger::default())
            .configure(handlers::routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
