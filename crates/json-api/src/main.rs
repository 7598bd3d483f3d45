//! Grocer JSON API Server

use std::process;

use salvo::{
    affix_state::inject,
    oapi::{OpenApi, swagger_ui::SwaggerUi},
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info};

use grocer_app::context::AppContext;

use crate::{
    config::ServerConfig,
    observability::{Observability, metrics_handler, request_logging},
    state::State,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod analytics;
mod catalog;
mod config;
mod coupons;
mod extensions;
mod healthcheck;
mod observability;
mod orders;
mod router;
mod settings;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;
mod tracking;
mod webhooks;

/// Grocer JSON API Server entry point
///
/// # Panics
///
/// Panics if the server fails to bind or serve requests
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    let observability = Observability::init(&config).unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "subscriber failed to install, eprintln is the only sink left"
        )]
        {
            eprintln!("Observability error: {e}");
        }

        process::exit(1);
    });

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    let app = match AppContext::from_config(
        &config.database.database_url,
        config.database.run_migrations,
        config.courier.into(),
        config.checkout.total_tolerance_minor,
    )
    .await
    {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            observability.shutdown();
            process::exit(1);
        }
    };

    let router = Router::new()
        .hoop(request_logging)
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(inject(State::from_app_context(app)))
        .push(router::app_router());

    let doc = OpenApi::new("Grocer API", "0.1.0").merge_router(&router);

    let router = router
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();
    let grace = config.server.shutdown_grace();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, grace).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests
    server.serve(router).await;

    observability.shutdown();
}
