use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use recurrence::config::Settings;
use recurrence::interface::SessionRegistry;
use recurrence::server;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(1);
        }
    };
    info!(listen = %settings.listen, "starting recurrence service");

    let registry = Arc::new(SessionRegistry::new());
    let app = server::router(registry, Arc::new(settings.clone()));

    let listener = match tokio::net::TcpListener::bind(&settings.listen).await {
        Ok(listener) => listener,
        Err(error) => {
            eprintln!("could not bind {}: {error}", settings.listen);
            std::process::exit(1);
        }
    };
    if let Err(error) = axum::serve(listener, app).await {
        eprintln!("server error: {error}");
        std::process::exit(1);
    }
}
