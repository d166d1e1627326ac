use std::net::TcpListener;

use bookshelf::configuration::get_configuration;
use bookshelf::startup::{run, AppState};
use bookshelf::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let state = AppState::build(&configuration).map_err(|e| {
        tracing::error!("Failed to initialise application state: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Startup error")
    })?;

    let address = configuration.application.address();
    tracing::info!("Binding server to address: {}", address);

    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    run(listener, state)?.await
}
