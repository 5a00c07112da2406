use std::env;
use std::error::Error;

use autha_mock::config::Configuration;
use autha_mock::{app, initialize_state, telemetry};
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    telemetry::setup_logging();

    let mut config = Configuration::default();
    if let Ok(path) = env::var("CONFIG_PATH") {
        config = config.path(path);
    }
    let mut config = config.read()?;
    if let Ok(port) = env::var("PORT") {
        config = config.port(port.parse()?);
    }

    let address = config.address();
    let state = initialize_state(config)?;

    for record in state.authenticator.directory().iter() {
        tracing::info!(
            email = %record.email,
            display_name = %record.profile.display_name,
            display_role = %record.profile.display_role,
            cities = %record.profile.cities.join(", "),
            "test identity available"
        );
    }

    let listener = TcpListener::bind(address).await?;
    tracing::info!(%address, "server started");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
