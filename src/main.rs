use feedback_relay::configuration::get_configuration;
use feedback_relay::create_app;
use feedback_relay::errors::Error;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::str::FromStr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn bind_address(host: &str, port: u16) -> Result<SocketAddr, Error> {
    let host = IpAddr::from_str(host)?;
    Ok(SocketAddr::from((host, port)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let configuration = get_configuration().expect("Failed to read configuration");
    let addr = bind_address(
        &configuration.application.host,
        configuration.application.port,
    )
    .expect("Failed to create socket address");
    let (app, _) = create_app(&configuration).expect("Failed to start server");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind socket address");
    info!("Server running on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}
