use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wirebind_mock::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "mock server listening");
    wirebind_mock::run(listener).await?;
    Ok(())
}
