use jpdb_epub_deck::jpdb::mock::run_mock_server;
use jpdb_epub_deck::jpdb::models::JPDB_MOCK_API_URL;

use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let api_key = std::env::args().nth(1).unwrap_or_else(|| "mock_api_key".to_string());
    let addr: SocketAddr = JPDB_MOCK_API_URL.trim_start_matches("http://").parse()?;

    let (_address, shutdown) = run_mock_server(addr, &api_key).await?;
    println!("Mock Server running on {}, API key: {}", JPDB_MOCK_API_URL, api_key);

    tokio::signal::ctrl_c().await?;
    shutdown.send(()).ok();

    Ok(())
}
