use std::sync::Arc;

use mock_server::Panel;
use tokio::{net::TcpListener, sync::RwLock};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let token = std::env::var("PANEL_TOKEN").unwrap_or_else(|_| "dev-token".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("easypanel mock listening on {addr}");
    mock_server::run(listener, Arc::new(RwLock::new(Panel::new(&token)))).await
}
