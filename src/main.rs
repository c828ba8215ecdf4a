use anyhow::Result;
use dotenvy::dotenv;
use std::{env, net::SocketAddr};

use lunara_backend::{router, store::Database, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/lunara.db".to_string());
    let db = Database::connect(&database_url).await?;

    let app = router(AppState::new(db));

    let addr = SocketAddr::from(([0, 0, 0, 0], 3050));
    tracing::info!("🩸 Lunara backend running at {}", addr);

    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;

    Ok(())
}
