use std::sync::Arc;

use experience_recs::{
    config::Config,
    db::{create_pool, PgExperienceStore},
    routes::{create_router, AppState},
    services::{providers::GroqProvider, RecommendationService},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("experience_recs=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config).await?;
    let store = Arc::new(PgExperienceStore::new(pool));
    let llm = Arc::new(GroqProvider::new(
        config.llm_api_key.clone(),
        &config.llm_api_url,
    ));

    let recommendations = RecommendationService::new(store, llm, config.llm_model.clone());
    let app = create_router(Arc::new(AppState::new(recommendations)));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, model = %config.llm_model, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
