use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pm25_advisor::config::Config;
use pm25_advisor::model::load_handle;
use pm25_advisor::pipeline::PredictionPipeline;
use pm25_advisor::service::WeatherClient;
use pm25_advisor::store::PredictionStore;
use pm25_advisor::web::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pm25_advisor=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::parse();

    tracing::info!("Starting PM2.5 advisory server");

    let model = load_handle(&config.model_path);

    let store = PredictionStore::new(&config.db_path);
    if let Err(e) = store.init() {
        tracing::error!("Audit log at {} is not usable: {}", config.db_path.display(), e);
    }

    let weather = WeatherClient::new(config.weather_settings())?;
    if config.weather_api_key.is_none() {
        tracing::warn!("No weather API key configured, index view will have no live weather");
    }

    let app = router(AppState {
        pipeline: PredictionPipeline::new(model, store),
        weather,
        city: config.city.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("Listening on http://{}", config.bind);
    axum::serve(listener, app).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
