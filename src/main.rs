use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use smart_prop::config::{LoggingSettings, Settings};
use smart_prop::core::{RankingContract, Recommender};
use smart_prop::routes::{self, AppState};
use smart_prop::services::{AuthService, MistralClient, PostgresClient};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(&LoggingSettings::default());
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::other(format!("Configuration error: {}", e)));
        }
    };

    init_tracing(&settings.logging);

    info!("Starting Smart Prop server...");

    let store = Arc::new(PostgresClient::new(&settings.database).await.map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::io::Error::other(format!("PostgreSQL connection error: {}", e))
    })?);

    info!("PostgreSQL client initialized (max: {} connections)", settings.database.max_connections);

    let ranking = &settings.ranking;
    if ranking.api_key.is_empty() {
        error!("No ranking API key configured; recommendations will fail until MISTRAL_API_KEY is set");
    }

    let ranker = Arc::new(
        MistralClient::new(
            ranking.endpoint.clone(),
            ranking.api_key.clone(),
            ranking.model.clone(),
            ranking.temperature,
            ranking.timeout(),
        )
        .map_err(|e| {
            error!("Failed to build ranking client: {}", e);
            std::io::Error::other(e.to_string())
        })?,
    );

    let contract = RankingContract::new(ranking.max_results);
    info!(
        "Ranking client initialized (model: {}, contract: {}, timeout: {:?})",
        ranker.model(),
        RankingContract::VERSION,
        ranking.timeout()
    );

    let recommender = Recommender::new(store.clone(), ranker, contract, ranking.timeout());
    info!("Recommendations capped at {} properties", recommender.contract().max_results());

    let app_state = AppState {
        store: store.clone(),
        recommender,
        auth: Arc::new(AuthService::new(&settings.auth)),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    let result = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await;

    store.close().await;
    info!("Database pool closed");

    result
}
