use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use transfer_eval::config::{LoggingSettings, Settings};
use transfer_eval::core::{AssistedMatcher, EquivalencyTable, Evaluator, MatchStrategy};
use transfer_eval::routes::{self, AppState};
use transfer_eval::services::{load_sample_transcript, AdvisorDrafter, AnthropicClient, TranscriptParser};

fn init_logging(logging: &LoggingSettings) {
    // LOG_LEVEL / LOG_FORMAT win over the config file
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging);

    info!("Starting Transfer Eval service...");

    let table = EquivalencyTable::load(&settings.data.equivalencies_path)
        .map_err(|e| startup_error("Failed to load equivalency table", e))?;

    info!("Loaded {} equivalencies from {}", table.len(), settings.data.equivalencies_path);

    let sample = load_sample_transcript(&settings.data.sample_transcript_path)
        .map_err(|e| startup_error("Failed to load sample transcript", e))?;

    // Reasoning service is optional; without a key everything runs deterministically
    let client = match settings.anthropic.options() {
        Some(options) => {
            let client = AnthropicClient::new(options)
                .map_err(|e| startup_error("Failed to create reasoning client", e))?;
            info!("Reasoning service enabled (model: {})", client.model());
            Some(Arc::new(client))
        }
        None => {
            warn!("No Anthropic API key configured, using exact-code matching only");
            None
        }
    };

    let strategy = match &client {
        Some(client) => MatchStrategy::Assisted(AssistedMatcher::new(client.clone())),
        None => MatchStrategy::Deterministic,
    };

    let app_state = AppState {
        evaluator: Evaluator::new(Arc::new(table), strategy),
        transcripts: TranscriptParser::new(client.clone(), sample),
        advisor: AdvisorDrafter::new(client),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .app_data(routes::multipart_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
