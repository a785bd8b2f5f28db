use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use stall_algo::config::Settings;
use stall_algo::core::{CatalogFilterEngine, PeerRanker};
use stall_algo::routes::{self, recommendations::AppState};
use stall_algo::services::{BackendClient, BackendTables, CacheManager, SnapshotStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// Output style for the fmt subscriber, from `LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Compact,
    Pretty,
    Full,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "full" => LogFormat::Full,
            _ => LogFormat::Compact,
        }
    }
}

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    // LOG_LEVEL / LOG_FORMAT win over RUST_LOG so deploys only need one knob
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = LogFormat::parse(&std::env::var("LOG_FORMAT").unwrap_or_default());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    match log_format {
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Full => subscriber.init(),
        LogFormat::Compact => subscriber.compact().init(),
    }

    info!("Starting Stall Algo recommendation service...");

    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        io_error("Configuration error", e)
    })?;

    info!("Configuration loaded successfully");

    let tables = BackendTables {
        menus: settings.tables.menus,
        stalls: settings.tables.stalls,
        profiles: settings.tables.profiles,
    };

    let backend = BackendClient::new(
        settings.backend.url,
        settings.backend.api_key,
        settings.backend.timeout_secs.unwrap_or(30),
        tables,
    )
    .map_err(|e| {
        error!("Failed to create backend client: {}", e);
        io_error("Backend client error", e)
    })?;

    info!("Backend client initialized");

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);

    let cache = match settings.cache.redis_url.as_deref().filter(|url| !url.is_empty()) {
        Some(redis_url) => match CacheManager::new(redis_url, cache_ttl).await {
            Ok(c) => {
                info!("Snapshot cache initialized with Redis tier (TTL: {}s)", cache_ttl);
                c
            }
            Err(e) => {
                error!("Failed to connect to Redis ({})", e);
                return Err(io_error("Redis connection failed", e));
            }
        },
        None => {
            warn!("No Redis URL configured, snapshots are cached in process only");
            CacheManager::local(cache_ttl)
        }
    };

    let app_state = AppState {
        snapshots: SnapshotStore::new(Arc::new(backend), Arc::new(cache)),
        engine: CatalogFilterEngine::new(),
        ranker: PeerRanker::new(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_defaults_to_compact() {
        assert_eq!(LogFormat::parse(""), LogFormat::Compact);
        assert_eq!(LogFormat::parse("json"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("Pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("full"), LogFormat::Full);
    }
}
