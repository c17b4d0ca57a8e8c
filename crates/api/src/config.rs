use catalog_core::pagination::DEFAULT_PAGE_SIZE;
use catalog_core::placement::{PlacementPolicy, DEFAULT_MAX_SEGMENT_SECS};
use catalog_core::settings::CatalogSettings;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// PostgreSQL URL. When unset the server runs on the seeded in-memory store.
    pub database_url: Option<String>,
    /// Placement policy and page size handed to the catalog engine.
    pub catalog: CatalogSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`         | unset (in-memory store)    |
    /// | `PLACEMENT_POLICY`     | `contiguous`               |
    /// | `MAX_SEGMENT_SECS`     | `3600`                     |
    /// | `PAGE_SIZE`            | `5` (clamped to 1..=100)   |
    ///
    /// Panics on malformed values: misconfiguration should fail at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let max_segment_secs: u32 = std::env::var("MAX_SEGMENT_SECS")
            .unwrap_or_else(|_| DEFAULT_MAX_SEGMENT_SECS.to_string())
            .parse()
            .expect("MAX_SEGMENT_SECS must be a valid u32");

        let placement = match std::env::var("PLACEMENT_POLICY") {
            Ok(name) => PlacementPolicy::parse(&name, max_segment_secs)
                .unwrap_or_else(|e| panic!("Invalid PLACEMENT_POLICY '{name}': {e}")),
            Err(_) => PlacementPolicy::parse("contiguous", max_segment_secs)
                .unwrap_or_else(|e| panic!("Invalid MAX_SEGMENT_SECS: {e}")),
        };

        let page_size: i64 = std::env::var("PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse()
            .expect("PAGE_SIZE must be a valid integer");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            catalog: CatalogSettings::new(placement, page_size),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
