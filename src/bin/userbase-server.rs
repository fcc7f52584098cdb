use std::{net::IpAddr, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Body,
    extract::OriginalUri,
    http::{Method, Response, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use clap::Parser;
use rust_embed::RustEmbed;
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info};
use userbase::{
    AppState, SharedState, api,
    config::{
        AppConfig, DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_DB_HOST, DEFAULT_DB_NAME,
        DEFAULT_DB_PASSWORD, DEFAULT_DB_PORT, DEFAULT_DB_USER, DEFAULT_POOL_SIZE,
        DEFAULT_SERVICE_NAME, DbConfig,
    },
    db::{self, schema, user_repo::MySqlUserStore},
    error::ErrorResponseBody,
};

#[derive(Parser, Debug)]
#[command(author, version, about, rename_all = "kebab-case")]
struct Cli {
    /// MySQL server host
    #[arg(long, env = "DB_HOST", value_name = "HOST", default_value = DEFAULT_DB_HOST)]
    db_host: String,
    /// MySQL server port
    #[arg(long, env = "DB_PORT", value_name = "PORT", default_value_t = DEFAULT_DB_PORT)]
    db_port: u16,
    /// MySQL user
    #[arg(long, env = "DB_USER", value_name = "USER", default_value = DEFAULT_DB_USER)]
    db_user: String,
    /// MySQL password
    #[arg(
        long,
        env = "DB_PASSWORD",
        value_name = "PASSWORD",
        default_value = DEFAULT_DB_PASSWORD,
        hide_env_values = true
    )]
    db_password: String,
    /// Database (schema) holding the users table
    #[arg(long, env = "DB_NAME", value_name = "NAME", default_value = DEFAULT_DB_NAME)]
    db_name: String,
    /// Maximum number of pooled connections
    #[arg(long, env = "DB_POOL_SIZE", value_name = "N", default_value_t = DEFAULT_POOL_SIZE)]
    db_pool_size: u32,
    /// Seconds a request waits for a free connection before failing
    #[arg(
        long,
        env = "DB_ACQUIRE_TIMEOUT_SECS",
        value_name = "SECS",
        default_value_t = DEFAULT_ACQUIRE_TIMEOUT_SECS
    )]
    db_acquire_timeout_secs: u64,
    /// HTTP listen port
    #[arg(long, env = "PORT", value_name = "PORT", default_value_t = 3001)]
    port: u16,
    /// HTTP listen address
    #[arg(long, env = "BIND_ADDR", value_name = "ADDR", default_value = "0.0.0.0")]
    bind_addr: IpAddr,
    /// Name reported by /health
    #[arg(long, env = "SERVICE_NAME", value_name = "NAME", default_value = DEFAULT_SERVICE_NAME)]
    service_name: String,
}

impl Cli {
    fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    fn app_config(&self) -> AppConfig {
        AppConfig {
            service_name: self.service_name.clone(),
        }
    }

    fn db_config(&self) -> DbConfig {
        DbConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_name.clone(),
            pool_size: self.db_pool_size,
            acquire_timeout: Duration::from_secs(self.db_acquire_timeout_secs),
        }
    }
}

#[derive(RustEmbed)]
#[folder = "dist"]
struct EmbeddedDist;

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap and the log filter read the environment
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => debug!("loaded environment from {}", path.display()),
        Err(err) if err.not_found() => {}
        Err(err) => error!("failed to read .env: {err}"),
    }

    let cli = Cli::parse();
    let state = init_shared_state(&cli).await?;

    let app = build_app(state);

    let listen = cli.listen_addr();
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind to {listen}"))?;

    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error")?;

    Ok(())
}

/// JSON API plus the embedded UI on every other path.
fn build_app(state: SharedState) -> Router {
    let spa_routes = get(frontend_handler).head(frontend_handler);
    Router::new()
        .merge(api::create_router(state))
        .route("/", spa_routes.clone())
        .route("/{*path}", spa_routes)
}

async fn init_shared_state(cli: &Cli) -> Result<SharedState> {
    // unreachable database at startup is fatal
    let pool = db::init_db(&cli.db_config()).await?;
    let store = Arc::new(MySqlUserStore::new(pool));

    schema::initialize(store.as_ref()).await;

    Ok(Arc::new(AppState::new(cli.app_config(), store)))
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("failed to install CTRL+C handler: {err}");
    }
    info!("shutdown signal received");
}

async fn frontend_handler(method: Method, OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = uri.path().trim_start_matches('/');
    // unknown API paths must not fall through to the SPA
    if path == "api" || path.starts_with("api/") {
        let body = Json(ErrorResponseBody {
            error: "Not found".into(),
        });
        return (StatusCode::NOT_FOUND, body).into_response();
    }
    if path.contains("..") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let candidate = if path.is_empty() { "index.html" } else { path };
    if let Some(resp) = embedded_response(candidate, &method) {
        return resp;
    }
    if let Some(resp) = embedded_response("index.html", &method) {
        return resp;
    }

    StatusCode::NOT_FOUND.into_response()
}

fn embedded_response(path: &str, method: &Method) -> Option<Response<Body>> {
    let asset = EmbeddedDist::get(path)?;
    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(asset.data.into_owned())
    };
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(
            header::CACHE_CONTROL,
            if path == "index.html" {
                "no-cache"
            } else {
                "public, max-age=31536000, immutable"
            },
        )
        .header(
            header::CONTENT_SECURITY_POLICY,
            "default-src 'self'; base-uri 'self'; frame-ancestors 'none'; form-action 'self'; \
             script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; \
             connect-src 'self'; object-src 'none'",
        )
        .header(header::REFERRER_POLICY, "no-referrer")
        .body(body)
        .ok()
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
