use std::{fs::OpenOptions, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack_rs::{
    AppState, DomainStore, RetryPolicy, SqliteRemoteStore, build_router, graceful_shutdown,
    logging_middleware,
};

/// The REST API server for fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "FINTRACK_DB_PATH")]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "FINTRACK_PORT", default_value_t = 3000)]
    port: u16,

    /// The local timezone as a canonical timezone name, used to decide what
    /// "today" is for period filters.
    #[arg(long, env = "FINTRACK_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// File path for the debug log.
    #[arg(long, env = "FINTRACK_LOG_PATH", default_value = "debug.log")]
    log_path: String,

    /// How many times to try a remote call before giving up.
    #[arg(long, env = "FINTRACK_MAX_ATTEMPTS", default_value_t = 3)]
    max_attempts: u32,

    /// How long to wait before the first retry, in milliseconds.
    #[arg(long, env = "FINTRACK_INITIAL_BACKOFF_MS", default_value_t = 100)]
    initial_backoff_ms: u64,

    /// The longest wait between retries, in milliseconds.
    #[arg(long, env = "FINTRACK_MAX_BACKOFF_MS", default_value_t = 2000)]
    max_backoff_ms: u64,

    /// How long a single remote call may take, in milliseconds.
    #[arg(long, env = "FINTRACK_TIMEOUT_MS", default_value_t = 10_000)]
    timeout_ms: u64,
}

impl Args {
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_path);

    let connection = Connection::open(&args.db_path).unwrap_or_else(|error| {
        panic!("Could not open database file at {}: {error}", args.db_path)
    });
    let remote = SqliteRemoteStore::open(connection).expect("Could not initialize database");

    let store = Arc::new(DomainStore::new(Box::new(remote), args.retry_policy()));

    let state = AppState::new(store.clone(), &args.timezone)
        .unwrap_or_else(|error| panic!("Could not create app state: {error}"));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));
    tokio::spawn(load_when_listening(handle.clone(), store));

    let router = add_tracing_layer(
        build_router(state).layer(middleware::from_fn(logging_middleware)),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Could not start server");
}

/// Load the store once the server accepts connections, so clients can see
/// that it is still loading.
async fn load_when_listening(handle: Handle<SocketAddr>, store: Arc<DomainStore>) {
    let Some(addr) = handle.listening().await else {
        tracing::error!("Server stopped before it started listening, not loading data");
        return;
    };

    tracing::debug!("Listening on {addr}, loading transactions and goals");

    if let Err(error) = store.load().await {
        tracing::warn!("Started with incomplete data: {error}");
    }
}

fn setup_logging(log_path: &str) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fintrack_rs=debug,server=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are already logged where they are converted into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
