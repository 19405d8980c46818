//! ParkPulse server runtime.
//!
//! [`ServerHandle`] owns the process lifecycle: metrics recorder, database
//! and migrations, optional demo seed, cache backend, REST API and graceful
//! shutdown.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::ParkingService;
use crate::config::{AppConfig, RedisSection};
use crate::infrastructure::cache::{Cache, RedisBackend};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::seed::seed_demo_data;
use crate::infrastructure::database::{init_database, TransactionExecutor};
use crate::interfaces::http::create_api_router;
use crate::support::{listen_for_shutdown_signals, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Insert demo data into an empty database (default: false).
    pub seed: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            seed: false,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running ParkPulse server.
///
/// ```rust,no_run
/// use parkpulse::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub config: AppConfig,
    pub service: ParkingService,
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownSignal,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// 1. install the Prometheus recorder
    /// 2. connect to the database, migrate, seed if asked
    /// 3. connect the cache (disabled when redis is off or unreachable)
    /// 4. serve the REST API until shutdown
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!("Starting ParkPulse...");

        let prometheus_handle = prometheus_handle();

        // ── Database ───────────────────────────────────────────
        let db = init_database(&app_cfg.database.to_database_config()).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        if opts.seed {
            seed_demo_data(&db).await?;
        }

        // ── Cache ──────────────────────────────────────────────
        let shutdown = ShutdownSignal::new();
        let cache = connect_cache(&app_cfg.redis, shutdown.clone()).await;

        // ── Services ───────────────────────────────────────────
        let options = app_cfg.transactions.to_options();
        info!(
            max_retries = options.max_retries,
            isolation = ?options.isolation_level,
            "🔁 Transaction executor configured"
        );
        let executor = TransactionExecutor::new(db.clone(), options);
        let service = ParkingService::new(executor, cache, app_cfg.reports.to_policy());

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(service.clone(), Instant::now(), prometheus_handle);

        let api_addr = app_cfg.server_address();
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        let api_port = listener.local_addr()?.port();
        info!("REST API server listening on http://{}", api_addr);

        let api_shutdown = shutdown.clone();
        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 ParkPulse started.");

        Ok(Self {
            config: app_cfg,
            service,
            api_port,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        tokio::spawn(listen_for_shutdown_signals(self.shutdown.clone()));
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered.
    /// In-flight requests get `server.shutdown_timeout` seconds to finish.
    pub async fn wait(self) {
        info!("⏳ Waiting for server tasks to complete...");

        let grace = Duration::from_secs(self.config.server.shutdown_timeout);
        match tokio::time::timeout(grace, self.api_task).await {
            Ok(Ok(())) => info!("REST API server stopped"),
            Ok(Err(e)) => error!("REST API server task panicked: {}", e),
            Err(_) => warn!(
                timeout_secs = grace.as_secs(),
                "REST API server did not drain in time"
            ),
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }

        info!("👋 ParkPulse shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down ParkPulse...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global recorder can only be installed once per process; a restart
/// within the same process reuses it. `None` when another recorder won.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("📊 Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder unavailable, /metrics disabled");
                None
            }
        })
        .clone()
}

async fn connect_cache(redis: &RedisSection, shutdown: ShutdownSignal) -> Cache {
    if !redis.enabled {
        info!("Cache disabled by configuration");
        return Cache::disabled();
    }

    let connect_timeout = Duration::from_millis(redis.connect_timeout_ms);
    let response_timeout = Duration::from_millis(redis.response_timeout_ms);
    match RedisBackend::connect(&redis.url, connect_timeout, response_timeout).await {
        Ok(backend) => {
            info!(url = %redis.url, "🗄️  Redis cache connected");
            Cache::new(Arc::new(backend), shutdown)
        }
        Err(e) => {
            warn!(url = %redis.url, error = %e, "Redis unreachable, running without cache");
            Cache::disabled()
        }
    }
}

/// Initialize tracing from the application config. `RUST_LOG` wins over
/// `logging.level`. Call once at process startup.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
