/*
 * Responsibility
 * - Config loading → tracing → collaborators → Router assembly
 * - Interceptor chain (telemetry → CORS) around the transport layers
 * - axum::serve() with graceful shutdown
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{Cli, Config};
use crate::middleware::{
    self,
    chain::Chain,
    cors::{Cors, CorsSettings},
    recorder::RouteTag,
    telemetry::Telemetry,
};
use crate::repos::{PgUserStore, connect_and_migrate};
use crate::services::{
    auth::build_token_service,
    mail::SesMailSender,
    metrics::HttpMetrics,
    storage::S3ObjectStore,
};
use crate::state::{AppState, StorageSettings};

fn init_tracing(debug: bool) {
    // RUST_LOG wins if set, e.g.
    // RUST_LOG=info,api_scaffold=debug cargo run
    let default = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing; stderr can be hidden depending on
        // how the process is launched.
        tracing::error!(?info, "panic");

        // Development: crash the whole process so the failure is noticed.
        // Production: default behavior, the server keeps running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run(cli: Cli) -> Result<()> {
    let env_files = cli.load_env_files();
    let config = Config::from_env(cli.env).context("loading configuration")?;

    init_tracing(config.debug);
    init_panic_hook(!config.app_env.is_production());

    for file in &env_files {
        debug!(file = %file.display(), "loaded env file");
    }

    info!(
        env = config.app_env.as_str(),
        addr = %config.addr,
        "starting API"
    );

    let state = build_state(&config).await?;

    let cors = Arc::new(CorsSettings::new());
    cors.configure(config.cors.clone());

    let app = build_app(state, cors);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    info!(addr = %config.addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("server stopped");
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    // Process-level services, injected into the shared application state.
    let pool = connect_and_migrate(&config.database_url)
        .await
        .context("connecting to the database")?;

    Ok(AppState {
        tokens: build_token_service(config),
        users: Arc::new(PgUserStore::new(pool)),
        objects: Arc::new(S3ObjectStore::from_env(&config.aws_region).await),
        mailer: Arc::new(SesMailSender::from_env(&config.aws_region, &config.mail_from).await),
        metrics: Arc::new(HttpMetrics::new().context("registering HTTP metrics")?),
        storage: StorageSettings {
            bucket: config.aws_bucket.clone(),
            region: config.aws_region.clone(),
        },
    })
}

/// Assemble the full application.
///
/// Outermost first: telemetry → CORS → transport layers → router. The auth
/// gate is attached per route inside `api::v1::routes`; every matched route
/// also reports its template back to telemetry through `RouteTag`.
pub fn build_app(state: AppState, cors: Arc<CorsSettings>) -> Router {
    let metrics = state.metrics.clone();

    let router = Router::new()
        .route("/metrics", get(api::metrics::metrics))
        .nest("/api/v1", api::v1::routes(state.tokens.clone()))
        .route_layer(Chain::new().with(RouteTag))
        .with_state(state);

    let router = middleware::http::apply(router);

    router.layer(
        Chain::new()
            .with(Telemetry::new(metrics))
            .with(Cors::new(cors)),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("shutdown signal received, draining connections");
}
