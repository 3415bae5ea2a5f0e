use std::{future::IntoFuture, pin::pin, process, sync::Arc};

use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

use seodeck::{
    application::{
        audit::AuditService,
        redirects::{RedirectPolicy, RedirectService},
        seo::{BulkPolicy, SeoService},
        sitemap::SitemapService,
    },
    cache::ListingCache,
    config,
    domain::catalog::PageCatalog,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_startup_error(&error);
        process::exit(1);
    }
}

fn report_startup_error(error: &InfraError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "startup error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "startup error");
    });
}

async fn run() -> Result<(), InfraError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| InfraError::configuration(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), InfraError> {
    let db = init_repositories(&settings).await?;

    let catalog = Arc::new(
        PageCatalog::standard().map_err(|err| InfraError::configuration(err.to_string()))?,
    );
    let cache = settings
        .cache
        .enabled
        .then(|| Arc::new(ListingCache::new(&settings.cache)));

    let audit = AuditService::new(db.clone());
    let redirects = RedirectService::new(
        db.clone(),
        audit.clone(),
        RedirectPolicy {
            max_chain: settings.seo.redirect_chain_max,
            delete_cap: settings.seo.redirect_delete_cap,
        },
    );
    let seo = SeoService::new(
        catalog.clone(),
        db.clone(),
        db.clone(),
        redirects.clone(),
        audit.clone(),
        cache,
        BulkPolicy {
            editor_limit: settings.seo.editor_bulk_limit,
            admin_limit: settings.seo.admin_bulk_limit,
        },
    );
    let sitemap = SitemapService::new(catalog, db.clone());

    let state = ApiState {
        seo: Arc::new(seo),
        redirects: Arc::new(redirects),
        sitemap: Arc::new(sitemap),
        audit: Arc::new(audit),
        db,
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr).await?;
    info!(addr = %settings.server.addr, "listening");

    // Drain in-flight connections after a shutdown signal, but never for
    // longer than the configured graceful window.
    let (drain_tx, drain_rx) = oneshot::channel::<()>();
    let mut server = pin!(
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = drain_rx.await;
            })
            .into_future()
    );

    tokio::select! {
        result = &mut server => return result.map_err(Into::into),
        _ = shutdown_signal() => {
            info!("shutdown signal received, draining connections");
            let _ = drain_tx.send(());
        }
    }

    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
            warn!(
                timeout_secs = settings.server.graceful_shutdown.as_secs(),
                "graceful shutdown window elapsed, exiting"
            );
            Ok(())
        }
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), InfraError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await?;
    PostgresRepositories::run_migrations(&pool).await?;

    info!("migrations applied");
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, InfraError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await?;
    PostgresRepositories::run_migrations(&pool).await?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}
