use std::{future::IntoFuture, process, sync::Arc};

use bikinghub::{
    application::{
        auth::{Argon2PasswordHasher, AuthGuard, Sha256KeyHasher},
        error::AppError,
        repos::UsersRepo,
    },
    cache::{CacheConfig, CollectionCache, MemoryCacheStore},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, api::ApiDependencies},
        telemetry,
        weather::FmiWeatherProvider,
    },
};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::IssueKey(args) => run_issue_key(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let provider = FmiWeatherProvider::new(&settings.weather)?;
    if settings.weather.mml_api_key.is_none() {
        warn!(
            target = "bikinghub::weather",
            "no mml api key configured; forecasts cannot be fetched"
        );
    }

    let cache_config = CacheConfig::from(&settings.cache);
    let cache = CollectionCache::new(
        Arc::new(MemoryCacheStore::new(&cache_config)),
        cache_config,
    );

    let deps = ApiDependencies {
        users: repositories.clone(),
        locations: repositories.clone(),
        favourites: repositories.clone(),
        weather: repositories.clone(),
        auth_keys: repositories,
        weather_provider: Arc::new(provider),
        key_hasher: Arc::new(Sha256KeyHasher),
        password_hasher: Arc::new(Argon2PasswordHasher),
    };
    let state = ApiState::new(deps, cache, settings.locations.dedup_radius_km);

    serve_http(&settings, state).await
}

async fn run_issue_key(
    settings: config::Settings,
    args: config::IssueKeyArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let user = repositories
        .find_by_name(&args.user)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    let guard = AuthGuard::new(repositories, Arc::new(Sha256KeyHasher));
    let issued = guard.issue_key(user.id, args.admin).await?;

    info!(
        target = "bikinghub::auth",
        user_id = user.id,
        key_id = issued.key_id,
        admin = issued.admin,
        "api key issued"
    );
    println!("{}", issued.key);
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "bikinghub::http",
        addr = %settings.server.addr,
        "listening"
    );

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();

    let grace = settings.server.graceful_shutdown;
    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = async {
            if signalled_rx.await.is_ok() {
                tokio::time::sleep(grace).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            warn!(
                target = "bikinghub::http",
                grace_seconds = grace.as_secs(),
                "in-flight requests did not finish before the shutdown deadline"
            );
        }
    }

    info!(target = "bikinghub::http", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(target = "bikinghub::http", "shutdown signal received");
}
