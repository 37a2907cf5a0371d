// Main entry point for the crawler and the intake API

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use github_client::{GitHubApi, GitHubClient};
use stargazer_core::{
    server::{build_app, AppState},
    start_quota_scheduler, Config, MainRepositoryWorker, PostgresStore, TaskQueueWorker,
    WorkerRunner,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stargazer", version, about = "GitHub stargazer crawler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the main repository and process requested repositories
    Crawler,
    /// Serve the JSON intake API
    Web,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{},stargazer_core=debug,github_client=info,sqlx=warn",
                    config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(main_repository = %config.main_repository, "Configuration loaded");

    // Connect to database
    let store = PostgresStore::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    store.migrate().await.context("Failed to run migrations")?;
    tracing::info!("Database ready");

    let store = Arc::new(store);
    match cli.command {
        Command::Crawler => run_crawler(config, store).await,
        Command::Web => run_web(config, store).await,
    }
}

async fn run_crawler(config: Config, store: Arc<PostgresStore>) -> Result<()> {
    let token = config
        .github_token
        .clone()
        .context("STARGAZER_GH_TOKEN must be set")?;
    let github: Arc<dyn GitHubApi> =
        Arc::new(GitHubClient::new(token).context("Failed to build GitHub client")?);

    let mut scheduler = start_quota_scheduler(github.clone())
        .await
        .context("Failed to start quota scheduler")?;

    let shutdown = CancellationToken::new();

    let main_worker = MainRepositoryWorker::new(
        github.clone(),
        store.clone(),
        config.main_repository.clone(),
        config.user_ttl(),
    );
    let task_worker = TaskQueueWorker::new(
        github,
        store.clone(),
        store,
        config.eligibility_rules(),
        config.task_repository_max_stargazer_pages,
    );

    let handles = [
        tokio::spawn(
            WorkerRunner::new(
                Arc::new(main_worker),
                config.main_repository_scan_delay,
                shutdown.clone(),
            )
            .run(),
        ),
        tokio::spawn(
            WorkerRunner::new(
                Arc::new(task_worker),
                config.task_repository_scan_delay,
                shutdown.clone(),
            )
            .run(),
        ),
    ];

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("received shutdown signal");
    shutdown.cancel();

    for handle in handles {
        handle.await.context("Worker task panicked")?;
    }
    scheduler
        .shutdown()
        .await
        .context("Failed to stop quota scheduler")?;

    tracing::info!("Crawler stopped");
    Ok(())
}

async fn run_web(config: Config, store: Arc<PostgresStore>) -> Result<()> {
    let app = build_app(AppState {
        queue: store,
        policy: config.intake_policy(),
    });

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("received shutdown signal");
        })
        .await
        .context("Server error")?;

    Ok(())
}
