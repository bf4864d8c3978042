use std::sync::Arc;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrutin_core::database::{
    ArchiveRepository, CandidateRepository, ElectionRepository, PostgresDatabase, VoterRepository,
};
use scrutin_core::ledger::{HttpLedgerClient, LedgerClient};
use scrutin_core::lifecycle::{LifecycleScheduler, LifecycleService, SweepSettings};
use scrutin_core::uploads::CandidateMediaStore;
use scrutin_server::AppState;
use scrutin_server::infra::config::Config;
use scrutin_server::routes::create_app;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "scrutin-server")]
#[command(about = "Election lifecycle orchestrator over a ledger gateway and a Postgres mirror")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Run database preflight checks (connectivity + privileges) and exit
    Preflight,
    /// Apply database migrations and exit (runs preflight first)
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        match command {
            Command::Db(DbCommand::Preflight) => {
                run_db_preflight(&cli.serve).await?;
                return Ok(());
            }
            Command::Db(DbCommand::Migrate) => {
                run_db_migrate(&cli.serve).await?;
                return Ok(());
            }
        }
    }

    run_server(cli.serve).await
}

async fn run_db_preflight(args: &ServeArgs) -> anyhow::Result<()> {
    let ConfigBootstrap { database_url, .. } = load_runtime_config(args).await?;
    let pg = PostgresDatabase::new(&database_url)
        .await
        .context("failed to connect to PostgreSQL for preflight")?;
    pg.preflight_only()
        .await
        .context("database preflight failed")?;
    info!("Database preflight passed");
    Ok(())
}

async fn run_db_migrate(args: &ServeArgs) -> anyhow::Result<()> {
    let ConfigBootstrap { database_url, .. } = load_runtime_config(args).await?;
    let pg = PostgresDatabase::new(&database_url)
        .await
        .context("failed to connect to PostgreSQL for migration")?;
    pg.initialize_schema()
        .await
        .context("database migration failed")?;
    info!("Database migrations applied");
    Ok(())
}

struct ConfigBootstrap {
    config: Arc<Config>,
    database_url: String,
}

async fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<ConfigBootstrap> {
    let mut config = Config::from_env().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server_port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server_host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Ledger gateway: {}", config.ledger_gateway_url);
    match &config.contract_address {
        Some(address) => info!("Contract address: {}", address),
        None => warn!("CONTRACT_ADDRESS not set - archives will carry no contract reference"),
    }
    info!(
        "Sweep cadence: completion every {}, archival every {}",
        humantime::format_duration(config.sweeps.completion_interval),
        humantime::format_duration(config.sweeps.archival_interval)
    );

    config
        .ensure_directories()
        .context("failed to create upload directories")?;

    let Some(database_url) = config.database_url.clone() else {
        error!("DATABASE_URL must be provided for PostgreSQL connections");
        return Err(anyhow::anyhow!(
            "No PostgreSQL connection configuration found"
        ));
    };

    if !(database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")) {
        error!("Only PostgreSQL database URLs are supported");
        return Err(anyhow::anyhow!(
            "Invalid database URL: must start with postgres:// or postgresql://"
        ));
    }

    Ok(ConfigBootstrap {
        config: Arc::new(config),
        database_url,
    })
}

struct ResourceBootstrap {
    state: AppState,
    scheduler: Arc<LifecycleScheduler>,
    shutdown_tx: mpsc::Sender<()>,
}

async fn wire_app_resources(
    config: Arc<Config>,
    database_url: &str,
) -> anyhow::Result<ResourceBootstrap> {
    let postgres = match PostgresDatabase::new(database_url).await {
        Ok(db) => {
            info!("Successfully connected to PostgreSQL");
            db
        }
        Err(connect_error) => {
            error!("PostgreSQL connection failed: {}", connect_error);
            return Err(anyhow::anyhow!(
                "Database connection failed: {}",
                connect_error
            ));
        }
    };

    match postgres.initialize_schema().await {
        Ok(()) => {
            info!("Database schema initialized successfully");
        }
        Err(e) => {
            error!("Failed to initialize database schema: {}", e);
            return Err(anyhow::anyhow!("Database migration failed: {}", e));
        }
    }

    let elections: Arc<dyn ElectionRepository> = Arc::new(postgres.elections().clone());
    let candidates: Arc<dyn CandidateRepository> = Arc::new(postgres.candidates().clone());
    let voters: Arc<dyn VoterRepository> = Arc::new(postgres.voters().clone());
    let archives: Arc<dyn ArchiveRepository> = Arc::new(postgres.archives().clone());

    let ledger: Arc<dyn LedgerClient> = Arc::new(
        HttpLedgerClient::new(
            config.ledger_gateway_url.clone(),
            config.contract_address.clone(),
            config.ledger_timeout,
        )
        .context("failed to initialize ledger gateway client")?,
    );

    let media = Arc::new(CandidateMediaStore::new(config.upload_dir.clone()));
    media
        .ensure_exists()
        .await
        .context("failed to prepare candidate media directory")?;

    let lifecycle = Arc::new(LifecycleService::new(
        elections.clone(),
        candidates.clone(),
        voters,
        archives.clone(),
        ledger.clone(),
        media,
        config.contract_address.clone(),
    ));

    let settings = SweepSettings {
        completion_interval: config.sweeps.completion_interval,
        archival_interval: config.sweeps.archival_interval,
        auto_complete: config.sweeps.auto_complete,
        auto_archive: config.sweeps.auto_archive,
    };

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let scheduler = Arc::new(LifecycleScheduler::new(
        lifecycle.clone(),
        settings,
        shutdown_rx,
    ));

    let state = AppState::new(
        config,
        lifecycle,
        elections,
        candidates,
        archives,
        ledger,
    );

    Ok(ResourceBootstrap {
        state,
        scheduler,
        shutdown_tx,
    })
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let ConfigBootstrap {
        config,
        database_url,
    } = load_runtime_config(&args).await?;

    let ResourceBootstrap {
        state,
        scheduler,
        shutdown_tx,
    } = wire_app_resources(Arc::clone(&config), &database_url).await?;

    let scheduler_handle = tokio::spawn(scheduler.run());

    let app = create_app(state);

    info!(
        "Starting scrutin server (HTTP) on {}:{}",
        config.server_host, config.server_port
    );

    let listener =
        tokio::net::TcpListener::bind((config.server_host.as_str(), config.server_port)).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the sweep loops before the process exits.
    let _ = shutdown_tx.send(()).await;
    match scheduler_handle.await {
        Ok(Ok(())) => info!("Lifecycle scheduler stopped"),
        Ok(Err(e)) => warn!("Lifecycle scheduler exited with error: {}", e),
        Err(e) => warn!("Lifecycle scheduler task failed: {}", e),
    }

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
