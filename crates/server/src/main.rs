use anyhow::Context;
use bond_core::Config;
use bond_server::{build_router, run_ingest, AppState};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "bond-ledger", version, about = "Electoral bond reconciliation ledger")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile the purchase and redemption reports and rebuild the database.
    Ingest {
        #[arg(long)]
        purchases: PathBuf,
        #[arg(long)]
        redemptions: PathBuf,
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Serve the read-only query API.
    Serve {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long)]
        bind: Option<String>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_env().context("applying BOND_* environment overrides")?;
    Ok(config)
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install ctrl-c handler; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;
    init_tracing(config.server.log_json);

    match cli.command {
        Command::Ingest {
            purchases,
            redemptions,
            db,
        } => {
            if let Some(db) = db {
                config.store.path = db;
            }
            let stats = tokio::task::spawn_blocking(move || {
                run_ingest(&purchases, &redemptions, &config)
            })
            .await
            .context("ingest task panicked")??;
            info!(
                purchases = stats.purchases,
                redemptions = stats.redemptions,
                transactions = stats.transactions,
                "database rebuilt"
            );
        }
        Command::Serve { db, bind } => {
            if let Some(db) = db {
                config.store.path = db;
            }
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            config.validate()?;

            let app = build_router(AppState::new(config.store.path.clone()));
            let listener = tokio::net::TcpListener::bind(&config.server.bind)
                .await
                .with_context(|| format!("binding {}", config.server.bind))?;
            info!(
                bind = %config.server.bind,
                db = %config.store.path.display(),
                "serving query API"
            );
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }
    Ok(())
}
