//! owa-ingest - library management CLI
//!
//! `add` scans a music directory into the library, `member` registers a
//! member account.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owa_common::config::{load_toml_config, resolve_database_path};
use owa_common::db::{init_database, members};
use owa_common::UnitOfWork;
use owa_ingest::Ingestor;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for owa-ingest
#[derive(Parser, Debug)]
#[command(name = "owa-ingest")]
#[command(about = "Music library ingestion and management")]
#[command(version)]
struct Args {
    /// Database file (overrides OWA_DATABASE and the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, global = true, env = "OWA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a directory and store its tracks
    Add {
        /// Root of the music tree
        #[arg(short, long)]
        dir: PathBuf,

        /// Existing member who tags newly added artists by genre
        #[arg(short, long)]
        member: Option<String>,
    },

    /// Create a member (no-op if the name is taken)
    Member {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = load_toml_config(args.config.as_deref()).context("Failed to load config")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_path = resolve_database_path(args.database.as_deref(), &config);
    info!("Database: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    match args.command {
        Command::Add { dir, member } => {
            let member = match member {
                Some(name) => Some(
                    members::find_member_by_name(&pool, &name)
                        .await?
                        .with_context(|| format!("No such member: {}", name))?,
                ),
                None => None,
            };

            let ingestor = Ingestor::new(pool, &config.ingest.extensions);

            // Dropping the ingestion future drops its unit of work, which
            // discards the in-flight group.
            tokio::select! {
                result = ingestor.store_directory(&dir, member.as_ref()) => {
                    let report = result.context("Ingestion failed")?;
                    info!(
                        groups = report.groups_committed,
                        failed = report.groups_failed,
                        stored = report.files_stored,
                        skipped = report.files_skipped,
                        elapsed_s = report.elapsed.as_secs(),
                        "Ingestion complete"
                    );
                    Ok(ExitCode::SUCCESS)
                }
                _ = signal::ctrl_c() => {
                    warn!("Interrupted, in-flight group rolled back");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Member {
            name,
            email,
            password,
        } => {
            let mut uow = UnitOfWork::new(pool);
            let member = uow.member(&name, &email, &password).await?;
            let created = uow.is_new(member.id.0);
            uow.commit().await.context("Failed to store member")?;

            if created {
                info!("Created member {}", member.name);
            } else {
                info!("Member {} already exists", member.name);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
