//! repetask CLI: runs the API and administers the repetition catalog.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use repetask::api::{AppState, Server};
use repetask::config::Config;
use repetask::config::secrets::ExposeSecret;
use repetask::db::Db;
use repetask::engine::{Schedule, ScheduleFile};
use repetask::model::repetition::{NewRepetitionType, RepetitionTypeId};
use repetask::store::{MemoryStore, ScheduleProvider};
use repetask::telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(name = "repetask", about = "Task tracking with spaced repetition")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Keep everything in memory instead of Postgres (data is lost on exit)
        #[arg(long)]
        in_memory: bool,
        /// TOML schedule to seed the in-memory catalog with
        #[arg(long, requires = "in_memory")]
        schedule: Option<PathBuf>,
    },
    /// Repetition catalog administration
    Stages {
        #[command(subcommand)]
        action: StageAction,
    },
    /// Note maintenance
    Notes {
        #[command(subcommand)]
        action: NoteAction,
    },
}

#[derive(Subcommand)]
enum StageAction {
    /// List the catalog in order
    List,
    /// Add a single stage
    Add {
        name: String,
        /// Position in the sequence (unique, greater than 0)
        #[arg(long)]
        order: i32,
        /// Days until the task is due after entering this stage
        #[arg(long)]
        day: i32,
    },
    /// Insert every stage from a TOML schedule file
    Seed { file: PathBuf },
    /// Remove a stage. Tasks still pointing at it will fail to complete.
    Remove { id: String },
}

#[derive(Subcommand)]
enum NoteAction {
    /// Count notes whose task has been deleted
    Orphans,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            in_memory,
            schedule,
        } => cmd_serve(in_memory, schedule).await,
        Command::Stages { action } => {
            let db = connect().await?;
            match action {
                StageAction::List => cmd_stage_list(&db).await,
                StageAction::Add { name, order, day } => {
                    cmd_stage_add(&db, NewRepetitionType::new(name, order, day)).await
                }
                StageAction::Seed { file } => cmd_stage_seed(&db, file).await,
                StageAction::Remove { id } => {
                    db.delete_repetition_type(RepetitionTypeId::parse(&id)?)
                        .await?;
                    println!("Removed {id}");
                    Ok(())
                }
            }
        }
        Command::Notes {
            action: NoteAction::Orphans,
        } => {
            let db = connect().await?;
            let orphans = db.count_orphaned_notes().await?;
            println!("{orphans} orphaned note(s)");
            Ok(())
        }
    }
}

async fn connect() -> anyhow::Result<Db> {
    let config = Config::from_env()?;
    let url = config
        .database_url
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
    let db = Db::connect(url.expose_secret()).await?;
    db.migrate().await?;
    Ok(db)
}

async fn cmd_serve(in_memory: bool, schedule: Option<PathBuf>) -> anyhow::Result<()> {
    let config = if in_memory {
        Config::from_env_without_database()?
    } else {
        Config::from_env()?
    };

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "repetask".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let state = if in_memory {
        let catalog = match schedule {
            Some(path) => ScheduleFile::load(&path)?.into_schedule()?,
            None => Schedule::default(),
        };
        tracing::warn!(stages = catalog.len(), "serving from the in-memory store");
        AppState::new(Arc::new(MemoryStore::with_schedule(catalog)))
    } else {
        let url = config
            .database_url
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
        let db = Db::connect(url.expose_secret()).await?;
        db.migrate().await?;
        db.health_check().await?;
        AppState::new(Arc::new(db))
    };

    let server = Server::start(state, &config.bind_addr(), config.request_timeout).await?;

    // Dropping the server on ctrl-c aborts it.
    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
        result = server.wait() => result?,
    }
    Ok(())
}

async fn cmd_stage_list(db: &Db) -> anyhow::Result<()> {
    let stages = db.list_stages().await?;
    if stages.is_empty() {
        println!("No repetition types defined.");
        return Ok(());
    }

    println!("{:<36}  {:>5}  {:>5}  NAME", "ID", "ORDER", "DAYS");
    println!("{}", "-".repeat(70));
    for stage in &stages {
        println!(
            "{:<36}  {:>5}  {:>5}  {}",
            stage.id, stage.order, stage.day, stage.name
        );
    }
    println!("\n{} stage(s)", stages.len());
    Ok(())
}

async fn cmd_stage_add(db: &Db, new: NewRepetitionType) -> anyhow::Result<()> {
    let stage = db.insert_repetition_type(new).await?;
    println!("Added: {} (order {}, {} days)", stage.id, stage.order, stage.day);
    Ok(())
}

async fn cmd_stage_seed(db: &Db, file: PathBuf) -> anyhow::Result<()> {
    let defs = ScheduleFile::load(&file)?.stages;
    // Catch duplicate orders within the file before touching the database.
    Schedule::from_definitions(defs.clone())?;
    let stages = db.seed_repetition_types(defs).await?;
    println!("Seeded {} stage(s) from {}", stages.len(), file.display());
    Ok(())
}
