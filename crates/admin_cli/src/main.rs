use std::{error::Error, path::Path};

use clap::{Args, Parser, Subcommand};
use engine::{Engine, EntityType, SyncStatus};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "ledger_sync_admin")]
#[command(about = "Admin utilities for a ledger sync store (backup, restore, manual sync)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./ledger_sync.db?mode=rwc"
    )]
    database_url: String,

    /// Log filter, e.g. `engine=debug`.
    #[arg(long, env = "RUST_LOG", default_value = "engine=warn")]
    log_filter: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a full snapshot of the store.
    Export(ExportArgs),
    /// Replace the whole store with a snapshot file.
    Import(FileArgs),
    /// Print the rows changed since a cursor.
    Pull(PullArgs),
    /// Apply a push payload file and print the result.
    Push(FileArgs),
    /// Print when the store last synced without conflicts.
    Status,
    /// Print the change-log entry of one record.
    Log(LogArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Output file. The snapshot goes to stdout when omitted.
    #[arg(long)]
    out: Option<String>,
}

#[derive(Args, Debug)]
struct FileArgs {
    #[arg(long)]
    file: String,
}

#[derive(Args, Debug)]
struct PullArgs {
    /// Cursor from a previous pull. Omit for every row.
    #[arg(long)]
    cursor: Option<String>,
}

#[derive(Args, Debug)]
struct LogArgs {
    /// One of transaction, category, automation_rule, setting, user.
    #[arg(long, value_parser = parse_entity_type)]
    entity_type: EntityType,
    /// Record id, or key for settings.
    #[arg(long)]
    id: String,
}

fn parse_entity_type(raw: &str) -> Result<EntityType, String> {
    EntityType::try_from(raw)
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn read_json(path: &str) -> Result<serde_json::Value, Box<dyn Error + Send + Sync>> {
    let text = std::fs::read_to_string(Path::new(path))
        .map_err(|err| format!("failed to read {path}: {err}"))?;
    Ok(serde_json::from_str(&text)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Export(args) => {
            let snapshot = engine.export().await?;
            match args.out {
                Some(out) => {
                    std::fs::write(&out, serde_json::to_string_pretty(&snapshot)?)?;
                    eprintln!(
                        "exported {} transactions, {} categories, {} rules, {} settings, {} users to {out}",
                        snapshot.transactions.len(),
                        snapshot.categories.len(),
                        snapshot.rules.len(),
                        snapshot.settings.len(),
                        snapshot.users.len()
                    );
                }
                None => print_json(&snapshot)?,
            }
        }
        Command::Import(args) => {
            let snapshot = engine::decode_snapshot(read_json(&args.file)?)?;
            engine.import(snapshot).await?;
            eprintln!("imported {}", args.file);
        }
        Command::Pull(args) => {
            let response = engine.pull(args.cursor.as_deref()).await?;
            print_json(&response)?;
        }
        Command::Push(args) => {
            let payload = engine::decode_push(read_json(&args.file)?)?;
            let result = engine.push(payload).await?;
            print_json(&result)?;
            if !result.conflicts.is_empty() {
                eprintln!("{} record(s) conflicted", result.conflicts.len());
                std::process::exit(3);
            }
        }
        Command::Status => {
            print_json(&SyncStatus {
                last_successful_sync_at: engine.last_successful_sync_at().await?,
            })?;
        }
        Command::Log(args) => match engine.change_log_entry(args.entity_type, &args.id).await? {
            Some(entry) => print_json(&entry)?,
            None => {
                eprintln!("no change recorded for {} {}", args.entity_type, args.id);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
