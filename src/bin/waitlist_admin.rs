use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use farmtech_waitlist::{EntryListingService, SqliteWaitlistStore, StatsService, WaitlistStore};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "waitlist-admin",
    version = "0.1.0",
    about = "Operator tools for the FarmTech waitlist database"
)]
struct Args {
    /// Path to the SQLite database file
    #[arg(
        short,
        long,
        env = "DATABASE_PATH",
        default_value = "./data/farmtech-waitlist.db"
    )]
    database: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export every entry, newest signup first
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print signup statistics as JSON
    Stats,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExportFormat {
    /// A single JSON array
    Json,
    /// One JSON object per line
    Jsonl,
}

fn setup_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,waitlist_admin=info"));

    // Logs go to stderr so exports on stdout stay clean.
    fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_tracing();

    let args = Args::parse();

    let store = SqliteWaitlistStore::open(&args.database)
        .with_context(|| format!("Failed to open {}", args.database.display()))?;
    let store: Arc<dyn WaitlistStore> = Arc::new(store);

    match args.command {
        Command::Export { format, output } => {
            let entries = EntryListingService::new(store)
                .list_entries()
                .await
                .context("Failed to list entries")?;

            let mut writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?,
                )),
                None => Box::new(BufWriter::new(io::stdout().lock())),
            };

            match format {
                ExportFormat::Json => {
                    serde_json::to_writer_pretty(&mut writer, &entries)?;
                    writeln!(writer)?;
                }
                ExportFormat::Jsonl => {
                    for entry in &entries {
                        serde_json::to_writer(&mut writer, entry)?;
                        writeln!(writer)?;
                    }
                }
            }
            writer.flush()?;

            info!("Exported {} entries", entries.len());
        }
        Command::Stats => {
            let stats = StatsService::new(store)
                .stats()
                .await
                .context("Failed to compute statistics")?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
