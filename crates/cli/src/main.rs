//! sqlog CLI - run SQL against SQLite through the instrumented accessor
//!
//! Every statement produces one structured record on stdout and in the rotated log file.

mod row;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use row::JsonRow;
use sqlog_core::Value;
use sqlog_infra_logging::{init_tracing, LogConfig, LogFactory};
use sqlog_infra_sqlite::{create_pool, InstrumentedExecutor, SqlExecutor, SqliteExecutor};
use std::path::PathBuf;
use tracing::info;

const DEFAULT_DB_URL: &str = "sqlite://sqlog.db";

#[derive(Parser)]
#[command(name = "sqlog")]
#[command(about = "Run SQL against SQLite with per-call structured logging", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database URL
    #[arg(long, env = "SQLOG_DB_URL", default_value = DEFAULT_DB_URL)]
    db: String,

    /// Log file path (overrides SQLOG_LOG_PATH)
    #[arg(long)]
    log_path: Option<PathBuf>,

    /// Megabytes before the log file is rotated (overrides SQLOG_LOG_MAX_SIZE)
    #[arg(long)]
    log_max_size: Option<u64>,

    /// Rotated log files kept, 0 = all (overrides SQLOG_LOG_MAX_BACKUPS)
    #[arg(long)]
    log_max_backups: Option<usize>,

    /// Days rotated log files are kept, 0 = forever (overrides SQLOG_LOG_MAX_AGE)
    #[arg(long)]
    log_max_age: Option<u64>,

    /// Gzip rotated log files
    #[arg(long)]
    log_compress: bool,

    /// Do not echo log records to stdout
    #[arg(long)]
    quiet_console: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a statement and report rows affected
    Exec {
        /// SQL with `?` placeholders
        sql: String,

        /// Positional arguments (integer, float, null, true/false, else text)
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a query and print each row as JSON
    Query {
        /// SQL with `?` placeholders
        sql: String,

        /// Positional arguments (integer, float, null, true/false, else text)
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn parse_args(raw: &[String]) -> Vec<Value> {
    raw.iter().map(|s| Value::parse_lenient(s)).collect()
}

impl Cli {
    /// Overlay the flags that were given onto `config`
    fn apply_log_flags(&self, mut config: LogConfig) -> LogConfig {
        if let Some(path) = &self.log_path {
            config.path = path.clone();
        }
        if let Some(max_size) = self.log_max_size {
            config.max_size = max_size;
        }
        if let Some(max_backups) = self.log_max_backups {
            config.max_backups = max_backups;
        }
        if let Some(max_age) = self.log_max_age {
            config.max_age = max_age;
        }
        if self.log_compress {
            config.compress = true;
        }
        if self.quiet_console {
            config.console = false;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Diagnostics (pretty by default, JSON with SQLOG_LOG_FORMAT=json)
    let log_format = std::env::var("SQLOG_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    init_tracing(log_format == "json").context("Failed to install tracing subscriber")?;

    // 2. Log configuration: SQLOG_LOG_* env, then flags
    let config = LogConfig::from_env().context("Invalid SQLOG_LOG_* configuration")?;
    let config = cli.apply_log_flags(config);

    run(cli, config).await
}

async fn run(cli: Cli, config: LogConfig) -> Result<()> {
    // 3. Log sink
    let factory = LogFactory::new(config).context("Failed to open log sink")?;

    // 4. Database
    info!(db = %cli.db, "Opening database...");
    let pool = create_pool(&cli.db)
        .await
        .with_context(|| format!("Failed to open database {}", cli.db))?;

    // 5. Wiring
    let db = InstrumentedExecutor::new(SqliteExecutor::new(pool), factory.sql_logger());

    match cli.command {
        Commands::Exec { sql, args } => {
            let result = db
                .exec(&sql, &parse_args(&args))
                .await
                .context("Statement failed")?;
            println!(
                "{} rows affected: {}, last insert id: {}",
                "OK".green(),
                result.rows_affected,
                result.last_insert_id
            );
        }
        Commands::Query { sql, args } => {
            let rows: Vec<JsonRow> = db
                .select(&sql, &parse_args(&args))
                .await
                .context("Query failed")?;
            for row in &rows {
                println!("{}", row.render());
            }
            println!("{} {} row(s)", "OK".green(), rows.len());
        }
    }

    factory.flush().context("Failed to flush log sink")?;
    Ok(())
}
