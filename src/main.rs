use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use grocery_loader::config::DatabaseTarget;
use grocery_loader::spreadsheet::describe_workbook;
use grocery_loader::{LogReporter, Pipeline, PipelineConfig};
use log::{error, info, warn};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "grocery-loader")]
#[command(about = "Clean a retail sales spreadsheet into a CSV checkpoint and a database table")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true, default_value = "grocery-loader.toml")]
    config: PathBuf,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Values that take precedence over the configuration file.
#[derive(Args)]
struct Overrides {
    /// Source workbook path or URL
    #[arg(long, global = true)]
    source: Option<String>,
    /// Sheet name or glob pattern
    #[arg(long, global = true)]
    sheet: Option<String>,
    /// CSV checkpoint path
    #[arg(long, global = true)]
    csv: Option<PathBuf>,
    /// Target table name
    #[arg(long, global = true)]
    table: Option<String>,
    /// MySQL password
    #[arg(long, global = true, env = "GROCERY_DB_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, normalize, clean, write the CSV checkpoint and replace the database table
    Run {
        /// Stop after writing the CSV checkpoint
        #[arg(long)]
        skip_database: bool,
    },
    /// Load an existing CSV checkpoint into the database
    LoadCsv,
    /// List the sheets of the source workbook with their inferred columns
    Inspect,
}

impl Overrides {
    fn apply(self, config: &mut PipelineConfig) -> Result<()> {
        if let Some(source) = self.source {
            config.source.path = source;
        }
        if let Some(sheet) = self.sheet {
            config.source.sheet = sheet;
        }
        if let Some(csv) = self.csv {
            config.output.csv_path = csv;
        }
        match config.database.as_mut() {
            Some(database) => {
                if let Some(table) = self.table {
                    database.table = table;
                }
                match (self.password, &mut database.target) {
                    (Some(secret), DatabaseTarget::MySql { password, .. }) => *password = secret,
                    (Some(_), target) => warn!("Password ignored, {target} takes no password"),
                    (None, _) => (),
                }
            }
            None => {
                if let Some(table) = self.table {
                    bail!("--table '{table}' given but the configuration has no [database] section");
                }
                if self.password.is_some() {
                    warn!("Password ignored, the configuration has no [database] section");
                }
            }
        }
        Ok(())
    }
}

fn execute(cli: Cli) -> Result<()> {
    let mut config = PipelineConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from '{}'", cli.config.display()))?;
    cli.overrides.apply(&mut config)?;
    config.validate().context("Invalid configuration after command-line overrides")?;

    let pipeline = Pipeline::new(&config);
    let mut reporter = LogReporter;
    match cli.command {
        Commands::Run { skip_database } => {
            let summary = pipeline.run(&mut reporter, skip_database).context("Pipeline run failed")?;
            info!(
                "Run complete: {} rows loaded, {} dropped, {} written",
                summary.rows_loaded, summary.rows_dropped, summary.rows_written
            );
        }
        Commands::LoadCsv => {
            let outcome = pipeline
                .load_checkpoint(&mut reporter)
                .context("Loading the CSV checkpoint failed")?;
            info!("Checkpoint loaded: {} rows into '{}'", outcome.rows, outcome.table);
        }
        Commands::Inspect => {
            let sheets = describe_workbook(&config.source).context("Inspecting the source workbook failed")?;
            for sheet in sheets {
                info!("Sheet '{}': {} data rows", sheet.name, sheet.rows);
                for column in sheet.columns {
                    info!("  {:<32} {}", column.name, column.kind.as_str());
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match execute(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
