mod output;
mod report;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use log::{error, info, warn};

use wapispec_core::config::{self, CONFIG_FILE_NAME, Overrides, WapiConfig};
use wapispec_core::failure::ReportContext;
use wapispec_core::{GenerationOptions, GenerationOutcome, Selection, generate};
use wapispec_source::{DirSchemaSource, HttpSchemaSource, WapiConnection};

use crate::output::OutputSink;

#[derive(Parser)]
#[command(
    name = "wapispec",
    about = "Generate OpenAPI 3.0 documents from Infoblox WAPI schemas",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch schemas and write one OpenAPI document per object group
    Generate(GenerateArgs),

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Path to the configuration file (YAML or JSON)
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Grid Master hostname (overrides config)
    #[arg(long)]
    hostname: Option<String>,

    /// WAPI username (overrides config)
    #[arg(long)]
    username: Option<String>,

    /// WAPI password (overrides config)
    #[arg(long, env = "WAPISPEC_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// WAPI version, e.g. 2.13.6 (overrides config)
    #[arg(long)]
    wapi_version: Option<String>,

    /// Only generate this object group
    #[arg(short, long)]
    group: Option<String>,

    /// Only generate these object types
    #[arg(long, num_args = 1..)]
    objects: Vec<String>,

    /// Output directory (overrides config)
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Output format: json or yaml (overrides config)
    #[arg(long)]
    format: Option<String>,

    /// Read saved schema JSON files from this directory instead of a Grid Master
    #[arg(long)]
    schema_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Generate(args) => cmd_generate(args).await,

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "wapispec", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_config(args: &mut GenerateArgs) -> Result<WapiConfig> {
    let mut cfg = config::load_config(&args.config)?;
    info!("Loaded configuration from {}", args.config.display());

    cfg.apply_overrides(Overrides {
        hostname: args.hostname.take(),
        username: args.username.take(),
        password: args.password.take(),
        wapi_version: args.wapi_version.take(),
        output_dir: args.output_dir.take(),
        output_format: args.format.take(),
    });
    cfg.validate(args.schema_dir.is_none())?;
    Ok(cfg)
}

async fn cmd_generate(mut args: GenerateArgs) -> Result<()> {
    let cfg = load_config(&mut args)?;
    let started = chrono::Local::now();
    info!("Starting OpenAPI generation at {}", started.format("%Y-%m-%d %H:%M:%S"));

    let selection = Selection::from_args(args.group.take(), std::mem::take(&mut args.objects));
    let grouping = cfg.grouping();
    let options = GenerationOptions::from(&cfg);

    let outcome = match &args.schema_dir {
        Some(dir) => {
            info!("Reading saved schemas from {}", dir.display());
            let source = DirSchemaSource::new(dir);
            generate(&source, &grouping, &selection, &options).await
        }
        None => {
            let connection = WapiConnection::from_config(&cfg.connection)?;
            let source = HttpSchemaSource::new(connection)
                .context("failed to create WAPI client")?;
            generate(&source, &grouping, &selection, &options).await
        }
    };

    let sink = OutputSink::new(
        &cfg.output.directory,
        cfg.output.resolved_format(),
        cfg.output.format_json,
    );
    let mut written = Vec::new();
    for doc in &outcome.documents {
        let path = sink.write(&doc.group, &doc.document)?;
        written.push((doc.group.as_str(), path));
    }

    if !outcome.failures.is_empty() {
        report_failures(&cfg, &outcome, &started.format("%Y%m%d_%H%M%S").to_string());
    }

    if written.is_empty() {
        anyhow::bail!("No API files were generated. Check your input parameters and try again.");
    }

    info!(
        "Generation completed in {:.1}s",
        (chrono::Local::now() - started).num_milliseconds() as f64 / 1000.0
    );
    info!("Group API files:");
    for (group, path) in &written {
        info!("  - {group}: {}", path.display());
    }
    Ok(())
}

fn report_failures(cfg: &WapiConfig, outcome: &GenerationOutcome, timestamp: &str) {
    report::log_failures(&outcome.failures);

    let context = ReportContext {
        timestamp: timestamp.to_string(),
        wapi_version: cfg.wapi_version().to_string(),
        hostname: cfg.connection.hostname.clone().unwrap_or_default(),
    };
    let username = cfg.connection.username.as_deref().unwrap_or_default();
    let dir = PathBuf::from(&cfg.output.logs_directory);

    match report::write_failure_report(&dir, &outcome.failures, outcome.processed, context, username) {
        Ok(artifacts) => {
            warn!("Detailed failure information written to:");
            warn!("  - Log file: {}", artifacts.log.display());
            warn!("  - JSON report: {}", artifacts.json.display());
        }
        Err(e) => error!("Failed to write failure report: {e:#}"),
    }
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
