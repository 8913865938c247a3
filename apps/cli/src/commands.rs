//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use notionsite_client::NotionClient;
use notionsite_core::{CollectionKind, FsAssetStore, Pipeline, ProgressReporter, write_collections};
use notionsite_shared::{
    AppConfig, NotionSiteError, init_config, load_config, load_config_from, resolve_token,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// notionsite: turn Notion databases into static site content.
#[derive(Parser)]
#[command(
    name = "notionsite",
    version,
    about = "Build project, member, working group and committee collections from Notion.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.notionsite/notionsite.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// A collection selectable with `--only`.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum Kind {
    Projects,
    Members,
    WorkingGroups,
    Committees,
}

impl From<Kind> for CollectionKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Projects => CollectionKind::Projects,
            Kind::Members => CollectionKind::Members,
            Kind::WorkingGroups => CollectionKind::WorkingGroups,
            Kind::Committees => CollectionKind::Committees,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Query every database and write the collections.
    Build {
        /// Output directory for the JSON collections (overrides output.dir).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Directory assets are saved under (overrides output.assets_dir).
        #[arg(long)]
        assets: Option<PathBuf>,

        /// Only build these collections (comma-separated). Defaults to all.
        #[arg(long, value_enum, value_delimiter = ',')]
        only: Vec<Kind>,
    },

    /// Print the data source each configured database resolves to.
    Resolve,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "notionsite=info",
        1 => "notionsite=debug",
        _ => "notionsite=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Build { out, assets, only } => {
            let only: Vec<CollectionKind> = only.into_iter().map(CollectionKind::from).collect();
            cmd_build(config_path, out, assets, &only).await
        }
        Command::Resolve => cmd_resolve(config_path).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

/// Load the config file, then apply `NOTION_*` environment overrides.
fn resolved_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    config.apply_env_overrides();
    Ok(config)
}

/// Build a pipeline against the live API from validated config.
fn live_pipeline(config: &AppConfig, assets_dir: &Path) -> Result<Pipeline> {
    config.validate_sources()?;
    let token = resolve_token(config)?;

    let client = NotionClient::new(&config.notion, token)?;
    let assets = FsAssetStore::new(assets_dir, Duration::from_secs(config.notion.timeout_secs))?;

    Ok(
        Pipeline::new(Arc::new(client), Arc::new(assets), config.sources.clone())
            .with_concurrency(config.output.concurrency),
    )
}

async fn cmd_build(
    config_path: Option<&Path>,
    out: Option<PathBuf>,
    assets: Option<PathBuf>,
    only: &[CollectionKind],
) -> Result<()> {
    let config = resolved_config(config_path)?;
    let out_dir = out.unwrap_or_else(|| PathBuf::from(&config.output.dir));
    let assets_dir = assets.unwrap_or_else(|| PathBuf::from(&config.output.assets_dir));

    let pipeline = live_pipeline(&config, &assets_dir)?;

    info!(
        out = %out_dir.display(),
        assets = %assets_dir.display(),
        concurrency = config.output.concurrency,
        "building collections"
    );

    let start = Instant::now();
    let reporter = CliProgress::new();
    let collections = pipeline.build_all(only, &reporter).await;
    reporter.finish();

    let written = write_collections(&out_dir, &collections)?;

    println!();
    println!("  Collections written to {}", out_dir.display());
    println!("  Projects:       {}", collections.projects.len());
    println!("  Members:        {}", collections.members.len());
    println!("  Working groups: {}", collections.working_groups.len());
    println!("  Committees:     {}", collections.committees.len());
    println!("  Files:          {}", written.len());
    println!("  Time:           {:.1}s", start.elapsed().as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_resolve(config_path: Option<&Path>) -> Result<()> {
    let config = resolved_config(config_path)?;
    let pipeline = live_pipeline(&config, Path::new(&config.output.assets_dir))?;

    let mut failures = 0;
    for (label, resolved) in pipeline.resolve_sources().await {
        match resolved {
            Ok(id) => println!("  {label:<14} {id}"),
            Err(e) => {
                failures += 1;
                println!("  {label:<14} error: {e}");
            }
        }
    }

    if failures > 0 {
        return Err(eyre!("{failures} data source(s) could not be resolved"));
    }
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolved_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner.set_message("Querying databases");
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn collection_started(&self, kind: CollectionKind) {
        self.spinner.set_message(format!("Building {kind}"));
    }

    fn collection_finished(&self, kind: CollectionKind, count: usize) {
        self.spinner.println(format!("  ✓ {kind}: {count}"));
    }

    fn collection_failed(&self, kind: CollectionKind, error: &NotionSiteError) {
        self.spinner.println(format!("  ✗ {kind}: {error}"));
    }
}
