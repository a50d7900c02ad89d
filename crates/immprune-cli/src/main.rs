mod console;
mod logger;
mod wizard;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use immprune_core::{
    BatchOptions, CompareOptions, CompareResult, Config, ImmichClient, ImmpruneError, LocalSource,
    Locale, PhotosLibrary, ReportPlan,
};

use crate::console::ConsoleObserver;

#[derive(Parser)]
#[command(name = "immprune", version, about = "Safely prune iCloud Photos (already safe in Immich)")]
struct Cli {
    /// Config file (default: <config dir>/immprune/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List files safe to delete from iCloud Photos (newest first)
    Compare(CompareArgs),
    /// Write or replace the Immich credentials
    Setup,
}

#[derive(Args)]
struct CompareArgs {
    /// Videos only
    #[arg(long)]
    only_videos: bool,

    /// Only assets after YYYY-MM-DD
    #[arg(long)]
    after: Option<String>,

    /// Maximum number of results (0 = no limit)
    #[arg(long)]
    limit: Option<usize>,

    /// Output file path
    #[arg(long, default_value = immprune_core::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Disable the interactive wizard
    #[arg(long)]
    no_ui: bool,

    /// Report and console language
    #[arg(long, value_enum, default_value_t = Locale::En)]
    lang: Locale,

    /// How to read the local Photos library
    #[arg(long, value_enum, default_value_t = LocalSource::Automation)]
    source: LocalSource,

    /// First year of year batches (enables batching)
    #[arg(long, requires = "batch_end")]
    batch_start: Option<i32>,

    /// Last year of year batches
    #[arg(long, requires = "batch_start")]
    batch_end: Option<i32>,

    /// Years per batch
    #[arg(long, default_value_t = 2)]
    batch_years: u32,

    /// Limit per batch (0 = no limit)
    #[arg(long, default_value_t = 0)]
    batch_limit: usize,
}

impl CompareArgs {
    /// The wizard only runs when nothing that shapes the scan was given on the command line.
    fn wants_wizard(&self) -> bool {
        !self.no_ui
            && self.after.is_none()
            && self.limit.is_none()
            && !self.only_videos
            && self.batch_start.is_none()
            && std::io::stdin().is_terminal()
    }

    fn to_options(&self) -> anyhow::Result<CompareOptions> {
        let after = self
            .after
            .as_deref()
            .map(immprune_core::parse_after_date)
            .transpose()?;
        let batch = match (self.batch_start, self.batch_end) {
            (Some(start_year), Some(end_year)) => Some(BatchOptions {
                start_year,
                end_year,
                batch_years: self.batch_years,
                limit_per_batch: self.batch_limit,
            }),
            _ => None,
        };

        let options = CompareOptions {
            only_videos: self.only_videos,
            after,
            limit: self.limit.unwrap_or(0),
            output: self.output.clone(),
            batch,
            locale: self.lang,
        };
        options.validate()?;
        Ok(options)
    }
}

fn collect_options(args: &CompareArgs) -> anyhow::Result<CompareOptions> {
    let options = args.to_options()?;
    if !args.wants_wizard() {
        return Ok(options);
    }
    let options = wizard::run_compare_wizard(options)?;
    options.validate()?;
    Ok(options)
}

fn config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => immprune_core::config::default_path()
            .ok_or_else(|| ImmpruneError::Config("cannot locate the user config directory".into()).into()),
    }
}

fn load_config(path: &std::path::Path) -> anyhow::Result<Config> {
    let config = match Config::resolve(path)? {
        Some(config) => config,
        None if std::io::stdin().is_terminal() => wizard::run_setup(path)?,
        None => {
            return Err(ImmpruneError::Config(format!(
                "no credentials found; run `immprune setup` or set {} and {}",
                immprune_core::config::ENV_URL,
                immprune_core::config::ENV_KEY
            ))
            .into())
        }
    };
    config.validate()?;
    log::debug!("using Immich at {}", config.immich_url);
    Ok(config)
}

fn print_batches(plan: &ReportPlan) {
    let ReportPlan::Batched(groups) = plan else {
        return;
    };
    eprintln!("📚 Writing {} batches", groups.len());
    for (i, group) in groups.iter().enumerate() {
        eprintln!("🔹 Batch {}/{}: {}", i + 1, groups.len(), group.batch);
        if !group.assets.is_empty() {
            eprintln!("📝 Batch {} written ({} entries)", group.batch, group.assets.len());
        }
    }
}

fn print_summary(result: &CompareResult, options: &CompareOptions) {
    eprintln!(
        "Immich assets: {}, local assets: {}, safe candidates: {}, listed: {}",
        result.remote_assets,
        result.local_assets,
        result.matched,
        result.reported()
    );
    println!("{}", options.locale.output_ready(&options.output.display().to_string()));
}

/// Presentation hints for platform failures.
fn hint(err: &anyhow::Error) -> Option<&'static str> {
    match err.downcast_ref::<ImmpruneError>()? {
        ImmpruneError::AutomationDenied(_) => Some(
            "Allow your terminal under System Settings > Privacy & Security > Automation > Photos, then retry.",
        ),
        ImmpruneError::ToolNotInstalled(_) => Some("Install it (e.g. `pip install osxphotos`) or use --source automation."),
        _ => None,
    }
}

fn run_compare(cli: &Cli, args: &CompareArgs) -> anyhow::Result<()> {
    let options = match collect_options(args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("❌ Input error: {:#}", e);
            std::process::exit(1);
        }
    };

    let config = load_config(&config_path(cli)?).context("Configuration error")?;
    let catalog = ImmichClient::new(&config.immich_url, &config.immich_key);
    let library = PhotosLibrary::new(args.source);

    let t = std::time::Instant::now();
    let result = {
        let observer = ConsoleObserver::new(options.locale);
        immprune_core::compare(&options, &catalog, &library, &observer)
    };
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            if let Some(hint) = hint(&e) {
                eprintln!("{}", hint);
            }
            return Err(e);
        }
    };

    print_batches(&result.plan);
    print_summary(&result, &options);
    log::info!("compare finished in {:.2}s", t.elapsed().as_secs_f64());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose, cli.quiet);

    match &cli.command {
        Command::Compare(args) => run_compare(&cli, args),
        Command::Setup => {
            wizard::run_setup(&config_path(&cli)?)?;
            Ok(())
        }
    }
}
