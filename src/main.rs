use anyhow::Result;
use azbuilt::azure::client::ArmClient;
use azbuilt::azure::{auth, subscriptions};
use azbuilt::config::Config;
use azbuilt::pipeline::{self, RunRequest, RunSummary};
use azbuilt::report::{OutputFormat, ReportOptions, DEFAULT_TITLE, DEFAULT_TOC_PAGE_OFFSET};
use azbuilt::resource::Snapshot;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// As-built documentation generator for Azure
#[derive(Parser, Debug)]
#[command(name = "azbuilt", version, about, long_about = None)]
struct Args {
    /// Subscription ID to inventory (repeatable, or comma-separated)
    #[arg(
        short,
        long = "subscription",
        env = "AZURE_SUBSCRIPTION_IDS",
        value_delimiter = ','
    )]
    subscriptions: Vec<String>,

    /// Resource Manager endpoint (sovereign clouds)
    #[arg(long, env = "AZURE_RESOURCE_MANAGER_URL")]
    arm_endpoint: Option<String>,

    /// Report output path
    #[arg(short, long)]
    output: Option<String>,

    /// Output format (defaults from the output extension)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Report title
    #[arg(long)]
    title: Option<String>,

    /// Page number of the first section minus one, for the table of contents
    #[arg(long)]
    toc_page_offset: Option<usize>,

    /// Log level for the run log
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Run log path
    #[arg(long)]
    log_file: Option<String>,

    /// Save fetched data as a JSON snapshot
    #[arg(long)]
    save_snapshot: Option<PathBuf>,

    /// Render from a JSON snapshot instead of calling Azure
    #[arg(long, conflicts_with = "save_snapshot")]
    from_snapshot: Option<PathBuf>,

    /// Remember the effective subscriptions and output in the config file
    #[arg(long)]
    save_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_path: &str,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = PathBuf::from(log_path);
    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    // Truncate so each run gets a fresh log
    let file = std::fs::File::create(&log_path)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.to_string().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.and(std::io::stderr.with_max_level(Level::WARN)))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("azbuilt {} started with log level: {:?}", azbuilt::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::load();

    let log_file = config.effective_log_file(args.log_file.as_deref());
    let _log_guard = setup_logging(args.log_level, &log_file)?;

    let output = config.effective_output(args.output.as_deref());
    let output_path = PathBuf::from(&output);

    let options = ReportOptions {
        title: args
            .title
            .clone()
            .or_else(|| config.report_title.clone())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        toc_page_offset: args
            .toc_page_offset
            .or(config.toc_page_offset)
            .unwrap_or(DEFAULT_TOC_PAGE_OFFSET),
        generated_at: Some(chrono::Utc::now()),
    };

    let mut request = RunRequest::new(Vec::new(), &output_path);
    request.options = options;
    request.save_snapshot = args.save_snapshot.clone();
    if let Some(format) = args.format {
        request.format = format;
    }

    let summary = match &args.from_snapshot {
        Some(path) => pipeline::run_from_snapshot(Snapshot::load(path)?, &request)?,
        None => {
            let client = ArmClient::new(&config.effective_endpoint(args.arm_endpoint.as_deref()))?;
            request.subscription_ids = resolve_subscriptions(&client, &config, &args).await?;

            if args.save_config {
                config.output = Some(output.clone());
                config.set_subscriptions(&request.subscription_ids)?;
            }

            pipeline::run(&client, &client, &request).await?
        }
    };

    report_summary(&summary);
    tracing::info!("As-Built Document generation process completed.");
    Ok(())
}

async fn resolve_subscriptions(client: &ArmClient, config: &Config, args: &Args) -> Result<Vec<String>> {
    let ids = config.effective_subscriptions(&args.subscriptions);

    for id in &ids {
        if !auth::validate_subscription_id(id) {
            tracing::warn!("Subscription ID {} does not look like a GUID", id);
        }
    }

    if !ids.is_empty() {
        return Ok(ids);
    }

    tracing::info!("No subscriptions configured, discovering enabled subscriptions");
    let discovered = subscriptions::list_subscription_ids(client).await?;
    if discovered.is_empty() {
        return Err(anyhow::anyhow!(
            "No Azure subscriptions found. Pass --subscription or set AZURE_SUBSCRIPTION_IDS"
        ));
    }
    tracing::info!("Discovered {} subscriptions", discovered.len());
    Ok(discovered)
}

fn report_summary(summary: &RunSummary) {
    println!(
        "Wrote {} ({} sections, {} resource groups)",
        summary.output.display(),
        summary.sections,
        summary.counters.resource_groups
    );
    for outcome in summary.failed_subscriptions() {
        eprintln!(
            "Warning: subscription {} incomplete: {}",
            outcome.subscription_id,
            outcome.errors.join("; ")
        );
    }
}
