//! CLI entrypoint for agent-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use council_application::resource_guard::MONITOR_INTERVAL;
use council_application::{
    CouncilWorker, DeliberationEngine, MemoryProbe, MessageBroker, PromptIntake, PromptQueue,
    PromptStore, ReclaimHook, ResourceGuard, ensure_participants, topics,
};
use council_infrastructure::{
    ChannelBroker, ConfigLoader, InMemoryPromptStore, MallocTrimHook, OllamaGateway, SysinfoProbe,
};

/// CLI arguments for agent-council
#[derive(Parser, Debug)]
#[command(name = "agent-council")]
#[command(author, version, about = "Agent Council - local models deliberate and vote on prompts")]
#[command(long_about = r#"
Agent Council convenes a council of local Ollama models to deliberate on
prompts. Members take turns refining a shared statement until the
discussion budget runs out, elites vote on the candidates, and the
statement with the most votes becomes the answer.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./council.toml      Project-level config
3. ~/.config/agent-council/config.toml   Global config

Example:
  agent-council serve -v
  agent-council submit "What's the best way to handle errors in Rust?"
  agent-council config-check --config council.toml
"#)]
struct Cli {
    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the council service until interrupted
    Serve {
        /// Write logs to daily-rotated files in this directory instead of stderr
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,
    },
    /// Deliberate on a single prompt and print the answer
    Submit {
        /// The prompt to put before the council
        prompt: String,

        /// Discussion budget in milliseconds (defaults to the configured value)
        #[arg(long, value_name = "MS")]
        discussion_time_ms: Option<u64>,
    },
    /// Validate configuration and show where it was loaded from
    ConfigCheck,
}

/// Initialize logging based on verbosity level.
///
/// With a log directory the subscriber writes to a daily-rotated file;
/// the returned guard must stay alive until exit so buffered lines are
/// flushed.
fn init_logging(verbose: u8, log_dir: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "agent-council.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .init();
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { log_dir } => {
            let _guard = init_logging(cli.verbose, log_dir.as_ref())?;
            serve(cli.config.as_ref()).await
        }
        Command::Submit {
            prompt,
            discussion_time_ms,
        } => {
            let _guard = init_logging(cli.verbose, None)?;
            submit(cli.config.as_ref(), &prompt, discussion_time_ms).await
        }
        Command::ConfigCheck => {
            let _guard = init_logging(cli.verbose, None)?;
            config_check(cli.config.as_ref())
        }
    }
}

/// Run the full service: intake subscription, worker, and memory monitor.
async fn serve(config_path: Option<&PathBuf>) -> Result<()> {
    let file_config = ConfigLoader::load_checked(config_path)?;
    let config = file_config.to_council_config();

    info!(
        members = config.members().len(),
        elites = config.elites().len(),
        ollama = %file_config.ollama.base_url,
        "Starting agent-council"
    );

    // === Dependency Injection ===
    let gateway = Arc::new(OllamaGateway::new(
        file_config.ollama.base_url.clone(),
        file_config.ollama.timeout(),
    )?);

    // The council cannot convene without its roster installed.
    ensure_participants(gateway.as_ref(), &config.roster())
        .await
        .context("Roster provisioning failed")?;

    let engine = Arc::new(DeliberationEngine::new(
        Arc::clone(&gateway),
        config.members().to_vec(),
        config.elites().to_vec(),
        config.deliberation(),
    )?);

    let store: Arc<dyn PromptStore> = Arc::new(InMemoryPromptStore::new());
    let broker: Arc<dyn MessageBroker> = Arc::new(ChannelBroker::new(topics::all()));
    broker.connect().await?;

    let queue = Arc::new(PromptQueue::new(config.queue()));
    let intake = Arc::new(PromptIntake::new(
        Arc::clone(&queue),
        Arc::clone(&store),
        Arc::clone(&broker),
    ));
    if let Err(e) = broker.subscribe(topics::QUEUE, intake.into_handler()).await {
        error!(topic = topics::QUEUE, "Failed to register intake: {e}");
    }

    let probe: Arc<dyn MemoryProbe> = Arc::new(SysinfoProbe::new());
    let guard = Arc::new(ResourceGuard::new(probe, config.memory()));

    let shutdown = CancellationToken::new();
    let monitor = guard.spawn_monitor(MONITOR_INTERVAL, shutdown.clone());

    let reclaim: Arc<dyn ReclaimHook> = Arc::new(MallocTrimHook);
    let mut worker = CouncilWorker::new(
        engine,
        Arc::clone(&store),
        Arc::clone(&broker),
        Arc::clone(&queue),
        Arc::clone(&guard),
        Some(reclaim),
        config.worker(),
    );
    let worker_shutdown = shutdown.clone();
    let worker_task = tokio::spawn(async move { worker.run(worker_shutdown).await });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");
    shutdown.cancel();

    worker_task.await?;
    monitor.await?;
    info!("Council service stopped");
    Ok(())
}

/// One-shot deliberation: provision the roster, deliberate, print the answer.
async fn submit(
    config_path: Option<&PathBuf>,
    prompt: &str,
    discussion_time_ms: Option<u64>,
) -> Result<()> {
    if prompt.trim().is_empty() {
        bail!("Prompt must not be empty");
    }

    let file_config = ConfigLoader::load_checked(config_path)?;
    let config = file_config.to_council_config();

    let gateway = Arc::new(OllamaGateway::new(
        file_config.ollama.base_url.clone(),
        file_config.ollama.timeout(),
    )?);
    ensure_participants(gateway.as_ref(), &config.roster())
        .await
        .context("Roster provisioning failed")?;

    let engine = DeliberationEngine::new(
        gateway,
        config.members().to_vec(),
        config.elites().to_vec(),
        config.deliberation(),
    )?;

    let budget = discussion_time_ms.map(Duration::from_millis);
    let outcome = engine.deliberate(prompt, budget).await?;

    println!("{}", outcome.answer);
    Ok(())
}

/// Validate configuration and report which files were considered.
fn config_check(config_path: Option<&PathBuf>) -> Result<()> {
    if let Some(path) = config_path {
        println!("Explicit config: {}", path.display());
    }
    ConfigLoader::print_config_sources();
    println!();

    let file_config = ConfigLoader::load(config_path)?;
    let issues = file_config.validate();
    if !issues.is_empty() {
        println!("Configuration has {} issue(s):", issues.len());
        for issue in &issues {
            println!("  - {issue}");
        }
        bail!("Invalid configuration");
    }

    println!(
        "Configuration OK: {} member(s), {} elite(s)",
        file_config.members.len(),
        file_config.elites.len()
    );
    Ok(())
}
