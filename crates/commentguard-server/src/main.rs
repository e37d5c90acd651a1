//! CommentGuard
//!
//! Cyberbullying moderation for live-stream chat: serve the HTTP API, check
//! a single comment from the shell, or train new artifacts from a labeled
//! dataset.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commentguard_classifiers::{
    load_dataset, train_and_select, ArtifactPaths, ModerationPipeline, Normalizer,
    SentimentStrategy, TrainingConfig,
};
use commentguard_core::Verdict;
use commentguard_policy::PolicyPreset;
use commentguard_server::{create_router, AppState, ConfigOverrides, ServiceConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "commentguard")]
#[command(about = "CommentGuard cyberbullying moderation", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml", env = "COMMENTGUARD_CONFIG", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP moderation service
    Serve(ServeArgs),

    /// Moderate one comment and print the verdict as JSON
    Check {
        /// Comment text
        text: String,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Train artifacts from a labeled CSV or JSON Lines dataset
    Train(TrainArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Listen address
    #[arg(short = 'l', long, env = "COMMENTGUARD_LISTEN")]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "COMMENTGUARD_PORT")]
    port: Option<u16>,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
struct PipelineArgs {
    /// Policy preset (live_stream or coarse)
    #[arg(short, long)]
    policy: Option<PolicyPreset>,

    /// Sentiment strategy (lexicon, keyword or disabled)
    #[arg(short, long)]
    sentiment: Option<SentimentStrategy>,

    /// Vectorizer artifact path
    #[arg(long)]
    vectorizer: Option<PathBuf>,

    /// Model artifact path
    #[arg(long)]
    model: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Labeled dataset: CSV with a header row, or JSON Lines
    #[arg(short, long)]
    data: PathBuf,

    /// Output directory for vectorizer.json and model.json
    #[arg(short, long, default_value = "models")]
    out: PathBuf,

    /// Training epochs per candidate
    #[arg(long, default_value_t = 20)]
    epochs: usize,

    /// Seed for the split and shuffles
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

impl PipelineArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            policy: self.policy,
            sentiment: self.sentiment,
            vectorizer: self.vectorizer.clone(),
            model: self.model.clone(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    match cli.command {
        Command::Serve(args) => serve(&cli.config, args).await,
        Command::Check { text, pipeline } => check(&cli.config, &text, &pipeline),
        Command::Train(args) => train(args),
    }
}

async fn serve(config_path: &Path, args: ServeArgs) -> Result<()> {
    info!("Starting CommentGuard server");

    let overrides = ConfigOverrides {
        listen: args.listen.clone(),
        port: args.port,
        ..args.pipeline.overrides()
    };
    let config = ServiceConfig::load(config_path, &overrides)?;
    info!("Configuration loaded successfully");
    info!("Vectorizer: {}", config.pipeline.artifacts.vectorizer.display());
    info!("Model: {}", config.pipeline.artifacts.model.display());
    info!("Feed capacity: {}", config.server.feed_capacity);

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    let addr: SocketAddr = format!("{}:{}", config.server.listen, config.server.port).parse()?;
    let state = AppState::new(config, metrics_handle)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    // Graceful shutdown handler
    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn check(config_path: &Path, text: &str, args: &PipelineArgs) -> Result<()> {
    let config = ServiceConfig::load(config_path, &args.overrides())?;
    let pipeline = ModerationPipeline::from_config(&config.pipeline)?;

    let verdict = pipeline.moderate(text);
    println!("{}", serde_json::to_string_pretty(&verdict)?);

    if let Verdict::Rejected { error_kind, reason } = verdict {
        anyhow::bail!("comment rejected ({error_kind}): {reason}");
    }
    Ok(())
}

fn train(args: TrainArgs) -> Result<()> {
    let records = load_dataset(&args.data)?;
    let normalizer = Normalizer::new()?;
    let config = TrainingConfig {
        epochs: args.epochs,
        seed: args.seed,
        ..Default::default()
    };

    let trained = train_and_select(&records, &normalizer, &config)?;
    let paths = ArtifactPaths::in_dir(&args.out);
    trained.save(&paths)?;

    info!(
        selected = %trained.report.selected,
        out = %args.out.display(),
        "Training complete"
    );
    println!("{}", serde_json::to_string_pretty(&trained.report)?);
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("commentguard=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("commentguard=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "commentguard_requests_total",
        "Total number of comments submitted"
    );
    metrics::describe_counter!(
        "commentguard_outcomes_total",
        "Moderation outcomes by outcome label"
    );
    metrics::describe_counter!(
        "commentguard_rejections_total",
        "Comments that could not be evaluated, by error kind"
    );
    metrics::describe_histogram!(
        "commentguard_pipeline_latency_us",
        metrics::Unit::Microseconds,
        "Pipeline evaluation latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
