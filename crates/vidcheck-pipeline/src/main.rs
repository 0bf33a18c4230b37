//! vidcheck CLI: validate a video and run it through the analysis pipeline.
//!
//! Input is either a local file path or an http(s) URL. Analysis runs against
//! the in-process mock service unless `--server` points at a running
//! vidcheck-api instance.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vidcheck_analysis::{
    build_strategy, AnalysisService, DelayBounds, DelayProvider, FixedDelay, HttpAnalysisClient,
    LocalAnalysisService, RandomDelay, StrategyKind,
};
use vidcheck_models::{
    check, format_file_size, validate, AnalysisEnvelope, AnalysisResponse, ValidatedSubmission,
    VideoFile, VideoSource, VideoSubmission,
};
use vidcheck_pipeline::progress::{self, ProgressEvent};
use vidcheck_pipeline::{
    OrchestratorConfig, PipelineError, PipelineResult, RunOutcome, StageOrchestrator,
};

#[derive(Parser)]
#[command(name = "vidcheck", version, about = "Detect AI-generated videos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a file or URL against the upload policy without analyzing it
    Validate {
        /// Path to a video file or an http(s) URL
        input: String,
    },
    /// Validate, then run the full analysis pipeline
    Analyze(AnalyzeArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Path to a video file or an http(s) URL
    input: String,

    /// Base URL of a vidcheck-api server; analyzes in-process when omitted
    #[arg(long, env = "VIDCHECK_SERVER")]
    server: Option<String>,

    /// Scoring strategy for in-process analysis
    #[arg(long, env = "SCORING_STRATEGY", default_value = "mock")]
    strategy: StrategyKind,

    /// Minimum per-stage delay in milliseconds
    #[arg(long, default_value_t = 800)]
    stage_min_ms: u64,

    /// Maximum per-stage delay in milliseconds
    #[arg(long, default_value_t = 1200)]
    stage_max_ms: u64,

    /// Minimum simulated analysis time in milliseconds
    #[arg(long, env = "ANALYSIS_MIN_DELAY_MS", default_value_t = 2000)]
    analysis_min_ms: u64,

    /// Maximum simulated analysis time in milliseconds
    #[arg(long, env = "ANALYSIS_MAX_DELAY_MS", default_value_t = 4000)]
    analysis_max_ms: u64,

    /// Timeout for the analysis service call in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Skip all simulated delays
    #[arg(long)]
    no_delay: bool,
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vidcheck=info"));

    // stdout carries the JSON result; logs go to stderr.
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn is_url(input: &str) -> bool {
    input.contains("://")
}

/// Build a submission without reading file content; enough for validation.
fn declared_submission(input: &str) -> PipelineResult<VideoSubmission> {
    if is_url(input) {
        return Ok(VideoSubmission::url(input));
    }

    let path = Path::new(input);
    let metadata = std::fs::metadata(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(VideoSubmission::file(VideoFile::declared(
        file_name(path),
        metadata.len(),
    )))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Validate first, then load file content for a submission that passed.
async fn load_submission(input: &str) -> PipelineResult<ValidatedSubmission> {
    let declared = declared_submission(input)?;
    check(&declared)?;

    if declared.is_url() {
        return Ok(ValidatedSubmission::try_from(declared)?);
    }

    let path = Path::new(input);
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    let file = VideoFile::new(file_name(path), content);
    info!(file = %file.name, size = %format_file_size(file.size), "Loaded video file");

    Ok(ValidatedSubmission::try_from(VideoSubmission {
        id: declared.id,
        source: VideoSource::File(file),
    })?)
}

fn build_service(args: &AnalyzeArgs) -> PipelineResult<Arc<dyn AnalysisService>> {
    let timeout = Duration::from_secs(args.timeout_secs);
    if let Some(server) = &args.server {
        info!(server = %server, "Using remote analysis server");
        return Ok(Arc::new(HttpAnalysisClient::with_timeout(server, timeout)?));
    }

    let delay: Arc<dyn DelayProvider> = if args.no_delay {
        Arc::new(FixedDelay::zero())
    } else {
        Arc::new(RandomDelay)
    };
    let strategy = build_strategy(
        args.strategy,
        delay,
        DelayBounds::from_millis(args.analysis_min_ms, args.analysis_max_ms),
    );
    info!(strategy = strategy.name(), "Using in-process analysis");
    Ok(Arc::new(LocalAnalysisService::new(strategy)))
}

async fn analyze(args: AnalyzeArgs) -> PipelineResult<()> {
    let submission = load_submission(&args.input).await?;
    let service = build_service(&args)?;

    let stage_delay: Arc<dyn DelayProvider> = if args.no_delay {
        Arc::new(FixedDelay::zero())
    } else {
        Arc::new(RandomDelay)
    };
    let orchestrator = StageOrchestrator::new(
        service,
        stage_delay,
        OrchestratorConfig {
            stage_delay: DelayBounds::from_millis(args.stage_min_ms, args.stage_max_ms),
            service_timeout: Duration::from_secs(args.timeout_secs),
        },
    );

    let (sender, mut receiver) = progress::channel();
    let reporter = tokio::spawn(async move {
        while let Some((id, event)) = receiver.recv().await {
            match event {
                ProgressEvent::StageStarted {
                    stage,
                    progress_percent,
                } => info!(submission_id = %id, progress = progress_percent, "{}", stage.label()),
                ProgressEvent::AwaitingService => {
                    info!(submission_id = %id, "Waiting for analysis result")
                }
                _ => {}
            }
        }
    });

    let outcome = orchestrator.run(submission, &sender).await;
    drop(sender);
    let _ = reporter.await;

    let response = match outcome {
        RunOutcome::Completed(result) => AnalysisResponse::success(result),
        RunOutcome::Failed { reason } => AnalysisResponse::failure(reason),
        RunOutcome::Busy => return Err(PipelineError::Busy),
    };

    let envelope = AnalysisEnvelope::from(response.clone());
    print_json(&envelope).map_err(|e| PipelineError::Failed(e.to_string()))?;

    match response {
        AnalysisResponse::Success { .. } => Ok(()),
        AnalysisResponse::Failure { error_message } => Err(PipelineError::Failed(error_message)),
    }
}

async fn run(cli: Cli) -> PipelineResult<()> {
    match cli.command {
        Commands::Validate { input } => {
            let submission = declared_submission(&input)?;
            let outcome = validate(&submission);
            print_json(&outcome).map_err(|e| PipelineError::Failed(e.to_string()))?;
            check(&submission)?;
            Ok(())
        }
        Commands::Analyze(args) => analyze(args).await,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_parses_analyze_flags() {
        let cli = Cli::try_parse_from([
            "vidcheck",
            "analyze",
            "https://example.com/a.mp4",
            "--no-delay",
            "--timeout-secs",
            "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze(args) => {
                assert!(args.no_delay);
                assert_eq!(args.timeout_secs, 5);
                assert_eq!(args.strategy, StrategyKind::Mock);
            }
            Commands::Validate { .. } => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_declared_submission_reads_metadata_only() {
        let mut file = tempfile::Builder::new().suffix(".mov").tempfile().unwrap();
        file.write_all(&[0u8; 128]).unwrap();

        let submission = declared_submission(file.path().to_str().unwrap()).unwrap();
        match submission.source {
            VideoSource::File(video) => {
                assert_eq!(video.size, 128);
                assert!(video.content.is_empty());
                assert!(video.name.ends_with(".mov"));
            }
            VideoSource::Url(_) => panic!("expected file"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = declared_submission("/definitely/not/here.mp4").unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_load_submission_rejects_before_reading() {
        let file = tempfile::Builder::new().suffix(".mkv").tempfile().unwrap();
        let err = load_submission(file.path().to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_load_submission_reads_content() {
        let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
        file.write_all(b"not really a video").unwrap();

        let submission = load_submission(file.path().to_str().unwrap()).await.unwrap();
        match &submission.submission().source {
            VideoSource::File(video) => {
                assert_eq!(video.content.len(), 18);
                assert_eq!(video.size, 18);
            }
            VideoSource::Url(_) => panic!("expected file"),
        }
    }
}
