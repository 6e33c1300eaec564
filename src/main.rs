use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use whisper_control::config::DEFAULT_CONFIG_PATH;
use whisper_control::{
    console, create_router, microphone, AppState, Config, MicrophoneDirectory, ProcessLauncher,
    SessionController, SessionRequest, SharedDisplay, TranscriptPoller, WhisperModel,
};

#[derive(Parser)]
#[command(name = "whisper-control", version, about = "Real-time transcription control")]
struct Cli {
    /// Config file (extension optional)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP control API (default)
    Serve,
    /// Transcribe in this terminal until Enter or Ctrl-C
    Run(RunArgs),
    /// List microphones and their indices
    Mics,
}

#[derive(Args)]
struct RunArgs {
    #[arg(long, value_enum)]
    model: Option<WhisperModel>,

    #[arg(long)]
    energy_threshold: Option<i64>,

    /// Seconds
    #[arg(long)]
    record_timeout: Option<f64>,

    /// Seconds
    #[arg(long)]
    phrase_timeout: Option<f64>,

    #[arg(long)]
    mic_index: Option<i64>,
}

impl From<RunArgs> for SessionRequest {
    fn from(args: RunArgs) -> Self {
        Self {
            model: args.model.map(|m| m.to_string()),
            energy_threshold: args.energy_threshold,
            record_timeout: args.record_timeout,
            phrase_timeout: args.phrase_timeout,
            mic_index: args.mic_index,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cfg).await,
        Command::Run(args) => {
            let session = SessionRequest::from(args)
                .resolve(&cfg.session.defaults)
                .context("Invalid session settings")?;
            console::run(&cfg, session).await
        }
        Command::Mics => {
            let mics = microphone::from_settings(&cfg.microphones).list().await?;
            for mic in mics {
                println!("{:>3}  {}", mic.index, mic.name);
            }
            Ok(())
        }
    }
}

async fn serve(cfg: Config) -> Result<()> {
    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Worker: {} {}", cfg.worker.program, cfg.worker.args.join(" "));
    info!("Transcript file: {}", cfg.transcript.artifact_path.display());

    let controller = SessionController::new(Arc::new(ProcessLauncher), cfg.worker.clone())
        .with_notice_duration(cfg.session.stop_notice());
    let status = controller.subscribe();

    let display = SharedDisplay::new();
    let microphones: Arc<dyn MicrophoneDirectory> =
        Arc::from(microphone::from_settings(&cfg.microphones));
    let state = AppState::new(
        controller,
        display.clone(),
        microphones,
        cfg.session.defaults.clone(),
    )
    .with_reap_exited_worker(cfg.session.reap_exited_worker);

    let poller = TranscriptPoller::new(&cfg.transcript.artifact_path)
        .with_interval(cfg.transcript.poll_interval());
    let (poller_stop_tx, poller_stop_rx) = oneshot::channel::<()>();
    let poller_task = tokio::spawn(poller.run(status, display, async move {
        poller_stop_rx.await.ok();
    }));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(state.clone()))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")?;

    // Don't leave a worker recording after we exit
    {
        let mut controller = state.controller.lock().await;
        if controller.status().is_running() {
            match controller.stop() {
                Ok(report) => info!("Stopped session {} on shutdown", report.session_id),
                Err(e) => warn!("Failed to stop session on shutdown: {}", e),
            }
        }
    }

    poller_stop_tx.send(()).ok();
    poller_task.await.context("Transcript poller task panicked")?;

    Ok(())
}
