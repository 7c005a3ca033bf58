use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use stt_lanes::application::services::{
    FastLaneExecutor, LaneDispatcher, SlowLaneExecutor, StagingArea,
};
use stt_lanes::infrastructure::audio::HotEngineFactory;
use stt_lanes::infrastructure::observability::{TracingConfig, init_tracing};
use stt_lanes::infrastructure::worker::WhisperCliWorker;
use stt_lanes::presentation::{AppState, Environment, Settings, create_router};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::current().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(
        &TracingConfig {
            environment: environment.to_string(),
            json_format: settings.logging.enable_json,
            debug: settings.logging.debug,
        },
        settings.server.port,
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(settings.lanes.blocking_threads.max(1))
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(serve(settings))
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let cache_dir = settings.engine.cache_dir();
    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("Failed to create model cache {}", cache_dir.display()))?;

    let engine = {
        let model = settings.engine.model.clone();
        let cache_dir = cache_dir.clone();
        tokio::task::spawn_blocking(move || HotEngineFactory::load_or_disable(&model, &cache_dir))
            .await?
    };

    let fast_lane = engine.map(|engine| {
        let executor = FastLaneExecutor::new(engine);
        match &settings.lanes.fast_lane_temp_dir {
            Some(dir) => executor.with_temp_dir(dir),
            None => executor,
        }
    });

    let staging_dir = settings.lanes.staging_dir(&settings.engine);
    let staging = StagingArea::open(&staging_dir)
        .with_context(|| format!("Failed to open staging area {}", staging_dir.display()))?;

    let mut worker = WhisperCliWorker::new(&settings.worker.script, &settings.engine.model)
        .with_model_cache(&settings.engine.cache_home, &cache_dir);
    if let Some(interpreter) = settings.worker.interpreter() {
        worker = worker.with_interpreter(interpreter);
    }

    let slow_lane = SlowLaneExecutor::new(staging, Arc::new(worker))
        .with_max_workers(settings.lanes.max_cold_workers);

    let dispatcher = LaneDispatcher::new(fast_lane, slow_lane);
    if !dispatcher.engine_loaded() {
        tracing::warn!("Hot engine unavailable, every transcription request will be rejected");
    }

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    tracing::info!(
        model = %settings.engine.model,
        staging_dir = %staging_dir.display(),
        max_cold_workers = settings.lanes.max_cold_workers,
        "Lanes ready"
    );

    let router = create_router(AppState::new(dispatcher, settings));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
