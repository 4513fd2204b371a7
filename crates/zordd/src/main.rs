use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use zord_core::{FacePipeline, IdentityGallery};
use zordd::{spawn_engine, AppState, Config, GeminiClient, MessageRouter, SceneDescriber};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("zordd starting");

    let config = Config::from_env()?;

    // Load models synchronously (fail-fast)
    let scrfd_path = config.scrfd_model_path();
    let arcface_path = config.arcface_model_path();
    let mut pipeline = FacePipeline::load(&scrfd_path, &arcface_path)
        .with_context(|| format!("loading models from {}", config.model_dir.display()))?;
    tracing::info!(scrfd = %scrfd_path, arcface = %arcface_path, "face models loaded");

    let gallery = IdentityGallery::load(&config.known_faces_dir, &mut pipeline)?
        .with_threshold(config.match_threshold);

    let engine = spawn_engine(pipeline)?;
    let service = GeminiClient::from_config(&config).context("building description client")?;
    let describer = SceneDescriber::new(Arc::new(service), engine.clone(), Arc::new(gallery));
    let state = AppState { router: MessageRouter::new(engine, describer) };

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, model = %config.describe_model, "zordd ready");

    tokio::select! {
        result = zordd::serve(listener, state) => result.context("server error")?,
        _ = tokio::signal::ctrl_c() => tracing::info!("zordd shutting down"),
    }

    Ok(())
}
