use crate::cli::{Cli, Commands, StateCommands};
use anyhow::{Context, Result, bail};
use base64::{Engine, engine::general_purpose::STANDARD};
use designsync::persistence::{SyncEvent, SyncObserver, create_state_sync};
use designsync::{Config, GenerateRequest, Generator};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

async fn run_generate(config: &Config, image: &Path, style: Option<String>) -> Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("read image {}", image.display()))?;
    let request = GenerateRequest {
        image_base64: Some(image_data_uri(image, &bytes)),
        style,
    };

    let generator = Generator::from_config(&config.generation);
    match generator.run(request).await {
        Ok(success) => {
            println!("{}", serde_json::to_string_pretty(&success.to_json())?);
            Ok(())
        }
        Err(failure) => {
            eprintln!("{}", serde_json::to_string_pretty(&failure.to_json())?);
            bail!("generation failed at step '{}': {}", failure.step, failure.error)
        }
    }
}

fn image_data_uri(path: &Path, bytes: &[u8]) -> String {
    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

async fn run_state(config: &Config, command: StateCommands) -> Result<()> {
    let remote_failed = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&remote_failed);
    let observer: Arc<dyn SyncObserver> = Arc::new(move |event: &SyncEvent| {
        if matches!(
            event,
            SyncEvent::RemoteWriteFailed { .. } | SyncEvent::RemoteReadFailed { .. }
        ) {
            flag.store(true, Ordering::SeqCst);
        }
    });

    let sync = create_state_sync(config, Some(observer))?;

    match command {
        StateCommands::Load => {
            let state = sync.load().await.unwrap_or(Value::Null);
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        StateCommands::Save { json, file } => {
            let raw = match (json, file) {
                (Some(json), _) => json,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("read state file {}", path.display()))?,
                (None, None) => bail!("state save needs --json or --file"),
            };
            let state: Value = serde_json::from_str(&raw).context("parse state JSON")?;
            sync.save(state);
            info!(app_id = sync.app_id(), "state saved locally");
        }
    }

    sync.shutdown().await;
    if config.persistence.remote_enabled() && remote_failed.load(Ordering::SeqCst) {
        eprintln!("warning: remote state store unavailable; local copy is authoritative");
    }
    Ok(())
}

pub async fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(host) = host {
                config.gateway.host = host;
            }
            info!(
                "Starting gateway on {}:{}",
                config.gateway.host, config.gateway.port
            );
            designsync::gateway::run_gateway(Arc::new(config)).await
        }
        Commands::Generate { image, style } => run_generate(&config, &image, style).await,
        Commands::State { state_command } => run_state(&config, state_command).await,
    }
}
