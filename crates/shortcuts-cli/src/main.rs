//! shortcuts-cli - シミュレーションホストでライフサイクルを一周させるデモ
//!
//! 各ショートカットについて add → launch → is_running → close → remove を実行し、
//! 結果を JSON で標準出力に出します。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use shortcuts_core::app::{AppBuilder, ControllerConfig, RunningStatus};
use shortcuts_core::domain::ShortcutConfig;
use shortcuts_core::impls::{InMemoryHost, LogToaster, ProcessSimulation};

#[derive(Parser, Debug)]
#[command(name = "shortcuts-cli")]
#[command(about = "Drive the shortcut lifecycle controller against a simulated host")]
struct Args {
    /// JSON file with a list of shortcuts (defaults to built-in samples)
    #[arg(long)]
    shortcuts: Option<PathBuf>,

    /// JSON controller config (timeouts, retries)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Keep the shortcuts registered at the end
    #[arg(long)]
    keep: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CycleReport {
    name: String,
    added: bool,
    launched: bool,
    running_after_launch: bool,
    closed: bool,
    running_after_close: bool,
    removed: Option<bool>,
    status: Option<RunningStatus>,
}

fn sample_shortcuts() -> Vec<ShortcutConfig> {
    vec![
        ShortcutConfig::new("Konsole", "/usr/bin/konsole").with_start_directory("/home/deck"),
        ShortcutConfig::new("Htop", "/usr/bin/konsole")
            .with_start_directory("/home/deck")
            .with_launch_options("-e htop"),
    ]
}

fn load_shortcuts(path: Option<&PathBuf>) -> Result<Vec<ShortcutConfig>> {
    let Some(path) = path else {
        return Ok(sample_shortcuts());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid shortcut list in {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    // (A) 設定とショートカット一覧を読む
    let config = match &args.config {
        Some(path) => ControllerConfig::from_path(path)?,
        None => ControllerConfig::default(),
    };
    let shortcuts = load_shortcuts(args.shortcuts.as_ref())?;
    info!(count = shortcuts.len(), "loaded shortcuts");

    // (B) シミュレーションホストを用意してワイヤリング
    let host = Arc::new(InMemoryHost::with_process_simulation(ProcessSimulation {
        start_delay: Some(Duration::from_millis(200)),
        stop_delay: Some(Duration::from_millis(100)),
    }));
    let app = AppBuilder::new()
        .with_host(host)
        .toaster(Arc::new(LogToaster))
        .config(config)
        .build()?;

    if !app.wait_for_services_initialized().await {
        warn!("host services never reported ready, continuing anyway");
    }

    // (C) 一つずつライフサイクルを回す
    let manager = &app.manager;
    let mut reports = Vec::with_capacity(shortcuts.len());
    for shortcut in &shortcuts {
        let added = manager.add(shortcut).await;
        let launched = manager.launch(shortcut).await;
        let running_after_launch = manager.is_running(shortcut);
        let closed = manager.close(shortcut).await;
        let running_after_close = manager.is_running(shortcut);
        let status = manager.status(shortcut);
        let removed = if args.keep {
            None
        } else {
            Some(manager.remove(shortcut).await)
        };

        reports.push(CycleReport {
            name: shortcut.name().to_string(),
            added,
            launched,
            running_after_launch,
            closed,
            running_after_close,
            removed,
            status,
        });
    }

    // (D) 結果を出力
    println!("{}", serde_json::to_string_pretty(&reports)?);
    info!(remaining = manager.shortcuts().await.len(), "done");
    Ok(())
}
