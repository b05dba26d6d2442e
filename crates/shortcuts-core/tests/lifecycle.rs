//! End-to-end lifecycle against the in-memory host.

use std::sync::Arc;
use std::time::Duration;

use shortcuts_core::app::{App, AppBuilder, ControllerConfig, WaitOptions};
use shortcuts_core::domain::{AppId, LifetimeEvent, ShortcutConfig, ShortcutState};
use shortcuts_core::impls::{HostCall, InMemoryHost, ProcessSimulation, RecordingToaster};
use tokio::time::Instant;

fn build(host: &InMemoryHost) -> (App, Arc<RecordingToaster>) {
    let toaster = Arc::new(RecordingToaster::new());
    let app = AppBuilder::new()
        .with_host(Arc::new(host.clone()))
        .toaster(toaster.clone())
        .config(ControllerConfig::default())
        .build()
        .unwrap();
    (app, toaster)
}

fn simulated() -> InMemoryHost {
    InMemoryHost::with_process_simulation(ProcessSimulation {
        start_delay: Some(Duration::from_millis(200)),
        stop_delay: Some(Duration::from_millis(100)),
    })
}

#[tokio::test(start_paused = true)]
async fn full_cycle_through_the_manager() {
    let host = simulated();
    let (app, toaster) = build(&host);
    let shortcut = ShortcutConfig::new("Htop", "/usr/bin/konsole")
        .with_start_directory("/home/deck")
        .with_launch_options("-e htop");

    assert!(app.manager.add(&shortcut).await);
    let app_id = app.directory.resolve_by_name("Htop").await.unwrap().app_id;
    assert!(app.directory.exists_by_id(app_id).await);

    let start = Instant::now();
    assert!(app.manager.launch(&shortcut).await);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_millis(250));
    assert!(app.manager.is_running(&shortcut));
    assert_eq!(app.tracker.state(app_id), Some(ShortcutState::Running));

    assert!(app.manager.close(&shortcut).await);
    assert!(!app.manager.is_running(&shortcut));

    assert!(app.manager.remove(&shortcut).await);
    assert!(!app.directory.exists_by_name("Htop").await);
    assert!(toaster.toasts().is_empty());
    assert_eq!(host.lifetime_listener_count(), 0);
}

#[tokio::test]
async fn create_failure_leaves_no_residual_record() {
    let host = InMemoryHost::new();
    host.rename_next_add("Htop (copy)");
    let (app, _) = build(&host);

    assert!(app.controller.create("Htop", "/usr/bin/htop").await.is_none());
    assert!(app.controller.shortcuts().await.is_empty());
}

#[tokio::test]
async fn created_id_is_fresh_and_named() {
    let host = InMemoryHost::new();
    let existing = host.insert_shortcut("Htop", "/usr/bin/htop");
    let (app, _) = build(&host);

    let app_id = app.controller.create("Btop", "/usr/bin/btop").await.unwrap();

    assert_ne!(app_id, existing);
    assert!(!app_id.is_placeholder());
    let record = app.directory.resolve_by_name("Btop").await.unwrap();
    assert_eq!(record.app_id, app_id);
}

#[tokio::test]
async fn setters_are_idempotent() {
    let host = InMemoryHost::new();
    let app_id = host.insert_shortcut("Htop", "/usr/bin/htop");
    let (app, _) = build(&host);

    assert!(app.controller.set_executable(app_id, "/usr/bin/btop").await);
    assert!(app.controller.set_executable(app_id, "/usr/bin/btop").await);
    assert!(app.controller.set_launch_options(app_id, "--tree").await);
    assert!(app.controller.set_launch_options(app_id, "--tree").await);

    assert_eq!(host.call_count(HostCall::SetShortcutExe), 1);
    assert_eq!(host.call_count(HostCall::SetAppLaunchOptions), 1);
}

#[tokio::test]
async fn remove_twice_is_true_both_times() {
    let host = InMemoryHost::new();
    let app_id = host.insert_shortcut("Htop", "/usr/bin/htop");
    let (app, _) = build(&host);

    assert!(app.controller.remove(app_id).await);
    assert!(app.controller.remove(app_id).await);
    assert!(!app.directory.exists_by_id(app_id).await);
}

#[tokio::test(start_paused = true)]
async fn wait_times_out_without_further_callbacks() {
    let host = InMemoryHost::new();
    let (app, _) = build(&host);
    let app_id = AppId::new(99);
    let start = Instant::now();

    let ok = app
        .notifier
        .wait_for_lifetime_event(app_id, WaitOptions::launch(Duration::from_millis(1500), false))
        .await;

    assert!(!ok);
    assert!(start.elapsed() >= Duration::from_millis(1500));
    assert_eq!(host.lifetime_listener_count(), 0);
    host.emit_lifetime(LifetimeEvent::started(app_id));
}

#[tokio::test(start_paused = true)]
async fn terminate_without_stop_event_is_false_at_timeout() {
    let host = InMemoryHost::new();
    let app_id = host.insert_shortcut("Htop", "/usr/bin/htop");
    let (app, _) = build(&host);
    let start = Instant::now();

    assert!(!app.controller.terminate(app_id).await);

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1500));
    assert!(elapsed < Duration::from_millis(1550));
}

#[tokio::test]
async fn placeholder_id_never_exists() {
    let host = InMemoryHost::new();
    host.insert_shortcut("Htop", "/usr/bin/htop");
    let (app, _) = build(&host);

    assert!(!app.directory.exists_by_id(AppId::PLACEHOLDER).await);
}

#[tokio::test(start_paused = true)]
async fn hide_app_confirms_after_lag() {
    let host = InMemoryHost::new();
    let app_id = host.insert_shortcut("Htop", "/usr/bin/htop");
    host.set_hide_lag(2);
    let (app, _) = build(&host);

    assert!(app.controller.registry().hide_app(app_id).await);
}

#[test]
fn login_watcher_reports_transitions() {
    let host = InMemoryHost::new();
    let (app, _) = build(&host);
    let logins = Arc::new(std::sync::Mutex::new(Vec::new()));

    let watcher = app.watch_auth(
        {
            let logins = Arc::clone(&logins);
            move |user| logins.lock().unwrap().push(user.to_string())
        },
        || {},
        false,
    );
    host.set_login_user("deck");
    host.set_login_user("deck");

    assert!(watcher.is_active());
    assert_eq!(*logins.lock().unwrap(), vec!["deck".to_string()]);
}
