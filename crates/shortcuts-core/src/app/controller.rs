//! ShortcutsController - ショートカットのライフサイクルを動かす
//!
//! create / configure / launch / terminate / remove をまとめます。
//! 失敗はすべて `bool` / `Option` / `ConfigureReport` に変換され、例外的な経路はありません。
//!
//! # launch / terminate の順序
//! 1. `watch` で購読（期限はここから）
//! 2. game id を引いてホストに run / terminate を投げる
//! 3. `outcome` で通知を待つ（失敗理由はログに残す）
//!
//! 2 が失敗した場合、待ちは drop されて購読は解除されます。

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::lifetime::{LifetimeNotifier, WaitOptions};
use super::registry::RegistryAdapter;
use crate::domain::{AppId, AppRecord, ShortcutConfig, ShortcutError, ShortcutField};

/// configure の項目ごとの結果。ロールバックはしない。
#[derive(Debug)]
pub struct ConfigureReport {
    pub executable: Result<(), ShortcutError>,
    pub start_directory: Result<(), ShortcutError>,
    pub launch_options: Result<(), ShortcutError>,
}

impl ConfigureReport {
    pub fn is_success(&self) -> bool {
        self.executable.is_ok() && self.start_directory.is_ok() && self.launch_options.is_ok()
    }

    /// 失敗した項目とその理由
    pub fn failures(&self) -> Vec<(ShortcutField, &ShortcutError)> {
        ShortcutField::ALL
            .into_iter()
            .filter_map(|field| self.outcome(field).err().map(|error| (field, error)))
            .collect()
    }

    pub fn outcome(&self, field: ShortcutField) -> Result<(), &ShortcutError> {
        let outcome = match field {
            ShortcutField::Executable => &self.executable,
            ShortcutField::StartDirectory => &self.start_directory,
            ShortcutField::LaunchOptions => &self.launch_options,
        };
        outcome.as_ref().map(|_| ())
    }
}

pub struct ShortcutsController {
    registry: Arc<RegistryAdapter>,
    notifier: Arc<LifetimeNotifier>,
    lifetime_timeout: Duration,
}

impl ShortcutsController {
    pub fn new(
        registry: Arc<RegistryAdapter>,
        notifier: Arc<LifetimeNotifier>,
        lifetime_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            notifier,
            lifetime_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<RegistryAdapter> {
        &self.registry
    }

    pub async fn shortcuts(&self) -> Vec<AppRecord> {
        self.registry.shortcuts().await
    }

    pub async fn create(&self, name: &str, executable_path: &str) -> Option<AppId> {
        self.registry.create_shortcut(name, executable_path).await
    }

    /// 3 項目を独立に書き込む。一つの失敗は他に影響しない。
    pub async fn configure(&self, app_id: AppId, config: &ShortcutConfig) -> ConfigureReport {
        let executable = self
            .registry
            .write_field(app_id, ShortcutField::Executable, config.executable_path())
            .await;
        let start_directory = self
            .registry
            .write_field(app_id, ShortcutField::StartDirectory, config.start_directory())
            .await;
        let launch_options = self
            .registry
            .write_field(app_id, ShortcutField::LaunchOptions, config.launch_options())
            .await;

        let report = ConfigureReport {
            executable,
            start_directory,
            launch_options,
        };
        for (field, error) in report.failures() {
            warn!(%app_id, name = config.name(), %field, %error, "could not configure shortcut");
        }
        report
    }

    pub async fn set_executable(&self, app_id: AppId, path: &str) -> bool {
        self.registry.set_executable(app_id, path).await
    }

    pub async fn set_start_directory(&self, app_id: AppId, dir: &str) -> bool {
        self.registry.set_start_directory(app_id, dir).await
    }

    pub async fn set_launch_options(&self, app_id: AppId, options: &str) -> bool {
        self.registry.set_launch_options(app_id, options).await
    }

    /// 起動して、起動通知（`wait_until_stop` なら終了通知）を待つ
    pub async fn launch(&self, app_id: AppId, wait_until_stop: bool) -> bool {
        let wait = self.notifier.watch(
            app_id,
            WaitOptions::launch(self.lifetime_timeout, wait_until_stop),
        );

        let Some(game_id) = self.registry.game_id(app_id).await else {
            return false;
        };
        if let Err(error) = self.registry.run_game(&game_id).await {
            warn!(%app_id, %game_id, %error, "could not run shortcut");
            return false;
        }

        match wait.outcome().await {
            Ok(()) => {
                info!(%app_id, wait_until_stop, "shortcut launched");
                true
            }
            Err(error) => {
                warn!(%app_id, wait_until_stop, %error, "no lifetime confirmation for launch");
                false
            }
        }
    }

    /// 終了を要求して、終了通知を待つ
    pub async fn terminate(&self, app_id: AppId) -> bool {
        let wait = self
            .notifier
            .watch(app_id, WaitOptions::terminate(self.lifetime_timeout));

        let Some(game_id) = self.registry.game_id(app_id).await else {
            return false;
        };
        if let Err(error) = self.registry.terminate_app(&game_id).await {
            warn!(%app_id, %game_id, %error, "could not terminate shortcut");
            return false;
        }

        match wait.outcome().await {
            Ok(()) => {
                info!(%app_id, "shortcut terminated");
                true
            }
            Err(error) => {
                warn!(%app_id, %error, "no lifetime confirmation for terminate");
                false
            }
        }
    }

    pub async fn remove(&self, app_id: AppId) -> bool {
        self.registry.remove_shortcut(app_id).await
    }
}
