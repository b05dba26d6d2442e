//! ShortcutManager - UI から呼ばれる境界
//!
//! UI はショートカットを `ShortcutConfig`（名前で識別）で扱います。
//! ここで名前を AppId に解決し、コントローラを呼び、失敗をトーストにします。
//! どのメソッドも panic やエラーを返さず、`bool` で答えます。
//!
//! `is_running` だけは同期です。名前 → AppId の対応と `RunningTracker` の
//! 最後に観測した状態から答えます。対応表はその用途専用で、remove / close は
//! 毎回ホストに名前を問い合わせます。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::controller::ShortcutsController;
use super::directory::ShortcutDirectory;
use super::lifetime::LifetimeNotifier;
use super::tracker::{RunningStatus, RunningTracker};
use crate::domain::{AppId, AppRecord, LifecycleOp, ShortcutConfig};
use crate::ports::Toaster;

const TOAST_TITLE: &str = "Shortcuts";

const ADD_FAILED: &str = "Failed to add shortcut";
const LAUNCH_FAILED: &str = "Shortcut failed. Check the command.";
const CLOSE_FAILED: &str = "Failed to close shortcut.";
const REMOVE_NOT_FOUND: &str = "Didn't find shortcut to remove.";
const REMOVE_FAILED: &str = "Failed to remove shortcut";

pub struct ShortcutManager {
    controller: Arc<ShortcutsController>,
    directory: Arc<ShortcutDirectory>,
    notifier: Arc<LifetimeNotifier>,
    tracker: Arc<RunningTracker>,
    toaster: Arc<dyn Toaster>,
    known: Mutex<HashMap<String, AppId>>,
}

impl ShortcutManager {
    pub fn new(
        controller: Arc<ShortcutsController>,
        directory: Arc<ShortcutDirectory>,
        notifier: Arc<LifetimeNotifier>,
        tracker: Arc<RunningTracker>,
        toaster: Arc<dyn Toaster>,
    ) -> Self {
        Self {
            controller,
            directory,
            notifier,
            tracker,
            toaster,
            known: Mutex::new(HashMap::new()),
        }
    }

    fn known(&self) -> MutexGuard<'_, HashMap<String, AppId>> {
        self.known.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remember(&self, name: &str, app_id: AppId) {
        self.known().insert(name.to_string(), app_id);
        self.tracker.track(app_id);
    }

    fn known_id(&self, name: &str) -> Option<AppId> {
        self.known().get(name).copied()
    }

    /// ホストに問い合わせて名前を解決し、対応表を更新する
    ///
    /// 外部で削除・再作成されると対応表は古くなるので、ホストを変更する操作は
    /// 必ずこちらを使う。
    async fn resolve(&self, name: &str) -> Option<AppId> {
        let resolved = self.directory.resolve_by_name(name).await.map(|record| record.app_id);
        let stale = match resolved {
            Some(app_id) => self.known().insert(name.to_string(), app_id),
            None => self.known().remove(name),
        };
        if let Some(stale) = stale
            && Some(stale) != resolved
        {
            debug!(%stale, name, "shortcut was replaced outside the manager");
            self.tracker.forget(stale);
        }
        if let Some(app_id) = resolved {
            self.tracker.track(app_id);
        }
        resolved
    }

    fn toast(&self, body: &str) {
        self.toaster.toast(TOAST_TITLE, body);
    }

    /// 名前で既存のショートカットを探す。無ければ作る。
    async fn ensure_registered(&self, config: &ShortcutConfig) -> Option<AppId> {
        if let Some(app_id) = self.resolve(config.name()).await {
            debug!(%app_id, name = config.name(), "shortcut already registered");
            return Some(app_id);
        }

        let app_id = self
            .controller
            .create(config.name(), config.executable_path())
            .await?;
        self.tracker.note(app_id, LifecycleOp::Create);
        self.remember(config.name(), app_id);
        Some(app_id)
    }

    /// 登録して 3 項目を設定する
    async fn apply(&self, config: &ShortcutConfig) -> Option<AppId> {
        let app_id = self.ensure_registered(config).await?;
        let report = self.controller.configure(app_id, config).await;
        if !report.is_success() {
            return None;
        }
        self.tracker.note(app_id, LifecycleOp::Configure);
        Some(app_id)
    }

    pub async fn add(&self, config: &ShortcutConfig) -> bool {
        match self.apply(config).await {
            Some(app_id) => {
                info!(%app_id, name = config.name(), "shortcut ready");
                true
            }
            None => {
                self.toast(ADD_FAILED);
                false
            }
        }
    }

    /// 既存のショートカットに設定を反映する（無ければ作る）
    pub async fn update(&self, config: &ShortcutConfig) -> bool {
        match self.apply(config).await {
            Some(_) => true,
            None => {
                warn!(name = config.name(), "could not update shortcut");
                false
            }
        }
    }

    pub async fn remove(&self, config: &ShortcutConfig) -> bool {
        let Some(app_id) = self.resolve(config.name()).await else {
            self.toast(REMOVE_NOT_FOUND);
            return false;
        };
        self.remove_by_id(app_id).await
    }

    pub async fn remove_by_id(&self, app_id: AppId) -> bool {
        if !self.controller.remove(app_id).await {
            self.toast(REMOVE_FAILED);
            return false;
        }
        self.tracker.note(app_id, LifecycleOp::Remove);
        self.tracker.forget(app_id);
        self.known().retain(|_, known| *known != app_id);
        true
    }

    /// 必要なら登録・設定してから起動し、起動通知を待つ
    pub async fn launch(&self, config: &ShortcutConfig) -> bool {
        let Some(app_id) = self.apply(config).await else {
            self.toast(LAUNCH_FAILED);
            return false;
        };
        self.tracker.follow(app_id, &self.notifier);

        if self.controller.launch(app_id, false).await {
            self.tracker.note(app_id, LifecycleOp::ObservedStart);
            true
        } else {
            self.toast(LAUNCH_FAILED);
            false
        }
    }

    pub async fn close(&self, config: &ShortcutConfig) -> bool {
        let Some(app_id) = self.resolve(config.name()).await else {
            self.toast(CLOSE_FAILED);
            return false;
        };

        if self.controller.terminate(app_id).await {
            self.tracker.note(app_id, LifecycleOp::ObservedStop);
            true
        } else {
            self.toast(CLOSE_FAILED);
            false
        }
    }

    /// 最後に観測した状態。一度も解決していない名前は false。
    pub fn is_running(&self, config: &ShortcutConfig) -> bool {
        self.known_id(config.name())
            .is_some_and(|app_id| self.tracker.is_running(app_id))
    }

    pub fn status(&self, config: &ShortcutConfig) -> Option<RunningStatus> {
        self.known_id(config.name())
            .and_then(|app_id| self.tracker.status(app_id))
    }

    pub async fn shortcuts(&self) -> Vec<AppRecord> {
        self.controller.shortcuts().await
    }

    /// ホストの起動中リストで `is_running` の答えを補正する
    pub async fn refresh_running(&self) -> bool {
        self.tracker
            .refresh_running(self.controller.registry())
            .await
    }
}
