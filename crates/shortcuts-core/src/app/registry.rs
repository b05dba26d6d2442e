//! RegistryAdapter - ホストのアプリ登録簿への唯一の入り口
//!
//! ホスト API の失敗はここで捕まえてログに出し、`None` / `false` / 空 Vec に変換します。
//! 呼び出し側がホスト固有のエラーを見ることはありません。
//!
//! # verify-after-write
//! ホストの書き込み API は fire-and-forget です。書き込み後に読み戻し、
//! [`host_value_matches`] で一致したときだけ成功とします。
//! 読み戻しは `RetryPolicy` の回数だけポーリングします。

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::retry::{RetryPolicy, wait_for_predicate};
use super::subscription::Subscription;
use crate::domain::{
    AppId, AppOverview, AppRecord, GameId, HostError, RawAppDetails, ShortcutError,
    ShortcutField, host_value_matches,
};
use crate::ports::{DetailsCallback, HostApps, HostCollections};

pub struct RegistryAdapter {
    apps: Arc<dyn HostApps>,
    collections: Arc<dyn HostCollections>,
    details_timeout: Duration,
    retry: RetryPolicy,
}

impl RegistryAdapter {
    pub fn new(
        apps: Arc<dyn HostApps>,
        collections: Arc<dyn HostCollections>,
        details_timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            apps,
            collections,
            details_timeout,
            retry,
        }
    }

    // ── queries ───────────────────────────────────────────────────────────

    /// 管理対象のアプリ ID。取得に失敗したら空。
    pub async fn list_managed_app_ids(&self) -> Vec<AppId> {
        match self.apps.managed_app_ids().await {
            Ok(ids) => ids,
            Err(error) => {
                warn!(%error, "could not list managed apps");
                Vec::new()
            }
        }
    }

    /// 一つのアプリの現在の詳細
    ///
    /// `None` は「不明」です（ホストがまだ詳細を用意していない場合を含む）。
    /// 「存在しない」とは区別しません。
    pub async fn app_details(&self, app_id: AppId) -> Option<AppRecord> {
        let (tx, rx) = oneshot::channel::<RawAppDetails>();
        let tx = Arc::new(Mutex::new(Some(tx)));

        let subscription = Subscription::open(|gate| {
            let callback: DetailsCallback = Arc::new(move |details| {
                if !gate.is_open() {
                    return;
                }
                let sender = tx.lock().unwrap_or_else(PoisonError::into_inner).take();
                if let Some(sender) = sender {
                    let _ = sender.send(details);
                }
            });
            self.apps.register_for_app_details(app_id, callback)
        });
        let subscription = match subscription {
            Ok(subscription) => subscription,
            Err(error) => {
                warn!(%app_id, %error, "could not register for app details");
                return None;
            }
        };

        let details = tokio::time::timeout(self.details_timeout, rx).await;
        subscription.dispose();

        match details {
            Ok(Ok(raw)) => {
                let record = raw.into_record();
                if record.is_none() {
                    debug!(%app_id, "host reported details without an app id");
                }
                record
            }
            Ok(Err(_)) => None,
            Err(_) => {
                debug!(%app_id, timeout_ms = self.details_timeout.as_millis() as u64, "app details not delivered in time");
                None
            }
        }
    }

    /// 複数アプリの詳細を並行に取得する。順序は入力どおり。
    pub async fn apps_details(&self, app_ids: &[AppId]) -> Vec<Option<AppRecord>> {
        join_all(app_ids.iter().map(|app_id| self.app_details(*app_id))).await
    }

    /// 詳細が取れた管理対象アプリすべて
    pub async fn shortcuts(&self) -> Vec<AppRecord> {
        let ids = self.list_managed_app_ids().await;
        let records: Vec<AppRecord> = self.apps_details(&ids).await.into_iter().flatten().collect();
        debug!(managed = ids.len(), resolved = records.len(), "listed shortcuts");
        records
    }

    pub async fn find_by_name(&self, name: &str) -> Vec<AppRecord> {
        let found: Vec<AppRecord> = self
            .shortcuts()
            .await
            .into_iter()
            .filter(|record| record.display_name == name)
            .collect();
        debug!(name, results = found.len(), "looked up shortcuts by name");
        found
    }

    pub async fn find_by_id(&self, app_id: AppId) -> Vec<AppRecord> {
        let found: Vec<AppRecord> = self
            .shortcuts()
            .await
            .into_iter()
            .filter(|record| record.app_id == app_id)
            .collect();
        debug!(%app_id, results = found.len(), "looked up shortcuts by id");
        found
    }

    pub async fn app_overview(&self, app_id: AppId) -> Option<AppOverview> {
        match self.read_overview(app_id).await {
            Ok(overview) => overview,
            Err(error) => {
                warn!(%app_id, %error, "could not read app overview");
                None
            }
        }
    }

    /// 「無い」と「読めなかった」を区別したい呼び出し側向け
    async fn read_overview(&self, app_id: AppId) -> Result<Option<AppOverview>, HostError> {
        self.apps.app_overview(app_id).await
    }

    pub async fn game_id(&self, app_id: AppId) -> Option<GameId> {
        let overview = self.app_overview(app_id).await;
        if overview.is_none() {
            warn!(%app_id, "could not resolve game id");
        }
        overview.map(|overview| overview.game_id)
    }

    // ── mutations ─────────────────────────────────────────────────────────

    /// ショートカットを作成する
    ///
    /// ホストが返した id の表示名が `name` と一致しなければ、重複や孤児を残さないよう
    /// その id を削除してから `None` を返します。
    pub async fn create_shortcut(&self, name: &str, executable_path: &str) -> Option<AppId> {
        let app_id = match self.apps.add_shortcut(name, executable_path).await {
            Ok(Some(app_id)) if !app_id.is_placeholder() => app_id,
            Ok(_) => {
                warn!(name, "host did not return an app id for the new shortcut");
                return None;
            }
            Err(error) => {
                warn!(name, %error, "could not add shortcut");
                return None;
            }
        };

        match self.app_overview(app_id).await {
            Some(overview) if overview.display_name == name => {
                info!(%app_id, name, "added shortcut");
                Some(app_id)
            }
            overview => {
                warn!(
                    %app_id,
                    name,
                    actual = ?overview.as_ref().map(|o| o.display_name.as_str()),
                    "new shortcut does not match the requested name, rolling back"
                );
                if !self.remove_shortcut(app_id).await {
                    warn!(%app_id, name, "rollback of mismatched shortcut was not confirmed");
                }
                None
            }
        }
    }

    pub async fn set_executable(&self, app_id: AppId, path: &str) -> bool {
        self.report_write(app_id, ShortcutField::Executable, path)
            .await
    }

    pub async fn set_start_directory(&self, app_id: AppId, dir: &str) -> bool {
        self.report_write(app_id, ShortcutField::StartDirectory, dir)
            .await
    }

    pub async fn set_launch_options(&self, app_id: AppId, options: &str) -> bool {
        self.report_write(app_id, ShortcutField::LaunchOptions, options)
            .await
    }

    async fn report_write(&self, app_id: AppId, field: ShortcutField, intended: &str) -> bool {
        match self.write_field(app_id, field, intended).await {
            Ok(()) => true,
            Err(error) => {
                warn!(%app_id, %field, %error, "could not set shortcut field");
                false
            }
        }
    }

    /// verify-after-write の本体
    ///
    /// 1. 現在値を読む（不明なら NotFound）
    /// 2. 既に一致していれば書き込まずに成功
    /// 3. 書き込む
    /// 4. 一致するまで読み戻す（RetryPolicy の回数まで）
    pub(crate) async fn write_field(
        &self,
        app_id: AppId,
        field: ShortcutField,
        intended: &str,
    ) -> Result<(), ShortcutError> {
        let current = self
            .app_details(app_id)
            .await
            .ok_or(ShortcutError::NotFound)?;

        if host_value_matches(current.field(field), intended) {
            debug!(%app_id, %field, display_name = %current.display_name, "field already up to date");
            return Ok(());
        }

        self.issue_write(app_id, field, intended).await?;

        let confirmed = wait_for_predicate(&self.retry, move || async move {
            self.app_details(app_id)
                .await
                .is_some_and(|updated| host_value_matches(updated.field(field), intended))
        })
        .await;

        if confirmed {
            info!(%app_id, %field, display_name = %current.display_name, "set shortcut field");
            Ok(())
        } else {
            Err(ShortcutError::WriteUnconfirmed { field })
        }
    }

    async fn issue_write(
        &self,
        app_id: AppId,
        field: ShortcutField,
        value: &str,
    ) -> Result<(), HostError> {
        match field {
            ShortcutField::Executable => self.apps.set_shortcut_exe(app_id, value).await,
            ShortcutField::StartDirectory => self.apps.set_shortcut_start_dir(app_id, value).await,
            ShortcutField::LaunchOptions => self.apps.set_app_launch_options(app_id, value).await,
        }
    }

    /// ショートカットを削除する。既に無ければ成功。
    ///
    /// 削除要求の後、drag-and-drop を許すユーザーコレクションから id を外し、
    /// overview が引けなくなるまでポーリングして確認します。
    /// overview の読み出し自体が失敗した場合は、無いとはみなさず `false`。
    pub async fn remove_shortcut(&self, app_id: AppId) -> bool {
        match self.read_overview(app_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                info!(%app_id, "shortcut already absent");
                return true;
            }
            Err(error) => {
                warn!(%app_id, %error, "could not confirm shortcut state before removal");
                return false;
            }
        }

        if let Err(error) = self.apps.remove_shortcut(app_id).await {
            warn!(%app_id, %error, "could not remove shortcut");
            return false;
        }

        self.scrub_collections(app_id).await;

        let removed = wait_for_predicate(&self.retry, move || async move {
            matches!(self.read_overview(app_id).await, Ok(None))
        })
        .await;

        if removed {
            info!(%app_id, "removed shortcut");
        } else {
            warn!(%app_id, "shortcut still present after removal");
        }
        removed
    }

    async fn scrub_collections(&self, app_id: AppId) {
        let collections = match self.collections.user_collections().await {
            Ok(collections) => collections,
            Err(error) => {
                warn!(%app_id, %error, "could not list user collections");
                return;
            }
        };

        for collection in collections
            .iter()
            .filter(|c| c.allows_drag_and_drop && c.contains(app_id))
        {
            match self
                .collections
                .remove_apps_from_collection(&collection.id, &[app_id])
                .await
            {
                Ok(()) => {
                    info!(%app_id, collection = %collection.name, "removed shortcut from collection")
                }
                Err(error) => {
                    warn!(%app_id, collection = %collection.name, %error, "could not remove shortcut from collection")
                }
            }
        }
    }

    /// アプリを非表示にし、反映されるまでポーリングする
    pub async fn hide_app(&self, app_id: AppId) -> bool {
        if self.is_hidden(app_id).await {
            info!(%app_id, "app already hidden");
            return true;
        }

        if let Err(error) = self.collections.set_apps_hidden(&[app_id], true).await {
            warn!(%app_id, %error, "could not hide app");
            return false;
        }

        let hidden =
            wait_for_predicate(&self.retry, move || async move { self.is_hidden(app_id).await })
                .await;
        if hidden {
            info!(%app_id, "hid app");
        } else {
            warn!(%app_id, "could not hide app (ran out of retries)");
        }
        hidden
    }

    async fn is_hidden(&self, app_id: AppId) -> bool {
        match self.collections.is_hidden(app_id).await {
            Ok(hidden) => hidden,
            Err(error) => {
                warn!(%app_id, %error, "could not read hidden state");
                false
            }
        }
    }

    // ── process control ───────────────────────────────────────────────────

    pub async fn run_game(&self, game_id: &GameId) -> Result<(), HostError> {
        self.apps.run_game(game_id).await
    }

    pub async fn terminate_app(&self, game_id: &GameId) -> Result<(), HostError> {
        self.apps.terminate_app(game_id).await
    }

    /// 現在起動中のアプリ。取得できなければ `None`。
    pub async fn running_app_ids(&self) -> Option<Vec<AppId>> {
        match self.apps.running_app_ids().await {
            Ok(ids) => Some(ids),
            Err(error) => {
                warn!(%error, "could not list running apps");
                None
            }
        }
    }
}
