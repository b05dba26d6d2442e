//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - ホスト port を `Arc<dyn _>` で注入する

use std::sync::Arc;

use super::config::ControllerConfig;
use super::controller::ShortcutsController;
use super::directory::ShortcutDirectory;
use super::lifetime::LifetimeNotifier;
use super::manager::ShortcutManager;
use super::registry::RegistryAdapter;
use super::session::{AuthWatcher, wait_for_services_initialized};
use super::tracker::RunningTracker;
use crate::ports::{Clock, HostApps, HostCollections, HostLifetime, HostSession, SystemClock, Toaster};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let host = Arc::new(InMemoryHost::new());
/// let app = AppBuilder::new()
///     .with_host(host)
///     .toaster(Arc::new(LogToaster))
///     .config(ControllerConfig::default())
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - ホスト port（apps / lifetime / collections / session）と toaster は必須
/// - 不足があれば build() が BuildError を返す
/// - clock と config は省略するとデフォルト
#[derive(Default)]
pub struct AppBuilder {
    apps: Option<Arc<dyn HostApps>>,
    lifetime: Option<Arc<dyn HostLifetime>>,
    collections: Option<Arc<dyn HostCollections>>,
    session: Option<Arc<dyn HostSession>>,
    toaster: Option<Arc<dyn Toaster>>,
    clock: Option<Arc<dyn Clock>>,
    config: ControllerConfig,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing port: {0}. Provide it on the builder before calling build().")]
    MissingPort(&'static str),
}

impl AppBuilder {
    /// 新しい AppBuilder を作成
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apps(mut self, apps: Arc<dyn HostApps>) -> Self {
        self.apps = Some(apps);
        self
    }

    pub fn lifetime(mut self, lifetime: Arc<dyn HostLifetime>) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    pub fn collections(mut self, collections: Arc<dyn HostCollections>) -> Self {
        self.collections = Some(collections);
        self
    }

    pub fn session(mut self, session: Arc<dyn HostSession>) -> Self {
        self.session = Some(session);
        self
    }

    /// 一つの型がすべてのホスト port を実装している場合のショートカット
    pub fn with_host<H>(self, host: Arc<H>) -> Self
    where
        H: HostApps + HostLifetime + HostCollections + HostSession + 'static,
    {
        self.apps(host.clone())
            .lifetime(host.clone())
            .collections(host.clone())
            .session(host)
    }

    pub fn toaster(mut self, toaster: Arc<dyn Toaster>) -> Self {
        self.toaster = Some(toaster);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// AppBuilder を構築して App を生成
    ///
    /// # 検証
    /// - 必須 port がすべて設定されているかチェック
    /// - 不足があれば BuildError::MissingPort を返す
    pub fn build(self) -> Result<App, BuildError> {
        let apps = self.apps.ok_or(BuildError::MissingPort("apps"))?;
        let lifetime = self.lifetime.ok_or(BuildError::MissingPort("lifetime"))?;
        let collections = self
            .collections
            .ok_or(BuildError::MissingPort("collections"))?;
        let session = self.session.ok_or(BuildError::MissingPort("session"))?;
        let toaster = self.toaster.ok_or(BuildError::MissingPort("toaster"))?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let config = self.config;

        let registry = Arc::new(RegistryAdapter::new(
            apps,
            collections,
            config.details_timeout(),
            config.retry_policy(),
        ));
        let notifier = Arc::new(LifetimeNotifier::new(lifetime));
        let controller = Arc::new(ShortcutsController::new(
            Arc::clone(&registry),
            Arc::clone(&notifier),
            config.lifetime_timeout(),
        ));
        let directory = Arc::new(ShortcutDirectory::new(registry));
        let tracker = Arc::new(RunningTracker::new(clock));
        let manager = Arc::new(ShortcutManager::new(
            Arc::clone(&controller),
            Arc::clone(&directory),
            Arc::clone(&notifier),
            Arc::clone(&tracker),
            toaster,
        ));

        Ok(App {
            controller,
            directory,
            manager,
            notifier,
            tracker,
            session,
            config,
        })
    }
}

/// App は組み上がったコンポーネント一式
pub struct App {
    pub controller: Arc<ShortcutsController>,
    pub directory: Arc<ShortcutDirectory>,
    pub manager: Arc<ShortcutManager>,
    pub notifier: Arc<LifetimeNotifier>,
    pub tracker: Arc<RunningTracker>,
    pub session: Arc<dyn HostSession>,
    pub config: ControllerConfig,
}

impl App {
    pub fn watch_auth<L, O>(&self, on_login: L, on_logout: O, once: bool) -> AuthWatcher
    where
        L: Fn(&str) + Send + Sync + 'static,
        O: Fn() + Send + Sync + 'static,
    {
        AuthWatcher::register(self.session.as_ref(), on_login, on_logout, once)
    }

    pub async fn wait_for_services_initialized(&self) -> bool {
        wait_for_services_initialized(self.session.as_ref(), &self.config.services_retry_policy())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryHost, RecordingToaster};

    #[test]
    fn test_build_success() {
        let app = AppBuilder::new()
            .with_host(Arc::new(InMemoryHost::new()))
            .toaster(Arc::new(RecordingToaster::new()))
            .build();
        assert!(app.is_ok());
    }

    #[test]
    fn test_build_missing_toaster() {
        let app = AppBuilder::new()
            .with_host(Arc::new(InMemoryHost::new()))
            .build();
        assert!(matches!(app, Err(BuildError::MissingPort("toaster"))));
    }

    #[test]
    fn test_build_missing_host() {
        let app = AppBuilder::new()
            .toaster(Arc::new(RecordingToaster::new()))
            .build();
        assert!(matches!(app, Err(BuildError::MissingPort("apps"))));
    }

    #[tokio::test]
    async fn test_built_app_is_wired() {
        let host = Arc::new(InMemoryHost::new());
        let app = AppBuilder::new()
            .with_host(host.clone())
            .toaster(Arc::new(RecordingToaster::new()))
            .build()
            .unwrap();

        let app_id = app.controller.create("Konsole", "/usr/bin/konsole").await.unwrap();
        assert!(app.directory.exists_by_id(app_id).await);
        assert!(app.wait_for_services_initialized().await);
    }
}
