//! HostApps port - ホストのアプリ登録簿とプロセス操作
//!
//! 書き込み系（add を除く）とプロセス操作はすべて fire-and-forget です。
//! `Ok(())` は「ホストが例外を投げなかった」だけを意味し、反映は保証されません。
//! 成功判定は必ず読み戻しで行います（`app::registry` 参照）。

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{AppId, AppOverview, GameId, HostError, RawAppDetails};
use crate::ports::HostRegistration;

/// details 登録に渡すコールバック
pub type DetailsCallback = Arc<dyn Fn(RawAppDetails) + Send + Sync>;

#[async_trait]
pub trait HostApps: Send + Sync {
    /// 管理対象（非ネイティブ/デスクトップ枠）のアプリ ID 一覧。ホストの列挙順。
    async fn managed_app_ids(&self) -> Result<Vec<AppId>, HostError>;

    /// 詳細の通知を登録する。実際には一度だけ通知を受けて解除する。
    fn register_for_app_details(
        &self,
        app_id: AppId,
        callback: DetailsCallback,
    ) -> Result<Box<dyn HostRegistration>, HostError>;

    async fn app_overview(&self, app_id: AppId) -> Result<Option<AppOverview>, HostError>;

    /// 新規ショートカットを追加する。ホストが id を返さないこともある。
    async fn add_shortcut(&self, name: &str, exe: &str) -> Result<Option<AppId>, HostError>;

    async fn remove_shortcut(&self, app_id: AppId) -> Result<(), HostError>;

    async fn set_shortcut_exe(&self, app_id: AppId, exe: &str) -> Result<(), HostError>;

    async fn set_shortcut_start_dir(
        &self,
        app_id: AppId,
        start_dir: &str,
    ) -> Result<(), HostError>;

    async fn set_app_launch_options(
        &self,
        app_id: AppId,
        options: &str,
    ) -> Result<(), HostError>;

    async fn run_game(&self, game_id: &GameId) -> Result<(), HostError>;

    async fn terminate_app(&self, game_id: &GameId) -> Result<(), HostError>;

    /// 現在起動中のアプリ ID
    async fn running_app_ids(&self) -> Result<Vec<AppId>, HostError>;
}
