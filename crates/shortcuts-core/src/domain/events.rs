//! Events - ホストが発行するプロセスのライフタイム通知

use serde::{Deserialize, Serialize};

use super::ids::AppId;

/// LifetimeEvent はアプリのプロセスが起動/終了したことを表す
///
/// ホストのグローバルなストリームで届くため、購読側で `app_id` を絞り込みます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifetimeEvent {
    pub app_id: AppId,
    pub is_running: bool,
}

impl LifetimeEvent {
    pub fn started(app_id: AppId) -> Self {
        Self {
            app_id,
            is_running: true,
        }
    }

    pub fn stopped(app_id: AppId) -> Self {
        Self {
            app_id,
            is_running: false,
        }
    }
}
