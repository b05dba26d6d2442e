//! Records - ホストが観測した状態のスナップショット
//!
//! これらはすべて一時的なコピーです。ホスト側は独立して変化するため、
//! 呼び出しをまたいでキャッシュしてはいけません。

use serde::{Deserialize, Serialize};

use super::ids::{AppId, GameId};
use super::shortcut::ShortcutField;

/// AppRecord はホストが保持するショートカットの詳細
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub app_id: AppId,
    pub display_name: String,
    pub shortcut_exe: String,
    pub shortcut_start_dir: String,
    pub launch_options: String,
}

impl AppRecord {
    /// 指定フィールドの現在値（ホストが付けた引用符を含む生の値）
    pub fn field(&self, field: ShortcutField) -> &str {
        match field {
            ShortcutField::Executable => &self.shortcut_exe,
            ShortcutField::StartDirectory => &self.shortcut_start_dir,
            ShortcutField::LaunchOptions => &self.launch_options,
        }
    }
}

/// details 登録のコールバックでホストから届く生データ
///
/// ホストは詳細をまだ用意できていないとき、`app_id` 無しで通知してきます。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAppDetails {
    pub app_id: Option<AppId>,
    pub display_name: String,
    pub shortcut_exe: String,
    pub shortcut_start_dir: String,
    pub launch_options: String,
}

impl RawAppDetails {
    /// `app_id` が無ければ「不明」として `None`
    pub fn into_record(self) -> Option<AppRecord> {
        let app_id = self.app_id?;
        Some(AppRecord {
            app_id,
            display_name: self.display_name,
            shortcut_exe: self.shortcut_exe,
            shortcut_start_dir: self.shortcut_start_dir,
            launch_options: self.launch_options,
        })
    }
}

impl From<AppRecord> for RawAppDetails {
    fn from(record: AppRecord) -> Self {
        Self {
            app_id: Some(record.app_id),
            display_name: record.display_name,
            shortcut_exe: record.shortcut_exe,
            shortcut_start_dir: record.shortcut_start_dir,
            launch_options: record.launch_options,
        }
    }
}

/// AppOverview はホストの軽量な同期サマリ
///
/// 作成確認・削除確認・game id の解決に使います。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppOverview {
    pub app_id: AppId,
    pub display_name: String,
    pub game_id: GameId,
}

/// ユーザーが作ったコレクション（削除時に掃除する二次インデックス）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCollection {
    pub id: String,
    pub name: String,
    pub allows_drag_and_drop: bool,
    pub apps: Vec<AppId>,
}

impl UserCollection {
    pub fn contains(&self, app_id: AppId) -> bool {
        self.apps.contains(&app_id)
    }
}
