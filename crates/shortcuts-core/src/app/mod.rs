//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてショートカットのライフサイクルを実装します。
//!
//! # 主要コンポーネント
//! - **RegistryAdapter**: ホストの登録簿の読み書き（verify-after-write）
//! - **LifetimeNotifier**: 起動/終了通知の購読と待ち合わせ
//! - **ShortcutsController**: create / configure / launch / terminate / remove
//! - **ShortcutDirectory**: 名前 → AppId
//! - **RunningTracker**: 最後に観測した実行状態
//! - **ShortcutManager**: UI 境界（トースト）
//! - **AuthWatcher**: ログイン状態の監視
//! - **AppBuilder**: ワイヤリング

pub mod builder;
pub mod config;
pub mod controller;
pub mod directory;
pub mod lifetime;
pub mod manager;
pub mod registry;
pub mod retry;
pub mod session;
pub mod subscription;
pub mod tracker;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::config::{ConfigError, ControllerConfig};
pub use self::controller::{ConfigureReport, ShortcutsController};
pub use self::directory::ShortcutDirectory;
pub use self::lifetime::{LifetimeNotifier, LifetimeWait, WaitOptions};
pub use self::manager::ShortcutManager;
pub use self::registry::RegistryAdapter;
pub use self::retry::{RetryPolicy, wait_for_predicate};
pub use self::session::{AuthWatcher, wait_for_services_initialized};
pub use self::subscription::{Subscription, SubscriptionGate};
pub use self::tracker::{RunningStatus, RunningTracker};
