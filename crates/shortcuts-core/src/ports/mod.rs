//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait はホストアプリケーションの API への境界で、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - ホストの登録簿が source of truth（正本）。こちらはキャッシュしない
//! - コールバック登録は `HostRegistration` を返し、解除は呼び出し側が管理する
//! - すべて `Send + Sync`。`Arc<dyn _>` で注入する

pub mod clock;
pub mod collections;
pub mod host_apps;
pub mod lifetime;
pub mod registration;
pub mod session;
pub mod toaster;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::collections::HostCollections;
pub use self::host_apps::{DetailsCallback, HostApps};
pub use self::lifetime::{HostLifetime, LifetimeCallback};
pub use self::registration::HostRegistration;
pub use self::session::{HostSession, LoginCallback};
pub use self::toaster::Toaster;
