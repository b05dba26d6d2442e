//! shortcuts-core
//!
//! Core building blocks for the shortcut lifecycle controller.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, shortcut, record, events, state, errors）
//! - **ports**: ホスト境界（HostApps, HostLifetime, HostCollections, HostSession, Toaster, Clock）
//! - **app**: アプリケーションロジック（registry, lifetime, controller, directory, tracker, manager, session, builder）
//! - **impls**: 実装（InMemoryHost など開発用）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{App, AppBuilder, ControllerConfig, ShortcutManager, ShortcutsController};
pub use domain::{AppId, AppRecord, ShortcutConfig, ShortcutError};
