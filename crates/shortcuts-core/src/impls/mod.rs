//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryHost**: すべてのホスト port を実装するフェイク（故障注入つき）
//! - **LogToaster** / **RecordingToaster**: Toaster
//!
//! 実ホストへのバインディングは別クレートに配置します。

pub mod memory_host;
pub mod toaster;

// 主要な型を再エクスポート
pub use self::memory_host::{HostCall, InMemoryHost, ProcessSimulation};
pub use self::toaster::{LogToaster, RecordingToaster};
