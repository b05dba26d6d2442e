//! Errors - エラー型と分類
//!
//! すべての種類はアダプタ/ノーティファイアの境界で吸収され、
//! 呼び出し側には bool / Option として見えます。ここでの型は
//! ログと内部の伝播（`?`）のためのものです。

use thiserror::Error;

use super::shortcut::ShortcutField;
use super::state::{LifecycleOp, ShortcutState};

/// ErrorKind は失敗の運用上の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 参照先のレコードが無い（空/None として返す）
    NotFound,
    /// 書き込み後の読み戻しが一致しない
    WriteUnconfirmed,
    /// ライフタイム待ちや詳細取得がタイムアウトした
    Timeout,
    /// ホスト呼び出しそのものが失敗した
    HostCallFailed,
}

/// ホスト API 呼び出しの失敗
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("host call `{call}` failed: {message}")]
    CallFailed { call: &'static str, message: String },

    #[error("host is not available")]
    Unavailable,
}

impl HostError {
    pub fn call_failed(call: &'static str, message: impl Into<String>) -> Self {
        HostError::CallFailed {
            call,
            message: message.into(),
        }
    }
}

/// ShortcutError はコントローラ内部で使うドメインエラー
#[derive(Debug, Error)]
pub enum ShortcutError {
    #[error("no record found")]
    NotFound,

    #[error("write to {field} was not confirmed by read-back")]
    WriteUnconfirmed { field: ShortcutField },

    #[error("timed out waiting for the host")]
    Timeout,

    #[error(transparent)]
    HostCallFailed(#[from] HostError),
}

impl ShortcutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShortcutError::NotFound => ErrorKind::NotFound,
            ShortcutError::WriteUnconfirmed { .. } => ErrorKind::WriteUnconfirmed,
            ShortcutError::Timeout => ErrorKind::Timeout,
            ShortcutError::HostCallFailed(_) => ErrorKind::HostCallFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot apply {op:?} to a shortcut in state {from:?}")]
pub struct InvalidTransition {
    pub from: ShortcutState,
    pub op: LifecycleOp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_errors_convert_into_host_call_failed() {
        let err: ShortcutError = HostError::call_failed("run_game", "boom").into();
        assert_eq!(err.kind(), ErrorKind::HostCallFailed);
        assert!(err.to_string().contains("run_game"));
    }

    #[test]
    fn write_unconfirmed_names_the_field() {
        let err = ShortcutError::WriteUnconfirmed {
            field: ShortcutField::StartDirectory,
        };
        assert_eq!(err.kind(), ErrorKind::WriteUnconfirmed);
        assert_eq!(
            err.to_string(),
            "write to start_directory was not confirmed by read-back"
        );
    }
}
