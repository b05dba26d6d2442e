//! Host identifiers (strongly-typed IDs).
//!
//! ホストが割り当てる ID を newtype で包みます。
//! `AppId` と `GameId` を型で区別することで、起動 API に app id を
//! 渡してしまうような取り違えをコンパイル時に防ぎます。
//!
//! ## AppId(0) について
//! ホスト側の慣習で `0` は「見つからない」を表す予約値です。
//! 実在するショートカットが `0` を持つことはありません。

use serde::{Deserialize, Serialize};
use std::fmt;

/// ホストが割り当てるアプリ ID
///
/// 一度割り当てられたら変わらず、ライブラリ内で一意です。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(u32);

impl AppId {
    /// 「見つからない」を表す予約値
    pub const PLACEHOLDER: AppId = AppId(0);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_placeholder(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for AppId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 起動/終了 API が受け取るゲーム ID
///
/// AppId から直接は導出せず、必ずホストの overview から解決します。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
