//! Shortcut - ユーザーが宣言したショートカット設定
//!
//! `ShortcutConfig` はユーザーの意図（name / executable / start dir / launch options）です。
//! コントローラはこれを書き換えず、ホストの状態と比較するだけです。
//!
//! # 値の比較
//! ホストは exe や start dir を `"path"` のように引用符で包んで保存することがあります。
//! 比較は必ず [`host_value_matches`] を通して行います。

use serde::{Deserialize, Serialize};
use std::fmt;

/// ショートカットの宣言的な設定
///
/// 構築後は不変です（setter は持たず、`with_*` は新しい値を返します）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutConfig {
    name: String,
    executable_path: String,
    #[serde(default)]
    start_directory: String,
    #[serde(default)]
    launch_options: String,
}

impl ShortcutConfig {
    pub fn new(name: impl Into<String>, executable_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            executable_path: executable_path.into(),
            start_directory: String::new(),
            launch_options: String::new(),
        }
    }

    pub fn with_start_directory(mut self, start_directory: impl Into<String>) -> Self {
        self.start_directory = start_directory.into();
        self
    }

    pub fn with_launch_options(mut self, launch_options: impl Into<String>) -> Self {
        self.launch_options = launch_options.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn executable_path(&self) -> &str {
        &self.executable_path
    }

    pub fn start_directory(&self) -> &str {
        &self.start_directory
    }

    pub fn launch_options(&self) -> &str {
        &self.launch_options
    }

    /// 指定フィールドの意図した値
    pub fn value_of(&self, field: ShortcutField) -> &str {
        match field {
            ShortcutField::Executable => &self.executable_path,
            ShortcutField::StartDirectory => &self.start_directory,
            ShortcutField::LaunchOptions => &self.launch_options,
        }
    }
}

/// verify-after-write の対象になる書き込み可能フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutField {
    Executable,
    StartDirectory,
    LaunchOptions,
}

impl ShortcutField {
    pub const ALL: [ShortcutField; 3] = [
        ShortcutField::Executable,
        ShortcutField::StartDirectory,
        ShortcutField::LaunchOptions,
    ];
}

impl fmt::Display for ShortcutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShortcutField::Executable => "executable",
            ShortcutField::StartDirectory => "start_directory",
            ShortcutField::LaunchOptions => "launch_options",
        };
        f.write_str(name)
    }
}

/// ホストが付ける外側の引用符を一組だけ外す
///
/// `"` 一文字だけの値はそのまま返します。
pub fn strip_host_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(value)
}

/// ホストが観測した値と意図した値が一致するか
///
/// 両辺を [`strip_host_quotes`] で正規化してから比較します。
/// exe / start dir / launch options の 3 フィールドすべてでこの関数だけを使います。
pub fn host_value_matches(actual: &str, intended: &str) -> bool {
    strip_host_quotes(actual) == strip_host_quotes(intended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("/usr/bin/bash", "/usr/bin/bash", true)]
    #[case::host_quoted("\"/usr/bin/bash\"", "/usr/bin/bash", true)]
    #[case::intent_quoted("/usr/bin/bash", "\"/usr/bin/bash\"", true)]
    #[case::both_quoted("\"/usr/bin/bash\"", "\"/usr/bin/bash\"", true)]
    #[case::different("\"/usr/bin/zsh\"", "/usr/bin/bash", false)]
    #[case::half_quoted("\"/usr/bin/bash", "/usr/bin/bash", false)]
    #[case::empty("", "", true)]
    #[case::quoted_empty("\"\"", "", true)]
    fn host_value_matches_tolerates_one_quote_pair(
        #[case] actual: &str,
        #[case] intended: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(host_value_matches(actual, intended), expected);
    }

    #[test]
    fn strip_only_removes_one_pair() {
        assert_eq!(strip_host_quotes("\"\"a\"\""), "\"a\"");
        assert_eq!(strip_host_quotes("\""), "\"");
    }

    #[test]
    fn config_deserializes_camel_case_with_defaults() {
        let config: ShortcutConfig = serde_json::from_value(serde_json::json!({
            "name": "Konsole",
            "executablePath": "/usr/bin/konsole",
        }))
        .unwrap();

        assert_eq!(config.name(), "Konsole");
        assert_eq!(config.executable_path(), "/usr/bin/konsole");
        assert_eq!(config.start_directory(), "");
        assert_eq!(config.value_of(ShortcutField::LaunchOptions), "");
    }

    #[test]
    fn builder_methods_fill_optional_fields() {
        let config = ShortcutConfig::new("Htop", "/usr/bin/htop")
            .with_start_directory("/home/deck")
            .with_launch_options("-d 10");

        assert_eq!(config.value_of(ShortcutField::Executable), "/usr/bin/htop");
        assert_eq!(config.value_of(ShortcutField::StartDirectory), "/home/deck");
        assert_eq!(config.value_of(ShortcutField::LaunchOptions), "-d 10");
    }
}
