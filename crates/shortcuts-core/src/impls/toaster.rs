//! Toaster 実装
//!
//! - **LogToaster**: トーストを tracing に流す（CLI 用）
//! - **RecordingToaster**: 受け取ったトーストを保持する（テスト用）

use std::sync::{Mutex, PoisonError};

use tracing::info;

use crate::ports::Toaster;

#[derive(Debug, Default)]
pub struct LogToaster;

impl Toaster for LogToaster {
    fn toast(&self, title: &str, body: &str) {
        info!(title, body, "toast");
    }
}

#[derive(Debug, Default)]
pub struct RecordingToaster {
    toasts: Mutex<Vec<(String, String)>>,
}

impl RecordingToaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<(String, String)> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 本文だけを取り出す
    pub fn bodies(&self) -> Vec<String> {
        self.toasts().into_iter().map(|(_, body)| body).collect()
    }
}

impl Toaster for RecordingToaster {
    fn toast(&self, title: &str, body: &str) {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((title.to_string(), body.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_toaster_keeps_order() {
        let toaster = RecordingToaster::new();
        toaster.toast("Error", "Failed to add shortcut");
        toaster.toast("Error", "Failed to close shortcut.");

        assert_eq!(
            toaster.bodies(),
            vec!["Failed to add shortcut", "Failed to close shortcut."]
        );
    }
}
