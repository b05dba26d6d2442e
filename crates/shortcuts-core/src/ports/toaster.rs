//! Toaster port - ユーザーに見える通知
//!
//! コアはログだけを出します。トーストを出すのは UI 境界（`ShortcutManager`）だけです。

pub trait Toaster: Send + Sync {
    fn toast(&self, title: &str, body: &str);
}
