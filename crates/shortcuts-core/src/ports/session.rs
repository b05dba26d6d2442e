//! HostSession port - ログイン状態とサービス初期化

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::HostError;
use crate::ports::HostRegistration;

/// ユーザー名を受け取る。空文字はログアウトを意味する。
pub type LoginCallback = Arc<dyn Fn(&str) + Send + Sync>;

#[async_trait]
pub trait HostSession: Send + Sync {
    fn register_for_login_state_change(
        &self,
        callback: LoginCallback,
    ) -> Result<Box<dyn HostRegistration>, HostError>;

    /// ホストのサービス群が初期化済みか
    async fn services_initialized(&self) -> Result<bool, HostError>;
}
