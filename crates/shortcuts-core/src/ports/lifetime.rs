//! HostLifetime port - プロセス起動/終了通知のグローバルストリーム

use std::sync::Arc;

use crate::domain::{HostError, LifetimeEvent};
use crate::ports::HostRegistration;

pub type LifetimeCallback = Arc<dyn Fn(LifetimeEvent) + Send + Sync>;

/// HostLifetime はすべてのアプリの通知を一本のストリームで流す
///
/// 購読側が `app_id` で絞り込む必要があります。
/// 通知はホストの発行順にコールバックされます。
pub trait HostLifetime: Send + Sync {
    fn register_for_lifetime_notifications(
        &self,
        callback: LifetimeCallback,
    ) -> Result<Box<dyn HostRegistration>, HostError>;
}
