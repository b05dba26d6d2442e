//! Subscription - ホスト登録の解除を一度だけ行うハンドル
//!
//! ホストの登録 API は「解除関数」を返すだけなので、解除漏れや二重解除が起きやすい。
//! `Subscription` はそれを次の規則で包みます。
//! - `dispose()` は何度呼んでもホストの解除は一度だけ
//! - drop でも dispose される（キャンセル = drop）
//! - dispose 後はゲートが閉じ、ホストが遅れて通知してきてもコールバックに届かない

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::HostError;
use crate::ports::HostRegistration;

/// コールバック側が参照する開閉フラグ
#[derive(Debug, Clone)]
pub struct SubscriptionGate(Arc<AtomicBool>);

impl SubscriptionGate {
    pub fn is_open(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct Subscription {
    active: Arc<AtomicBool>,
    registration: Mutex<Option<Box<dyn HostRegistration>>>,
}

impl Subscription {
    /// ゲートを作ってから `register` を呼び、その登録を包む
    ///
    /// # 使用例
    /// ```ignore
    /// let subscription = Subscription::open(|gate| {
    ///     host.register_for_lifetime_notifications(Arc::new(move |event| {
    ///         if gate.is_open() { /* ... */ }
    ///     }))
    /// })?;
    /// ```
    pub fn open<F>(register: F) -> Result<Self, HostError>
    where
        F: FnOnce(SubscriptionGate) -> Result<Box<dyn HostRegistration>, HostError>,
    {
        let active = Arc::new(AtomicBool::new(true));
        let registration = register(SubscriptionGate(Arc::clone(&active)))?;
        Ok(Self {
            active,
            registration: Mutex::new(Some(registration)),
        })
    }

    /// 何も登録していないハンドル（登録に失敗したとき用）
    pub fn inert() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
            registration: Mutex::new(None),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// ホストの登録を解除する。二回目以降は何もしない。
    pub fn dispose(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        let registration = self
            .registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(registration) = registration {
            registration.unregister();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingRegistration(Arc<AtomicUsize>);

    impl HostRegistration for CountingRegistration {
        fn unregister(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counting() -> (Arc<AtomicUsize>, Subscription, SubscriptionGate) {
        let count = Arc::new(AtomicUsize::new(0));
        let mut gate = None;
        let subscription = Subscription::open(|g| {
            gate = Some(g);
            Ok(Box::new(CountingRegistration(Arc::clone(&count))) as Box<dyn HostRegistration>)
        })
        .unwrap();
        (count, subscription, gate.unwrap())
    }

    #[test]
    fn double_dispose_unregisters_once() {
        let (count, subscription, gate) = counting();
        assert!(gate.is_open());

        subscription.dispose();
        subscription.dispose();
        drop(subscription);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!gate.is_open());
    }

    #[test]
    fn drop_disposes() {
        let (count, subscription, gate) = counting();
        drop(subscription);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!gate.is_open());
    }

    #[test]
    fn failed_registration_is_reported() {
        let result = Subscription::open(|_| Err(HostError::Unavailable));
        assert!(matches!(result, Err(HostError::Unavailable)));
    }

    #[test]
    fn inert_subscription_is_inactive() {
        let subscription = Subscription::inert();
        assert!(!subscription.is_active());
        subscription.dispose();
    }
}
