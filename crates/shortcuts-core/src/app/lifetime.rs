//! LifetimeNotifier - 一つのアプリの起動/終了通知を待つ
//!
//! ホストの通知はグローバルなストリームなので、ここで `app_id` に絞り込みます。
//!
//! # 学習ポイント
//! - 購読（`watch`）とトリガ（run/terminate）を分ける。先に購読しないと、
//!   すぐに届いた通知を取りこぼす
//! - コールバック → unbounded mpsc で発行順を保ったまま async 側へ渡す
//! - `tokio::time::timeout_at` で「通知 vs 期限」を競わせる
//! - どの経路で終わっても `Subscription` が一度だけ解除する

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use super::subscription::Subscription;
use crate::domain::{AppId, HostError, LifetimeEvent, ShortcutError};
use crate::ports::{HostLifetime, LifetimeCallback};

/// 待ち条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// `None` なら期限なし
    pub timeout: Option<Duration>,
    /// `is_running = true` が来るまで他の通知を無視する
    pub wait_for_start: bool,
    /// 開始条件を満たした後、`is_running = false` で解決する
    pub wait_until_stop: bool,
}

impl WaitOptions {
    /// 起動待ち。`until_stop` なら終了まで待つ。
    pub fn launch(timeout: Duration, until_stop: bool) -> Self {
        Self {
            timeout: Some(timeout),
            wait_for_start: true,
            wait_until_stop: until_stop,
        }
    }

    /// 終了待ち
    pub fn terminate(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            wait_for_start: false,
            wait_until_stop: true,
        }
    }
}

pub struct LifetimeNotifier {
    host: Arc<dyn HostLifetime>,
}

impl LifetimeNotifier {
    pub fn new(host: Arc<dyn HostLifetime>) -> Self {
        Self { host }
    }

    /// `app_id` の通知だけを `on_event` に流す
    ///
    /// 返したハンドルを dispose（または drop）した後は、ホストが遅れて通知しても
    /// `on_event` は呼ばれません。
    pub fn subscribe<F>(&self, app_id: AppId, on_event: F) -> Result<Subscription, ShortcutError>
    where
        F: Fn(LifetimeEvent) + Send + Sync + 'static,
    {
        let subscription = Subscription::open(|gate| {
            let callback: LifetimeCallback = Arc::new(move |event: LifetimeEvent| {
                if event.app_id == app_id && gate.is_open() {
                    on_event(event);
                }
            });
            self.host.register_for_lifetime_notifications(callback)
        })?;
        debug!(%app_id, "subscribed to lifetime notifications");
        Ok(subscription)
    }

    /// 購読を開始し、後で `resolve` する待ちを返す
    ///
    /// 期限はこの時点から数えます。
    pub fn watch(&self, app_id: AppId, options: WaitOptions) -> LifetimeWait {
        let deadline = options.timeout.map(|timeout| Instant::now() + timeout);
        let (tx, rx) = mpsc::unbounded_channel();

        let (subscription, events) = match self.subscribe(app_id, move |event| {
            let _ = tx.send(event);
        }) {
            Ok(subscription) => (subscription, Ok(rx)),
            Err(error) => {
                warn!(%app_id, %error, "could not subscribe to lifetime notifications");
                (Subscription::inert(), Err(error))
            }
        };

        LifetimeWait {
            app_id,
            options,
            deadline,
            events,
            subscription,
        }
    }

    /// `watch` + `resolve`
    pub async fn wait_for_lifetime_event(&self, app_id: AppId, options: WaitOptions) -> bool {
        self.watch(app_id, options).resolve().await
    }
}

/// 購読済みの待ち。drop するとキャンセル（購読解除）になる。
#[derive(Debug)]
pub struct LifetimeWait {
    app_id: AppId,
    options: WaitOptions,
    deadline: Option<Instant>,
    events: Result<mpsc::UnboundedReceiver<LifetimeEvent>, ShortcutError>,
    subscription: Subscription,
}

impl LifetimeWait {
    pub fn app_id(&self) -> AppId {
        self.app_id
    }

    /// 条件を満たせば `true`、期限切れやストリーム終了なら `false`
    pub async fn resolve(self) -> bool {
        self.outcome().await.is_ok()
    }

    /// `resolve` と同じ待ちを行い、失敗の理由を返す
    ///
    /// - 期限切れ: `ShortcutError::Timeout`
    /// - 購読できなかった: 購読時のエラー
    /// - ストリームが閉じた: `HostError::Unavailable`
    pub async fn outcome(self) -> Result<(), ShortcutError> {
        let LifetimeWait {
            app_id,
            options,
            mut deadline,
            events,
            subscription,
        } = self;
        let mut events = events?;
        let mut started = !options.wait_for_start;

        let outcome = loop {
            let next = match deadline {
                Some(at) => match timeout_at(at, events.recv()).await {
                    Ok(next) => next,
                    Err(_) => {
                        debug!(%app_id, ?options, "timed out waiting for lifetime event");
                        break Err(ShortcutError::Timeout);
                    }
                },
                None => events.recv().await,
            };
            let Some(event) = next else {
                debug!(%app_id, "lifetime stream closed");
                break Err(HostError::Unavailable.into());
            };

            if !started {
                if !event.is_running {
                    continue;
                }
                started = true;
                deadline = None;
                if options.wait_until_stop {
                    continue;
                }
                break Ok(());
            }

            // 開始条件を満たした最初の通知で期限は外れる
            deadline = None;
            if options.wait_until_stop && event.is_running {
                continue;
            }
            break Ok(());
        };

        subscription.dispose();
        debug!(%app_id, resolved = outcome.is_ok(), "lifetime wait resolved");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use crate::impls::{HostCall, InMemoryHost};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TIMEOUT: Duration = Duration::from_millis(1500);

    fn notifier(host: &InMemoryHost) -> LifetimeNotifier {
        LifetimeNotifier::new(Arc::new(host.clone()))
    }

    fn emit_later(host: &InMemoryHost, delay: Duration, event: LifetimeEvent) {
        let host = host.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            host.emit_lifetime(event);
        });
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_on_start_event() {
        let host = InMemoryHost::new();
        let app_id = AppId::new(7);
        let notifier = notifier(&host);

        let wait = notifier.watch(app_id, WaitOptions::launch(TIMEOUT, false));
        host.emit_lifetime(LifetimeEvent::started(app_id));

        assert!(wait.resolve().await);
        assert_eq!(host.lifetime_listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_and_unsubscribes() {
        let host = InMemoryHost::new();
        let notifier = notifier(&host);
        let start = Instant::now();

        let ok = notifier
            .wait_for_lifetime_event(AppId::new(7), WaitOptions::launch(TIMEOUT, false))
            .await;

        assert!(!ok);
        let elapsed = start.elapsed();
        assert!(elapsed >= TIMEOUT);
        assert!(elapsed < TIMEOUT + Duration::from_millis(50));
        assert_eq!(host.lifetime_listener_count(), 0);
        assert_eq!(host.unregister_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ignores_other_apps_and_stops_before_start() {
        let host = InMemoryHost::new();
        let app_id = AppId::new(7);
        let notifier = notifier(&host);

        let wait = notifier.watch(app_id, WaitOptions::launch(TIMEOUT, false));
        host.emit_lifetime(LifetimeEvent::started(AppId::new(8)));
        host.emit_lifetime(LifetimeEvent::stopped(app_id));

        assert!(!wait.resolve().await);
    }

    #[tokio::test(start_paused = true)]
    async fn start_event_clears_the_deadline() {
        let host = InMemoryHost::new();
        let app_id = AppId::new(7);
        let notifier = notifier(&host);

        let wait = notifier.watch(app_id, WaitOptions::launch(TIMEOUT, true));
        emit_later(&host, Duration::from_millis(200), LifetimeEvent::started(app_id));
        emit_later(&host, Duration::from_secs(10), LifetimeEvent::stopped(app_id));
        let start = Instant::now();

        assert!(wait.resolve().await);
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn until_stop_skips_repeated_start_events() {
        let host = InMemoryHost::new();
        let app_id = AppId::new(7);
        let notifier = notifier(&host);
        let seen = Arc::new(AtomicUsize::new(0));
        let _observer = notifier
            .subscribe(app_id, {
                let seen = Arc::clone(&seen);
                move |_| {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            })
            .unwrap();

        let wait = notifier.watch(app_id, WaitOptions::launch(TIMEOUT, true));
        host.emit_lifetime(LifetimeEvent::started(app_id));
        host.emit_lifetime(LifetimeEvent::started(app_id));
        host.emit_lifetime(LifetimeEvent::stopped(app_id));

        assert!(wait.resolve().await);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn terminate_resolves_on_first_stop() {
        let host = InMemoryHost::new();
        let app_id = AppId::new(7);
        let notifier = notifier(&host);

        let wait = notifier.watch(app_id, WaitOptions::terminate(TIMEOUT));
        emit_later(&host, Duration::from_millis(100), LifetimeEvent::stopped(app_id));
        let start = Instant::now();

        assert!(wait.resolve().await);
        assert!(start.elapsed() < TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_wait_cancels_it() {
        let host = InMemoryHost::new();
        let notifier = notifier(&host);

        let wait = notifier.watch(AppId::new(7), WaitOptions::terminate(TIMEOUT));
        assert_eq!(host.lifetime_listener_count(), 1);
        drop(wait);

        assert_eq!(host.lifetime_listener_count(), 0);
        assert_eq!(host.unregister_calls(), 1);
    }

    #[test]
    fn disposed_subscription_receives_nothing() {
        let host = InMemoryHost::new();
        let app_id = AppId::new(7);
        let notifier = notifier(&host);
        let seen = Arc::new(AtomicUsize::new(0));

        let subscription = notifier
            .subscribe(app_id, {
                let seen = Arc::clone(&seen);
                move |_| {
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            })
            .unwrap();
        host.emit_lifetime(LifetimeEvent::started(app_id));
        subscription.dispose();
        subscription.dispose();
        host.emit_lifetime(LifetimeEvent::stopped(app_id));

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(host.unregister_calls(), 1);
    }

    #[tokio::test]
    async fn failed_registration_resolves_false() {
        let host = InMemoryHost::new();
        host.fail_call(HostCall::RegisterLifetime);
        let notifier = notifier(&host);

        assert!(
            !notifier
                .wait_for_lifetime_event(AppId::new(7), WaitOptions::terminate(TIMEOUT))
                .await
        );
        assert!(notifier.subscribe(AppId::new(7), |_| {}).is_err());

        let error = notifier
            .watch(AppId::new(7), WaitOptions::terminate(TIMEOUT))
            .outcome()
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::HostCallFailed);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_wait_reports_timeout() {
        let host = InMemoryHost::new();
        let notifier = notifier(&host);

        let error = notifier
            .watch(AppId::new(7), WaitOptions::launch(TIMEOUT, false))
            .outcome()
            .await
            .unwrap_err();

        assert!(matches!(error, ShortcutError::Timeout));
        assert_eq!(error.kind(), ErrorKind::Timeout);
        assert_eq!(host.lifetime_listener_count(), 0);
    }
}
