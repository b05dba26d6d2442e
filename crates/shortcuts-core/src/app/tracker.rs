//! RunningTracker - AppId ごとの最後に観測した状態
//!
//! UI の `is_running` は同期的に答える必要があるため、ライフタイム通知を
//! 購読して状態を手元に保持します。ホストの起動中リストで補正もできます。
//!
//! # 学習ポイント
//! - 状態遷移は `ShortcutState::apply` に任せ、不正な遷移はログに残して無視する
//! - コールバックからは `Weak` で参照し、トラッカーが消えたら何もしない
//! - `Subscription` の drop（ホスト呼び出し）はロックの外で行う

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::lifetime::LifetimeNotifier;
use super::registry::RegistryAdapter;
use super::subscription::Subscription;
use crate::domain::{AppId, InvalidTransition, LifecycleOp, ShortcutState};
use crate::ports::Clock;

/// 状態のスナップショット（表示・出力用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningStatus {
    pub app_id: AppId,
    pub state: ShortcutState,
    pub is_running: bool,
    pub changed_at: DateTime<Utc>,
}

struct TrackedApp {
    state: ShortcutState,
    changed_at: DateTime<Utc>,
    subscription: Option<Subscription>,
}

type Entries = Mutex<HashMap<AppId, TrackedApp>>;

pub struct RunningTracker {
    clock: Arc<dyn Clock>,
    entries: Arc<Entries>,
}

impl RunningTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<AppId, TrackedApp>> {
        lock(&self.entries)
    }

    /// 登録済みとして追跡を始める。既に追跡中なら何もしない。
    pub fn track(&self, app_id: AppId) {
        let now = self.clock.now();
        self.entries().entry(app_id).or_insert_with(|| TrackedApp {
            state: ShortcutState::Registered,
            changed_at: now,
            subscription: None,
        });
    }

    /// 操作を適用する。未追跡のアプリは `Unregistered` から始まる。
    pub fn record(
        &self,
        app_id: AppId,
        op: LifecycleOp,
    ) -> Result<ShortcutState, InvalidTransition> {
        let (result, released) = apply(&self.entries, self.clock.now(), app_id, op);
        drop(released);
        result
    }

    /// `record` と同じだが結果を返さない。不正な遷移は `apply` がログに残す。
    pub fn note(&self, app_id: AppId, op: LifecycleOp) {
        let (_, released) = apply(&self.entries, self.clock.now(), app_id, op);
        drop(released);
    }

    pub fn state(&self, app_id: AppId) -> Option<ShortcutState> {
        self.entries().get(&app_id).map(|tracked| tracked.state)
    }

    /// 最後に観測した状態が Running か
    pub fn is_running(&self, app_id: AppId) -> bool {
        self.state(app_id).is_some_and(ShortcutState::is_running)
    }

    pub fn status(&self, app_id: AppId) -> Option<RunningStatus> {
        self.entries()
            .get(&app_id)
            .map(|tracked| snapshot(app_id, tracked))
    }

    pub fn statuses(&self) -> Vec<RunningStatus> {
        let mut statuses: Vec<RunningStatus> = self
            .entries()
            .iter()
            .map(|(app_id, tracked)| snapshot(*app_id, tracked))
            .collect();
        statuses.sort_by_key(|status| status.app_id);
        statuses
    }

    /// ライフタイム通知を購読して状態を追従させる
    ///
    /// 同じアプリへの二重購読はしません。購読に失敗したら `false`。
    pub fn follow(&self, app_id: AppId, notifier: &LifetimeNotifier) -> bool {
        self.track(app_id);
        if self
            .entries()
            .get(&app_id)
            .is_some_and(|tracked| tracked.subscription.is_some())
        {
            return true;
        }

        let entries: Weak<Entries> = Arc::downgrade(&self.entries);
        let clock = Arc::clone(&self.clock);
        let subscription = notifier.subscribe(app_id, move |event| {
            let Some(entries) = entries.upgrade() else {
                return;
            };
            let op = if event.is_running {
                LifecycleOp::ObservedStart
            } else {
                LifecycleOp::ObservedStop
            };
            let (_, released) = apply(&entries, clock.now(), event.app_id, op);
            drop(released);
        });
        let subscription = match subscription {
            Ok(subscription) => subscription,
            Err(error) => {
                warn!(%app_id, %error, "could not follow shortcut lifetime");
                return false;
            }
        };

        let duplicate = {
            let mut entries = self.entries();
            match entries.get_mut(&app_id) {
                Some(tracked) if tracked.subscription.is_none() => {
                    tracked.subscription = Some(subscription);
                    None
                }
                _ => Some(subscription),
            }
        };
        drop(duplicate);
        debug!(%app_id, "following shortcut lifetime");
        true
    }

    /// 追跡をやめ、購読を解除する
    pub fn forget(&self, app_id: AppId) {
        let removed = self.entries().remove(&app_id);
        drop(removed);
    }

    /// ホストの起動中リストで状態を補正する。リストが取れなければ `false`。
    pub async fn refresh_running(&self, registry: &RegistryAdapter) -> bool {
        let Some(running) = registry.running_app_ids().await else {
            return false;
        };
        let now = self.clock.now();
        let mut entries = self.entries();

        for app_id in &running {
            entries.entry(*app_id).or_insert_with(|| TrackedApp {
                state: ShortcutState::Registered,
                changed_at: now,
                subscription: None,
            });
        }
        for (app_id, tracked) in entries.iter_mut() {
            let op = if running.contains(app_id) {
                LifecycleOp::ObservedStart
            } else {
                LifecycleOp::ObservedStop
            };
            if let Ok(next) = tracked.state.apply(op)
                && next != tracked.state
            {
                tracked.state = next;
                tracked.changed_at = now;
            }
        }
        debug!(running = running.len(), tracked = entries.len(), "refreshed running state");
        true
    }
}

fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<AppId, TrackedApp>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

fn snapshot(app_id: AppId, tracked: &TrackedApp) -> RunningStatus {
    RunningStatus {
        app_id,
        state: tracked.state,
        is_running: tracked.state.is_running(),
        changed_at: tracked.changed_at,
    }
}

/// 遷移を適用する。Removed になったら購読を返す（呼び出し側がロック外で drop する）。
fn apply(
    entries: &Entries,
    now: DateTime<Utc>,
    app_id: AppId,
    op: LifecycleOp,
) -> (Result<ShortcutState, InvalidTransition>, Option<Subscription>) {
    let mut entries = lock(entries);
    let tracked = entries.entry(app_id).or_insert_with(|| TrackedApp {
        state: ShortcutState::Unregistered,
        changed_at: now,
        subscription: None,
    });

    match tracked.state.apply(op) {
        Ok(next) => {
            if next != tracked.state {
                tracked.state = next;
                tracked.changed_at = now;
            }
            let released = if next == ShortcutState::Removed {
                tracked.subscription.take()
            } else {
                None
            };
            (Ok(next), released)
        }
        Err(error) => {
            warn!(%app_id, %error, "ignoring invalid lifecycle transition");
            (Err(error), None)
        }
    }
}
