//! Session - ログイン状態の監視とサービス初期化待ち

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use super::retry::{RetryPolicy, wait_for_predicate};
use super::subscription::Subscription;
use crate::ports::{HostSession, LoginCallback};

#[derive(Debug, Default)]
struct AuthState {
    /// 最初の通知までは不明
    logged_in: Option<bool>,
    login_fired: bool,
    logout_fired: bool,
}

/// ログイン/ログアウトの遷移でコールバックを呼ぶ
///
/// - 空のユーザー名はログアウト
/// - 同じ状態が続けて届いても呼ぶのは最初の一回（遷移時）だけ
/// - `once` なら、それぞれのコールバックはこの watcher の生涯で最大一回
/// - 登録に失敗したら何もしない（inert な）watcher になる
#[derive(Debug)]
pub struct AuthWatcher {
    subscription: Subscription,
}

impl AuthWatcher {
    pub fn register<L, O>(host: &dyn HostSession, on_login: L, on_logout: O, once: bool) -> Self
    where
        L: Fn(&str) + Send + Sync + 'static,
        O: Fn() + Send + Sync + 'static,
    {
        let state = Arc::new(Mutex::new(AuthState::default()));

        let subscription = Subscription::open(|gate| {
            let callback: LoginCallback = Arc::new(move |username: &str| {
                if !gate.is_open() {
                    return;
                }
                let logging_in = !username.is_empty();
                let fire = {
                    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                    let transition = state.logged_in != Some(logging_in);
                    state.logged_in = Some(logging_in);
                    let fired = if logging_in {
                        &mut state.login_fired
                    } else {
                        &mut state.logout_fired
                    };
                    let fire = transition && !(once && *fired);
                    if fire {
                        *fired = true;
                    }
                    fire
                };
                if !fire {
                    return;
                }
                if logging_in {
                    info!(username, "user logged in");
                    on_login(username);
                } else {
                    info!("user logged out");
                    on_logout();
                }
            });
            host.register_for_login_state_change(callback)
        });

        match subscription {
            Ok(subscription) => Self { subscription },
            Err(error) => {
                warn!(%error, "could not register for login state changes");
                Self {
                    subscription: Subscription::inert(),
                }
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    pub fn unregister(&self) {
        self.subscription.dispose();
    }
}

/// ホストのサービスが初期化されるまでポーリングする
pub async fn wait_for_services_initialized(host: &dyn HostSession, policy: &RetryPolicy) -> bool {
    let initialized = wait_for_predicate(policy, move || async move {
        match host.services_initialized().await {
            Ok(initialized) => initialized,
            Err(error) => {
                debug!(%error, "services initialized check failed");
                false
            }
        }
    })
    .await;
    if initialized {
        info!("host services initialized");
    } else {
        warn!(attempts = policy.attempts, "host services did not initialize");
    }
    initialized
}
