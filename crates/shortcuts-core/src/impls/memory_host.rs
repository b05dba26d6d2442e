//! InMemoryHost - 開発用・テスト用のホスト
//!
//! すべてのホスト port（HostApps / HostLifetime / HostCollections / HostSession）を
//! 一つの構造体で実装します。
//!
//! # 学習ポイント
//! - std Mutex + Weak によるコールバック登録と解除
//! - コールバックはロックを外してから呼ぶ（再入でデッドロックしない）
//! - 故障注入（書き込みの無視、詳細の保留、呼び出し失敗）で eventual consistency を再現
//!
//! # ホストらしさの再現
//! - exe / start dir は `"path"` のように引用符付きで保存する（`set_quote_paths` で切替）
//! - remove はコレクションの所属を消さない（掃除は呼び出し側の責務）
//! - run/terminate は `ProcessSimulation` の遅延後にライフタイム通知を流す

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    AppId, AppOverview, AppRecord, GameId, HostError, LifetimeEvent, RawAppDetails,
    UserCollection,
};
use crate::ports::{
    DetailsCallback, HostApps, HostCollections, HostLifetime, HostRegistration, HostSession,
    LifetimeCallback, LoginCallback,
};

/// 呼び出し回数の計測と故障注入に使うホスト API の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostCall {
    ManagedAppIds,
    RegisterDetails,
    AppOverview,
    AddShortcut,
    RemoveShortcut,
    SetShortcutExe,
    SetShortcutStartDir,
    SetAppLaunchOptions,
    RunGame,
    TerminateApp,
    RunningAppIds,
    RegisterLifetime,
    UserCollections,
    RemoveFromCollection,
    IsHidden,
    SetAppsHidden,
    RegisterLoginState,
    ServicesInitialized,
}

impl HostCall {
    fn name(self) -> &'static str {
        match self {
            HostCall::ManagedAppIds => "managed_app_ids",
            HostCall::RegisterDetails => "register_for_app_details",
            HostCall::AppOverview => "app_overview",
            HostCall::AddShortcut => "add_shortcut",
            HostCall::RemoveShortcut => "remove_shortcut",
            HostCall::SetShortcutExe => "set_shortcut_exe",
            HostCall::SetShortcutStartDir => "set_shortcut_start_dir",
            HostCall::SetAppLaunchOptions => "set_app_launch_options",
            HostCall::RunGame => "run_game",
            HostCall::TerminateApp => "terminate_app",
            HostCall::RunningAppIds => "running_app_ids",
            HostCall::RegisterLifetime => "register_for_lifetime_notifications",
            HostCall::UserCollections => "user_collections",
            HostCall::RemoveFromCollection => "remove_apps_from_collection",
            HostCall::IsHidden => "is_hidden",
            HostCall::SetAppsHidden => "set_apps_hidden",
            HostCall::RegisterLoginState => "register_for_login_state_change",
            HostCall::ServicesInitialized => "services_initialized",
        }
    }
}

/// run/terminate 後にライフタイム通知を流すまでの遅延
///
/// `None` の場合は通知しません（テストで手動 emit するとき用）。
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessSimulation {
    pub start_delay: Option<Duration>,
    pub stop_delay: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenerKind {
    Details,
    Lifetime,
    Login,
}

struct HostApp {
    record: AppRecord,
    hidden: bool,
}

/// ショートカットの game id はホストの慣習どおり `(app_id << 32) | 0x02000000`
fn game_id_for(app_id: AppId) -> GameId {
    GameId::new(((u64::from(app_id.get()) << 32) | 0x0200_0000).to_string())
}

struct HostState {
    apps: Vec<HostApp>,
    collections: Vec<UserCollection>,
    running: HashSet<AppId>,

    details_listeners: BTreeMap<u64, (AppId, DetailsCallback)>,
    lifetime_listeners: BTreeMap<u64, LifetimeCallback>,
    login_listeners: BTreeMap<u64, LoginCallback>,
    next_listener_id: u64,
    unregister_calls: usize,

    calls: HashMap<HostCall, usize>,
    failing: HashSet<HostCall>,
    dropped_writes: HashSet<AppId>,
    held_details: HashSet<AppId>,
    kept_on_remove: HashSet<AppId>,
    next_add_name: Option<String>,
    hide_lag: u32,
    pending_hidden: HashMap<AppId, (u32, bool)>,
    services_lag: u32,

    quote_paths: bool,
    simulation: ProcessSimulation,
}

impl HostState {
    fn new(simulation: ProcessSimulation) -> Self {
        Self {
            apps: Vec::new(),
            collections: Vec::new(),
            running: HashSet::new(),
            details_listeners: BTreeMap::new(),
            lifetime_listeners: BTreeMap::new(),
            login_listeners: BTreeMap::new(),
            next_listener_id: 1,
            unregister_calls: 0,
            calls: HashMap::new(),
            failing: HashSet::new(),
            dropped_writes: HashSet::new(),
            held_details: HashSet::new(),
            kept_on_remove: HashSet::new(),
            next_add_name: None,
            hide_lag: 0,
            pending_hidden: HashMap::new(),
            services_lag: 0,
            quote_paths: true,
            simulation,
        }
    }

    fn record_call(&mut self, call: HostCall) -> Result<(), HostError> {
        *self.calls.entry(call).or_default() += 1;
        if self.failing.contains(&call) {
            return Err(HostError::call_failed(call.name(), "injected failure"));
        }
        Ok(())
    }

    fn app(&self, app_id: AppId) -> Option<&HostApp> {
        self.apps.iter().find(|app| app.record.app_id == app_id)
    }

    fn app_mut(&mut self, app_id: AppId) -> Option<&mut HostApp> {
        self.apps.iter_mut().find(|app| app.record.app_id == app_id)
    }

    fn app_by_game_id(&self, game_id: &GameId) -> Option<AppId> {
        self.apps
            .iter()
            .map(|app| app.record.app_id)
            .find(|app_id| game_id_for(*app_id) == *game_id)
    }

    /// ショートカットの app id は最上位ビットが立った乱数
    fn allocate_app_id(&self) -> AppId {
        loop {
            let app_id = AppId::new(rand::random::<u32>() | 0x8000_0000);
            if self.app(app_id).is_none() {
                return app_id;
            }
        }
    }

    fn quote(&self, value: &str) -> String {
        quote(value, self.quote_paths)
    }

    fn allocate_listener_id(&mut self) -> u64 {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        id
    }

    fn details_of(&self, app_id: AppId) -> RawAppDetails {
        self.app(app_id)
            .map(|app| RawAppDetails::from(app.record.clone()))
            .unwrap_or_default()
    }

    /// 書き込み系の共通処理。無視設定のアプリや未知のアプリには何もしない。
    fn write(
        &mut self,
        call: HostCall,
        app_id: AppId,
        apply: impl FnOnce(&mut AppRecord, bool),
    ) -> Result<(), HostError> {
        self.record_call(call)?;
        if self.dropped_writes.contains(&app_id) {
            return Ok(());
        }
        let quote_paths = self.quote_paths;
        if let Some(app) = self.app_mut(app_id) {
            apply(&mut app.record, quote_paths);
        }
        Ok(())
    }
}

struct MemoryRegistration {
    state: Weak<Mutex<HostState>>,
    kind: ListenerKind,
    id: u64,
}

impl HostRegistration for MemoryRegistration {
    fn unregister(&self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        state.unregister_calls += 1;
        match self.kind {
            ListenerKind::Details => {
                state.details_listeners.remove(&self.id);
            }
            ListenerKind::Lifetime => {
                state.lifetime_listeners.remove(&self.id);
            }
            ListenerKind::Login => {
                state.login_listeners.remove(&self.id);
            }
        }
    }
}

/// InMemoryHost は開発用のホスト
///
/// `Clone` は同じ状態を共有します。
///
/// # 使用例
/// ```ignore
/// let host = Arc::new(InMemoryHost::new());
/// let app_id = host.insert_shortcut("Konsole", "/usr/bin/konsole");
/// host.emit_lifetime(LifetimeEvent::started(app_id));
/// ```
#[derive(Clone)]
pub struct InMemoryHost {
    state: Arc<Mutex<HostState>>,
}

impl InMemoryHost {
    /// 新しい InMemoryHost を作成（ライフタイム通知は手動）
    pub fn new() -> Self {
        Self::with_process_simulation(ProcessSimulation::default())
    }

    pub fn with_process_simulation(simulation: ProcessSimulation) -> Self {
        Self {
            state: Arc::new(Mutex::new(HostState::new(simulation))),
        }
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn registration(&self, kind: ListenerKind, id: u64) -> Box<dyn HostRegistration> {
        Box::new(MemoryRegistration {
            state: Arc::downgrade(&self.state),
            kind,
            id,
        })
    }

    fn emit_after(&self, delay: Duration, event: LifetimeEvent) {
        let host = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            host.emit_lifetime(event);
        });
    }

    // ── seeding / inspection ──────────────────────────────────────────────

    /// 呼び出し回数に数えずにショートカットを直接登録する
    pub fn insert_shortcut(&self, name: &str, exe: &str) -> AppId {
        let mut state = self.state();
        let app_id = state.allocate_app_id();
        let record = AppRecord {
            app_id,
            display_name: name.to_string(),
            shortcut_exe: state.quote(exe),
            shortcut_start_dir: state.quote(&parent_dir(exe)),
            launch_options: String::new(),
        };
        state.apps.push(HostApp {
            record,
            hidden: false,
        });
        app_id
    }

    pub fn app(&self, app_id: AppId) -> Option<AppRecord> {
        self.state().app(app_id).map(|app| app.record.clone())
    }

    pub fn apps_named(&self, name: &str) -> Vec<AppRecord> {
        self.state()
            .apps
            .iter()
            .filter(|app| app.record.display_name == name)
            .map(|app| app.record.clone())
            .collect()
    }

    pub fn add_collection(&self, id: &str, name: &str, allows_drag_and_drop: bool, apps: &[AppId]) {
        self.state().collections.push(UserCollection {
            id: id.to_string(),
            name: name.to_string(),
            allows_drag_and_drop,
            apps: apps.to_vec(),
        });
    }

    pub fn collection(&self, id: &str) -> Option<UserCollection> {
        self.state()
            .collections
            .iter()
            .find(|collection| collection.id == id)
            .cloned()
    }

    pub fn is_running(&self, app_id: AppId) -> bool {
        self.state().running.contains(&app_id)
    }

    pub fn call_count(&self, call: HostCall) -> usize {
        self.state().calls.get(&call).copied().unwrap_or(0)
    }

    pub fn lifetime_listener_count(&self) -> usize {
        self.state().lifetime_listeners.len()
    }

    pub fn details_listener_count(&self) -> usize {
        self.state().details_listeners.len()
    }

    pub fn unregister_calls(&self) -> usize {
        self.state().unregister_calls
    }

    // ── fault injection ───────────────────────────────────────────────────

    pub fn fail_call(&self, call: HostCall) {
        self.state().failing.insert(call);
    }

    pub fn restore_call(&self, call: HostCall) {
        self.state().failing.remove(&call);
    }

    /// このアプリへの書き込みを黙って無視する
    pub fn drop_writes_for(&self, app_id: AppId) {
        self.state().dropped_writes.insert(app_id);
    }

    /// このアプリの詳細通知を保留する（`release_details_for` まで届かない）
    pub fn hold_details_for(&self, app_id: AppId) {
        self.state().held_details.insert(app_id);
    }

    /// 保留していた詳細を、待っているリスナーへ届ける
    pub fn release_details_for(&self, app_id: AppId) {
        let (details, callbacks) = {
            let mut state = self.state();
            state.held_details.remove(&app_id);
            let callbacks: Vec<DetailsCallback> = state
                .details_listeners
                .values()
                .filter(|(id, _)| *id == app_id)
                .map(|(_, callback)| Arc::clone(callback))
                .collect();
            (state.details_of(app_id), callbacks)
        };
        for callback in callbacks {
            callback(details.clone());
        }
    }

    /// remove の要求を受け付けても実際には消さない
    pub fn keep_on_remove(&self, app_id: AppId) {
        self.state().kept_on_remove.insert(app_id);
    }

    /// 次の add で、要求と異なる表示名を付ける
    pub fn rename_next_add(&self, display_name: &str) {
        self.state().next_add_name = Some(display_name.to_string());
    }

    pub fn set_quote_paths(&self, quote_paths: bool) {
        self.state().quote_paths = quote_paths;
    }

    /// hide が `is_hidden` に反映されるまでのポーリング回数
    pub fn set_hide_lag(&self, polls: u32) {
        self.state().hide_lag = polls;
    }

    /// `services_initialized` が true を返すまでのポーリング回数
    pub fn set_services_lag(&self, polls: u32) {
        self.state().services_lag = polls;
    }

    // ── events ────────────────────────────────────────────────────────────

    /// 登録済みのすべてのリスナーへライフタイム通知を流す
    pub fn emit_lifetime(&self, event: LifetimeEvent) {
        let callbacks: Vec<LifetimeCallback> = {
            let mut state = self.state();
            if event.is_running {
                state.running.insert(event.app_id);
            } else {
                state.running.remove(&event.app_id);
            }
            state.lifetime_listeners.values().cloned().collect()
        };
        for callback in callbacks {
            callback(event);
        }
    }

    /// ログイン状態の変化を通知する（空文字はログアウト）
    pub fn set_login_user(&self, username: &str) {
        let callbacks: Vec<LoginCallback> =
            self.state().login_listeners.values().cloned().collect();
        for callback in callbacks {
            callback(username);
        }
    }
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

fn quote(value: &str, quote_paths: bool) -> String {
    if quote_paths && !value.is_empty() {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

fn parent_dir(exe: &str) -> String {
    Path::new(exe)
        .parent()
        .map(|dir| dir.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl HostApps for InMemoryHost {
    async fn managed_app_ids(&self) -> Result<Vec<AppId>, HostError> {
        let mut state = self.state();
        state.record_call(HostCall::ManagedAppIds)?;
        Ok(state.apps.iter().map(|app| app.record.app_id).collect())
    }

    fn register_for_app_details(
        &self,
        app_id: AppId,
        callback: DetailsCallback,
    ) -> Result<Box<dyn HostRegistration>, HostError> {
        let (id, details) = {
            let mut state = self.state();
            state.record_call(HostCall::RegisterDetails)?;
            let id = state.allocate_listener_id();
            state
                .details_listeners
                .insert(id, (app_id, Arc::clone(&callback)));
            let details = if state.held_details.contains(&app_id) {
                None
            } else {
                Some(state.details_of(app_id))
            };
            (id, details)
        };
        if let Some(details) = details {
            callback(details);
        }
        Ok(self.registration(ListenerKind::Details, id))
    }

    async fn app_overview(&self, app_id: AppId) -> Result<Option<AppOverview>, HostError> {
        let mut state = self.state();
        state.record_call(HostCall::AppOverview)?;
        Ok(state.app(app_id).map(|app| AppOverview {
            app_id,
            display_name: app.record.display_name.clone(),
            game_id: game_id_for(app_id),
        }))
    }

    async fn add_shortcut(&self, name: &str, exe: &str) -> Result<Option<AppId>, HostError> {
        let mut state = self.state();
        state.record_call(HostCall::AddShortcut)?;
        let app_id = state.allocate_app_id();
        let display_name = state.next_add_name.take().unwrap_or_else(|| name.to_string());
        let record = AppRecord {
            app_id,
            display_name,
            shortcut_exe: state.quote(exe),
            shortcut_start_dir: state.quote(&parent_dir(exe)),
            launch_options: String::new(),
        };
        state.apps.push(HostApp {
            record,
            hidden: false,
        });
        Ok(Some(app_id))
    }

    async fn remove_shortcut(&self, app_id: AppId) -> Result<(), HostError> {
        let mut state = self.state();
        state.record_call(HostCall::RemoveShortcut)?;
        if state.kept_on_remove.contains(&app_id) {
            return Ok(());
        }
        state.apps.retain(|app| app.record.app_id != app_id);
        state.running.remove(&app_id);
        Ok(())
    }

    async fn set_shortcut_exe(&self, app_id: AppId, exe: &str) -> Result<(), HostError> {
        self.state()
            .write(HostCall::SetShortcutExe, app_id, |record, quote_paths| {
                record.shortcut_exe = quote(exe, quote_paths);
            })
    }

    async fn set_shortcut_start_dir(
        &self,
        app_id: AppId,
        start_dir: &str,
    ) -> Result<(), HostError> {
        self.state()
            .write(HostCall::SetShortcutStartDir, app_id, |record, quote_paths| {
                record.shortcut_start_dir = quote(start_dir, quote_paths);
            })
    }

    async fn set_app_launch_options(
        &self,
        app_id: AppId,
        options: &str,
    ) -> Result<(), HostError> {
        self.state()
            .write(HostCall::SetAppLaunchOptions, app_id, |record, _| {
                record.launch_options = options.to_string();
            })
    }

    async fn run_game(&self, game_id: &GameId) -> Result<(), HostError> {
        let (app_id, delay) = {
            let mut state = self.state();
            state.record_call(HostCall::RunGame)?;
            let app_id = state.app_by_game_id(game_id).ok_or_else(|| {
                HostError::call_failed("run_game", format!("unknown game id {game_id}"))
            })?;
            (app_id, state.simulation.start_delay)
        };
        if let Some(delay) = delay {
            self.emit_after(delay, LifetimeEvent::started(app_id));
        }
        Ok(())
    }

    async fn terminate_app(&self, game_id: &GameId) -> Result<(), HostError> {
        let (app_id, delay, running) = {
            let mut state = self.state();
            state.record_call(HostCall::TerminateApp)?;
            let app_id = state.app_by_game_id(game_id).ok_or_else(|| {
                HostError::call_failed("terminate_app", format!("unknown game id {game_id}"))
            })?;
            (app_id, state.simulation.stop_delay, state.running.contains(&app_id))
        };
        if running && let Some(delay) = delay {
            self.emit_after(delay, LifetimeEvent::stopped(app_id));
        }
        Ok(())
    }

    async fn running_app_ids(&self) -> Result<Vec<AppId>, HostError> {
        let mut state = self.state();
        state.record_call(HostCall::RunningAppIds)?;
        let mut running: Vec<AppId> = state.running.iter().copied().collect();
        running.sort();
        Ok(running)
    }
}

impl HostLifetime for InMemoryHost {
    fn register_for_lifetime_notifications(
        &self,
        callback: LifetimeCallback,
    ) -> Result<Box<dyn HostRegistration>, HostError> {
        let mut state = self.state();
        state.record_call(HostCall::RegisterLifetime)?;
        let id = state.allocate_listener_id();
        state.lifetime_listeners.insert(id, callback);
        drop(state);
        Ok(self.registration(ListenerKind::Lifetime, id))
    }
}

#[async_trait]
impl HostCollections for InMemoryHost {
    async fn user_collections(&self) -> Result<Vec<UserCollection>, HostError> {
        let mut state = self.state();
        state.record_call(HostCall::UserCollections)?;
        Ok(state.collections.clone())
    }

    async fn remove_apps_from_collection(
        &self,
        collection_id: &str,
        apps: &[AppId],
    ) -> Result<(), HostError> {
        let mut state = self.state();
        state.record_call(HostCall::RemoveFromCollection)?;
        let collection = state
            .collections
            .iter_mut()
            .find(|collection| collection.id == collection_id)
            .ok_or_else(|| {
                HostError::call_failed(
                    "remove_apps_from_collection",
                    format!("unknown collection {collection_id}"),
                )
            })?;
        if !collection.allows_drag_and_drop {
            return Err(HostError::call_failed(
                "remove_apps_from_collection",
                format!("collection {collection_id} does not allow drag and drop"),
            ));
        }
        collection.apps.retain(|app_id| !apps.contains(app_id));
        Ok(())
    }

    async fn is_hidden(&self, app_id: AppId) -> Result<bool, HostError> {
        let mut state = self.state();
        state.record_call(HostCall::IsHidden)?;
        let settled = match state.pending_hidden.get_mut(&app_id) {
            Some((remaining, hidden)) if *remaining <= 1 => Some(*hidden),
            Some((remaining, _)) => {
                *remaining -= 1;
                None
            }
            None => None,
        };
        if let Some(hidden) = settled {
            state.pending_hidden.remove(&app_id);
            if let Some(app) = state.app_mut(app_id) {
                app.hidden = hidden;
            }
        }
        Ok(state.app(app_id).is_some_and(|app| app.hidden))
    }

    async fn set_apps_hidden(&self, apps: &[AppId], hidden: bool) -> Result<(), HostError> {
        let mut state = self.state();
        state.record_call(HostCall::SetAppsHidden)?;
        let lag = state.hide_lag;
        for app_id in apps {
            if lag > 0 {
                state.pending_hidden.insert(*app_id, (lag, hidden));
            } else if let Some(app) = state.app_mut(*app_id) {
                app.hidden = hidden;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl HostSession for InMemoryHost {
    fn register_for_login_state_change(
        &self,
        callback: LoginCallback,
    ) -> Result<Box<dyn HostRegistration>, HostError> {
        let mut state = self.state();
        state.record_call(HostCall::RegisterLoginState)?;
        let id = state.allocate_listener_id();
        state.login_listeners.insert(id, callback);
        drop(state);
        Ok(self.registration(ListenerKind::Login, id))
    }

    async fn services_initialized(&self) -> Result<bool, HostError> {
        let mut state = self.state();
        state.record_call(HostCall::ServicesInitialized)?;
        if state.services_lag > 0 {
            state.services_lag -= 1;
            return Ok(false);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn add_shortcut_quotes_paths_and_derives_game_id() {
        let host = InMemoryHost::new();
        let app_id = host
            .add_shortcut("Konsole", "/usr/bin/konsole")
            .await
            .unwrap()
            .unwrap();

        let record = host.app(app_id).unwrap();
        assert_eq!(record.display_name, "Konsole");
        assert_eq!(record.shortcut_exe, "\"/usr/bin/konsole\"");
        assert_eq!(record.shortcut_start_dir, "\"/usr/bin\"");
        assert!(app_id.get() & 0x8000_0000 != 0);

        let overview = host.app_overview(app_id).await.unwrap().unwrap();
        assert_eq!(
            overview.game_id.as_str(),
            ((u64::from(app_id.get()) << 32) | 0x0200_0000).to_string()
        );
    }

    #[tokio::test]
    async fn remove_leaves_collections_untouched() {
        let host = InMemoryHost::new();
        let app_id = host.insert_shortcut("Htop", "/usr/bin/htop");
        host.add_collection("favorites", "Favorites", true, &[app_id]);

        host.remove_shortcut(app_id).await.unwrap();

        assert!(host.app(app_id).is_none());
        assert!(host.collection("favorites").unwrap().contains(app_id));
    }

    #[tokio::test]
    async fn dropped_writes_are_counted_but_not_applied() {
        let host = InMemoryHost::new();
        let app_id = host.insert_shortcut("Htop", "/usr/bin/htop");
        host.drop_writes_for(app_id);

        host.set_shortcut_exe(app_id, "/usr/bin/btop").await.unwrap();

        assert_eq!(host.call_count(HostCall::SetShortcutExe), 1);
        assert_eq!(host.app(app_id).unwrap().shortcut_exe, "\"/usr/bin/htop\"");
    }

    #[test]
    fn unregister_removes_lifetime_listener() {
        let host = InMemoryHost::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let registration = host
            .register_for_lifetime_notifications(Arc::new({
                let hits = Arc::clone(&hits);
                move |_| {
                    hits.fetch_add(1, Ordering::SeqCst);
                }
            }))
            .unwrap();

        host.emit_lifetime(LifetimeEvent::started(AppId::new(1)));
        registration.unregister();
        host.emit_lifetime(LifetimeEvent::stopped(AppId::new(1)));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(host.lifetime_listener_count(), 0);
        assert_eq!(host.unregister_calls(), 1);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_host_errors() {
        let host = InMemoryHost::new();
        host.fail_call(HostCall::ManagedAppIds);

        let err = host.managed_app_ids().await.unwrap_err();
        assert!(err.to_string().contains("managed_app_ids"));

        host.restore_call(HostCall::ManagedAppIds);
        assert!(host.managed_app_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn hide_lag_delays_visibility() {
        let host = InMemoryHost::new();
        let app_id = host.insert_shortcut("Htop", "/usr/bin/htop");
        host.set_hide_lag(2);

        host.set_apps_hidden(&[app_id], true).await.unwrap();

        assert!(!host.is_hidden(app_id).await.unwrap());
        assert!(host.is_hidden(app_id).await.unwrap());
    }
}
