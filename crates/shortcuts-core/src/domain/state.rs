//! State - ショートカットのライフサイクル状態
//!
//! # 状態遷移
//! ```text
//! Unregistered --create--> Registered --observed_start--> Running <--> Idle
//!        \                      \                            \          /
//!         `------------------- remove ----------------------> Removed
//! ```
//! - configure は登録済みなら何度でも可能（状態は変わらない）
//! - Running/Idle はホストからの起動/終了通知（observed_*）だけで動く。
//!   run/terminate の要求そのものは状態を変えない
//! - Removed は終端。再作成は新しい AppId になる

use serde::{Deserialize, Serialize};

use super::errors::InvalidTransition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutState {
    Unregistered,
    Registered,
    Running,
    Idle,
    Removed,
}

/// 状態を動かす操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleOp {
    Create,
    Configure,
    Remove,
    ObservedStart,
    ObservedStop,
}

impl ShortcutState {
    /// `op` を適用した次の状態
    pub fn apply(self, op: LifecycleOp) -> Result<ShortcutState, InvalidTransition> {
        use LifecycleOp as Op;
        use ShortcutState as S;

        let next = match (self, op) {
            (_, Op::Remove) => S::Removed,
            (S::Unregistered, Op::Create) => S::Registered,
            (S::Registered | S::Idle | S::Running, Op::Configure) => self,
            (S::Registered | S::Idle | S::Running, Op::ObservedStart) => S::Running,
            (S::Registered | S::Idle | S::Running, Op::ObservedStop) => S::Idle,
            (from, op) => return Err(InvalidTransition { from, op }),
        };
        Ok(next)
    }

    pub fn is_registered(self) -> bool {
        matches!(
            self,
            ShortcutState::Registered | ShortcutState::Running | ShortcutState::Idle
        )
    }

    pub fn is_running(self) -> bool {
        self == ShortcutState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn full_cycle() {
        let state = ShortcutState::Unregistered
            .apply(LifecycleOp::Create)
            .and_then(|s| s.apply(LifecycleOp::Configure))
            .and_then(|s| s.apply(LifecycleOp::ObservedStart))
            .and_then(|s| s.apply(LifecycleOp::ObservedStop))
            .and_then(|s| s.apply(LifecycleOp::ObservedStart))
            .and_then(|s| s.apply(LifecycleOp::Remove))
            .unwrap();
        assert_eq!(state, ShortcutState::Removed);
    }

    #[rstest]
    #[case::unregistered(ShortcutState::Unregistered)]
    #[case::registered(ShortcutState::Registered)]
    #[case::running(ShortcutState::Running)]
    #[case::idle(ShortcutState::Idle)]
    #[case::removed(ShortcutState::Removed)]
    fn remove_is_allowed_from_any_state(#[case] from: ShortcutState) {
        assert_eq!(from.apply(LifecycleOp::Remove).unwrap(), ShortcutState::Removed);
    }

    #[rstest]
    #[case::start_unregistered(ShortcutState::Unregistered, LifecycleOp::ObservedStart)]
    #[case::stop_unregistered(ShortcutState::Unregistered, LifecycleOp::ObservedStop)]
    #[case::configure_unregistered(ShortcutState::Unregistered, LifecycleOp::Configure)]
    #[case::create_twice(ShortcutState::Registered, LifecycleOp::Create)]
    #[case::configure_removed(ShortcutState::Removed, LifecycleOp::Configure)]
    #[case::observed_after_remove(ShortcutState::Removed, LifecycleOp::ObservedStart)]
    fn invalid_transitions_are_rejected(#[case] from: ShortcutState, #[case] op: LifecycleOp) {
        let err = from.apply(op).unwrap_err();
        assert_eq!(err.from, from);
        assert_eq!(err.op, op);
    }

    #[test]
    fn observed_events_toggle_running() {
        let running = ShortcutState::Registered
            .apply(LifecycleOp::ObservedStart)
            .unwrap();
        assert!(running.is_running());
        let idle = running.apply(LifecycleOp::ObservedStop).unwrap();
        assert_eq!(idle, ShortcutState::Idle);
        assert!(idle.is_registered());
    }
}
