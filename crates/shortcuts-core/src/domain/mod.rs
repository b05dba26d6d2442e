//! Domain model (IDs, shortcut intent, host records, lifecycle state, errors).
//!
//! ホストにもランタイムにも依存しない純粋な型だけを置きます。

pub mod errors;
pub mod events;
pub mod ids;
pub mod record;
pub mod shortcut;
pub mod state;

pub use self::errors::{ErrorKind, HostError, InvalidTransition, ShortcutError};
pub use self::events::LifetimeEvent;
pub use self::ids::{AppId, GameId};
pub use self::record::{AppOverview, AppRecord, RawAppDetails, UserCollection};
pub use self::shortcut::{ShortcutConfig, ShortcutField, host_value_matches, strip_host_quotes};
pub use self::state::{LifecycleOp, ShortcutState};
