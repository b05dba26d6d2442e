//! HostCollections port - コレクションと表示/非表示
//!
//! 削除時の二次インデックス掃除と hide のためだけに使います。

use async_trait::async_trait;

use crate::domain::{AppId, HostError, UserCollection};

#[async_trait]
pub trait HostCollections: Send + Sync {
    async fn user_collections(&self) -> Result<Vec<UserCollection>, HostError>;

    /// drag-and-drop を許すコレクションからアプリを外す
    async fn remove_apps_from_collection(
        &self,
        collection_id: &str,
        apps: &[AppId],
    ) -> Result<(), HostError>;

    async fn is_hidden(&self, app_id: AppId) -> Result<bool, HostError>;

    async fn set_apps_hidden(&self, apps: &[AppId], hidden: bool) -> Result<(), HostError>;
}
