//! ShortcutDirectory - 表示名から AppId への変換

use std::sync::Arc;

use super::registry::RegistryAdapter;
use crate::domain::{AppId, AppRecord};

pub struct ShortcutDirectory {
    registry: Arc<RegistryAdapter>,
}

impl ShortcutDirectory {
    pub fn new(registry: Arc<RegistryAdapter>) -> Self {
        Self { registry }
    }

    /// 名前が一致する最初のショートカット
    pub async fn resolve_by_name(&self, name: &str) -> Option<AppRecord> {
        self.registry.find_by_name(name).await.into_iter().next()
    }

    pub async fn exists_by_name(&self, name: &str) -> bool {
        self.resolve_by_name(name)
            .await
            .is_some_and(|record| !record.app_id.is_placeholder())
    }

    /// `AppId(0)` は常に false
    pub async fn exists_by_id(&self, app_id: AppId) -> bool {
        if app_id.is_placeholder() {
            return false;
        }
        self.registry
            .find_by_id(app_id)
            .await
            .first()
            .is_some_and(|record| !record.app_id.is_placeholder())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::RetryPolicy;
    use crate::impls::InMemoryHost;
    use std::time::Duration;

    fn directory(host: &InMemoryHost) -> ShortcutDirectory {
        let host = Arc::new(host.clone());
        ShortcutDirectory::new(Arc::new(RegistryAdapter::new(
            host.clone(),
            host,
            Duration::from_millis(1000),
            RetryPolicy::default(),
        )))
    }

    #[tokio::test]
    async fn resolves_existing_names() {
        let host = InMemoryHost::new();
        let app_id = host.insert_shortcut("Konsole", "/usr/bin/konsole");
        let directory = directory(&host);

        assert_eq!(directory.resolve_by_name("Konsole").await.unwrap().app_id, app_id);
        assert!(directory.exists_by_name("Konsole").await);
        assert!(directory.exists_by_id(app_id).await);
    }

    #[tokio::test]
    async fn missing_entries_do_not_exist() {
        let host = InMemoryHost::new();
        host.insert_shortcut("Konsole", "/usr/bin/konsole");
        let directory = directory(&host);

        assert!(directory.resolve_by_name("Yakuake").await.is_none());
        assert!(!directory.exists_by_name("Yakuake").await);
        assert!(!directory.exists_by_id(AppId::new(3)).await);
        assert!(!directory.exists_by_id(AppId::PLACEHOLDER).await);
    }
}
