use crate::domain::ports::SessionStorage;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory session store.
///
/// Clones share the same map, so a cloned handle sees every write.
#[derive(Default, Clone)]
pub struct InMemorySessionStorage {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().await;
        Ok(values.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().await;
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_remove() {
        let storage = InMemorySessionStorage::new();
        assert!(storage.get("cart").await.unwrap().is_none());

        storage.put("cart", "[]".to_string()).await.unwrap();
        assert_eq!(storage.get("cart").await.unwrap().as_deref(), Some("[]"));

        storage.put("cart", "[1]".to_string()).await.unwrap();
        assert_eq!(storage.get("cart").await.unwrap().as_deref(), Some("[1]"));

        storage.remove("cart").await.unwrap();
        assert!(storage.get("cart").await.unwrap().is_none());
        storage.remove("missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let storage = InMemorySessionStorage::new();
        let other = storage.clone();
        storage.put("k", "v".to_string()).await.unwrap();
        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
