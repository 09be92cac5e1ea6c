//! In-process document store for tests and local runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{FirestoreError, FirestoreResult};
use crate::store::DocumentStore;
use crate::types::{Fields, Value};

/// Document store held in memory, ordered by collection then id.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<BTreeMap<(String, String), Fields>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across all collections.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create(&self, collection: &str, id: &str, fields: Fields) -> FirestoreResult<String> {
        let mut documents = self.documents.write().await;
        let key = (collection.to_string(), id.to_string());
        if documents.contains_key(&key) {
            return Err(FirestoreError::AlreadyExists(format!("{}/{}", collection, id)));
        }
        documents.insert(key, fields);
        Ok(id.to_string())
    }

    async fn get(&self, collection: &str, id: &str) -> FirestoreResult<Option<Fields>> {
        Ok(self
            .documents
            .read()
            .await
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> FirestoreResult<Vec<(String, Fields)>> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|((c, _), fields)| c == collection && fields.get(field) == Some(&value))
            .map(|((_, id), fields)| (id.clone(), fields.clone()))
            .collect())
    }
}
