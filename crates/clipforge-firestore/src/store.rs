//! Document store abstraction over Firestore.

use async_trait::async_trait;

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::types::{Fields, StructuredQuery, Value};

/// Keyed document storage grouped into collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create `collection/id`; fails if the document already exists.
    async fn create(&self, collection: &str, id: &str, fields: Fields) -> FirestoreResult<String>;

    /// Fields of `collection/id`, `None` when absent.
    async fn get(&self, collection: &str, id: &str) -> FirestoreResult<Option<Fields>>;

    /// Every document of `collection` whose `field` equals `value`, as
    /// `(id, fields)` pairs.
    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> FirestoreResult<Vec<(String, Fields)>>;
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn create(&self, collection: &str, id: &str, fields: Fields) -> FirestoreResult<String> {
        let doc = self.create_document(collection, id, fields).await?;
        Ok(doc.id().unwrap_or(id).to_string())
    }

    async fn get(&self, collection: &str, id: &str) -> FirestoreResult<Option<Fields>> {
        Ok(self
            .get_document(collection, id)
            .await?
            .map(|doc| doc.into_fields()))
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> FirestoreResult<Vec<(String, Fields)>> {
        let docs = self
            .run_query(StructuredQuery::field_equals(collection, field, value))
            .await?;

        Ok(docs
            .into_iter()
            .filter_map(|doc| {
                let id = doc.id()?.to_string();
                Some((id, doc.into_fields()))
            })
            .collect())
    }
}
