//! SQL introspection contract
//!
//! The AI query workflow needs two things from the database: the schema
//! (to build the completion prompt) and raw query execution (to run the
//! generated statement). Both belong to the persistence collaborator; the
//! memory store can describe its schema but does not speak SQL, so raw
//! execution is only available against SQL-backed deployments.

use crate::store::MemoryStore;
use async_trait::async_trait;
use tubeops_core::WorkflowError;

/// One table with its column names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Column names
    pub columns: Vec<String>,
}

impl TableSchema {
    /// Table description from static names
    #[must_use]
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

/// Result rows of one raw query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRows {
    /// Column labels
    pub columns: Vec<String>,
    /// Row cells as strings, one vector per row
    pub rows: Vec<Vec<String>>,
}

/// Schema introspection plus raw query execution
#[async_trait]
pub trait SqlBackend: Send + Sync {
    /// Tables with their columns, in a stable order
    fn schema(&self) -> Vec<TableSchema>;

    /// Execute one raw statement
    ///
    /// # Errors
    /// - [`WorkflowError::Storage`] when the backend cannot run raw SQL
    /// - [`WorkflowError::ExternalService`] for backend failures
    async fn execute(&self, sql: &str) -> Result<QueryRows, WorkflowError>;
}

#[async_trait]
impl SqlBackend for MemoryStore {
    fn schema(&self) -> Vec<TableSchema> {
        vec![
            TableSchema::new(
                "users",
                &[
                    "id",
                    "name",
                    "email",
                    "is_verified",
                    "can_upload",
                    "signed_up_at",
                    "max_upload_duration",
                ],
            ),
            TableSchema::new("channels", &["id", "name", "owner_id"]),
            TableSchema::new(
                "videos",
                &["id", "title", "url", "thumbnail_url", "channel_id", "price", "created_at"],
            ),
            TableSchema::new(
                "user_comments",
                &["id", "video_id", "author_id", "content", "is_spam", "created_at"],
            ),
            TableSchema::new(
                "feature_flags",
                &["slug", "description", "is_enabled", "rollout_percentage", "enabled_environments"],
            ),
            TableSchema::new(
                "customer_support_tickets",
                &["id", "title", "description", "severity", "contact_method", "status", "created_at"],
            ),
            TableSchema::new(
                "video_purchases",
                &["id", "owner_id", "video_id", "amount", "created_at"],
            ),
        ]
    }

    async fn execute(&self, _sql: &str) -> Result<QueryRows, WorkflowError> {
        Err(WorkflowError::Storage(
            "the in-memory store does not execute raw SQL; point the query tool at a SQL-backed deployment"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_stable_and_nonempty() {
        let store = MemoryStore::new();
        let schema = store.schema();
        assert!(schema.iter().any(|t| t.name == "feature_flags"));
        assert_eq!(store.schema(), schema);
    }

    #[tokio::test]
    async fn raw_sql_is_rejected() {
        let store = MemoryStore::new();
        let err = store.execute("SELECT 1").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Storage(_)));
    }
}
