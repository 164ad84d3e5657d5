//! Account deletion scheduling
//!
//! Banning a user schedules their account for permanent deletion and marks
//! their uploaded content for removal. The mechanism that performs the
//! eventual deletion lives outside this repository; the contract here is
//! only "mark for deletion". The reference implementation records marked
//! emails in the store's ledger so workflows and tests can observe them.

use crate::store::MemoryStore;
use async_trait::async_trait;
use std::sync::Arc;
use tubeops_core::WorkflowError;

/// External collaborator that schedules account deletion
#[async_trait]
pub trait DeletionScheduler: Send + Sync {
    /// Mark the account behind `email` (and its uploaded content) for
    /// deletion
    ///
    /// # Errors
    /// - [`WorkflowError::NotFound`] when no account has that email
    async fn schedule_user_deletion(&self, email: &str) -> Result<(), WorkflowError>;
}

/// Scheduler backed by the memory store's pending-deletion ledger
pub struct LedgerScheduler {
    store: Arc<MemoryStore>,
}

impl LedgerScheduler {
    /// Scheduler writing to the given store's ledger
    #[inline]
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DeletionScheduler for LedgerScheduler {
    async fn schedule_user_deletion(&self, email: &str) -> Result<(), WorkflowError> {
        if self.store.user_by_email(email).is_none() {
            return Err(WorkflowError::not_found("user", email));
        }
        tracing::warn!(email, "account marked for deletion");
        self.store.mark_for_deletion(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::User;

    #[tokio::test]
    async fn marks_existing_accounts() {
        let store = Arc::new(MemoryStore::new());
        store.insert_user(User::new("spammer@viewtube.example"));

        let scheduler = LedgerScheduler::new(Arc::clone(&store));
        scheduler
            .schedule_user_deletion("spammer@viewtube.example")
            .await
            .unwrap();

        assert_eq!(
            store.pending_deletions(),
            vec!["spammer@viewtube.example".to_string()]
        );
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let scheduler = LedgerScheduler::new(store);

        let err = scheduler
            .schedule_user_deletion("ghost@viewtube.example")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { .. }));
    }
}
