//! The remote persistent store that holds the durable copies of transactions and goals.
//!
//! The [DomainStore](crate::DomainStore) only talks to the remote store
//! through the [RemoteStore] trait, so the backend can be swapped without
//! touching the store.

mod sqlite;

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    database_id::{GoalId, TransactionId},
    goal::{FinancialGoal, NewGoal},
    transaction::{NewTransaction, Transaction, TransactionStatus},
};

pub use sqlite::SqliteRemoteStore;

/// The reasons a remote call can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteError {
    /// The remote store could not be reached or was too busy to answer.
    ///
    /// Repeating the call may succeed.
    #[error("the remote store is unavailable: {0}")]
    Unavailable(String),

    /// The remote store did not answer in time.
    ///
    /// Repeating the call may succeed.
    #[error("the remote store did not respond within {0:?}")]
    Timeout(Duration),

    /// The remote store refused the request, e.g. a constraint was violated.
    ///
    /// Repeating the same call will fail the same way.
    #[error("the remote store rejected the request: {0}")]
    Rejected(String),

    /// An update or delete referred to a row that does not exist.
    #[error("no row with the requested ID exists in the remote store")]
    MissingRow,
}

impl RemoteError {
    /// Whether repeating the call could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// A row-oriented store with a `transactions` and a `goals` collection.
///
/// Every call either returns the requested data or a [RemoteError].
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All transactions ordered by due date, oldest first.
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, RemoteError>;

    /// All goals ordered by deadline, soonest first.
    async fn fetch_goals(&self) -> Result<Vec<FinancialGoal>, RemoteError>;

    /// Insert a transaction and return the stored row with its new ID.
    async fn insert_transaction(
        &self,
        new_transaction: &NewTransaction,
    ) -> Result<Transaction, RemoteError>;

    /// Insert a goal and return the stored row with its new ID.
    async fn insert_goal(&self, new_goal: &NewGoal) -> Result<FinancialGoal, RemoteError>;

    /// Replace every field of the transaction `id`.
    async fn update_transaction(
        &self,
        id: TransactionId,
        new_transaction: &NewTransaction,
    ) -> Result<(), RemoteError>;

    /// Replace only the status of the transaction `id`.
    async fn update_transaction_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<(), RemoteError>;

    /// Set the amount saved towards the goal `id`.
    async fn update_goal_progress(
        &self,
        id: GoalId,
        current_amount: f64,
    ) -> Result<(), RemoteError>;

    /// Delete the transaction `id`.
    async fn delete_transaction(&self, id: TransactionId) -> Result<(), RemoteError>;
}
