//! A [RemoteStore] backed by a SQLite database.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{Connection, ErrorCode};

use crate::{
    database_id::{GoalId, TransactionId},
    db::initialize,
    goal::{self, FinancialGoal, NewGoal},
    remote::{RemoteError, RemoteStore},
    transaction::{self, NewTransaction, Transaction, TransactionStatus},
};

/// Persists transactions and goals in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteRemoteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRemoteStore {
    /// Create a store from a connection whose tables have already been created.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Create the tables if needed and wrap the connection.
    ///
    /// # Errors
    /// Returns an error if the tables cannot be created.
    pub fn open(connection: Connection) -> Result<Self, rusqlite::Error> {
        initialize(&connection)?;

        Ok(Self::new(Arc::new(Mutex::new(connection))))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RemoteError> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            RemoteError::Unavailable("could not acquire the database lock".to_owned())
        })
    }
}

impl From<rusqlite::Error> for RemoteError {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked,
                    extended_code: _,
                },
                _,
            ) => RemoteError::Unavailable(error.to_string()),
            rusqlite::Error::QueryReturnedNoRows => RemoteError::MissingRow,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                RemoteError::Rejected(error.to_string())
            }
        }
    }
}

fn expect_one_row(rows_affected: usize) -> Result<(), RemoteError> {
    if rows_affected == 0 {
        Err(RemoteError::MissingRow)
    } else {
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for SqliteRemoteStore {
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, RemoteError> {
        let connection = self.lock()?;

        Ok(transaction::get_all_transactions(&connection)?)
    }

    async fn fetch_goals(&self) -> Result<Vec<FinancialGoal>, RemoteError> {
        let connection = self.lock()?;

        Ok(goal::get_all_goals(&connection)?)
    }

    async fn insert_transaction(
        &self,
        new_transaction: &NewTransaction,
    ) -> Result<Transaction, RemoteError> {
        let connection = self.lock()?;

        Ok(transaction::create_transaction(new_transaction, &connection)?)
    }

    async fn insert_goal(&self, new_goal: &NewGoal) -> Result<FinancialGoal, RemoteError> {
        let connection = self.lock()?;

        Ok(goal::create_goal(new_goal, &connection)?)
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        new_transaction: &NewTransaction,
    ) -> Result<(), RemoteError> {
        let connection = self.lock()?;

        expect_one_row(transaction::update_transaction(
            id,
            new_transaction,
            &connection,
        )?)
    }

    async fn update_transaction_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<(), RemoteError> {
        let connection = self.lock()?;

        expect_one_row(transaction::update_transaction_status(
            id,
            status,
            &connection,
        )?)
    }

    async fn update_goal_progress(
        &self,
        id: GoalId,
        current_amount: f64,
    ) -> Result<(), RemoteError> {
        let connection = self.lock()?;

        expect_one_row(goal::update_goal_progress(id, current_amount, &connection)?)
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<(), RemoteError> {
        let connection = self.lock()?;

        expect_one_row(transaction::delete_transaction(id, &connection)?)
    }
}
