//! The in-memory store of transactions and goals kept in step with the remote store.
//!
//! Every mutation goes to the [RemoteStore] first and only touches memory once
//! the remote call has succeeded. A failed call leaves memory as it was and
//! records the error, which can be read back with [DomainStore::error].
//!
//! Mutations run one at a time. The in-memory state is only locked briefly
//! before and after each remote call, so reads never wait on the remote store.

use std::{
    collections::BTreeSet,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use time::Date;
use tokio::sync::Mutex;

use crate::{
    Error,
    database_id::{GoalId, TransactionId},
    error::StoreOperation,
    filter::TransactionFilter,
    goal::{FinancialGoal, NewGoal},
    period::Period,
    remote::{RemoteError, RemoteStore},
    retry::RetryPolicy,
    summary::Summary,
    transaction::{NewTransaction, Transaction, TransactionStatus},
};

#[derive(Debug)]
struct StoreState {
    transactions: Vec<Transaction>,
    goals: Vec<FinancialGoal>,
    filter: TransactionFilter,
    is_loading: bool,
    error: Option<Error>,
}

impl StoreState {
    fn find_transaction_mut(&mut self, id: TransactionId) -> Option<&mut Transaction> {
        self.transactions
            .iter_mut()
            .find(|transaction| transaction.id == id)
    }

    fn find_goal_mut(&mut self, id: GoalId) -> Option<&mut FinancialGoal> {
        self.goals.iter_mut().find(|goal| goal.id == id)
    }

    /// Clear the error slot on success, or record the failure and convert it
    /// to an [Error].
    fn settle<T>(
        &mut self,
        operation: StoreOperation,
        result: Result<T, RemoteError>,
    ) -> Result<T, Error> {
        match result {
            Ok(value) => {
                self.error = None;
                Ok(value)
            }
            Err(source) => Err(self.record_failure(operation, source)),
        }
    }

    fn record_failure(&mut self, operation: StoreOperation, source: RemoteError) -> Error {
        tracing::error!("Could not {operation}: {source}");

        let error = Error::RemoteOperationFailed { operation, source };
        self.error = Some(error.clone());

        error
    }

    fn reject(&mut self, error: Error) -> Error {
        tracing::error!("{error}");
        self.error = Some(error.clone());

        error
    }
}

/// The single source of truth for the transactions, goals and the current
/// filter of a session.
///
/// The store is shared between requests behind an [Arc](std::sync::Arc), every
/// method takes `&self`.
pub struct DomainStore {
    remote: Box<dyn RemoteStore>,
    retry_policy: RetryPolicy,
    state: RwLock<StoreState>,
    /// Held for the whole of a load or mutation so that remote calls and
    /// their effect on memory happen in the same order.
    mutation_lock: Mutex<()>,
}

impl DomainStore {
    /// Create an empty store that has not loaded anything yet.
    ///
    /// [DomainStore::is_loading] is true until [DomainStore::load] completes.
    pub fn new(remote: Box<dyn RemoteStore>, retry_policy: RetryPolicy) -> Self {
        Self {
            remote,
            retry_policy,
            state: RwLock::new(StoreState {
                transactions: Vec::new(),
                goals: Vec::new(),
                filter: TransactionFilter::default(),
                is_loading: true,
                error: None,
            }),
            mutation_lock: Mutex::new(()),
        }
    }

    /// Fetch all transactions and goals from the remote store.
    ///
    /// The two fetches run concurrently. A collection is only replaced if its
    /// fetch succeeded.
    ///
    /// # Errors
    /// Returns the last fetch error if either fetch failed.
    pub async fn load(&self) -> Result<(), Error> {
        let _mutation = self.mutation_lock.lock().await;
        self.write().is_loading = true;

        let remote = self.remote.as_ref();
        let retry_policy = self.retry_policy;
        let (transactions, goals) = tokio::join!(
            retry_policy.run(StoreOperation::FetchTransactions, move || {
                remote.fetch_transactions()
            }),
            retry_policy.run(StoreOperation::FetchGoals, move || remote.fetch_goals()),
        );

        let mut state = self.write();
        state.is_loading = false;
        state.error = None;

        match transactions {
            Ok(transactions) => {
                tracing::debug!("Loaded {} transactions", transactions.len());
                state.transactions = transactions;
            }
            Err(source) => {
                state.record_failure(StoreOperation::FetchTransactions, source);
            }
        }

        match goals {
            Ok(goals) => {
                tracing::debug!("Loaded {} goals", goals.len());
                state.goals = goals;
            }
            Err(source) => {
                state.record_failure(StoreOperation::FetchGoals, source);
            }
        }

        match &state.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Save a new transaction and append it to the list.
    ///
    /// A timed out insert is not repeated since it may have been stored,
    /// [DomainStore::load] shows whether it was.
    ///
    /// # Errors
    /// Returns [Error::RemoteOperationFailed] if the remote insert fails.
    pub async fn add_transaction(
        &self,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, Error> {
        let _mutation = self.mutation_lock.lock().await;

        let remote = self.remote.as_ref();
        let new_transaction = &new_transaction;
        let result = self
            .retry_policy
            .run(StoreOperation::AddTransaction, move || {
                remote.insert_transaction(new_transaction)
            })
            .await;

        let mut state = self.write();
        let transaction = state.settle(StoreOperation::AddTransaction, result)?;
        state.transactions.push(transaction.clone());

        Ok(transaction)
    }

    /// Replace every field of the transaction `id`, keeping its ID.
    ///
    /// # Errors
    /// Returns [Error::RemoteOperationFailed] if the remote update fails,
    /// including when no transaction has the ID `id`.
    pub async fn update_transaction(
        &self,
        id: TransactionId,
        new_transaction: NewTransaction,
    ) -> Result<(), Error> {
        let _mutation = self.mutation_lock.lock().await;

        let remote = self.remote.as_ref();
        let new_transaction_ref = &new_transaction;
        let result = self
            .retry_policy
            .run(StoreOperation::UpdateTransaction, move || {
                remote.update_transaction(id, new_transaction_ref)
            })
            .await;

        let mut state = self.write();
        state.settle(StoreOperation::UpdateTransaction, result)?;

        if let Some(transaction) = state.find_transaction_mut(id) {
            *transaction = new_transaction.with_id(id);
        }

        Ok(())
    }

    /// Delete the transaction `id`.
    ///
    /// # Errors
    /// Returns [Error::RemoteOperationFailed] if the remote delete fails,
    /// including when no transaction has the ID `id`.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<(), Error> {
        let _mutation = self.mutation_lock.lock().await;

        let remote = self.remote.as_ref();
        let result = self
            .retry_policy
            .run(StoreOperation::DeleteTransaction, move || {
                remote.delete_transaction(id)
            })
            .await;

        let mut state = self.write();
        state.settle(StoreOperation::DeleteTransaction, result)?;
        state.transactions.retain(|transaction| transaction.id != id);

        Ok(())
    }

    /// Change only the status of the transaction `id`.
    ///
    /// # Errors
    /// Returns [Error::RemoteOperationFailed] if the remote update fails,
    /// including when no transaction has the ID `id`.
    pub async fn update_transaction_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<(), Error> {
        let _mutation = self.mutation_lock.lock().await;

        let remote = self.remote.as_ref();
        let result = self
            .retry_policy
            .run(StoreOperation::UpdateTransactionStatus, move || {
                remote.update_transaction_status(id, status)
            })
            .await;

        let mut state = self.write();
        state.settle(StoreOperation::UpdateTransactionStatus, result)?;

        if let Some(transaction) = state.find_transaction_mut(id) {
            transaction.status = status;
        }

        Ok(())
    }

    /// Save a new goal and append it to the list.
    ///
    /// # Errors
    /// Returns [Error::RemoteOperationFailed] if the remote insert fails.
    pub async fn add_goal(&self, new_goal: NewGoal) -> Result<FinancialGoal, Error> {
        let _mutation = self.mutation_lock.lock().await;

        let remote = self.remote.as_ref();
        let new_goal = &new_goal;
        let result = self
            .retry_policy
            .run(StoreOperation::AddGoal, move || remote.insert_goal(new_goal))
            .await;

        let mut state = self.write();
        let goal = state.settle(StoreOperation::AddGoal, result)?;
        state.goals.push(goal.clone());

        Ok(goal)
    }

    /// Add `amount` to the amount saved towards the goal `id`.
    ///
    /// The saved amount never goes past the goal's target.
    ///
    /// # Returns
    /// The updated goal, or `None` if no goal has the ID `id`. Unknown IDs do
    /// not touch the remote store.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::InvalidProgressAmount] if `amount` is not a positive number.
    /// - [Error::RemoteOperationFailed] if the remote update fails.
    pub async fn update_goal_progress(
        &self,
        id: GoalId,
        amount: f64,
    ) -> Result<Option<FinancialGoal>, Error> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(self.write().reject(Error::InvalidProgressAmount(amount)));
        }

        let _mutation = self.mutation_lock.lock().await;

        let current_amount = self
            .get_goal_by_id(id)
            .map(|goal| goal.progressed_amount(amount));
        let Some(current_amount) = current_amount else {
            tracing::debug!("Ignoring progress for unknown goal {id}");
            return Ok(None);
        };

        let remote = self.remote.as_ref();
        let result = self
            .retry_policy
            .run(StoreOperation::UpdateGoalProgress, move || {
                remote.update_goal_progress(id, current_amount)
            })
            .await;

        let mut state = self.write();
        state.settle(StoreOperation::UpdateGoalProgress, result)?;

        Ok(state.find_goal_mut(id).map(|goal| {
            goal.current_amount = current_amount;
            goal.clone()
        }))
    }

    /// Pay one installment towards the goal `id`.
    ///
    /// # Returns
    /// The updated goal, or `None` if no goal has the ID `id`.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::NotAnInstallmentGoal] if the goal is a one-time goal.
    /// - [Error::RemoteOperationFailed] if the remote update fails.
    pub async fn pay_installment(&self, id: GoalId) -> Result<Option<FinancialGoal>, Error> {
        let Some(goal) = self.get_goal_by_id(id) else {
            return Ok(None);
        };

        let Some(installment_amount) = goal.installment_amount else {
            return Err(self.write().reject(Error::NotAnInstallmentGoal(id)));
        };

        self.update_goal_progress(id, installment_amount).await
    }

    pub fn get_transaction_by_id(&self, id: TransactionId) -> Option<Transaction> {
        self.read()
            .transactions
            .iter()
            .find(|transaction| transaction.id == id)
            .cloned()
    }

    pub fn get_goal_by_id(&self, id: GoalId) -> Option<FinancialGoal> {
        self.read().goals.iter().find(|goal| goal.id == id).cloned()
    }

    /// Replace the whole filter.
    pub fn set_filter(&self, filter: TransactionFilter) {
        self.write().filter = filter;
    }

    /// Set the filter's period and the date bounds it resolves to relative to
    /// `today`. The other filter fields are kept.
    ///
    /// Returns the new filter.
    pub fn apply_period(&self, period: Period, today: Date) -> TransactionFilter {
        tracing::debug!("Applying period {period} relative to {today}");

        let mut state = self.write();
        state.filter = std::mem::take(&mut state.filter).with_period(period, today);

        state.filter.clone()
    }

    /// Restore the filter that lets every transaction through.
    pub fn reset_filter(&self) {
        self.write().filter = TransactionFilter::default();
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// All transactions, in load order followed by the order they were added.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.read().transactions.clone()
    }

    pub fn goals(&self) -> Vec<FinancialGoal> {
        self.read().goals.clone()
    }

    pub fn filter(&self) -> TransactionFilter {
        self.read().filter.clone()
    }

    /// The transactions that pass the current filter, in list order.
    pub fn filtered_transactions(&self) -> Vec<Transaction> {
        let state = self.read();

        state
            .filter
            .apply(&state.transactions)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }

    /// The most recent failure, if the last operation did not succeed.
    pub fn error(&self) -> Option<Error> {
        self.read().error.clone()
    }

    pub fn error_message(&self) -> Option<String> {
        self.read().error.as_ref().map(Error::to_string)
    }

    /// The distinct category labels in use, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.read()
            .transactions
            .iter()
            .filter_map(|transaction| transaction.category.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// The totals of the transactions that pass the current filter.
    pub fn summary(&self) -> Summary {
        let state = self.read();

        Summary::from_transactions(state.filter.apply(&state.transactions))
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
