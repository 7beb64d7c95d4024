use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    database_id::{GoalId, TransactionId},
    goal::{FinancialGoal, NewGoal},
    remote::{RemoteError, RemoteStore},
    transaction::{NewTransaction, Transaction, TransactionStatus},
};

#[derive(Debug, Default)]
struct FakeState {
    transactions: Vec<Transaction>,
    goals: Vec<FinancialGoal>,
    next_id: i64,
    queued_failures: VecDeque<RemoteError>,
    persistent_failure: Option<RemoteError>,
    goal_fetch_failure: Option<RemoteError>,
    reply_delay: Option<Duration>,
    hang: bool,
    call_count: u32,
}

/// An in-memory [RemoteStore] that can be told to fail, reply late or hang.
///
/// Clones share the same state so a test can keep a handle after giving the
/// store to a [DomainStore](crate::DomainStore).
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeRemoteStore {
    state: Arc<Mutex<FakeState>>,
}

impl FakeRemoteStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Seed the store. IDs of later inserts continue after the largest seeded ID.
    pub(crate) fn with_data(transactions: Vec<Transaction>, goals: Vec<FinancialGoal>) -> Self {
        let max_id = transactions
            .iter()
            .map(|transaction| transaction.id)
            .chain(goals.iter().map(|goal| goal.id))
            .max()
            .unwrap_or(0);

        let store = Self::new();
        {
            let mut state = store.state();
            state.transactions = transactions;
            state.goals = goals;
            state.next_id = max_id;
        }

        store
    }

    /// Make the next call fail with `error`. Queued failures are used in order.
    pub(crate) fn fail_next(&self, error: RemoteError) {
        self.state().queued_failures.push_back(error);
    }

    /// Make every call fail with `error` until [FakeRemoteStore::recover] is called.
    pub(crate) fn fail_always(&self, error: RemoteError) {
        self.state().persistent_failure = Some(error);
    }

    /// Make every goal fetch fail with `error` until [FakeRemoteStore::recover]
    /// is called. Other calls are unaffected.
    pub(crate) fn fail_goal_fetches(&self, error: RemoteError) {
        self.state().goal_fetch_failure = Some(error);
    }

    /// Undo [FakeRemoteStore::fail_always], [FakeRemoteStore::fail_goal_fetches]
    /// and [FakeRemoteStore::hang], and drop queued failures.
    pub(crate) fn recover(&self) {
        let mut state = self.state();
        state.persistent_failure = None;
        state.goal_fetch_failure = None;
        state.queued_failures.clear();
        state.hang = false;
    }

    /// Make the next call wait for `delay` after it has done its work and
    /// before it replies.
    pub(crate) fn delay_next_reply(&self, delay: Duration) {
        self.state().reply_delay = Some(delay);
    }

    /// Make every call wait forever.
    pub(crate) fn hang(&self) {
        self.state().hang = true;
    }

    pub(crate) fn call_count(&self) -> u32 {
        self.state().call_count
    }

    pub(crate) fn stored_transactions(&self) -> Vec<Transaction> {
        self.state().transactions.clone()
    }

    pub(crate) fn stored_goals(&self) -> Vec<FinancialGoal> {
        self.state().goals.clone()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("Fake remote store lock poisoned")
    }

    async fn begin_call(&self) -> Result<(), RemoteError> {
        let hang = {
            let mut state = self.state();
            state.call_count += 1;

            if let Some(error) = state.queued_failures.pop_front() {
                return Err(error);
            }

            if let Some(error) = &state.persistent_failure {
                return Err(error.clone());
            }

            state.hang
        };

        if hang {
            std::future::pending::<()>().await;
        }

        Ok(())
    }

    async fn end_call(&self) {
        let delay = self.state().reply_delay.take();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RemoteStore for FakeRemoteStore {
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>, RemoteError> {
        self.begin_call().await?;

        let mut transactions = self.stored_transactions();
        transactions.sort_by_key(|transaction| (transaction.due_date, transaction.id));
        self.end_call().await;

        Ok(transactions)
    }

    async fn fetch_goals(&self) -> Result<Vec<FinancialGoal>, RemoteError> {
        self.begin_call().await?;

        let goal_fetch_failure = self.state().goal_fetch_failure.clone();
        if let Some(error) = goal_fetch_failure {
            return Err(error);
        }

        let mut goals = self.stored_goals();
        goals.sort_by_key(|goal| (goal.deadline, goal.id));
        self.end_call().await;

        Ok(goals)
    }

    async fn insert_transaction(
        &self,
        new_transaction: &NewTransaction,
    ) -> Result<Transaction, RemoteError> {
        self.begin_call().await?;

        let transaction = {
            let mut state = self.state();
            state.next_id += 1;
            let transaction = new_transaction.clone().with_id(state.next_id);
            state.transactions.push(transaction.clone());
            transaction
        };
        self.end_call().await;

        Ok(transaction)
    }

    async fn insert_goal(&self, new_goal: &NewGoal) -> Result<FinancialGoal, RemoteError> {
        self.begin_call().await?;

        let goal = {
            let mut state = self.state();
            state.next_id += 1;
            let goal = new_goal.clone().with_id(state.next_id);
            state.goals.push(goal.clone());
            goal
        };
        self.end_call().await;

        Ok(goal)
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        new_transaction: &NewTransaction,
    ) -> Result<(), RemoteError> {
        self.begin_call().await?;

        {
            let mut state = self.state();
            let transaction = state
                .transactions
                .iter_mut()
                .find(|transaction| transaction.id == id)
                .ok_or(RemoteError::MissingRow)?;
            *transaction = new_transaction.clone().with_id(id);
        }
        self.end_call().await;

        Ok(())
    }

    async fn update_transaction_status(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<(), RemoteError> {
        self.begin_call().await?;

        {
            let mut state = self.state();
            let transaction = state
                .transactions
                .iter_mut()
                .find(|transaction| transaction.id == id)
                .ok_or(RemoteError::MissingRow)?;
            transaction.status = status;
        }
        self.end_call().await;

        Ok(())
    }

    async fn update_goal_progress(
        &self,
        id: GoalId,
        current_amount: f64,
    ) -> Result<(), RemoteError> {
        self.begin_call().await?;

        {
            let mut state = self.state();
            let goal = state
                .goals
                .iter_mut()
                .find(|goal| goal.id == id)
                .ok_or(RemoteError::MissingRow)?;
            goal.current_amount = current_amount;
        }
        self.end_call().await;

        Ok(())
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<(), RemoteError> {
        self.begin_call().await?;

        let deleted = {
            let mut state = self.state();
            let count_before = state.transactions.len();
            state.transactions.retain(|transaction| transaction.id != id);
            state.transactions.len() < count_before
        };

        if !deleted {
            return Err(RemoteError::MissingRow);
        }
        self.end_call().await;

        Ok(())
    }
}
