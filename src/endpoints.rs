//! The API endpoints URIs.

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for the transactions that pass the current filter.
pub const FILTERED_TRANSACTIONS: &str = "/api/transactions/filtered";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to change the status of a transaction.
pub const TRANSACTION_STATUS: &str = "/api/transactions/{transaction_id}/status";
/// The route to list and create goals.
pub const GOALS: &str = "/api/goals";
/// The route to add progress to a goal.
pub const GOAL_PROGRESS: &str = "/api/goals/{goal_id}/progress";
/// The route to pay one installment of a goal.
pub const GOAL_INSTALLMENT: &str = "/api/goals/{goal_id}/installment";
/// The route to read, replace and reset the transaction filter.
pub const FILTER: &str = "/api/filter";
/// The route to set the filter's date bounds from a period preset.
pub const FILTER_PERIOD: &str = "/api/filter/period";
/// The route for the distinct transaction categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route for the totals of the filtered transactions.
pub const SUMMARY: &str = "/api/summary";
/// The route for the loading state and last error of the store.
pub const STATUS: &str = "/api/status";
