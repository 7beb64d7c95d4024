//! JSON endpoints for the derived views of the store: categories, totals and status.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::Serialize;

use crate::{
    AppState,
    store::DomainStore,
    summary::{CategoryTotal, MonthTotal, Summary, totals_by_category, totals_by_month},
    transaction::TransactionType,
};

/// The state needed by the report endpoints.
#[derive(Clone)]
pub struct ReportEndpointState {
    pub store: Arc<DomainStore>,
}

impl FromRef<AppState> for ReportEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// The totals of the filtered transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub summary: Summary,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub income_by_month: Vec<MonthTotal>,
    pub expenses_by_month: Vec<MonthTotal>,
}

/// Whether the store is still loading and the last error, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Get the distinct categories in use, sorted, e.g. for filter pickers.
pub async fn get_categories_endpoint(
    State(state): State<ReportEndpointState>,
) -> Json<Vec<String>> {
    Json(state.store.categories())
}

pub async fn get_summary_endpoint(
    State(state): State<ReportEndpointState>,
) -> Json<SummaryResponse> {
    let transactions = state.store.filtered_transactions();

    Json(SummaryResponse {
        summary: Summary::from_transactions(&transactions),
        expenses_by_category: totals_by_category(&transactions, TransactionType::Expense),
        income_by_month: totals_by_month(&transactions, TransactionType::Income),
        expenses_by_month: totals_by_month(&transactions, TransactionType::Expense),
    })
}

pub async fn get_status_endpoint(
    State(state): State<ReportEndpointState>,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        is_loading: state.store.is_loading(),
        error: state.store.error_message(),
    })
}

#[cfg(test)]
mod report_endpoint_tests {
    use std::{sync::Arc, time::Duration};

    use axum::{Json, extract::State};
    use serde_json::json;
    use time::macros::date;

    use crate::{
        remote::RemoteError,
        retry::RetryPolicy,
        store::DomainStore,
        test_utils::FakeRemoteStore,
        transaction::{Transaction, TransactionType},
    };

    use super::{
        ReportEndpointState, StatusResponse, get_categories_endpoint, get_status_endpoint,
        get_summary_endpoint,
    };

    async fn get_test_state_with_policy(
        remote: FakeRemoteStore,
        policy: RetryPolicy,
    ) -> ReportEndpointState {
        let store = DomainStore::new(Box::new(remote), policy);
        // Load failures are read back through the status endpoint.
        let _ = store.load().await;

        ReportEndpointState {
            store: Arc::new(store),
        }
    }

    async fn get_test_state(remote: FakeRemoteStore) -> ReportEndpointState {
        get_test_state_with_policy(remote, RetryPolicy::no_retry(Duration::from_millis(50))).await
    }

    fn sample_remote() -> FakeRemoteStore {
        let transactions = vec![
            Transaction::build("Salary", 2000.0, date!(2024 - 01 - 05))
                .kind(TransactionType::Income)
                .category(Some("Work"))
                .finalize()
                .unwrap()
                .with_id(1),
            Transaction::build("Groceries", 150.0, date!(2024 - 01 - 20))
                .category(Some("Food"))
                .finalize()
                .unwrap()
                .with_id(2),
            Transaction::build("Power", 90.0, date!(2024 - 02 - 02))
                .finalize()
                .unwrap()
                .with_id(3),
        ];

        FakeRemoteStore::with_data(transactions, vec![])
    }

    #[tokio::test]
    async fn categories_are_sorted() {
        let state = get_test_state(sample_remote()).await;

        let Json(categories) = get_categories_endpoint(State(state)).await;

        assert_eq!(categories, vec!["Food".to_owned(), "Work".to_owned()]);
    }

    #[tokio::test]
    async fn summary_includes_totals_and_breakdowns() {
        let state = get_test_state(sample_remote()).await;

        let Json(response) = get_summary_endpoint(State(state)).await;

        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({
                "income": 2000.0,
                "expense": 240.0,
                "balance": 1760.0,
                "expensesByCategory": [
                    {"category": "Food", "total": 150.0},
                    {"category": "Uncategorized", "total": 90.0},
                ],
                "incomeByMonth": [
                    {"month": "2024-01-01", "label": "Jan", "total": 2000.0},
                ],
                "expensesByMonth": [
                    {"month": "2024-01-01", "label": "Jan", "total": 150.0},
                    {"month": "2024-02-01", "label": "Feb", "total": 90.0},
                ],
            })
        );
    }

    #[tokio::test]
    async fn status_reports_load_failure() {
        let remote = FakeRemoteStore::new();
        remote.fail_always(RemoteError::Unavailable("offline".to_owned()));
        let state = get_test_state(remote).await;

        let Json(status) = get_status_endpoint(State(state)).await;

        assert_eq!(
            status,
            StatusResponse {
                is_loading: false,
                error: Some("failed to fetch goals".to_owned()),
            }
        );
    }

    #[tokio::test]
    async fn status_is_clear_after_successful_load() {
        let state = get_test_state(sample_remote()).await;

        let Json(status) = get_status_endpoint(State(state)).await;

        assert_eq!(
            status,
            StatusResponse {
                is_loading: false,
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn status_is_loading_before_first_load() {
        let state = ReportEndpointState {
            store: Arc::new(DomainStore::new(
                Box::new(sample_remote()),
                RetryPolicy::default(),
            )),
        };

        let Json(status) = get_status_endpoint(State(state)).await;

        assert!(status.is_loading);
        assert_eq!(status.error, None);
    }

    #[tokio::test]
    async fn status_responds_while_remote_call_is_pending() {
        let remote = sample_remote();
        let state = get_test_state_with_policy(
            remote.clone(),
            RetryPolicy::no_retry(Duration::from_secs(60)),
        )
        .await;
        remote.hang();
        let pending = tokio::spawn({
            let store = state.store.clone();
            async move { store.delete_transaction(1).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let status = tokio::time::timeout(
            Duration::from_millis(500),
            get_status_endpoint(State(state.clone())),
        )
        .await;
        let summary = tokio::time::timeout(
            Duration::from_millis(500),
            get_summary_endpoint(State(state)),
        )
        .await;

        assert!(!pending.is_finished());
        let Ok(Json(status)) = status else {
            panic!("status endpoint waited on the pending remote call");
        };
        assert!(!status.is_loading);
        assert!(summary.is_ok(), "summary endpoint waited on the pending remote call");

        pending.abort();
    }
}
