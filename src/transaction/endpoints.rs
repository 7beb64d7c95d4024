//! JSON endpoints for reading and changing transactions.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    extract::{JsonBody, PathParam},
    store::DomainStore,
    transaction::{NewTransaction, Transaction, TransactionStatus, TransactionType},
};

/// The state needed by the transaction endpoints.
#[derive(Clone)]
pub struct TransactionEndpointState {
    pub store: Arc<DomainStore>,
}

impl FromRef<AppState> for TransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// The request body for creating or replacing a transaction.
///
/// `status` defaults to pending and `type` defaults to expense.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionForm {
    pub description: String,
    pub amount: f64,
    pub due_date: Date,
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    #[serde(rename = "type", default)]
    pub kind: Option<TransactionType>,
    #[serde(default)]
    pub category: Option<String>,
}

impl TransactionForm {
    fn finalize(self) -> Result<NewTransaction, Error> {
        let mut builder = Transaction::build(&self.description, self.amount, self.due_date)
            .category(self.category.as_deref());

        if let Some(status) = self.status {
            builder = builder.status(status);
        }

        if let Some(kind) = self.kind {
            builder = builder.kind(kind);
        }

        builder.finalize()
    }
}

/// The request body for changing the status of a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusForm {
    pub status: TransactionStatus,
}

/// Get every transaction, ignoring the filter.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionEndpointState>,
) -> Json<Vec<Transaction>> {
    Json(state.store.transactions())
}

/// Get the transactions that pass the current filter.
pub async fn get_filtered_transactions_endpoint(
    State(state): State<TransactionEndpointState>,
) -> Json<Vec<Transaction>> {
    Json(state.store.filtered_transactions())
}

pub async fn get_transaction_endpoint(
    State(state): State<TransactionEndpointState>,
    PathParam(transaction_id): PathParam<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    state
        .store
        .get_transaction_by_id(transaction_id)
        .map(Json)
        .ok_or(Error::NotFound)
}

/// A route handler for creating a new transaction, responds with the stored
/// transaction and its new ID.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionEndpointState>,
    JsonBody(form): JsonBody<TransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let new_transaction = form.finalize()?;

    let transaction = state.store.add_transaction(new_transaction).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn update_transaction_endpoint(
    State(state): State<TransactionEndpointState>,
    PathParam(transaction_id): PathParam<TransactionId>,
    JsonBody(form): JsonBody<TransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let new_transaction = form.finalize()?;

    state
        .store
        .update_transaction(transaction_id, new_transaction.clone())
        .await?;

    Ok(Json(new_transaction.with_id(transaction_id)))
}

pub async fn update_transaction_status_endpoint(
    State(state): State<TransactionEndpointState>,
    PathParam(transaction_id): PathParam<TransactionId>,
    JsonBody(form): JsonBody<StatusForm>,
) -> Result<Json<Transaction>, Error> {
    state
        .store
        .update_transaction_status(transaction_id, form.status)
        .await?;

    state
        .store
        .get_transaction_by_id(transaction_id)
        .map(Json)
        .ok_or(Error::NotFound)
}

pub async fn delete_transaction_endpoint(
    State(state): State<TransactionEndpointState>,
    PathParam(transaction_id): PathParam<TransactionId>,
) -> Result<StatusCode, Error> {
    state.store.delete_transaction(transaction_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod transaction_endpoint_tests {
    use std::{sync::Arc, time::Duration};

    use axum::{
        Json,
        extract::State,
        http::StatusCode,
        response::IntoResponse,
    };
    use serde_json::json;
    use time::macros::date;

    use crate::{
        extract::{JsonBody, PathParam},
        period::Period,
        remote::RemoteError,
        retry::RetryPolicy,
        store::DomainStore,
        test_utils::{FakeRemoteStore, assert_status, parse_json_body},
        transaction::{Transaction, TransactionStatus, TransactionType},
    };

    use super::{
        StatusForm, TransactionEndpointState, TransactionForm, create_transaction_endpoint,
        delete_transaction_endpoint, get_filtered_transactions_endpoint,
        get_transaction_endpoint, update_transaction_endpoint,
        update_transaction_status_endpoint,
    };

    async fn get_test_state() -> (TransactionEndpointState, FakeRemoteStore) {
        let transactions = vec![
            Transaction::build("Salary", 100.0, date!(2024 - 01 - 05))
                .kind(TransactionType::Income)
                .status(TransactionStatus::Paid)
                .finalize()
                .unwrap()
                .with_id(1),
        ];
        let remote = FakeRemoteStore::with_data(transactions, vec![]);
        let policy = RetryPolicy::no_retry(Duration::from_millis(50));
        let store = DomainStore::new(Box::new(remote.clone()), policy);
        store.load().await.expect("Could not load store");

        (
            TransactionEndpointState {
                store: Arc::new(store),
            },
            remote,
        )
    }

    fn rent_form() -> TransactionForm {
        TransactionForm {
            description: "Rent".to_owned(),
            amount: 1200.0,
            due_date: date!(2024 - 02 - 01),
            status: None,
            kind: None,
            category: Some("Housing".to_owned()),
        }
    }

    #[tokio::test]
    async fn create_responds_with_created_transaction() {
        let (state, _) = get_test_state().await;

        let response = create_transaction_endpoint(State(state.clone()), JsonBody(rent_form()))
            .await
            .into_response();

        assert_status(&response, StatusCode::CREATED);
        let body = parse_json_body(response).await;
        assert_eq!(
            body,
            json!({
                "id": 2,
                "description": "Rent",
                "amount": 1200.0,
                "dueDate": "2024-02-01",
                "status": "pending",
                "type": "expense",
                "category": "Housing",
            })
        );
        assert_eq!(state.store.transactions().len(), 2);
    }

    #[tokio::test]
    async fn create_with_empty_description_is_bad_request() {
        let (state, remote) = get_test_state().await;
        let calls_before = remote.call_count();
        let form = TransactionForm {
            description: "  ".to_owned(),
            ..rent_form()
        };

        let response = create_transaction_endpoint(State(state), JsonBody(form))
            .await
            .into_response();

        assert_status(&response, StatusCode::BAD_REQUEST);
        assert_eq!(remote.call_count(), calls_before);
    }

    #[tokio::test]
    async fn remote_failure_maps_to_gateway_errors() {
        let (state, remote) = get_test_state().await;

        remote.fail_next(RemoteError::Unavailable("busy".to_owned()));
        let response = create_transaction_endpoint(State(state.clone()), JsonBody(rent_form()))
            .await
            .into_response();
        assert_status(&response, StatusCode::SERVICE_UNAVAILABLE);
        let body = parse_json_body(response).await;
        assert_eq!(body["retryable"], json!(true));
        assert_eq!(body["error"], json!("failed to add transaction"));

        remote.fail_next(RemoteError::Rejected("constraint failed".to_owned()));
        let response = create_transaction_endpoint(State(state), JsonBody(rent_form()))
            .await
            .into_response();
        assert_status(&response, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn get_missing_transaction_is_not_found() {
        let (state, _) = get_test_state().await;

        let response = get_transaction_endpoint(State(state), PathParam(42))
            .await
            .into_response();

        assert_status(&response, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_returns_replaced_transaction() {
        let (state, _) = get_test_state().await;

        let response = update_transaction_endpoint(State(state), PathParam(1), JsonBody(rent_form()))
            .await
            .into_response();

        assert_status(&response, StatusCode::OK);
        let body = parse_json_body(response).await;
        assert_eq!(body["id"], json!(1));
        assert_eq!(body["description"], json!("Rent"));
    }

    #[tokio::test]
    async fn update_of_missing_transaction_is_not_found() {
        let (state, _) = get_test_state().await;

        let response = update_transaction_endpoint(State(state), PathParam(42), JsonBody(rent_form()))
            .await
            .into_response();

        assert_status(&response, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn status_update_changes_only_status() {
        let (state, _) = get_test_state().await;

        let response = update_transaction_status_endpoint(
            State(state),
            PathParam(1),
            JsonBody(StatusForm {
                status: TransactionStatus::Overdue,
            }),
        )
        .await
        .into_response();

        assert_status(&response, StatusCode::OK);
        let body = parse_json_body(response).await;
        assert_eq!(body["status"], json!("overdue"));
        assert_eq!(body["description"], json!("Salary"));
    }

    #[tokio::test]
    async fn delete_responds_with_no_content() {
        let (state, remote) = get_test_state().await;

        let response = delete_transaction_endpoint(State(state), PathParam(1))
            .await
            .into_response();

        assert_status(&response, StatusCode::NO_CONTENT);
        assert!(remote.stored_transactions().is_empty());
    }

    #[tokio::test]
    async fn filtered_endpoint_uses_store_filter() {
        let (state, _) = get_test_state().await;
        state
            .store
            .apply_period(Period::SevenDays, date!(2025 - 01 - 01));

        let Json(transactions) = get_filtered_transactions_endpoint(State(state)).await;

        assert!(transactions.is_empty());
    }
}
