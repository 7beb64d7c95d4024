//! JSON endpoints for savings goals.

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
    database_id::GoalId,
    extract::{JsonBody, PathParam},
    goal::{FinancialGoal, GoalKind, NewGoal},
    store::DomainStore,
};

/// The state needed by the goal endpoints.
#[derive(Clone)]
pub struct GoalEndpointState {
    pub store: Arc<DomainStore>,
}

impl FromRef<AppState> for GoalEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }
}

/// The request body for creating a goal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalForm {
    pub title: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub deadline: Date,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    #[serde(default)]
    pub installments: Option<u32>,
}

impl GoalForm {
    fn finalize(self) -> Result<NewGoal, Error> {
        FinancialGoal::build(&self.title, self.target_amount, self.deadline)
            .current_amount(self.current_amount)
            .plan(self.kind, self.installments)
            .finalize()
    }
}

/// The request body for adding progress to a goal.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressForm {
    pub amount: f64,
}

pub async fn get_goals_endpoint(
    State(state): State<GoalEndpointState>,
) -> Json<Vec<FinancialGoal>> {
    Json(state.store.goals())
}

/// A route handler for creating a new goal, responds with the stored goal
/// and its new ID.
pub async fn create_goal_endpoint(
    State(state): State<GoalEndpointState>,
    JsonBody(form): JsonBody<GoalForm>,
) -> Result<(StatusCode, Json<FinancialGoal>), Error> {
    let new_goal = form.finalize()?;

    let goal = state.store.add_goal(new_goal).await?;

    Ok((StatusCode::CREATED, Json(goal)))
}

/// Add progress to a goal, responds with the updated goal.
///
/// Unknown goals are reported as not found.
pub async fn update_goal_progress_endpoint(
    State(state): State<GoalEndpointState>,
    PathParam(goal_id): PathParam<GoalId>,
    JsonBody(form): JsonBody<ProgressForm>,
) -> Result<Json<FinancialGoal>, Error> {
    state
        .store
        .update_goal_progress(goal_id, form.amount)
        .await?
        .map(Json)
        .ok_or(Error::NotFound)
}

pub async fn pay_installment_endpoint(
    State(state): State<GoalEndpointState>,
    PathParam(goal_id): PathParam<GoalId>,
) -> Result<Json<FinancialGoal>, Error> {
    state
        .store
        .pay_installment(goal_id)
        .await?
        .map(Json)
        .ok_or(Error::NotFound)
}

#[cfg(test)]
mod goal_endpoint_tests {
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
        goal::{FinancialGoal, GoalKind},
        retry::RetryPolicy,
        store::DomainStore,
        test_utils::{FakeRemoteStore, assert_status, parse_json_body},
    };

    use super::{
        GoalEndpointState, GoalForm, ProgressForm, create_goal_endpoint, get_goals_endpoint,
        pay_installment_endpoint, update_goal_progress_endpoint,
    };

    async fn get_test_state() -> GoalEndpointState {
        let goals = vec![
            FinancialGoal::build("Emergency fund", 1000.0, date!(2024 - 06 - 30))
                .current_amount(900.0)
                .finalize()
                .unwrap()
                .with_id(1),
            FinancialGoal::build("Holiday", 1000.0, date!(2024 - 12 - 01))
                .installments(4)
                .finalize()
                .unwrap()
                .with_id(2),
        ];
        let remote = FakeRemoteStore::with_data(vec![], goals);
        let policy = RetryPolicy::no_retry(Duration::from_millis(50));
        let store = DomainStore::new(Box::new(remote), policy);
        store.load().await.expect("Could not load store");

        GoalEndpointState {
            store: Arc::new(store),
        }
    }

    #[tokio::test]
    async fn lists_goals_by_deadline() {
        let state = get_test_state().await;

        let Json(goals) = get_goals_endpoint(State(state)).await;

        let ids: Vec<_> = goals.iter().map(|goal| goal.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn create_installment_goal_reports_installment_amount() {
        let state = get_test_state().await;
        let form = GoalForm {
            title: "Bike".to_owned(),
            target_amount: 600.0,
            current_amount: 0.0,
            deadline: date!(2024 - 09 - 01),
            kind: GoalKind::Installment,
            installments: Some(3),
        };

        let response = create_goal_endpoint(State(state), JsonBody(form))
            .await
            .into_response();

        assert_status(&response, StatusCode::CREATED);
        let body = parse_json_body(response).await;
        assert_eq!(body["type"], json!("installment"));
        assert_eq!(body["installmentAmount"], json!(200.0));
        assert_eq!(body["deadline"], json!("2024-09-01"));
    }

    #[tokio::test]
    async fn create_installment_goal_without_count_is_bad_request() {
        let state = get_test_state().await;
        let form = GoalForm {
            title: "Bike".to_owned(),
            target_amount: 600.0,
            current_amount: 0.0,
            deadline: date!(2024 - 09 - 01),
            kind: GoalKind::Installment,
            installments: None,
        };

        let response = create_goal_endpoint(State(state), JsonBody(form))
            .await
            .into_response();

        assert_status(&response, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn progress_is_clamped_to_target() {
        let state = get_test_state().await;

        let response = update_goal_progress_endpoint(
            State(state),
            PathParam(1),
            JsonBody(ProgressForm { amount: 300.0 }),
        )
        .await
        .into_response();

        assert_status(&response, StatusCode::OK);
        let body = parse_json_body(response).await;
        assert_eq!(body["currentAmount"], json!(1000.0));
        assert_eq!(body["progressPercentage"], json!(100.0));
    }

    #[tokio::test]
    async fn progress_for_unknown_goal_is_not_found() {
        let state = get_test_state().await;

        let response = update_goal_progress_endpoint(
            State(state),
            PathParam(99),
            JsonBody(ProgressForm { amount: 10.0 }),
        )
        .await
        .into_response();

        assert_status(&response, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn negative_progress_is_bad_request() {
        let state = get_test_state().await;

        let response = update_goal_progress_endpoint(
            State(state),
            PathParam(1),
            JsonBody(ProgressForm { amount: -10.0 }),
        )
        .await
        .into_response();

        assert_status(&response, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn installment_payment_adds_one_installment() {
        let state = get_test_state().await;

        let response = pay_installment_endpoint(State(state), PathParam(2))
            .await
            .into_response();

        assert_status(&response, StatusCode::OK);
        let body = parse_json_body(response).await;
        assert_eq!(body["currentAmount"], json!(250.0));
    }

    #[tokio::test]
    async fn installment_payment_on_one_time_goal_is_bad_request() {
        let state = get_test_state().await;

        let response = pay_installment_endpoint(State(state), PathParam(1))
            .await
            .into_response();

        assert_status(&response, StatusCode::BAD_REQUEST);
    }
}
