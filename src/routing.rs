//! Application router configuration.

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};

use crate::{
    AppState, Error, endpoints,
    filter_endpoints::{
        apply_period_endpoint, get_filter_endpoint, reset_filter_endpoint, set_filter_endpoint,
    },
    goal::{
        create_goal_endpoint, get_goals_endpoint, pay_installment_endpoint,
        update_goal_progress_endpoint,
    },
    report_endpoints::{get_categories_endpoint, get_status_endpoint, get_summary_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint,
        get_filtered_transactions_endpoint, get_transaction_endpoint, get_transactions_endpoint,
        update_transaction_endpoint, update_transaction_status_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::FILTERED_TRANSACTIONS,
            get(get_filtered_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION_STATUS,
            put(update_transaction_status_endpoint),
        )
        .route(
            endpoints::GOALS,
            get(get_goals_endpoint).post(create_goal_endpoint),
        )
        .route(
            endpoints::GOAL_PROGRESS,
            post(update_goal_progress_endpoint),
        )
        .route(endpoints::GOAL_INSTALLMENT, post(pay_installment_endpoint))
        .route(
            endpoints::FILTER,
            get(get_filter_endpoint)
                .put(set_filter_endpoint)
                .delete(reset_filter_endpoint),
        )
        .route(endpoints::FILTER_PERIOD, post(apply_period_endpoint))
        .route(endpoints::CATEGORIES, get(get_categories_endpoint))
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .route(endpoints::STATUS, get(get_status_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
