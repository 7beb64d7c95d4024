//! JSON endpoints for reading and changing the transaction filter.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::Deserialize;

use crate::{
    AppState, Error, extract::JsonBody, filter::TransactionFilter, period::Period,
    store::DomainStore, timezone::current_local_date,
};

/// The state needed by the filter endpoints.
#[derive(Clone)]
pub struct FilterEndpointState {
    pub store: Arc<DomainStore>,
    /// The canonical timezone name used to decide what "today" is.
    pub local_timezone: String,
}

impl FromRef<AppState> for FilterEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The request body for applying a period preset.
#[derive(Debug, Clone, Deserialize)]
pub struct PeriodForm {
    pub period: Period,
}

pub async fn get_filter_endpoint(
    State(state): State<FilterEndpointState>,
) -> Json<TransactionFilter> {
    Json(state.store.filter())
}

/// Replace the whole filter. Fields missing from the body take their default.
pub async fn set_filter_endpoint(
    State(state): State<FilterEndpointState>,
    JsonBody(filter): JsonBody<TransactionFilter>,
) -> Json<TransactionFilter> {
    state.store.set_filter(filter.clone());

    Json(filter)
}

pub async fn reset_filter_endpoint(
    State(state): State<FilterEndpointState>,
) -> Json<TransactionFilter> {
    state.store.reset_filter();

    Json(TransactionFilter::default())
}

/// Set the filter's date bounds from a period preset relative to today in the
/// server's timezone.
pub async fn apply_period_endpoint(
    State(state): State<FilterEndpointState>,
    JsonBody(form): JsonBody<PeriodForm>,
) -> Result<Json<TransactionFilter>, Error> {
    let today = current_local_date(&state.local_timezone)?;

    Ok(Json(state.store.apply_period(form.period, today)))
}
