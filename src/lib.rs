//! Fintrack keeps track of income, expenses and savings goals.
//!
//! The [DomainStore] holds the transactions and goals of a session in memory
//! and keeps them in step with a [RemoteStore], which is SQLite by default.
//! This library also provides a JSON REST API over the store.

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod database_id;
mod db;
mod endpoints;
mod error;
mod extract;
mod filter;
mod filter_endpoints;
mod goal;
mod logging;
mod period;
mod remote;
mod report_endpoints;
mod retry;
mod routing;
mod store;
mod summary;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use database_id::{DatabaseId, GoalId, TransactionId};
pub use db::initialize as initialize_db;
pub use error::{Error, StoreOperation};
pub use filter::{Selection, TransactionFilter};
pub use goal::{FinancialGoal, GoalBuilder, GoalKind, NewGoal};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use period::{DateRange, Period};
pub use remote::{RemoteError, RemoteStore, SqliteRemoteStore};
pub use retry::RetryPolicy;
pub use routing::build_router;
pub use store::DomainStore;
pub use summary::{CategoryTotal, MonthTotal, Summary, totals_by_category, totals_by_month};
pub use transaction::{
    NewTransaction, Transaction, TransactionBuilder, TransactionStatus, TransactionType,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for Ctrl+C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not listen for the terminate signal: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
