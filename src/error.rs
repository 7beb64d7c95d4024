//! Defines the app level error type and its conversion to JSON responses.

use std::fmt::Display;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{database_id::GoalId, remote::RemoteError};

/// The remote calls the [DomainStore](crate::DomainStore) makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    FetchTransactions,
    FetchGoals,
    AddTransaction,
    UpdateTransaction,
    DeleteTransaction,
    UpdateTransactionStatus,
    AddGoal,
    UpdateGoalProgress,
}

impl StoreOperation {
    /// Whether running the operation twice leaves the remote store the same as
    /// running it once.
    ///
    /// Inserts are not idempotent: an insert that timed out may have been stored.
    pub fn is_idempotent(self) -> bool {
        !matches!(self, Self::AddTransaction | Self::AddGoal)
    }
}

impl Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description = match self {
            Self::FetchTransactions => "fetch transactions",
            Self::FetchGoals => "fetch goals",
            Self::AddTransaction => "add transaction",
            Self::UpdateTransaction => "update transaction",
            Self::DeleteTransaction => "delete transaction",
            Self::UpdateTransactionStatus => "update transaction status",
            Self::AddGoal => "add goal",
            Self::UpdateGoalProgress => "update goal progress",
        };

        f.write_str(description)
    }
}

/// The errors that may occur in the application.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transaction was given an empty or whitespace-only description.
    #[error("description cannot be empty")]
    EmptyDescription,

    /// A transaction amount was zero, negative or not a number.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    InvalidAmount(f64),

    /// A string could not be parsed as a transaction type.
    #[error("\"{0}\" is not a transaction type, expected \"income\" or \"expense\"")]
    InvalidTransactionType(String),

    /// A string could not be parsed as a transaction status.
    #[error("\"{0}\" is not a transaction status, expected \"pending\", \"paid\" or \"overdue\"")]
    InvalidTransactionStatus(String),

    /// A goal was given an empty or whitespace-only title.
    #[error("goal title cannot be empty")]
    EmptyGoalTitle,

    /// A goal target was zero, negative or not a number.
    #[error("{0} is not a valid target amount, targets must be greater than zero")]
    InvalidTargetAmount(f64),

    /// A goal was created with a negative saved amount or more than its target.
    #[error("{0} is not a valid current amount, it must be between zero and the target")]
    InvalidCurrentAmount(f64),

    /// An installment goal had no positive installment count, or a one-time goal had one.
    #[error("{0:?} is not a valid number of installments for this goal type")]
    InvalidInstallments(Option<u32>),

    /// A string could not be parsed as a goal type.
    #[error("\"{0}\" is not a goal type, expected \"one-time\" or \"installment\"")]
    InvalidGoalKind(String),

    /// Goal progress must be added in positive amounts.
    #[error("{0} is not a valid progress amount, it must be greater than zero")]
    InvalidProgressAmount(f64),

    /// An installment was paid towards a goal that is not split into installments.
    #[error("goal {0} is not an installment goal")]
    NotAnInstallmentGoal(GoalId),

    /// A request body or path parameter could not be read, e.g. the body
    /// was not valid JSON or an ID was not a number.
    #[error("{message}")]
    InvalidRequest { status: StatusCode, message: String },

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The configured timezone is not a valid canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// A call to the remote store failed.
    ///
    /// The in-memory state is left as it was before the call.
    #[error("failed to {operation}")]
    RemoteOperationFailed {
        operation: StoreOperation,
        #[source]
        source: RemoteError,
    },
}

impl Error {
    /// Whether repeating the action that caused this error could succeed.
    ///
    /// A timed out insert is not retryable since it may already have been
    /// stored, reload to find out.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RemoteOperationFailed {
                operation,
                source: RemoteError::Timeout(_),
            } => operation.is_idempotent(),
            Error::RemoteOperationFailed { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound
            | Error::RemoteOperationFailed {
                source: RemoteError::MissingRow,
                ..
            } => StatusCode::NOT_FOUND,
            Error::RemoteOperationFailed { source, .. } if source.is_retryable() => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Error::RemoteOperationFailed { .. } => StatusCode::BAD_GATEWAY,
            Error::InvalidRequest { status, .. } => *status,
            Error::InvalidTimezone(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (
            status_code,
            Json(json!({
                "error": self.to_string(),
                "retryable": self.is_retryable(),
            })),
        )
            .into_response()
    }
}
