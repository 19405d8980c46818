//! Maps service failures onto HTTP status codes
//!
//! | failure                                   | status |
//! |-------------------------------------------|--------|
//! | not found                                 | 404    |
//! | conflict (spot taken)                     | 409    |
//! | validation                                | 422    |
//! | transient failures outlasting every retry | 503    |
//! | anything else                             | 500    |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::application::ServiceError;
use crate::infrastructure::database::{TransactionError, TransactionFailure};
use crate::support::{AppError, DomainError, InfraError};

#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl<E: Into<ServiceError>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

fn domain_status(e: &DomainError) -> StatusCode {
    match e {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn transaction_status(e: &TransactionError) -> StatusCode {
    match (e.kind(), e.domain_error()) {
        (TransactionFailure::Rejected, Some(domain)) => domain_status(domain),
        (TransactionFailure::RetriesExhausted, _) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::App(AppError::Domain(e)) => domain_status(e),
            ServiceError::App(AppError::Infra(InfraError::Timeout(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ServiceError::App(AppError::Infra(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Transaction(e) => transaction_status(e),
        }
    }

    /// Client-facing message; store internals stay in the log.
    fn message(&self, status: StatusCode) -> String {
        match status {
            StatusCode::SERVICE_UNAVAILABLE => {
                "Service temporarily unavailable, please retry".to_string()
            }
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => match &self.0 {
                ServiceError::App(AppError::Domain(e)) => e.to_string(),
                ServiceError::Transaction(e) => e
                    .domain_error()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| e.to_string()),
                other => other.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "Request failed");
        }
        let body = ApiResponse::<()>::error(self.message(status));
        (status, Json(body)).into_response()
    }
}
