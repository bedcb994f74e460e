use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use error_stack::Report;
use kernel::KernelError;
use serde::Serialize;

#[derive(Debug)]
pub struct StackTrace(Report<KernelError>);

impl From<Report<KernelError>> for StackTrace {
    fn from(e: Report<KernelError>) -> Self {
        StackTrace(e)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    name: &'static str,
    message: String,
}

#[derive(Debug)]
pub struct ErrorStatus(Report<KernelError>);

impl From<Report<KernelError>> for ErrorStatus {
    fn from(e: Report<KernelError>) -> Self {
        ErrorStatus(e)
    }
}

impl IntoResponse for ErrorStatus {
    fn into_response(self) -> axum::response::Response {
        let context = self.0.current_context();
        let status = match context {
            KernelError::UserNotFound
            | KernelError::RentalNotFound
            | KernelError::MovieNotFound => StatusCode::NOT_FOUND,
            KernelError::PendentRental | KernelError::MovieInRental => StatusCode::CONFLICT,
            KernelError::AgeRestriction => StatusCode::FORBIDDEN,
            KernelError::Timeout => StatusCode::REQUEST_TIMEOUT,
            KernelError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            name: context.name(),
            message: context.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
