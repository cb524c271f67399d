//! JSON error responses.
//!
//! Every failure leaves the API as `{"error": <code>, "message": <text>}`.
//! Server errors are logged and their message is replaced.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use tripsplit_core::LedgerError;
use tripsplit_shared::{AppError, JwtError};

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// An error ready to be rendered as a JSON response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 400 with `INVALID_INPUT`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", message)
    }

    /// 401 with the given code.
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::new(
            status_from(err.http_status_code()),
            err.error_code(),
            err.to_string(),
        )
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::new(
            status_from(err.status_code()),
            err.error_code(),
            err.to_string(),
        )
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::unauthorized("TOKEN_EXPIRED", "Token has expired"),
            JwtError::DecodingError(_) => {
                Self::unauthorized("INVALID_TOKEN", "Invalid or malformed token")
            }
            JwtError::EncodingError(e) => AppError::Internal(e).into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            error!(code = self.code, error = %self.message, "Request failed");
            "An internal error occurred".to_string()
        } else {
            self.message
        };

        (
            self.status,
            Json(json!({ "error": self.code, "message": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use tripsplit_core::StoreError;
    use tripsplit_core::split::SplitError;
    use tripsplit_shared::types::TripId;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[case(LedgerError::SelfSettlement, StatusCode::BAD_REQUEST, "SELF_SETTLEMENT")]
    #[case(LedgerError::InvalidCredentials, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")]
    #[case(LedgerError::NotMember(TripId::new()), StatusCode::FORBIDDEN, "NOT_A_MEMBER")]
    #[case(LedgerError::TripNotFound(TripId::new()), StatusCode::NOT_FOUND, "TRIP_NOT_FOUND")]
    #[case(LedgerError::EmailTaken("a@b.c".into()), StatusCode::CONFLICT, "EMAIL_TAKEN")]
    #[case(
        LedgerError::Split(SplitError::EmptyParticipants),
        StatusCode::BAD_REQUEST,
        "EMPTY_PARTICIPANTS"
    )]
    fn test_ledger_error_mapping(
        #[case] err: LedgerError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let api = ApiError::from(err);
        assert_eq!(api.status(), status);
        assert_eq!(api.code(), code);
    }

    #[tokio::test]
    async fn test_client_error_keeps_message() {
        let response = ApiError::from(LedgerError::SelfSettlement).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "SELF_SETTLEMENT");
        assert_eq!(body["message"], "Debtor and creditor must be different users");
    }

    #[tokio::test]
    async fn test_server_error_masks_message() {
        let response =
            ApiError::from(LedgerError::Store(StoreError::backend("connection reset"))).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "STORE_ERROR");
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let api = ApiError::from(JwtError::Expired);
        assert_eq!(api.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(api.code(), "TOKEN_EXPIRED");
    }
}
