use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::ConflictDetails;
use domain::services::PolicyViolation;
use serde::Serialize;
use thiserror::Error;

/// Index backing the active-idempotency invariant; unique violations on it
/// mean a duplicate submission, not a generic conflict.
const IDEMPOTENCY_INDEX: &str = "bookings_active_idem_key";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        details: Option<ConflictDetails>,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
            details: None,
        }
    }

    pub fn conflict_with(message: impl Into<String>, details: ConflictDetails) -> Self {
        ApiError::Conflict {
            message: message.into(),
            details: Some(details),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    conflict_details: Option<ConflictDetails>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict { message, details } => {
                (StatusCode::CONFLICT, "conflict", message, details)
            }
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg, None),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            conflict_details: details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some("23505") {
                    if db_err.constraint() == Some(IDEMPOTENCY_INDEX) {
                        ApiError::conflict("Duplicate submission")
                    } else {
                        ApiError::conflict("Resource already exists")
                    }
                } else if db_err.code().as_deref() == Some("23503") {
                    ApiError::NotFound("Referenced resource not found".into())
                } else {
                    ApiError::Internal(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<PolicyViolation> for ApiError {
    fn from(violation: PolicyViolation) -> Self {
        match violation {
            PolicyViolation::BeyondHorizon { .. } | PolicyViolation::FullDayRequiresClub => {
                ApiError::Forbidden(violation.to_string())
            }
            PolicyViolation::StartsInPast
            | PolicyViolation::EmptyWindow
            | PolicyViolation::OutsideOperatingHours { .. }
            | PolicyViolation::TooShort { .. }
            | PolicyViolation::TooLong { .. } => ApiError::Validation(violation.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    format!(
                        "{}: {}",
                        field,
                        e.message.as_ref().map(|m| m.to_string()).unwrap_or_default()
                    )
                })
            })
            .collect();

        ApiError::Validation(messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::UserType;

    #[test]
    fn forbidden_maps_to_403() {
        let response = ApiError::Forbidden("not yours".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError::NotFound("missing".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_maps_to_409() {
        let response = ApiError::conflict("taken").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_maps_to_400() {
        let response = ApiError::Validation("bad input".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_maps_to_500() {
        let response = ApiError::Internal("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unavailable_maps_to_503() {
        let response = ApiError::ServiceUnavailable("db down".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn conflict_keeps_details() {
        let details = ConflictDetails {
            booked_by: "Roobooru".into(),
            club_name: Some("Roobooru".into()),
            user_type: UserType::Club,
            starts_at: "2025-06-02T00:00:00Z".parse().unwrap(),
            ends_at: "2025-06-02T23:30:00Z".parse().unwrap(),
        };
        match ApiError::conflict_with("day taken", details) {
            ApiError::Conflict { details: Some(d), .. } => assert_eq!(d.booked_by, "Roobooru"),
            other => panic!("expected conflict with details, got {:?}", other),
        }
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, ApiError::NotFound(_)));
    }

    #[test]
    fn horizon_violation_is_forbidden() {
        let error: ApiError = PolicyViolation::BeyondHorizon { horizon_days: 7 }.into();
        assert!(matches!(error, ApiError::Forbidden(_)));
    }

    #[test]
    fn full_day_violation_is_forbidden() {
        let error: ApiError = PolicyViolation::FullDayRequiresClub.into();
        assert!(matches!(error, ApiError::Forbidden(_)));
    }

    #[test]
    fn temporal_violations_are_validation_errors() {
        for violation in [
            PolicyViolation::StartsInPast,
            PolicyViolation::EmptyWindow,
            PolicyViolation::TooShort { min_minutes: 30 },
            PolicyViolation::TooLong { max_minutes: 120 },
        ] {
            let error: ApiError = violation.into();
            assert!(matches!(error, ApiError::Validation(_)));
        }
    }
}
