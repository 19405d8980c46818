//! JSON body extractor that also runs `validator` rules
//!
//! Bodies that fail their rules are turned into a validation [`ApiError`], so
//! they get the same 422 envelope as a validation failure raised deeper in
//! the service. Malformed JSON keeps the status axum picked (400, 415 or 422).

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::{ApiError, ApiResponse};
use crate::application::ServiceError;
use crate::support::{AppError, DomainError};

/// `Json<T>` whose value already passed `T::validate()`.
///
/// ```ignore
/// async fn create_report(
///     State(service): State<ParkingService>,
///     ValidatedJson(body): ValidatedJson<CreateReportRequest>,
/// ) -> Result<impl IntoResponse, ApiError> { ... }
/// ```
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    Malformed(JsonRejection),
    Invalid(ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Malformed(rejection) => {
                let body = ApiResponse::<()>::error(format!("Invalid JSON: {}", rejection.body_text()));
                (rejection.status(), Json(body)).into_response()
            }
            Self::Invalid(errors) => {
                let domain = DomainError::Validation(describe(&errors));
                ApiError(ServiceError::App(AppError::Domain(domain))).into_response()
            }
        }
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Malformed)?;
        value.validate().map_err(ValidatedJsonRejection::Invalid)?;
        Ok(Self(value))
    }
}

/// One `path: message` line per failed rule, sorted so the output is stable.
/// Nested failures are addressed as `updates[3].spot_id`.
fn describe(errors: &ValidationErrors) -> String {
    let mut lines = Vec::new();
    collect(errors, "", &mut lines);
    lines.sort();
    if lines.is_empty() {
        "request body failed validation".to_string()
    } else {
        lines.join("; ")
    }
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            (*field).to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(rules) => {
                out.extend(rules.iter().map(|rule| {
                    let message = rule
                        .message
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| rule.code.to_string());
                    format!("{path}: {message}")
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(Debug, Serialize, Deserialize, Validate)]
    struct Reading {
        #[validate(length(min = 1, message = "spot_id is required"))]
        spot_id: String,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Batch {
        #[validate(range(min = 1, max = 72))]
        hours: u32,
        #[validate(length(min = 1), nested)]
        readings: Vec<Reading>,
    }

    async fn post_raw(body: &'static str, content_type: Option<&str>) -> (StatusCode, Value) {
        let app = Router::new().route(
            "/batch",
            post(|ValidatedJson(batch): ValidatedJson<Batch>| async move {
                batch.readings.len().to_string()
            }),
        );
        let mut request = Request::builder().method("POST").uri("/batch");
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }
        let response = app
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn valid_body_reaches_the_handler() {
        let (status, _) = post_raw(
            r#"{"hours": 3, "readings": [{"spot_id": "A-12"}]}"#,
            Some("application/json"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_keeps_axum_status() {
        let (status, body) = post_raw("not json", Some("application/json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = post_raw(r#"{"hours": 3, "readings": []}"#, None).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn rule_failures_use_the_validation_envelope() {
        let (status, body) = post_raw(
            r#"{"hours": 0, "readings": [{"spot_id": "A-1"}, {"spot_id": ""}]}"#,
            Some("application/json"),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("hours: range"), "{message}");
        assert!(message.contains("readings[1].spot_id: spot_id is required"), "{message}");
    }

    #[test]
    fn describe_sorts_lines() {
        let batch = Batch {
            hours: 0,
            readings: vec![],
        };
        let errors = batch.validate().unwrap_err();
        assert_eq!(describe(&errors), "hours: range; readings: length");
    }
}
