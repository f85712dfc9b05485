//! Request extractors

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// JSON body that is deserialized and then validated
///
/// Malformed JSON, a wrong content type, missing fields and failed
/// validation rules all become a 400 [`AppError::Validation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::Validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| AppError::Validation(describe(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

/// Path parameters whose parse failures become a 400 [`AppError::BadRequest`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| AppError::BadRequest(rejection.body_text()))?;

        Ok(ValidPath(value))
    }
}

/// Flatten validation errors into `field: message` pairs, sorted by field
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{field}: {}", messages.join(", "))
        })
        .collect();
    fields.sort();
    fields.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RegisterRequest;
    use axum::{body::Body, http::header};

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let req = json_request(r#"{"username":"alice","password":"secret123"}"#);
        let ValidatedJson(body) = ValidatedJson::<RegisterRequest>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(body.username, "alice");
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let req = json_request(r#"{"username":"alice"}"#);
        let result = ValidatedJson::<RegisterRequest>::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_field_names_the_field() {
        let req = json_request(r#"{"username":"","password":""}"#);
        match ValidatedJson::<RegisterRequest>::from_request(req, &()).await {
            Err(AppError::Validation(details)) => {
                assert_eq!(
                    details,
                    "password: password must not be empty; username: username must not be empty"
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let req = json_request("{not json");
        let result = ValidatedJson::<RegisterRequest>::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_path_parse_failure_is_bad_request() {
        use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
        use tower::ServiceExt;

        let app = Router::new().route(
            "/items/:id",
            get(|ValidPath(id): ValidPath<i64>| async move { id.to_string() }),
        );

        let ok = app
            .clone()
            .oneshot(axum::http::Request::builder().uri("/items/7").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let response = app
            .oneshot(axum::http::Request::builder().uri("/items/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "BAD_REQUEST");

        // Same mapping outside a router
        assert_eq!(
            AppError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
