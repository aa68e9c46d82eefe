//! Request body validation
//!
//! [`ValidatedJson`] deserializes a JSON body and runs [`Validate`] on it, so
//! handlers only ever see well-formed input. Both failures become
//! [`AppError::Validation`] (400) before any storage access happens.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::AppError;

/// Input rules for a request body
pub trait Validate {
    /// Return one detail object per violated rule
    fn validate(&self) -> Result<(), Vec<serde_json::Value>>;
}

/// Collects rule violations as `{"field": ..., "error": ...}` details
#[derive(Debug, Default)]
pub struct Violations {
    details: Vec<serde_json::Value>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, error: impl Into<String>) {
        self.details.push(json!({
            "field": field,
            "error": error.into(),
        }));
    }

    /// Require non-blank text of at most `max_chars` characters
    pub fn text(&mut self, field: &str, value: &str, max_chars: usize) {
        if value.trim().is_empty() {
            self.add(field, "required");
        } else if value.chars().count() > max_chars {
            self.add(
                field,
                format!("must be at most {} characters long", max_chars),
            );
        }
    }

    pub fn finish(self) -> Result<(), Vec<serde_json::Value>> {
        if self.details.is_empty() {
            Ok(())
        } else {
            Err(self.details)
        }
    }
}

/// JSON body extractor that enforces [`Validate`]
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::validation(
                    vec![json!({ "field": "body", "error": rejection.body_text() })],
                    "request body could not be read",
                )
            })?;

        value
            .validate()
            .map_err(|details| AppError::validation(details, "request validation failed"))?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        routing::post,
        Router,
    };
    use http_body_util::BodyExt;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Label {
        text: String,
    }

    impl Validate for Label {
        fn validate(&self) -> Result<(), Vec<serde_json::Value>> {
            let mut violations = Violations::new();
            violations.text("text", &self.text, 5);
            violations.finish()
        }
    }

    async fn echo(ValidatedJson(label): ValidatedJson<Label>) -> String {
        label.text
    }

    async fn send(body: &str) -> (StatusCode, String) {
        let app = Router::new().route("/", post(echo));
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn text_rules() {
        let mut violations = Violations::new();
        violations.text("a", "   ", 5);
        violations.text("b", "toolong", 5);
        violations.text("c", "ñññññ", 5);

        let details = violations.finish().unwrap_err();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0], json!({"field": "a", "error": "required"}));
        assert_eq!(details[1]["field"], "b");
    }

    #[tokio::test]
    async fn accepts_valid_body() {
        let (status, body) = send(r#"{"text":"ok"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn rule_violation_is_bad_request() {
        let (status, body) = send(r#"{"text":"far too long"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("validation_error"));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (status, _) = send(r#"{"wrong":1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send("not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
