use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::ApiError;

/// JSON body extractor that runs `validator` rules before the handler sees
/// the payload. Rejects atomically: nothing downstream runs on invalid input.
pub struct ValidJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = axum::extract::rejection::JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;

        value.validate()?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;

    use crate::requests::dto::UpdateStatusRequest;

    fn json_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn rejection(body: &'static str) -> ApiError {
        ValidJson::<UpdateStatusRequest>::from_request(json_request(body), &())
            .await
            .map(|_| ())
            .unwrap_err()
    }

    #[tokio::test]
    async fn unknown_status_value_rejects_with_envelope() {
        let response = rejection(r#"{"status":"completed"}"#).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn malformed_json_rejects_with_bad_request() {
        let err = rejection(r#"{"status":"#).await;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
