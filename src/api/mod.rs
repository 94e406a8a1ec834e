//! Session HTTP API
//!
//! Exposes the state machine intents as routes and answers every call with
//! the current [`View`].

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde_json::json;
use tracing::warn;

use crate::collector::PreferenceForm;
use crate::models::TripId;
use crate::presenter::View;
use crate::session::Controller;
use crate::{TransitionError, TripAiError};

pub mod proxy;

/// Error answer shared by the session API and the planner proxy
pub struct ApiError(TripAiError);

impl From<TripAiError> for ApiError {
    fn from(err: TripAiError) -> Self {
        Self(err)
    }
}

/// Malformed or mistyped request bodies answer like any other invalid input
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(TripAiError::validation(rejection.body_text()))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            TripAiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TripAiError::Transition(TransitionError::UnknownTrip(_)) => StatusCode::NOT_FOUND,
            TripAiError::Transition(_) => StatusCode::CONFLICT,
            TripAiError::Network { .. } | TripAiError::Schema { .. } => StatusCode::BAD_GATEWAY,
            TripAiError::Config { .. } | TripAiError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed with {}: {}", status, self.0);
        }
        let body = Json(json!({
            "detail": self.0.user_message(),
            "error": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

type ApiResult = Result<Json<View>, ApiError>;

pub fn router(controller: Arc<Controller>) -> Router {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/start", post(start))
        .route("/session/submit", post(submit))
        .route("/session/select/{id}", post(select))
        .route("/session/back", post(back))
        .route("/session/start-over", post(start_over))
        .route("/session/landing", post(go_to_landing))
        .with_state(controller)
}

async fn get_session(State(controller): State<Arc<Controller>>) -> Json<View> {
    Json(controller.view().await)
}

async fn start(State(controller): State<Arc<Controller>>) -> ApiResult {
    controller.start().await?;
    Ok(Json(controller.view().await))
}

async fn submit(
    State(controller): State<Arc<Controller>>,
    payload: Result<Json<PreferenceForm>, JsonRejection>,
) -> ApiResult {
    let Json(form) = payload?;
    let preferences = form.collect()?;
    Ok(Json(controller.dispatch_submit(preferences).await?))
}

async fn select(State(controller): State<Arc<Controller>>, Path(id): Path<String>) -> ApiResult {
    let trip_id = TripId::from(id.as_str());
    Ok(Json(controller.dispatch_select(&trip_id).await?))
}

async fn back(State(controller): State<Arc<Controller>>) -> ApiResult {
    controller.back().await?;
    Ok(Json(controller.view().await))
}

async fn start_over(State(controller): State<Arc<Controller>>) -> Json<View> {
    controller.start_over().await;
    Json(controller.view().await)
}

async fn go_to_landing(State(controller): State<Arc<Controller>>) -> Json<View> {
    controller.go_to_landing().await;
    Json(controller.view().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Enrichment, TravelPreferences, TripRecommendation};
    use crate::planner::RecommendationClient;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use serde_json::Value;
    use tower::ServiceExt;

    struct UnreachablePlanner;

    #[async_trait]
    impl RecommendationClient for UnreachablePlanner {
        async fn fetch_destinations(
            &self,
            _prefs: &TravelPreferences,
        ) -> crate::Result<Vec<TripRecommendation>> {
            Err(TripAiError::network("connection refused"))
        }

        async fn fetch_itinerary(
            &self,
            _destination: &str,
            _prefs: &TravelPreferences,
        ) -> crate::Result<Enrichment> {
            Err(TripAiError::network("connection refused"))
        }
    }

    fn app() -> Router {
        router(Arc::new(Controller::new(Arc::new(UnreachablePlanner))))
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn submit_raw(app: &Router, body: &'static str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/session/submit")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (TripAiError::validation("bad"), StatusCode::UNPROCESSABLE_ENTITY),
            (TripAiError::network("down"), StatusCode::BAD_GATEWAY),
            (TripAiError::schema("bad json"), StatusCode::BAD_GATEWAY),
            (
                TransitionError::UnknownTrip("x".to_string()).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                TransitionError::StaleCompletion { ticket: 1 }.into(),
                StatusCode::CONFLICT,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn test_initial_session_is_landing() {
        let (status, body) = call(&app(), "GET", "/session", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "LANDING");
    }

    #[tokio::test]
    async fn test_start_moves_to_input() {
        let app = app();
        let (status, body) = call(&app, "POST", "/session/start", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "INPUT");
    }

    #[tokio::test]
    async fn test_invalid_intent_conflicts() {
        let (status, body) = call(&app(), "POST", "/session/back", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["detail"].as_str().unwrap().contains("LANDING"));
    }

    #[tokio::test]
    async fn test_invalid_form_is_unprocessable() {
        let app = app();
        call(&app, "POST", "/session/start", None).await;
        let form = serde_json::json!({ "startDate": "2024-06-03", "endDate": "2024-06-01" });
        let (status, _) = call(&app, "POST", "/session/submit", Some(form)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, body) = call(&app, "GET", "/session", None).await;
        assert_eq!(body["step"], "INPUT");
    }

    #[rstest]
    #[case::malformed("{not json")]
    #[case::negative_travelers(
        r#"{"startDate":"2024-06-01","endDate":"2024-06-03","travelers":-1}"#
    )]
    #[tokio::test]
    async fn test_unreadable_form_is_unprocessable(#[case] body: &'static str) {
        let app = app();
        call(&app, "POST", "/session/start", None).await;

        let (status, body) = submit_raw(&app, body).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().starts_with("Invalid input"));
        let (_, session) = call(&app, "GET", "/session", None).await;
        assert_eq!(session["step"], "INPUT");
    }

    #[tokio::test]
    async fn test_submit_answers_loading_then_settles() {
        let app = app();
        call(&app, "POST", "/session/start", None).await;
        let form = serde_json::json!({
            "startDate": "2024-06-01",
            "endDate": "2024-06-03",
            "travelers": 2,
            "companion": "커플"
        });
        let (status, body) = call(&app, "POST", "/session/submit", Some(form)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "LOADING");

        let mut settled = Value::Null;
        for _ in 0..50 {
            let (_, body) = call(&app, "GET", "/session", None).await;
            if body["step"] != "LOADING" {
                settled = body;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(settled["step"], "INPUT");
        assert_eq!(settled["notice"]["kind"], "destinations_failed");
    }

    #[tokio::test]
    async fn test_select_outside_results_conflicts() {
        let (status, _) = call(&app(), "POST", "/session/select/trip-0", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_start_over_and_landing() {
        let app = app();
        let (_, body) = call(&app, "POST", "/session/start-over", None).await;
        assert_eq!(body["step"], "INPUT");
        let (_, body) = call(&app, "POST", "/session/landing", None).await;
        assert_eq!(body["step"], "LANDING");
    }
}
