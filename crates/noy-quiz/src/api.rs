//! HTTP API for quiz sessions.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use noy_boundary::{
    group_name, Boundary, Layer, LayerResults, QuizRecord, ShareParams, SliderPosition, QUESTIONS,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{Error, SessionError};
use crate::session::{Advance, SessionId, SessionStatus, SessionStore};

type AppState = Arc<SessionStore>;

/// Build the API router.
pub fn build_router(store: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/questions", get(list_questions))
        .route("/api/v1/sessions", post(create_session))
        .route("/api/v1/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/v1/sessions/:id/answers", post(submit_answer))
        .route("/api/v1/sessions/:id/advance", post(advance_layer))
        .route("/api/v1/sessions/:id/layers/:layer/retake", post(retake_layer))
        .route("/api/v1/sessions/:id/results", get(get_results))
        .route("/api/v1/sessions/:id/share", get(get_share))
        .route("/api/v1/share", get(decode_share))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}

// --- Errors ---

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl Error {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Session(SessionError::NotFound(_)) => StatusCode::NOT_FOUND,
            Error::Session(SessionError::WrongLayer { .. })
            | Error::Session(SessionError::Finished)
            | Error::Session(SessionError::NotFinished) => StatusCode::CONFLICT,
            Error::Session(SessionError::StoreFull { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Boundary(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) | Error::Serialization(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

type ApiResult<T> = Result<T, Error>;

// --- Health ---

async fn health() -> &'static str {
    "OK"
}

// --- Questions ---

#[derive(Debug, Deserialize)]
struct QuestionsQuery {
    layer: Option<Layer>,
}

#[derive(Debug, Serialize)]
struct QuestionView {
    id: u32,
    layer: Layer,
    text: &'static str,
    positions: [SliderPosition; 5],
}

async fn list_questions(Query(query): Query<QuestionsQuery>) -> Json<Vec<QuestionView>> {
    let questions = QUESTIONS
        .iter()
        .filter(|q| query.layer.map_or(true, |layer| q.layer == layer))
        .map(|q| QuestionView {
            id: q.id,
            layer: q.layer,
            text: q.text,
            positions: SliderPosition::ALL,
        })
        .collect();
    Json(questions)
}

// --- Sessions ---

#[derive(Debug, Serialize)]
struct SessionView {
    id: SessionId,
    #[serde(flatten)]
    status: SessionStatus,
}

async fn create_session(
    State(store): State<AppState>,
) -> ApiResult<(StatusCode, Json<SessionView>)> {
    let (id, status) = store.create().await?;
    Ok((StatusCode::CREATED, Json(SessionView { id, status })))
}

async fn get_session(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    let id = SessionId::from(id);
    let status = store.read(&id, |s| s.status()).await?;
    Ok(Json(SessionView { id, status }))
}

async fn delete_session(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    store.remove(&SessionId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerRequest {
    question_id: u32,
    value: u32,
}

#[derive(Debug, Serialize)]
struct AnswerResponse {
    boundary: Option<Boundary>,
}

async fn submit_answer(
    State(store): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AnswerRequest>,
) -> ApiResult<Json<AnswerResponse>> {
    let id = SessionId::from(id);
    let boundary = store
        .with_session(&id, |s| s.answer(req.question_id, req.value))
        .await?;
    tracing::debug!(
        session = %id,
        question_id = req.question_id,
        value = req.value,
        ?boundary,
        "answer submitted"
    );
    Ok(Json(AnswerResponse { boundary }))
}

async fn advance_layer(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Advance>> {
    let id = SessionId::from(id);
    let advance = store.with_session(&id, |s| s.advance()).await?;
    tracing::info!(
        session = %id,
        layer = %advance.layer,
        winner = ?advance.result.as_ref().map(|r| r.winning_boundary),
        finished = advance.record.is_some(),
        "layer completed"
    );
    Ok(Json(advance))
}

async fn retake_layer(
    State(store): State<AppState>,
    Path((id, layer)): Path<(String, String)>,
) -> ApiResult<Json<SessionView>> {
    let layer: Layer = layer.parse()?;
    let id = SessionId::from(id);
    let status = store
        .with_session(&id, |s| {
            s.retake(layer);
            Ok(s.status())
        })
        .await?;
    tracing::info!(session = %id, %layer, "layer retaken");
    Ok(Json(SessionView { id, status }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultsView {
    layer_results: LayerResults,
    winning_percentages: BTreeMap<Layer, u32>,
    group_name: &'static str,
}

async fn get_results(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ResultsView>> {
    let layer_results = store
        .read(&SessionId::from(id), |s| s.results())
        .await?;
    Ok(Json(ResultsView {
        winning_percentages: layer_results.winning_percentages(),
        group_name: group_name(&layer_results),
        layer_results,
    }))
}

async fn get_share(
    State(store): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ShareParams>> {
    let params = store
        .read(&SessionId::from(id), |s| s.record().map(ShareParams::from_record))
        .await?
        .ok_or(SessionError::NotFinished)?;
    Ok(Json(params))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SharedView {
    #[serde(flatten)]
    record: QuizRecord,
    winning_percentages: BTreeMap<Layer, u32>,
    group_name: &'static str,
}

async fn decode_share(Query(params): Query<ShareParams>) -> ApiResult<Json<SharedView>> {
    let record = params.into_record()?;
    Ok(Json(SharedView {
        winning_percentages: record.layer_results.winning_percentages(),
        group_name: group_name(&record.layer_results),
        record,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VoteMode;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(Arc::new(SessionStore::new(8, VoteMode::Latest)))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = send(app, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_ok() {
        let (status, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("OK".into()));
    }

    #[tokio::test]
    async fn questions_filter_by_layer() {
        let app = app();
        let (_, all) = send(&app, Method::GET, "/api/v1/questions", None).await;
        assert_eq!(all.as_array().unwrap().len(), 16);

        let (status, deep) = send(&app, Method::GET, "/api/v1/questions?layer=deep", None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<u64> = deep
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![13, 14, 15, 16]);
        assert_eq!(deep[0]["positions"], json!([0, 25, 50, 75, 100]));
    }

    #[tokio::test]
    async fn answer_and_advance() {
        let app = app();
        let id = new_session(&app).await;

        let uri = format!("/api/v1/sessions/{id}/answers");
        let (status, body) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "questionId": 1, "value": 50 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "boundary": "connection" }));

        let (_, body) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "questionId": 1, "value": 10 })),
        )
        .await;
        assert_eq!(body, json!({ "boundary": null }));

        let (status, _) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "questionId": 9, "value": 50 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/advance"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["layer"], "outer");
        assert_eq!(body["nextLayer"], "daily");
        assert_eq!(body["result"]["winningBoundary"], "connection");
        assert_eq!(body["record"], Value::Null);

        let (_, body) = send(&app, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(body["currentLayer"], "daily");
        assert_eq!(body["completedLayers"], json!(["outer"]));
        assert_eq!(body["layerResults"]["outer"]["winningBoundary"], "connection");
    }

    #[tokio::test]
    async fn full_quiz_share_round_trip() {
        let app = app();
        let id = new_session(&app).await;
        let share_uri = format!("/api/v1/sessions/{id}/share");
        let advance_uri = format!("/api/v1/sessions/{id}/advance");

        let (status, _) = send(&app, Method::GET, &share_uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let mut record = Value::Null;
        for _ in 0..4 {
            let (_, body) = send(&app, Method::POST, &advance_uri, None).await;
            record = body["record"].clone();
        }
        assert_eq!(record["layerResults"]["outer"]["winningBoundary"], "connection");

        let results_uri = format!("/api/v1/sessions/{id}/results");
        let (_, results) = send(&app, Method::GET, &results_uri, None).await;
        assert_eq!(results["groupName"], "Open + Outer");
        // Outer defaults: connection twice out of four votes.
        assert_eq!(results["winningPercentages"]["outer"], 50);

        let (status, share) = send(&app, Method::GET, &share_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(share["outer"], "connection");

        let params: ShareParams = serde_json::from_value(share).unwrap();
        let query = serde_urlencoded::to_string(&params).unwrap();
        let (status, decoded) =
            send(&app, Method::GET, &format!("/api/v1/share?{query}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decoded["userId"], record["userId"]);
        assert_eq!(decoded["completedAt"], record["completedAt"]);
        assert_eq!(decoded["layerResults"], record["layerResults"]);
        assert_eq!(decoded["winningPercentages"], results["winningPercentages"]);
        assert_eq!(decoded["groupName"], "Open + Outer");
    }

    #[tokio::test]
    async fn bad_share_link_is_rejected() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/v1/share?outer=flow", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("userId"));

        let params = ShareParams {
            user_id: "N.7".to_string(),
            completed_at: "2025-06-01T12:00:00.000Z".to_string(),
            outer: "logic".to_string(),
            outer_votes: r#"{"flow":0,"caution":3}"#.to_string(),
            ..ShareParams::default()
        };
        let query = serde_urlencoded::to_string(&params).unwrap();
        let (status, body) =
            send(&app, Method::GET, &format!("/api/v1/share?{query}"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("no votes"));
    }

    #[tokio::test]
    async fn retake_and_delete() {
        let app = app();
        let id = new_session(&app).await;
        send(&app, Method::POST, &format!("/api/v1/sessions/{id}/advance"), None).await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/layers/outer/retake"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currentLayer"], "outer");
        assert_eq!(body["layerResults"]["outer"], Value::Null);

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/layers/surface/retake"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let session_uri = format!("/api/v1/sessions/{id}");
        let (status, _) = send(&app, Method::DELETE, &session_uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::GET, &session_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn full_store_returns_503() {
        let app = build_router(Arc::new(SessionStore::new(1, VoteMode::Latest)));
        new_session(&app).await;
        let (status, _) = send(&app, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
