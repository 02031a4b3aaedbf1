//! HTTP API for a vibewatch collection controller.
//!
//! Control endpoints start and stop sessions; everything else is a
//! read-only view of the controller for dashboards.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use vibewatch_core::{
    ClassificationResult, CollectionController, MonitorError, MonitorSnapshot, RangeTable, Sample,
    SessionReport, StartOutcome, Verdict, classify,
};

/// Shared server state.
struct AppState {
    controller: Arc<CollectionController>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Serialize)]
struct StartResponse {
    started: bool,
    session_id: Option<String>,
}

#[derive(Deserialize)]
struct ClassifyParams {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Serialize)]
struct ClassifyResponse {
    #[serde(flatten)]
    result: ClassificationResult,
    description: String,
    recommendation: String,
}

async fn handle_status(State(state): State<Arc<AppState>>) -> Json<MonitorSnapshot> {
    Json(state.controller.snapshot())
}

async fn handle_ranges(State(state): State<Arc<AppState>>) -> Json<RangeTable> {
    Json(state.controller.table().clone())
}

async fn handle_verdict(State(state): State<Arc<AppState>>) -> ApiResult<Verdict> {
    match state.controller.verdict() {
        Ok(v) => Ok(Json(v)),
        Err(e @ MonitorError::SessionActive) => Err(error(StatusCode::CONFLICT, e.to_string())),
        Err(e @ MonitorError::NoVerdict) => Err(error(StatusCode::NOT_FOUND, e.to_string())),
        Err(e) => Err(error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

async fn handle_start(State(state): State<Arc<AppState>>) -> ApiResult<StartResponse> {
    let controller = Arc::clone(&state.controller);
    let outcome = tokio::task::spawn_blocking(move || controller.start())
        .await
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(match outcome {
        StartOutcome::Started { session_id } => StartResponse {
            started: true,
            session_id: Some(session_id),
        },
        StartOutcome::AlreadyCollecting => StartResponse {
            started: false,
            session_id: state.controller.snapshot().session_id,
        },
    }))
}

async fn handle_stop(State(state): State<Arc<AppState>>) -> ApiResult<SessionReport> {
    let controller = Arc::clone(&state.controller);
    // stop() joins the sampling thread, so keep it off the async workers.
    let report = tokio::task::spawn_blocking(move || controller.stop())
        .await
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    report
        .map(Json)
        .ok_or_else(|| error(StatusCode::CONFLICT, "no session is collecting"))
}

async fn handle_classify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClassifyParams>,
) -> ApiResult<ClassifyResponse> {
    if !(params.x.is_finite() && params.y.is_finite() && params.z.is_finite()) {
        return Err(error(StatusCode::BAD_REQUEST, "x, y and z must be finite"));
    }
    let sample = Sample::new(0, params.x, params.y, params.z);
    let result = classify(&sample, state.controller.table());
    Ok(Json(ClassifyResponse {
        result,
        description: result
            .severity
            .description(state.controller.speed_level()),
        recommendation: result.severity.recommendation().to_string(),
    }))
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let snapshot = state.controller.snapshot();
    Json(serde_json::json!({
        "name": "vibewatch",
        "version": vibewatch_core::VERSION,
        "speed_level": snapshot.speed_level,
        "state": snapshot.state,
        "endpoints": {
            "/": "This API index",
            "/status": "Live snapshot: state, last 20 samples, latest classification, counts, risk index",
            "/ranges": "Active threshold table",
            "/verdict": "Verdict of the last stopped session (409 while collecting, 404 before any)",
            "/classify": {
                "method": "GET",
                "description": "Classify one reading against the active table",
                "params": { "x": "float", "y": "float", "z": "float" }
            },
            "/session/start": { "method": "POST", "description": "Begin a collection session" },
            "/session/stop": { "method": "POST", "description": "End the session and return its report" },
        },
    }))
}

/// Build the axum router around a shared controller.
pub fn build_router(controller: Arc<CollectionController>) -> Router {
    let state = Arc::new(AppState { controller });

    Router::new()
        .route("/", get(handle_index))
        .route("/status", get(handle_status))
        .route("/ranges", get(handle_ranges))
        .route("/verdict", get(handle_verdict))
        .route("/classify", get(handle_classify))
        .route("/session/start", post(handle_start))
        .route("/session/stop", post(handle_stop))
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves, then stop any running
/// session so its acquisition is closed and its verdict produced.
pub async fn serve_until<F>(
    controller: Arc<CollectionController>,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> std::io::Result<Option<SessionReport>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = build_router(Arc::clone(&controller));
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    let report = tokio::task::spawn_blocking(move || controller.stop())
        .await
        .map_err(std::io::Error::other)?;
    if let Some(r) = &report {
        log::info!(
            "stopped session {} on shutdown: {} (risk index {:.2})",
            r.session_id,
            r.verdict.tier,
            r.verdict.risk_index
        );
    }
    served.map(|()| report)
}

/// Serve the API until Ctrl+C. Returns the report of the session that was
/// still collecting at shutdown, if any.
pub async fn run_server(
    controller: Arc<CollectionController>,
    host: &str,
    port: u16,
) -> std::io::Result<Option<SessionReport>> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on http://{addr}");
    serve_until(controller, listener, async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => log::info!("shutting down"),
            Err(e) => {
                log::warn!("cannot listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use vibewatch_core::{
        AccelReading, NoModelAcquisition, ReplaySensor, Schedule, SpeedLevel, TickOutcome,
    };

    fn controller(readings: Vec<AccelReading>) -> Arc<CollectionController> {
        Arc::new(CollectionController::new(
            SpeedLevel::One,
            RangeTable::for_level(SpeedLevel::One),
            Box::new(ReplaySensor::from_readings(readings)),
            Box::new(NoModelAcquisition),
            Schedule::Manual,
        ))
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_index_lists_endpoints() {
        let app = build_router(controller(vec![]));
        let (status, json) = send(app, "GET", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "idle");
        assert!(json["endpoints"]["/session/stop"].is_object());
    }

    #[tokio::test]
    async fn test_verdict_before_any_session_is_404() {
        let app = build_router(controller(vec![]));
        let (status, json) = send(app, "GET", "/verdict").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().contains("no verdict"));
    }

    #[tokio::test]
    async fn test_session_lifecycle_over_http() {
        let c = controller(vec![AccelReading::new(-5.0, 0.0, 0.0)]);
        let app = build_router(Arc::clone(&c));

        let (status, json) = send(app.clone(), "POST", "/session/start").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["started"], true);

        let (_, json) = send(app.clone(), "POST", "/session/start").await;
        assert_eq!(json["started"], false);

        let (status, _) = send(app.clone(), "GET", "/verdict").await;
        assert_eq!(status, StatusCode::CONFLICT);

        assert!(matches!(c.tick(), TickOutcome::Recorded(_)));
        let (_, json) = send(app.clone(), "GET", "/status").await;
        assert_eq!(json["state"], "collecting");
        assert_eq!(json["counts"]["failure"], 1);
        assert_eq!(json["window"].as_array().unwrap().len(), 1);

        let (status, json) = send(app.clone(), "POST", "/session/stop").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["verdict"]["tier"], "Critical");
        assert_eq!(json["recorded"], 1);

        let (status, _) = send(app.clone(), "POST", "/session/stop").await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, json) = send(app, "GET", "/verdict").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["risk_index"], 3.0);
    }

    #[tokio::test]
    async fn test_classify_endpoint() {
        let app = build_router(controller(vec![]));
        let (status, json) = send(app.clone(), "GET", "/classify?x=-5&y=3&z=25").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["severity"], "failure");
        assert_eq!(json["axis_triggered"], "x");
        assert_eq!(json["axes"][1], "alert");

        let (status, _) = send(app, "GET", "/classify?x=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ranges_endpoint() {
        let app = build_router(controller(vec![]));
        let (_, json) = send(app, "GET", "/ranges").await;
        assert_eq!(json["alert"]["x"]["max"], 17.8);
    }

    #[tokio::test]
    async fn test_shutdown_stops_running_session() {
        let c = controller(vec![AccelReading::new(-5.0, 0.0, 0.0)]);
        c.start().unwrap();
        c.tick();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve_until(Arc::clone(&c), listener, async {
            rx.await.ok();
        }));
        tx.send(()).unwrap();

        let report = server.await.unwrap().unwrap().unwrap();
        assert_eq!(report.recorded, 1);
        assert_eq!(c.state(), vibewatch_core::ControllerState::Idle);
        assert_eq!(c.verdict().unwrap(), report.verdict);
    }

    #[tokio::test]
    async fn test_shutdown_while_idle_has_no_report() {
        let c = controller(vec![]);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let report = serve_until(c, listener, async {}).await.unwrap();
        assert!(report.is_none());
    }
}
