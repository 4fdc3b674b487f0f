//! HTTP surface: HTML views plus the JSON prediction API.

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::error::{InputError, PredictError};
use crate::formatters::{format_index, format_information, IndexOutcome};
use crate::models::{ApiError, ApiPrediction, PredictionResult};
use crate::pipeline::PredictionPipeline;
use crate::service::WeatherClient;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: PredictionPipeline,
    pub weather: WeatherClient,
    pub city: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/information", get(information))
        .route("/predict_api", post(predict_api))
        .route("/health", get(health))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Response for a panic anywhere in a handler. Uses the JSON error body so
/// `/predict_api` keeps its contract.
fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            error: PredictError::Internal(String::new()).user_message(),
        }),
    )
        .into_response()
}

fn status_for(error: &PredictError) -> StatusCode {
    match error {
        PredictError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PredictError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        PredictError::Inference(_) | PredictError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Runs model and store work off the async executor. A panic inside becomes
/// an internal error instead of tearing down the connection.
async fn run_pipeline<F>(job: F) -> Result<PredictionResult, PredictError>
where
    F: FnOnce() -> Result<PredictionResult, PredictError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| PredictError::Internal(e.to_string()))?
}

fn log_failure(route: &str, error: &PredictError) {
    match error {
        PredictError::InvalidInput(_) => tracing::info!("{} rejected: {}", route, error),
        _ => tracing::error!("{} failed: {}", route, error),
    }
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let weather = state.weather.fetch_current(&state.city).await;
    Html(format_index(weather.as_ref(), None))
}

async fn predict(
    State(state): State<Arc<AppState>>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let outcome = match form {
        Ok(Form(fields)) => {
            let pipeline = state.pipeline.clone();
            run_pipeline(move || pipeline.predict_form(&fields)).await
        }
        Err(rejection) => Err(PredictError::InvalidInput(InputError::MalformedBody(
            rejection.body_text(),
        ))),
    };

    match outcome {
        Ok(result) => Html(format_index(None, Some(IndexOutcome::Prediction(&result)))).into_response(),
        Err(e) => {
            log_failure("/predict", &e);
            let message = e.user_message();
            (
                status_for(&e),
                Html(format_index(None, Some(IndexOutcome::Error(&message)))),
            )
                .into_response()
        }
    }
}

async fn information() -> Html<String> {
    Html(format_information())
}

/// Parses the body as JSON whatever its declared content type.
async fn predict_api(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let pipeline = state.pipeline.clone();
    let outcome = run_pipeline(move || pipeline.predict_json(&body)).await;

    match outcome {
        Ok(result) => Json(ApiPrediction::from(&result)).into_response(),
        Err(e) => {
            log_failure("/predict_api", &e);
            (
                status_for(&e),
                Json(ApiError {
                    error: e.user_message(),
                }),
            )
                .into_response()
        }
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model_loaded": state.pipeline.model_loaded(),
    }))
}
