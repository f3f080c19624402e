use crate::model::KeepAliveFailure;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qrbridge_core::Repository;

pub async fn keep_alive_handler<R: Repository>(State(state): State<AppState<R>>) -> Response {
    match state.probe().run().await {
        Ok(report) => Json(report).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(KeepAliveFailure {
                error: "Database query failed",
            }),
        )
            .into_response(),
    }
}
