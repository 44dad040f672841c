use axum::Json;
use axum::extract::rejection::JsonRejection;

use crate::error::AppError;

/// Unwrap a JSON body, turning axum's plain-text rejections into `AppError`.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result.map(|Json(v)| v).map_err(|err| {
        tracing::debug!(error = %err, "rejected request body");
        AppError::BadRequest(err.body_text())
    })
}
