use leasedesk_core::{AppError, AppResult};
use reqwest::StatusCode;

/// Returns the response unchanged when successful, otherwise maps its status.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    context: &str,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_owned());
    Err(status_error(status, context, body.trim()))
}

/// Maps a failed send to a transport error.
pub(crate) fn transport_error(context: &str, error: &reqwest::Error) -> AppError {
    AppError::Transport(format!("failed to call {context}: {error}"))
}

pub(crate) fn status_error(status: StatusCode, context: &str, body: &str) -> AppError {
    let detail = if body.is_empty() {
        format!("{context} returned status {}", status.as_u16())
    } else {
        format!("{context} returned status {}: {body}", status.as_u16())
    };

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(detail),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(detail),
        StatusCode::FORBIDDEN => AppError::Forbidden(detail),
        StatusCode::NOT_FOUND => AppError::NotFound(detail),
        StatusCode::CONFLICT => AppError::Conflict(detail),
        _ => AppError::Internal(detail),
    }
}
