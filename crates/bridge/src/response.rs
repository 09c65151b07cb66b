use http::{HeaderMap, StatusCode};
use http::header::CONTENT_TYPE;
use micro_message::protocol::{HttpMessage, InvalidArgument, Response, Stream};
use tracing::error;

/// A `text/plain` response carrying `text`.
///
/// # Errors
///
/// Fails when `status` is outside `100..=599`.
pub fn text_response(status: StatusCode, text: &str) -> Result<Response, InvalidArgument> {
    Response::with_parts(Stream::from_bytes(text), status.as_u16(), HeaderMap::new())?
        .with_header(CONTENT_TYPE.as_str(), mime::TEXT_PLAIN.as_ref())
}

/// A `text/plain` response whose body is the lower-cased canonical reason of `status`,
/// e.g. `not found`.
pub fn status_response(status: StatusCode) -> Response {
    let text = status.canonical_reason().unwrap_or_default().to_ascii_lowercase();
    text_response(status, &text).unwrap_or_else(|e| {
        error!(cause = %e, status = %status, "failed to build status response");
        Response::new()
    })
}
