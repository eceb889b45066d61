//! Conversion of unhandled faults into recorded, generic 500 responses.
//!
//! Handlers never write error logs themselves. A faulting handler (or the
//! panic catcher) attaches a [`FaultReport`] to its response extensions and
//! [`record_faults`] turns that into an [`ErrorLog`] on the way out.

use std::any::Any;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleet_core::ErrorLog;
use tracing::error;

use super::handlers::ErrorResponse;
use crate::traits::ErrorRecorder;

/// Private details of a fault, carried from the handler to the recorder.
/// Never serialized into the response body.
#[derive(Debug, Clone)]
pub struct FaultReport {
    pub message: String,
    pub trace: String,
}

impl FaultReport {
    /// Builds a report from an error chain; the trace is its `Debug` form,
    /// which lists every cause.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self {
            message: format!("{err:#}"),
            trace: format!("{err:?}"),
        }
    }
}

/// Generic 500 response carrying `report` for [`record_faults`].
#[must_use]
pub fn fault_response(report: FaultReport) -> Response {
    let body = ErrorResponse {
        error: "internal_error".to_string(),
        message: "Internal Server Error".to_string(),
    };
    let mut response = (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
    response.extensions_mut().insert(report);
    response
}

/// Panic handler for `CatchPanicLayer::custom`.
///
/// This runs after the stack has unwound, so the recorded trace is the panic
/// payload only; no backtrace of the panicking frame is available here.
#[allow(clippy::needless_pass_by_value)]
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "non-string panic payload".to_string()
    };
    error!(%detail, "request handler panicked");
    fault_response(FaultReport {
        message: format!("handler panicked: {detail}"),
        trace: detail,
    })
}

/// Records the [`FaultReport`] of a response, if any, as an [`ErrorLog`]
/// for the request path. The response itself is passed through unchanged,
/// including when the recorder fails.
pub async fn record_faults(
    State(recorder): State<Arc<dyn ErrorRecorder>>,
    request: Request,
    next: Next,
) -> Response {
    let endpoint = request.uri().path().to_string();
    let mut response = next.run(request).await;

    if let Some(report) = response.extensions_mut().remove::<FaultReport>() {
        let entry = ErrorLog::new(report.message, report.trace, endpoint.as_str());
        if let Err(e) = recorder.record(entry).await {
            error!(%endpoint, "failed to record fault: {e:#}");
        }
    }
    response
}
