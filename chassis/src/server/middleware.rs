//! Default middleware stack
//!
//! Request logging goes through the injected [`Logger`] facade (severity by
//! status class) and panics unwind into a logged JSON 500. Error formatting
//! for handler results lives on `ChassisError`'s `IntoResponse` impl.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::catch_panic::{CatchPanicLayer, ResponseForPanic};

use crate::logger::{Fields, Logger};

/// Wire the default stack
///
/// Panic recovery sits inside request logging so a recovered panic is still
/// reported as a completed 500 request.
pub(crate) fn apply_defaults(router: Router, logger: Arc<dyn Logger>) -> Router {
    router
        .layer(CatchPanicLayer::custom(PanicRecovery {
            logger: logger.clone(),
        }))
        .layer(middleware::from_fn_with_state(logger, log_requests))
}

async fn log_requests(
    State(logger): State<Arc<dyn Logger>>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    let code = status.as_u16();
    let duration_ms = started.elapsed().as_millis() as u64;
    let fields: Fields<'_> = &[
        ("method", &method),
        ("path", &path),
        ("status", &code),
        ("duration_ms", &duration_ms),
    ];
    if status.is_server_error() {
        logger.error("request completed", fields);
    } else if status.is_client_error() {
        logger.warn("request completed", fields);
    } else {
        logger.info("request completed", fields);
    }

    response
}

/// Converts a caught handler panic into a JSON 500 and logs it
#[derive(Clone)]
struct PanicRecovery {
    logger: Arc<dyn Logger>,
}

impl ResponseForPanic for PanicRecovery {
    type ResponseBody = axum::body::Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response {
        let detail = if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            (*s).to_string()
        } else {
            "opaque panic payload".to_string()
        };
        self.logger
            .error("request handler panicked", &[("panic", &detail)]);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "internal server error" })),
        )
            .into_response()
    }
}
