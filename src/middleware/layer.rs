//! axum integration for [`RequestDecompressor`].

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    Router,
};

use super::decompressor::RequestDecompressor;

/// Middleware that decompresses the request body before calling `next`.
///
/// Rejected requests get a `400` JSON error and `next` is never run.
pub async fn decompress_request(
    State(decompressor): State<Arc<RequestDecompressor>>,
    request: Request,
    next: Next,
) -> Response {
    match decompressor.process(request).await {
        Ok(request) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

/// Wrap every route of `router` with request decompression.
///
/// Routes added after this call are not wrapped.
pub fn with_request_decompression<S>(
    router: Router<S>,
    decompressor: Arc<RequestDecompressor>,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(from_fn_with_state(decompressor, decompress_request))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http, http::StatusCode, routing::post};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    #[allow(clippy::assertions_on_constants)]
    async fn test_rejection_short_circuits() {
        let decompressor = Arc::new(RequestDecompressor::default());
        let router = with_request_decompression(
            Router::new().route(
                "/",
                post(|| async {
                    assert!(false, "handler must not run for rejected bodies");
                    StatusCode::OK
                }),
            ),
            Arc::clone(&decompressor),
        );

        let response = router
            .oneshot(
                http::Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-encoding", "lz4")
                    .body(Body::from("whatever"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(decompressor.stats().failed_requests(), 1);
    }
}
