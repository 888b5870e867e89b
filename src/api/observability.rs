use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::api::AppState;

/// Response extension set by `ApiError` so 400s from a face mismatch or a
/// missing clock-in are counted apart from ordinary validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome(pub &'static str);

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

fn outcome_label(status: u16, tagged: Option<Outcome>) -> &'static str {
    if let Some(Outcome(label)) = tagged {
        return label;
    }
    match status {
        500.. => "error",
        401 | 403 => "unauthorized",
        400..=499 => "client_error",
        _ => "success",
    }
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %uri,
        route = route.clone(),
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;

        let status = response.status().as_u16();
        let outcome = outcome_label(status, response.extensions().get::<Outcome>().copied());
        let elapsed = start.elapsed();

        // Unmatched paths collapse into one label.
        let labels = [
            ("method", method),
            ("route", route.unwrap_or_else(|| "unmatched".to_string())),
            ("outcome", outcome.to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        info!(
            event = "http_request_finished",
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            status_code = status,
            outcome,
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_outcome_wins_over_status() {
        assert_eq!(outcome_label(400, Some(Outcome("face_mismatch"))), "face_mismatch");
        assert_eq!(outcome_label(400, Some(Outcome("no_clock_in"))), "no_clock_in");
    }

    #[test]
    fn untagged_outcome_follows_status() {
        assert_eq!(outcome_label(200, None), "success");
        assert_eq!(outcome_label(201, None), "success");
        assert_eq!(outcome_label(400, None), "client_error");
        assert_eq!(outcome_label(401, None), "unauthorized");
        assert_eq!(outcome_label(502, None), "error");
    }
}
