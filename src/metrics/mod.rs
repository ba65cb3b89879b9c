pub mod registry;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

/// Handler for the /metrics endpoint
/// Returns metrics in Prometheus exposition format
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => {
            let body = String::from_utf8(buffer).unwrap_or_default();
            (
                StatusCode::OK,
                [("Content-Type", encoder.format_type())],
                body,
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
                .into_response()
        }
    }
}

pub use registry::{init_metrics, ERROR_RESPONSES_TOTAL};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_registered_with_default_registry() {
        init_metrics();
        ERROR_RESPONSES_TOTAL
            .with_label_values(&["IM_A_TEAPOT", "418"])
            .inc();

        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|family| family.get_name() == "error_responses_total"));
    }

    #[tokio::test]
    async fn test_metrics_handler_ok() {
        init_metrics();
        let response = metrics_handler().await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
