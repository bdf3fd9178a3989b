//! Prometheus request metrics for the marketplace API.
//!
//! Probes are excluded so scrape data reflects client traffic only.

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;
use std::sync::Arc;

pub(crate) const METRICS_NAMESPACE: &str = "pass_culture";
pub(crate) const METRICS_ENDPOINT: &str = "/metrics";
const UNMETERED_PATHS: [&str; 2] = ["/health/ready", "/health/live"];

/// Builder for the marketplace metrics, scraped at [`METRICS_ENDPOINT`].
pub(crate) fn marketplace_metrics() -> PrometheusMetricsBuilder {
    UNMETERED_PATHS.iter().fold(
        PrometheusMetricsBuilder::new(METRICS_NAMESPACE).endpoint(METRICS_ENDPOINT),
        |builder, path| builder.exclude(*path),
    )
}

/// Wraps the app in Prometheus middleware when metrics are configured,
/// otherwise only boxes the response body so both branches share one type.
#[derive(Clone)]
pub(crate) struct MetricsLayer(Option<Arc<PrometheusMetrics>>);

impl MetricsLayer {
    #[must_use]
    pub(crate) fn from_option(metrics: Option<PrometheusMetrics>) -> Self {
        Self(metrics.map(Arc::new))
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.0.is_some()
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let Some(metrics) = self.0.clone() else {
            return Box::pin(async move {
                let unmetered = service.map(ServiceResponse::map_into_boxed_body);
                Ok(boxed::service(unmetered))
            });
        };
        let metered = Compat::new((*metrics).clone()).new_transform(service);
        Box::pin(async move { Ok(boxed::service(metered.await?)) })
    }
}
