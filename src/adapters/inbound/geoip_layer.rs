//! GeoIP Tower Layer
//!
//! Wraps any `tower::Service` so that every request is enriched with
//! geolocation headers before it reaches the inner service.

use crate::adapters::outbound::{bind_resolver, DashMapGeoCache};
use crate::application::EnrichmentEngine;
use crate::config::Config;
use crate::domain::value_objects::CACHE_PURGE_INTERVAL;
use axum::http::Request;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Layer that applies [`GeoIpService`] to the wrapped service.
#[derive(Clone)]
pub struct GeoIpLayer {
    engine: Arc<EnrichmentEngine>,
}

impl GeoIpLayer {
    pub fn new(engine: Arc<EnrichmentEngine>) -> Self {
        Self { engine }
    }

    /// Bind the configured database and build a fresh cache.
    ///
    /// An unusable database is logged and leaves the engine unbound; this
    /// never fails. When called inside a tokio runtime the cache purge task
    /// is started as well.
    pub fn from_config(cfg: &Config) -> Self {
        let resolver = bind_resolver(&cfg.db_path, cfg.log_level);

        let cache = Arc::new(DashMapGeoCache::new());
        cache.start_purge(CACHE_PURGE_INTERVAL);

        Self::new(Arc::new(EnrichmentEngine::new(
            resolver,
            cache,
            cfg.log_level,
        )))
    }

    pub fn engine(&self) -> &Arc<EnrichmentEngine> {
        &self.engine
    }
}

impl<S> Layer<S> for GeoIpLayer {
    type Service = GeoIpService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GeoIpService {
            inner,
            engine: self.engine.clone(),
        }
    }
}

/// Middleware that decorates each request, then hands it to `inner`.
#[derive(Clone)]
pub struct GeoIpService<S> {
    inner: S,
    engine: Arc<EnrichmentEngine>,
}

impl<S, B> Service<Request<B>> for GeoIpService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        self.engine.enrich(&mut req);
        self.inner.call(req)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::application::{COUNTRY_HEADER, REGION_HEADER};
    use crate::domain::value_objects::LogLevel;
    use crate::domain::GeoRecord;
    use axum::body::Body;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::{service_fn, ServiceBuilder, ServiceExt};

    fn unbound_layer() -> GeoIpLayer {
        GeoIpLayer::new(Arc::new(EnrichmentEngine::new(
            None,
            Arc::new(DashMapGeoCache::new()),
            LogLevel::Error,
        )))
    }

    #[tokio::test]
    async fn test_inner_service_sees_decorated_request() {
        let svc = ServiceBuilder::new()
            .layer(unbound_layer())
            .service(service_fn(|req: Request<Body>| async move {
                let country = req.headers()[COUNTRY_HEADER].clone();
                Ok::<_, Infallible>(country)
            }));

        let req = Request::builder().body(Body::empty()).unwrap();
        let country = svc.oneshot(req).await.unwrap();

        assert_eq!(country, "unknown");
    }

    #[tokio::test]
    async fn test_inner_service_called_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let svc = ServiceBuilder::new()
            .layer(unbound_layer())
            .service(service_fn(move |req: Request<Body>| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    assert!(req.headers().contains_key(REGION_HEADER));
                    Ok::<_, Infallible>(())
                }
            }));

        let req = Request::builder().body(Body::empty()).unwrap();
        svc.oneshot(req).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_inner_error_is_passed_through() {
        let svc = ServiceBuilder::new()
            .layer(unbound_layer())
            .service(service_fn(|_req: Request<Body>| async move {
                Err::<(), _>("backend down")
            }));

        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(svc.oneshot(req).await.unwrap_err(), "backend down");
    }

    #[tokio::test]
    async fn test_from_config_missing_database_is_unbound() {
        let cfg = Config {
            db_path: "/nonexistent/GeoLite2-City.mmdb".to_string(),
            ..Config::default()
        };

        let layer = GeoIpLayer::from_config(&cfg);

        assert_eq!(
            layer.engine().state(),
            crate::application::EngineState::Unbound
        );
        assert_eq!(*layer.engine().lookup("8.8.8.8"), GeoRecord::unknown());
    }

    #[test]
    fn test_from_config_outside_runtime() {
        let layer = GeoIpLayer::from_config(&Config::default());
        assert_eq!(layer.engine().log_level(), LogLevel::Error);
    }
}
