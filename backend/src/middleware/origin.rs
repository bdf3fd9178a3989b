//! Middleware refusing requests whose `Origin` is not whitelisted.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::ORIGIN;
use actix_web::{Error, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::{Error as DomainError, GLOBAL_FIELD};

pub const FORBIDDEN_ORIGIN_MESSAGE: &str = "Header non autorisé";

/// Origin whitelist; an empty list accepts every origin.
///
/// ```
/// use actix_web::App;
/// use backend::middleware::OriginWhitelist;
///
/// let _app = App::new().wrap(OriginWhitelist::new(["https://app.passculture.beta.gouv.fr"]));
/// ```
#[derive(Clone, Debug, Default)]
pub struct OriginWhitelist {
    allowed: Arc<Vec<String>>,
}

impl OriginWhitelist {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: Arc::new(
                origins
                    .into_iter()
                    .map(|origin| origin.into().trim_end_matches('/').to_owned())
                    .filter(|origin| !origin.is_empty())
                    .collect(),
            ),
        }
    }

    fn accepts(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(_) if self.allowed.is_empty() => true,
            Some(origin) => {
                let origin = origin.trim_end_matches('/');
                self.allowed.iter().any(|allowed| allowed == origin)
            }
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for OriginWhitelist
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = OriginWhitelistMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(OriginWhitelistMiddleware {
            service: Rc::new(service),
            whitelist: self.clone(),
        }))
    }
}

pub struct OriginWhitelistMiddleware<S> {
    service: Rc<S>,
    whitelist: OriginWhitelist,
}

impl<S, B> Service<ServiceRequest> for OriginWhitelistMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let origin = req
            .headers()
            .get(ORIGIN)
            .map(|value| value.to_str().unwrap_or_default().to_owned());
        if self.whitelist.accepts(origin.as_deref()) {
            let service = Rc::clone(&self.service);
            return Box::pin(async move { Ok(service.call(req).await?.map_into_left_body()) });
        }

        warn!(origin = origin.as_deref().unwrap_or_default(), "origin refused");
        let response = DomainError::invalid_request(GLOBAL_FIELD, FORBIDDEN_ORIGIN_MESSAGE)
            .error_response();
        Box::pin(ready(Ok(req.into_response(response).map_into_right_body())))
    }
}
