//! Bearer access-token middleware for protected endpoints.
//!
//! Verifies the token through `AuthService::authenticate`, so revoked
//! sessions are refused even while their access tokens are unexpired, and
//! stores the verified claims in the request extensions.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
};
use uuid::Uuid;

use hl_core::domain::entities::{Claims, Role};

use crate::handlers::{bearer_token, handle_domain_error, unauthorized};
use crate::routes::auth::AppState;

/// Caller identity injected into requests that passed `JwtAuth`
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub subject_id: Uuid,
    pub session_id: Uuid,
    pub role: Role,
    pub claims: Claims,
}

impl AuthContext {
    pub fn from_claims(claims: Claims) -> Option<Self> {
        Some(Self {
            subject_id: claims.subject_id().ok()?,
            session_id: claims.session_id().ok()?,
            role: claims.role,
            claims,
        })
    }
}

/// JWT authentication middleware factory
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtAuth;

impl JwtAuth {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let Some(token) = bearer_token(req.request()) else {
                let response = unauthorized("Missing or invalid Authorization header");
                return Ok(req.into_response(response).map_into_right_body());
            };

            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                tracing::error!("JwtAuth mounted without application state");
                return Err(actix_web::error::ErrorInternalServerError("auth not configured"));
            };

            let claims = match state.auth.authenticate(&token).await {
                Ok(claims) => claims,
                Err(error) => {
                    let response = handle_domain_error(error);
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            let Some(context) = AuthContext::from_claims(claims) else {
                let response = unauthorized("Malformed token subject");
                return Ok(req.into_response(response).map_into_right_body());
            };

            req.extensions_mut().insert(context);
            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ErrorUnauthorized("Authentication required"));

        ready(result)
    }
}
