//! HTTP middleware utilities for the moderation service
//!
//! Provides JWT authentication for the admin surface and the shared-secret
//! guard for the cron endpoint. The report submission endpoints stay
//! unauthenticated (anonymous reporting is allowed); abuse control there is
//! the rate limiter's job.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{
    error::{ErrorForbidden, ErrorUnauthorized},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use uuid::Uuid;

// =====================================================================
// JWT Authentication
// =====================================================================

/// Authenticated caller stored in request extensions after token
/// validation.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub role: String,
}

/// Actix middleware that validates a Bearer token using the shared JWT
/// helpers.
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| ErrorUnauthorized("Missing Authorization header"))?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| ErrorUnauthorized("Invalid Authorization scheme"))?;

            let claims = auth_core::validate_token(token)
                .map_err(|_| ErrorUnauthorized("Invalid or expired token"))?;

            let user_id = Uuid::parse_str(&claims.claims.sub)
                .map_err(|_| ErrorUnauthorized("Invalid user ID"))?;

            req.extensions_mut().insert(AuthenticatedUser {
                id: user_id,
                role: claims.claims.role,
            });

            service.call(req).await
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Authentication required")),
        )
    }
}

/// Extractor that additionally requires the admin role. Non-admin callers
/// get a uniform 403 before the handler body runs.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: Uuid,
}

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = match req.extensions().get::<AuthenticatedUser>() {
            Some(user) if user.role == auth_core::ROLE_ADMIN => Ok(AdminUser { id: user.id }),
            Some(_) => Err(ErrorForbidden("Admin privilege required")),
            None => Err(ErrorUnauthorized("Authentication required")),
        };

        ready(result)
    }
}

// =====================================================================
// Cron endpoint guard
// =====================================================================

/// Check the static shared secret on the cron endpoint. This is a separate
/// credential from user auth on purpose: the scheduler holds no user
/// identity.
pub fn verify_cron_secret(req: &HttpRequest, expected: &str) -> bool {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token == expected)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn cron_secret_requires_exact_bearer_match() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer sweep-secret"))
            .to_http_request();
        assert!(verify_cron_secret(&req, "sweep-secret"));
        assert!(!verify_cron_secret(&req, "other-secret"));
    }

    #[test]
    fn cron_secret_rejects_missing_or_malformed_header() {
        let missing = TestRequest::default().to_http_request();
        assert!(!verify_cron_secret(&missing, "sweep-secret"));

        let wrong_scheme = TestRequest::default()
            .insert_header(("Authorization", "Basic sweep-secret"))
            .to_http_request();
        assert!(!verify_cron_secret(&wrong_scheme, "sweep-secret"));
    }
}
