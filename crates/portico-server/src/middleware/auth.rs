// Authentication middleware for Actix-web
// Verifies the bearer credential on every management request and hands the
// caller a renewed one in the response

use std::sync::Arc;

use actix_service::forward_ready;
use actix_utils::future::{Ready, ok};
use actix_web::{
    Error, ResponseError,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        Method,
        header::{ACCESS_CONTROL_EXPOSE_HEADERS, HeaderName, HeaderValue, InvalidHeaderName},
    },
};
use futures::future::LocalBoxFuture;

use portico_auth::{AuthSettings, PorticoJwtPayload, TOKEN_PREFIX, TokenRejection, TokenService};
use portico_common::PorticoError;

use crate::error::AppError;

/// Routes served without a credential, relative to the context path
const EXEMPT_ROUTES: &[&str] = &["/health"];

#[derive(Debug, thiserror::Error)]
pub enum AuthSetupError {
    #[error("invalid credential header name: {0}")]
    Header(#[from] InvalidHeaderName),
    #[error("invalid signing secret: {0}")]
    Secret(#[from] jsonwebtoken::errors::Error),
}

// Authentication middleware transformer
#[derive(Clone)]
pub struct Authentication {
    /// `None` in demo mode
    tokens: Option<Arc<TokenService>>,
    header: HeaderName,
    /// Full request paths that skip the gate
    exempt: Arc<[String]>,
}

fn exempt_paths(context_path: &str) -> Arc<[String]> {
    let prefix = context_path.trim_end_matches('/');
    EXEMPT_ROUTES
        .iter()
        .map(|route| format!("{prefix}{route}"))
        .collect()
}

impl Authentication {
    pub fn new(settings: &AuthSettings) -> Result<Self, AuthSetupError> {
        let header = HeaderName::from_bytes(settings.header.as_bytes())?;
        let tokens = if settings.enabled {
            Some(Arc::new(TokenService::from_settings(settings)?))
        } else {
            None
        };
        Ok(Self {
            tokens,
            header,
            exempt: exempt_paths(""),
        })
    }

    pub fn with_service(tokens: Arc<TokenService>, header: HeaderName) -> Self {
        Self {
            tokens: Some(tokens),
            header,
            exempt: exempt_paths(""),
        }
    }

    /// Demo mode: every request passes through untouched
    pub fn disabled() -> Self {
        Self {
            tokens: None,
            header: HeaderName::from_static("authorization"),
            exempt: exempt_paths(""),
        }
    }

    /// Resolve the exempt routes against the path the API is mounted under
    pub fn under_context_path(mut self, context_path: &str) -> Self {
        self.exempt = exempt_paths(context_path);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.tokens.is_some()
    }
}

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthenticationMiddleware {
            service,
            tokens: self.tokens.clone(),
            header: self.header.clone(),
            exempt: self.exempt.clone(),
        })
    }
}

pub struct AuthenticationMiddleware<S> {
    service: S,
    tokens: Option<Arc<TokenService>>,
    header: HeaderName,
    exempt: Arc<[String]>,
}

/// Read `Bearer <token>` from the credential header
fn extract_token(req: &ServiceRequest, header: &HeaderName) -> Option<String> {
    let value = req.headers().get(header)?.to_str().ok()?.trim();
    let token = value.strip_prefix(TOKEN_PREFIX)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn is_exempt(req: &ServiceRequest, exempt: &[String]) -> bool {
    Method::OPTIONS == *req.method() || exempt.iter().any(|path| path.as_str() == req.path())
}

fn verify(
    tokens: &TokenService,
    req: &ServiceRequest,
    header: &HeaderName,
) -> Result<PorticoJwtPayload, TokenRejection> {
    match extract_token(req, header) {
        Some(token) => tokens.verify(&token),
        None => Err(TokenRejection::Missing),
    }
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let tokens = match &self.tokens {
            Some(tokens) if !is_exempt(&req, &self.exempt) => tokens,
            _ => {
                let res = self.service.call(req);
                return Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) });
            }
        };

        let claims = match verify(tokens, &req, &self.header) {
            Ok(claims) => claims,
            Err(rejection) => {
                tracing::warn!(
                    method = %req.method(),
                    path = %req.path(),
                    peer = ?req.peer_addr(),
                    reason = %rejection,
                    "Rejected unauthenticated management request"
                );
                let response = AppError(PorticoError::Unauthorized(rejection.to_string()))
                    .error_response();
                return Box::pin(async move {
                    Ok(req.into_response(response).map_into_right_body())
                });
            }
        };

        let (token, renewed) = match tokens.rotate(&claims) {
            Ok(rotated) => rotated,
            Err(e) => {
                tracing::error!(subject = %claims.sub, error = %e, "Failed to renew credential");
                let response =
                    AppError(PorticoError::internal("failed to renew credential")).error_response();
                return Box::pin(async move {
                    Ok(req.into_response(response).map_into_right_body())
                });
            }
        };

        tracing::debug!(subject = %renewed.sub, exp = renewed.exp, "Credential renewed");

        let header = self.header.clone();
        let res = self.service.call(req);

        Box::pin(async move {
            let mut res = res.await?;
            let headers = res.headers_mut();
            if let Ok(value) = HeaderValue::from_str(&format!("{TOKEN_PREFIX}{token}")) {
                headers.insert(header.clone(), value);
            }
            if let Ok(value) = HeaderValue::from_str(header.as_str()) {
                headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, value);
            }
            Ok(res.map_into_left_body())
        })
    }
}
