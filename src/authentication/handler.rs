use async_trait::async_trait;
use hyper::http::{request, response, StatusCode};

use crate::authentication::{
    AuthenticationResult, AuthenticationScheme, AuthenticationSchemeOptions,
};

/// Scheme handler trait that verifies the credentials of a request for one kind of scheme
#[async_trait]
pub trait AuthenticationSchemeHandler<O: AuthenticationSchemeOptions>: Send + Sync {
    /// Authenticate the request with the given scheme
    ///
    /// Returns:
    /// - a passing result with the resolved principal if the credentials are valid
    /// - a failing result with the reason otherwise (missing or bad credentials are not errors)
    async fn authenticate(
        &self,
        request: &request::Parts,
        scheme: &AuthenticationScheme<O>,
    ) -> AuthenticationResult;

    /// Ask the client to authenticate, e.g. by setting a `WWW-Authenticate` header
    async fn challenge(
        &self,
        _request: &request::Parts,
        response: &mut response::Parts,
        _scheme: &AuthenticationScheme<O>,
    ) {
        response.status = StatusCode::UNAUTHORIZED;
    }

    /// Tell the client it is authenticated but not allowed to proceed
    async fn forbid(
        &self,
        _request: &request::Parts,
        response: &mut response::Parts,
        _scheme: &AuthenticationScheme<O>,
    ) {
        response.status = StatusCode::FORBIDDEN;
    }
}
