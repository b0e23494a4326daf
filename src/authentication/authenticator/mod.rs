
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use hyper::http::{request, response};
use tracing::{debug, instrument, warn};

use crate::authentication::{
    AuthenticationFailure, AuthenticationResult, AuthenticationSchemeRegistry, Error,
    HandlerResolver, RegisteredScheme, SchemeNames,
};
use crate::identity::{ClaimsPrincipal, Principal};

/// Failure reported when every evaluated scheme failed
#[derive(Debug)]
pub struct AggregateFailure(Vec<AuthenticationFailure>);

impl AggregateFailure {
    pub fn failures(&self) -> &[AuthenticationFailure] {
        &self.0
    }
}

impl fmt::Display for AggregateFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "All authentication schemes failed")?;
        for failure in &self.0 {
            write!(f, "; {failure}")?;
        }
        Ok(())
    }
}

impl StdError for AggregateFailure {}

/// Drives authentication: resolves schemes, resolves their handlers and combines the verdicts
pub struct Authenticator {
    schemes: Arc<AuthenticationSchemeRegistry>,
    handlers: Arc<HandlerResolver>,
}

impl Authenticator {
    pub fn new(schemes: Arc<AuthenticationSchemeRegistry>, handlers: Arc<HandlerResolver>) -> Self {
        Self { schemes, handlers }
    }

    fn resolve_scheme(&self, name: Option<&str>) -> Result<Arc<dyn RegisteredScheme>, Error> {
        match name {
            Some(name) => self.schemes.scheme(name),
            None => self.schemes.default_scheme().ok_or_else(|| {
                warn!("No scheme requested and no default authentication scheme resolvable");
                Error::NoDefaultScheme
            }),
        }
    }

    /// Authenticates the request with the named schemes, or the default scheme if `None`
    ///
    /// The first passing scheme does not short-circuit: every scheme is evaluated and
    /// the principals of all passing schemes are merged.
    ///
    /// # Errors
    ///
    /// Returns an error if a scheme cannot be resolved, no default scheme exists, or
    /// no handler is registered for a scheme. Rejected credentials are reported as a
    /// failing `AuthenticationResult`, not as an error.
    #[instrument(skip(self, request), fields(auth_scheme = tracing::field::Empty))]
    pub async fn authenticate(
        &self,
        request: &request::Parts,
        scheme_names: Option<SchemeNames>,
    ) -> Result<AuthenticationResult, Error> {
        let schemes = match &scheme_names {
            Some(names) => names
                .iter()
                .map(|name| self.resolve_scheme(Some(name.as_str())))
                .collect::<Result<Vec<_>, _>>()?,
            None => vec![self.resolve_scheme(None)?],
        };

        let mut passed = Vec::new();
        let mut failed = Vec::new();

        for scheme in schemes {
            let handler = self.handlers.resolve(scheme.handler_type())?;
            let result = handler.authenticate(request, scheme.clone()).await?;

            if result.passed() {
                debug!(scheme = scheme.name(), "Authentication scheme passed");
                passed.push(result);
            } else {
                let failure = result
                    .failure()
                    .map(AuthenticationFailure::message)
                    .unwrap_or_default();
                debug!(scheme = scheme.name(), failure = %failure, "Authentication scheme failed");
                failed.push(result);
            }
        }

        if passed.is_empty() {
            tracing::Span::current().record("auth_scheme", "anonymous");
            return Self::combine_failures(failed);
        }

        let result = Self::combine_passes(passed)?;
        tracing::Span::current().record("auth_scheme", result.scheme_names().primary());
        Ok(result)
    }

    fn combine_failures(
        mut failed: Vec<AuthenticationResult>,
    ) -> Result<AuthenticationResult, Error> {
        if failed.len() == 1 {
            return Ok(failed.remove(0));
        }

        let mut names = Vec::new();
        let mut failures = Vec::new();
        for result in failed {
            names.extend(result.scheme_names().iter().cloned());
            failures.extend(result.failure().cloned());
        }

        Ok(AuthenticationResult::fail(
            AuthenticationFailure::new(AggregateFailure(failures)),
            SchemeNames::new(names)?,
        ))
    }

    fn combine_passes(
        mut passed: Vec<AuthenticationResult>,
    ) -> Result<AuthenticationResult, Error> {
        if passed.len() == 1 {
            return Ok(passed.remove(0));
        }

        let mut names = Vec::new();
        let mut principal = ClaimsPrincipal::default();
        for result in &passed {
            names.extend(result.scheme_names().iter().cloned());
            if let Some(user) = result.user() {
                principal.merge(&**user);
            }
        }

        let user: Arc<dyn Principal> = Arc::new(principal);
        Ok(AuthenticationResult::pass(user, SchemeNames::new(names)?))
    }

    /// Asks the client to authenticate with the named scheme, or the default scheme if `None`
    ///
    /// # Errors
    ///
    /// Returns an error if the scheme or its handler cannot be resolved
    #[instrument(skip(self, request, response))]
    pub async fn challenge(
        &self,
        request: &request::Parts,
        response: &mut response::Parts,
        scheme_name: Option<&str>,
    ) -> Result<(), Error> {
        let scheme = self.resolve_scheme(scheme_name)?;
        let handler = self.handlers.resolve(scheme.handler_type())?;
        handler.challenge(request, response, scheme).await
    }

    /// Tells the client it may not access the resource, using the named or default scheme
    ///
    /// # Errors
    ///
    /// Returns an error if the scheme or its handler cannot be resolved
    #[instrument(skip(self, request, response))]
    pub async fn forbid(
        &self,
        request: &request::Parts,
        response: &mut response::Parts,
        scheme_name: Option<&str>,
    ) -> Result<(), Error> {
        let scheme = self.resolve_scheme(scheme_name)?;
        let handler = self.handlers.resolve(scheme.handler_type())?;
        handler.forbid(request, response, scheme).await
    }
}
