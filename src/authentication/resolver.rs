use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use hyper::http::{request, response};
use tracing::{debug, warn};

use crate::authentication::scheme::downcast_scheme;
use crate::authentication::{
    AuthenticationResult, AuthenticationSchemeHandler, AuthenticationSchemeOptions, Error,
    HandlerType, RegisteredScheme,
};

/// Handler invocation over a type-erased scheme
#[async_trait]
pub(crate) trait SchemeHandler: Send + Sync {
    async fn authenticate(
        &self,
        request: &request::Parts,
        scheme: Arc<dyn RegisteredScheme>,
    ) -> Result<AuthenticationResult, Error>;

    async fn challenge(
        &self,
        request: &request::Parts,
        response: &mut response::Parts,
        scheme: Arc<dyn RegisteredScheme>,
    ) -> Result<(), Error>;

    async fn forbid(
        &self,
        request: &request::Parts,
        response: &mut response::Parts,
        scheme: Arc<dyn RegisteredScheme>,
    ) -> Result<(), Error>;
}

struct TypedHandler<H, O> {
    handler: H,
    options: PhantomData<fn() -> O>,
}

#[async_trait]
impl<H, O> SchemeHandler for TypedHandler<H, O>
where
    H: AuthenticationSchemeHandler<O>,
    O: AuthenticationSchemeOptions,
{
    async fn authenticate(
        &self,
        request: &request::Parts,
        scheme: Arc<dyn RegisteredScheme>,
    ) -> Result<AuthenticationResult, Error> {
        let scheme = downcast_scheme::<O>(scheme)?;
        Ok(self.handler.authenticate(request, &scheme).await)
    }

    async fn challenge(
        &self,
        request: &request::Parts,
        response: &mut response::Parts,
        scheme: Arc<dyn RegisteredScheme>,
    ) -> Result<(), Error> {
        let scheme = downcast_scheme::<O>(scheme)?;
        self.handler.challenge(request, response, &scheme).await;
        Ok(())
    }

    async fn forbid(
        &self,
        request: &request::Parts,
        response: &mut response::Parts,
        scheme: Arc<dyn RegisteredScheme>,
    ) -> Result<(), Error> {
        let scheme = downcast_scheme::<O>(scheme)?;
        self.handler.forbid(request, response, &scheme).await;
        Ok(())
    }
}

/// Turns the handler type bound to a scheme into a handler instance
#[derive(Default)]
pub struct HandlerResolver {
    handlers: HashMap<HandlerType, Arc<dyn SchemeHandler>>,
    aliases: HashMap<String, HandlerType>,
}

impl HandlerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler instance used for every scheme bound to `H`
    pub fn register_handler<H, O>(&mut self, handler: H) -> HandlerType
    where
        H: AuthenticationSchemeHandler<O> + 'static,
        O: AuthenticationSchemeOptions,
    {
        let handler_type = HandlerType::of::<H>();
        let typed = TypedHandler {
            handler,
            options: PhantomData,
        };

        if self
            .handlers
            .insert(handler_type, Arc::new(typed))
            .is_some()
        {
            warn!(
                handler = handler_type.name(),
                "Replacing previously registered authentication scheme handler"
            );
        } else {
            debug!(
                handler = handler_type.name(),
                "Registered authentication scheme handler"
            );
        }

        handler_type
    }

    /// Register a handler and make it addressable by `alias` from the configuration file
    pub fn register_named_handler<H, O>(
        &mut self,
        alias: impl Into<String>,
        handler: H,
    ) -> HandlerType
    where
        H: AuthenticationSchemeHandler<O> + 'static,
        O: AuthenticationSchemeOptions,
    {
        let handler_type = self.register_handler(handler);
        self.aliases.insert(alias.into(), handler_type);
        handler_type
    }

    pub fn handler_type(&self, alias: &str) -> Option<HandlerType> {
        self.aliases.get(alias).copied()
    }

    pub fn contains(&self, handler_type: HandlerType) -> bool {
        self.handlers.contains_key(&handler_type)
    }

    pub(crate) fn resolve(
        &self,
        handler_type: HandlerType,
    ) -> Result<Arc<dyn SchemeHandler>, Error> {
        self.handlers.get(&handler_type).cloned().ok_or_else(|| {
            warn!(
                handler = handler_type.name(),
                "No authentication scheme handler registered"
            );
            Error::HandlerNotFound(handler_type.name())
        })
    }
}
