use std::sync::Arc;

use tracing::info;

use crate::authentication::{AuthenticationScheme, AuthenticationSchemeRegistry, HandlerResolver};
use crate::configuration::{Configuration, Error};

/// Builds the scheme registry described by the configuration
///
/// Every scheme's `handler` must be an alias registered on `handlers`.
///
/// # Errors
///
/// Returns `Error::UnknownHandler` if a scheme uses a handler alias that is not registered
pub fn create_scheme_registry(
    config: &Configuration,
    handlers: &HandlerResolver,
) -> Result<AuthenticationSchemeRegistry, Error> {
    let mut registry = AuthenticationSchemeRegistry::new();

    let mut names: Vec<&String> = config.scheme.keys().collect();
    names.sort();

    for name in names {
        let scheme_config = &config.scheme[name];
        let handler_type =
            handlers
                .handler_type(&scheme_config.handler)
                .ok_or_else(|| Error::UnknownHandler {
                    scheme: name.clone(),
                    handler: scheme_config.handler.clone(),
                })?;

        let is_default = config.default_scheme.as_ref() == Some(name);
        let scheme = AuthenticationScheme::with_handler_type(
            name.clone(),
            handler_type,
            scheme_config.options.clone(),
        );

        registry.register_scheme(Arc::new(scheme), is_default);
    }

    info!(
        schemes = registry.len(),
        default_scheme = ?registry.default_scheme().map(|scheme| scheme.name().to_string()),
        "Authentication schemes configured"
    );

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use hyper::http::request::Parts;

    use super::*;
    use crate::authentication::{
        AuthenticationResult, AuthenticationSchemeHandler, AuthenticationSchemeOptions,
        HandlerType, SchemeOptions,
    };

    struct CookieHandler;

    #[async_trait]
    impl AuthenticationSchemeHandler<SchemeOptions> for CookieHandler {
        async fn authenticate(
            &self,
            _request: &Parts,
            scheme: &AuthenticationScheme<SchemeOptions>,
        ) -> AuthenticationResult {
            AuthenticationResult::fail("No cookie", scheme.name())
        }
    }

    struct BearerHandler;

    #[async_trait]
    impl AuthenticationSchemeHandler<SchemeOptions> for BearerHandler {
        async fn authenticate(
            &self,
            _request: &Parts,
            scheme: &AuthenticationScheme<SchemeOptions>,
        ) -> AuthenticationResult {
            AuthenticationResult::fail("No token", scheme.name())
        }
    }

    fn build_handlers() -> HandlerResolver {
        let mut handlers = HandlerResolver::new();
        handlers.register_named_handler("cookie", CookieHandler);
        handlers.register_named_handler("bearer", BearerHandler);
        handlers
    }

    #[test]
    fn test_create_scheme_registry() {
        let config = r#"
        default_scheme = "token"

        [scheme.cookie]
        handler = "cookie"

        [scheme.token]
        handler = "bearer"

        [scheme.token.options]
        claims_issuer = "https://issuer.example.com"
        "#;
        let config = Configuration::load_from_str(config).unwrap();

        let registry = create_scheme_registry(&config, &build_handlers()).unwrap();

        assert_eq!(registry.scheme_names(), vec!["cookie", "token"]);

        let token = registry.get_scheme::<SchemeOptions>("token").unwrap();
        assert_eq!(token.handler_type(), HandlerType::of::<BearerHandler>());
        assert_eq!(token.options().claims_issuer(), Some("https://issuer.example.com"));

        let default = registry.default_scheme().unwrap();
        assert_eq!(default.name(), "token");
    }

    #[test]
    fn test_sole_configured_scheme_is_default() {
        let config = r#"
        [scheme.cookie]
        handler = "cookie"
        "#;
        let config = Configuration::load_from_str(config).unwrap();

        let registry = create_scheme_registry(&config, &build_handlers()).unwrap();

        let default = registry.default_scheme().unwrap();
        assert_eq!(default.name(), "cookie");
        assert_eq!(default.handler_type(), HandlerType::of::<CookieHandler>());
    }

    #[test]
    fn test_unknown_handler() {
        let config = r#"
        [scheme.oauth]
        handler = "oauth2"
        "#;
        let config = Configuration::load_from_str(config).unwrap();

        let error = create_scheme_registry(&config, &build_handlers()).unwrap_err();

        assert!(matches!(
            error,
            Error::UnknownHandler { scheme, handler } if scheme == "oauth" && handler == "oauth2"
        ));
        assert_eq!(
            create_scheme_registry(&config, &build_handlers())
                .unwrap_err()
                .to_string(),
            "Scheme \"oauth\" uses unknown handler \"oauth2\""
        );
    }
}
