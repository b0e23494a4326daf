use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::authentication::{AuthenticationSchemeHandler, Error};

/// Configuration carried by a scheme and handed to its handler.
pub trait AuthenticationSchemeOptions: Any + Debug + Send + Sync {
    /// Issuer stamped on the claims a handler creates, if any
    fn claims_issuer(&self) -> Option<&str> {
        None
    }
}

/// General-purpose scheme options, as read from the configuration file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SchemeOptions {
    #[serde(default)]
    pub claims_issuer: Option<String>,
    #[serde(default)]
    pub parameters: HashMap<String, toml::Value>,
}

impl SchemeOptions {
    /// Decodes a handler-specific parameter
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if the parameter cannot be decoded as `T`
    pub fn parameter<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, Error> {
        let Some(value) = self.parameters.get(name) else {
            return Ok(None);
        };

        value
            .clone()
            .try_into()
            .map(Some)
            .map_err(|err| Error::InvalidParameter {
                name: name.to_string(),
                msg: err.to_string(),
            })
    }
}

impl AuthenticationSchemeOptions for SchemeOptions {
    fn claims_issuer(&self) -> Option<&str> {
        self.claims_issuer.as_deref()
    }
}

/// Identifies the handler implementation responsible for a scheme, without holding an instance.
#[derive(Clone, Copy)]
pub struct HandlerType {
    id: TypeId,
    name: &'static str,
}

impl HandlerType {
    pub fn of<H: 'static>() -> Self {
        Self {
            id: TypeId::of::<H>(),
            name: type_name::<H>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for HandlerType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HandlerType {}

impl Hash for HandlerType {
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.id.hash(state);
    }
}

impl Debug for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HandlerType({})", self.name)
    }
}

/// A named scheme: one handler type bound to one options value.
#[derive(Debug)]
pub struct AuthenticationScheme<O> {
    name: String,
    handler_type: HandlerType,
    options: O,
}

impl<O: AuthenticationSchemeOptions> AuthenticationScheme<O> {
    pub fn new<H>(name: impl Into<String>, options: O) -> Self
    where
        H: AuthenticationSchemeHandler<O> + 'static,
    {
        Self::with_handler_type(name, HandlerType::of::<H>(), options)
    }

    pub fn with_handler_type(
        name: impl Into<String>,
        handler_type: HandlerType,
        options: O,
    ) -> Self {
        Self {
            name: name.into(),
            handler_type,
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler_type(&self) -> HandlerType {
        self.handler_type
    }

    pub fn options(&self) -> &O {
        &self.options
    }
}

/// Options-agnostic view of a scheme, used to store schemes of different option types together.
pub trait RegisteredScheme: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn handler_type(&self) -> HandlerType;

    fn options(&self) -> &dyn AuthenticationSchemeOptions;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<O: AuthenticationSchemeOptions> RegisteredScheme for AuthenticationScheme<O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn handler_type(&self) -> HandlerType {
        self.handler_type
    }

    fn options(&self) -> &dyn AuthenticationSchemeOptions {
        &self.options
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Recovers the typed scheme behind a registered one.
///
/// The registry cannot know which options type a caller expects, so a mismatch is
/// only detected here, at lookup time.
pub(crate) fn downcast_scheme<O: AuthenticationSchemeOptions>(
    scheme: Arc<dyn RegisteredScheme>,
) -> Result<Arc<AuthenticationScheme<O>>, Error> {
    let name = scheme.name().to_string();

    scheme
        .into_any()
        .downcast::<AuthenticationScheme<O>>()
        .map_err(|_| Error::OptionsTypeMismatch {
            scheme: name,
            expected: type_name::<O>(),
        })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use hyper::http::request::Parts;

    use super::*;
    use crate::authentication::AuthenticationResult;

    #[derive(Debug, Default)]
    struct CookieOptions {
        cookie_name: String,
    }

    impl AuthenticationSchemeOptions for CookieOptions {}

    struct CookieHandler;

    #[async_trait]
    impl AuthenticationSchemeHandler<CookieOptions> for CookieHandler {
        async fn authenticate(
            &self,
            _request: &Parts,
            scheme: &AuthenticationScheme<CookieOptions>,
        ) -> AuthenticationResult {
            AuthenticationResult::fail("No cookie", scheme.name())
        }
    }

    #[test]
    fn test_new_sets_all_properties() {
        let options = CookieOptions {
            cookie_name: "session".to_string(),
        };
        let scheme = AuthenticationScheme::new::<CookieHandler>("cookie", options);

        assert_eq!(scheme.name(), "cookie");
        assert_eq!(scheme.handler_type(), HandlerType::of::<CookieHandler>());
        assert_eq!(scheme.options().cookie_name, "session");
        assert!(scheme.handler_type().name().ends_with("CookieHandler"));
    }

    #[test]
    fn test_handler_type_equality() {
        assert_eq!(HandlerType::of::<CookieHandler>(), HandlerType::of::<CookieHandler>());
        assert_ne!(HandlerType::of::<CookieHandler>(), HandlerType::of::<CookieOptions>());
    }

    #[test]
    fn test_downcast_scheme() {
        let scheme: Arc<dyn RegisteredScheme> = Arc::new(AuthenticationScheme::new::<CookieHandler>(
            "cookie",
            CookieOptions::default(),
        ));

        assert!(downcast_scheme::<CookieOptions>(scheme.clone()).is_ok());

        let error = downcast_scheme::<SchemeOptions>(scheme).unwrap_err();
        assert!(matches!(error, Error::OptionsTypeMismatch { scheme, .. } if scheme == "cookie"));
    }

    #[test]
    fn test_scheme_options_parameters() {
        let toml = r#"
            claims_issuer = "https://issuer.example.com"

            [parameters]
            audience = "api"
            leeway_seconds = 30
        "#;

        let options: SchemeOptions = toml::from_str(toml).unwrap();

        assert_eq!(options.claims_issuer(), Some("https://issuer.example.com"));
        assert_eq!(options.parameter::<String>("audience").unwrap(), Some("api".to_string()));
        assert_eq!(options.parameter::<u64>("leeway_seconds").unwrap(), Some(30));
        assert_eq!(options.parameter::<String>("missing").unwrap(), None);

        let error = options.parameter::<u64>("audience").unwrap_err();
        assert!(matches!(error, Error::InvalidParameter { name, .. } if name == "audience"));
    }
}
