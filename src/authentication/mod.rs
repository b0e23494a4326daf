mod authenticator;
mod error;
mod handler;
mod registry;
mod resolver;
mod result;
mod scheme;

pub use authenticator::{AggregateFailure, Authenticator};
pub use error::Error;
pub use handler::AuthenticationSchemeHandler;
pub use registry::AuthenticationSchemeRegistry;
pub use resolver::HandlerResolver;
pub use result::{AuthenticationFailure, AuthenticationResult, SchemeNames};
pub use scheme::{
    AuthenticationScheme, AuthenticationSchemeOptions, HandlerType, RegisteredScheme,
    SchemeOptions,
};
