#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

//! Pluggable authentication schemes.
//!
//! A scheme binds a name to a handler type and that handler's options. Schemes live in an
//! [`AuthenticationSchemeRegistry`], which resolves them by name or picks the default one.
//! Handlers report their verdict as an [`AuthenticationResult`], and the [`Authenticator`]
//! wires the registry, the handlers and the results together.

pub mod authentication;
pub mod configuration;
pub mod identity;

pub use authentication::{
    AuthenticationFailure, AuthenticationResult, AuthenticationScheme,
    AuthenticationSchemeHandler, AuthenticationSchemeOptions, AuthenticationSchemeRegistry,
    Authenticator, HandlerResolver, HandlerType, SchemeNames, SchemeOptions,
};
pub use configuration::Configuration;
pub use identity::{Claim, ClaimsPrincipal, Principal};
