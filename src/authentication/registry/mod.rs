
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::authentication::scheme::downcast_scheme;
use crate::authentication::{
    AuthenticationScheme, AuthenticationSchemeOptions, Error, RegisteredScheme,
};

/// Authentication schemes by name, plus the default one.
///
/// Populated once at startup through `&mut self`, then shared (e.g. behind an `Arc`)
/// for lookups. There is no internal locking: registering after the registry has
/// been shared requires external synchronization.
#[derive(Debug, Default)]
pub struct AuthenticationSchemeRegistry {
    default_scheme: Option<Arc<dyn RegisteredScheme>>,
    schemes_by_name: HashMap<String, Arc<dyn RegisteredScheme>>,
}

impl AuthenticationSchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a scheme under its name, replacing any scheme already registered with that name
    ///
    /// If `is_default` is set, the scheme also becomes the default scheme.
    pub fn register_scheme<O: AuthenticationSchemeOptions>(
        &mut self,
        scheme: Arc<AuthenticationScheme<O>>,
        is_default: bool,
    ) {
        let scheme: Arc<dyn RegisteredScheme> = scheme;
        let name = scheme.name().to_string();

        if self
            .schemes_by_name
            .insert(name.clone(), scheme.clone())
            .is_some()
        {
            warn!(scheme = %name, "Replacing previously registered authentication scheme");
        } else {
            debug!(
                scheme = %name,
                handler = scheme.handler_type().name(),
                is_default,
                "Registered authentication scheme"
            );
        }

        if is_default {
            self.default_scheme = Some(scheme);
        }
    }

    /// Gets a scheme by name, whatever its options type
    ///
    /// # Errors
    ///
    /// Returns `Error::SchemeNotFound` if no scheme with that name was registered
    pub fn scheme(&self, name: &str) -> Result<Arc<dyn RegisteredScheme>, Error> {
        self.schemes_by_name
            .get(name)
            .cloned()
            .ok_or_else(|| Error::SchemeNotFound(name.to_string()))
    }

    /// Gets a scheme by name as the exact instance that was registered
    ///
    /// The caller is responsible for asking for the options type the scheme was registered with.
    ///
    /// # Errors
    ///
    /// Returns `Error::SchemeNotFound` if no scheme with that name was registered, or
    /// `Error::OptionsTypeMismatch` if the scheme does not use options of type `O`
    pub fn get_scheme<O: AuthenticationSchemeOptions>(
        &self,
        name: &str,
    ) -> Result<Arc<AuthenticationScheme<O>>, Error> {
        downcast_scheme(self.scheme(name)?)
    }

    /// The explicitly registered default scheme, else the only registered scheme, else `None`
    pub fn default_scheme(&self) -> Option<Arc<dyn RegisteredScheme>> {
        if let Some(scheme) = &self.default_scheme {
            return Some(scheme.clone());
        }

        if self.schemes_by_name.len() == 1 {
            return self.schemes_by_name.values().next().cloned();
        }

        None
    }

    /// Typed variant of [`Self::default_scheme`]
    ///
    /// # Errors
    ///
    /// Returns `Error::OptionsTypeMismatch` if the default scheme does not use options of type `O`
    pub fn get_default_scheme<O: AuthenticationSchemeOptions>(
        &self,
    ) -> Result<Option<Arc<AuthenticationScheme<O>>>, Error> {
        self.default_scheme().map(downcast_scheme::<O>).transpose()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemes_by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemes_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes_by_name.is_empty()
    }

    /// Registered scheme names, sorted
    pub fn scheme_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemes_by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
