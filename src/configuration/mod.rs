use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

mod error;
mod registry;

use crate::authentication::SchemeOptions;
pub use error::Error;
pub use registry::create_scheme_registry;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub default_scheme: Option<String>,
    #[serde(default)]
    pub scheme: HashMap<String, SchemeConfig>, // hashmap of scheme name <-> scheme config
}

#[derive(Clone, Debug, Deserialize)]
pub struct SchemeConfig {
    pub handler: String,
    #[serde(default)]
    pub options: SchemeOptions,
}

impl Configuration {
    /// Reads and validates the configuration file at `path`
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, otherwise any error of
    /// [`Self::load_from_str`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let config_str = fs::read_to_string(path)?;
        Self::load_from_str(&config_str)
    }

    /// # Errors
    ///
    /// Returns `Error::ConfigurationFileFormat` if the TOML is invalid, or
    /// `Error::UnknownDefaultScheme` if `default_scheme` names no configured scheme
    pub fn load_from_str(slice: &str) -> Result<Self, Error> {
        let config: Configuration = toml::from_str(slice)?;

        if let Some(default_scheme) = &config.default_scheme {
            if !config.scheme.contains_key(default_scheme) {
                return Err(Error::UnknownDefaultScheme(default_scheme.clone()));
            }
        }

        Ok(config)
    }
}
