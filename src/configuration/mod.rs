use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

mod error;

use crate::authentication::HandlerOptions;
use crate::oidc::OpenIdConnectOptions;
pub use error::Error;

#[derive(Clone, Debug, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub scheme: HashMap<String, OpenIdConnectOptions>, // hashmap of scheme name <-> handler options
    #[serde(default)]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "text")]
    Text,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "ObservabilityConfig::default_filter")]
    pub filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        ObservabilityConfig {
            log_format: LogFormat::default(),
            filter: ObservabilityConfig::default_filter(),
        }
    }
}

impl ObservabilityConfig {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Configuration {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let config_str = fs::read_to_string(path)?;
        Self::load_from_str(&config_str)
    }

    pub fn load_from_str(slice: &str) -> Result<Self, Error> {
        let mut config: Configuration = toml::from_str(slice)?;

        for (name, options) in &mut config.scheme {
            if options.authentication.authentication_scheme.is_none() {
                options.authentication.authentication_scheme = Some(name.clone());
            }

            options
                .validate()
                .map_err(|e| Error::InvalidScheme(name.clone(), e.to_string()))?;
        }

        Ok(config)
    }

    pub fn scheme(&self, name: &str) -> Option<&OpenIdConnectOptions> {
        self.scheme.get(name)
    }
}
