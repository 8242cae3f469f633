//! Layered configuration: defaults, then YAML, then `WS_CALL__*` env, then CLI.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use ws_soap::{SoapClientConfig, SoapVersion};

/// Environment prefix; nested keys are separated by `__`
/// (`WS_CALL__CLIENT__DEADLINE=5s`).
pub const ENV_PREFIX: &str = "WS_CALL__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub client: SoapClientConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive when neither `RUST_LOG` nor `-v` is given.
    pub level: String,
    /// Emit JSON lines instead of human-readable logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            json: false,
        }
    }
}

/// Values taken from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub soap12: bool,
    pub deadline: Option<Duration>,
}

impl AppConfig {
    /// Merge defaults, the optional YAML file and the environment.
    ///
    /// # Errors
    /// Fails if the file does not exist or any layer does not fit the schema.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(endpoint) = &overrides.endpoint {
            self.client.endpoint.clone_from(endpoint);
        }
        if overrides.soap12 {
            self.client.version = SoapVersion::Soap12;
        }
        if let Some(deadline) = overrides.deadline {
            self.client.deadline = deadline;
        }
    }

    /// # Errors
    /// Fails if the configuration cannot be rendered as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration as YAML")
    }
}
