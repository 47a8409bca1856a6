use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::endpoint_selector::EndpointConfiguration;
use crate::errors::ConfigurationError;
use crate::language_utils::{self, LanguageList};

/// Application configuration module
/// This module handles the relay configuration including loading,
/// validating and turning it into the runtime endpoint configuration.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Which kind of backend serves translations
    #[serde(default)]
    pub backend: BackendKind,

    /// Vendor endpoints, in sampling order
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    /// Directory holding the local engine's per-pair models
    #[serde(default = "default_models_dir")]
    pub models_dir: String,

    /// Whether to protect markup spans around backend calls
    #[serde(default = "default_true")]
    pub protect_tags: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Backend type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Remote vendor endpoints chosen by weight
    #[default]
    Endpoints,
    /// On-box engine with per-pair models
    Local,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Endpoints => write!(f, "endpoints"),
            Self::Local => write!(f, "local"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "endpoints" => Ok(Self::Endpoints),
            "local" => Ok(Self::Local),
            _ => Err(anyhow!("Invalid backend type: {}", s)),
        }
    }
}

/// A single vendor endpoint
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EndpointConfig {
    // @field: Base URL of the endpoint
    pub url: String,

    // @field: Share of traffic relative to the other endpoints
    #[serde(default = "default_weight")]
    pub weight: f64,

    // @field: Languages the endpoint advertises
    #[serde(default)]
    pub languages: LanguageList,
}

impl EndpointConfig {
    // @param url: Endpoint base URL
    // @returns: Endpoint with default weight supporting every relay language
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            weight: default_weight(),
            languages: language_utils::supported_language_list(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_weight() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_models_dir() -> String {
    "models".to_string()
}

fn default_endpoint_url() -> String {
    "http://localhost:8080".to_string()
}

/// Parse a comma-separated weight list such as `"0.7,0.3"`
///
/// Empty entries are skipped. When there is a single endpoint and no weight at
/// all, the endpoint gets weight 1.
pub fn parse_weight_list(raw: &str, endpoint_count: usize) -> Result<Vec<f64>> {
    let mut weights = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let weight: f64 = part
            .parse()
            .with_context(|| format!("Invalid endpoint weight '{}'", part))?;
        weights.push(weight);
    }

    if endpoint_count == 1 && weights.is_empty() {
        weights.push(default_weight());
    }

    Ok(weights)
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Write the configuration to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        match self.backend {
            BackendKind::Endpoints => {
                if self.endpoints.is_empty() {
                    return Err(anyhow!("At least one endpoint is required for the endpoints backend"));
                }
            }
            BackendKind::Local => {
                if self.models_dir.trim().is_empty() {
                    return Err(anyhow!("A models directory is required for the local backend"));
                }
            }
        }

        for endpoint in &self.endpoints {
            let url = Url::parse(&endpoint.url)
                .with_context(|| format!("Invalid endpoint URL: {}", endpoint.url))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(anyhow!("Endpoint URL must use http or https: {}", endpoint.url));
            }

            if !endpoint.weight.is_finite() || endpoint.weight < 0.0 {
                return Err(anyhow!("Invalid weight {} for endpoint {}", endpoint.weight, endpoint.url));
            }

            for code in endpoint.languages.sl.keys().chain(endpoint.languages.tl.keys()) {
                language_utils::validate_language_code(code)
                    .with_context(|| format!("Endpoint {} advertises an unknown language", endpoint.url))?;
            }
        }

        Ok(())
    }

    /// Endpoint URLs, in sampling order
    pub fn endpoint_urls(&self) -> Vec<String> {
        self.endpoints.iter().map(|e| e.url.clone()).collect()
    }

    /// Endpoint weights, in sampling order
    pub fn endpoint_weights(&self) -> Vec<f64> {
        self.endpoints.iter().map(|e| e.weight).collect()
    }

    /// Build the runtime endpoint configuration
    ///
    /// `weight_override` replaces the per-endpoint weights from the file, e.g.
    /// with a list parsed by `parse_weight_list`.
    pub fn endpoint_configuration(
        &self,
        weight_override: Option<Vec<f64>>,
    ) -> Result<EndpointConfiguration, ConfigurationError> {
        let weights = weight_override.unwrap_or_else(|| self.endpoint_weights());
        let lists: Vec<LanguageList> = self.endpoints.iter().map(|e| e.languages.clone()).collect();

        EndpointConfiguration::new(self.endpoint_urls(), weights, &lists)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            backend: BackendKind::default(),
            endpoints: vec![EndpointConfig::new(&default_endpoint_url())],
            models_dir: default_models_dir(),
            protect_tags: true,
            log_level: LogLevel::default(),
        }
    }
}
