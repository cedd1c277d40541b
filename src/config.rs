use crate::error::Result;
use crate::script::Step;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct StartStopConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub script: ScriptConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Name of the demo worker in log output
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Make the worker's start hook fail
    #[serde(default = "default_fail_on_start")]
    pub fail_on_start: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScriptConfig {
    /// Transitions to drive, in order
    #[serde(default = "default_script_steps")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl StartStopConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self> {
        Self::load_from_file("startstop.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("service.name", default_service_name())?
            .set_default("service.fail_on_start", default_fail_on_start())?
            .set_default(
                "script.steps",
                default_script_steps()
                    .iter()
                    .map(|step| step.to_string())
                    .collect::<Vec<_>>(),
            )?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with STARTSTOP_ prefix
            .add_source(
                Environment::with_prefix("STARTSTOP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    // STARTSTOP_SCRIPT__STEPS=start,stop
                    .list_separator(",")
                    .with_list_parse_key("script.steps"),
            )
            .build()?;

        let config: StartStopConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.service.name.trim().is_empty() {
            return Err(ConfigError::Message(
                "Service name must not be empty".to_string(),
            )
            .into());
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::Message(format!(
                    "Unknown log level '{}'",
                    other
                ))
                .into());
            }
        }

        match self.logging.format.as_str() {
            "json" | "pretty" | "compact" => {}
            other => {
                return Err(ConfigError::Message(format!(
                    "Unknown log format '{}'",
                    other
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Render as a TOML document
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            fail_on_start: default_fail_on_start(),
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            steps: default_script_steps(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_service_name() -> String {
    "worker".to_string()
}

fn default_fail_on_start() -> bool {
    false
}

fn default_script_steps() -> Vec<Step> {
    vec![Step::Start, Step::Stop]
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
