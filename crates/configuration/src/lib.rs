use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{AnalyticsSettings, LogFormat, LoggingSettings, Settings};

/// Prefix of the environment variables that override file settings,
/// e.g. `FOLIO__ANALYTICS__RISK_FREE_RATE=0.05`.
pub const ENV_PREFIX: &str = "FOLIO";

/// Loads the application configuration.
///
/// Sources are layered in order: built-in defaults, the optional TOML file at
/// `path` (a missing file is not an error), then `FOLIO__*` environment
/// variables. The merged result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(false));
    }

    let builder = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("analytics.default_benchmarks")
                .with_list_parse_key("analytics.risk_horizons")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}
