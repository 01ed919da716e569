use crate::error::ConfigError;
use rust_decimal::Decimal;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, Defaults, Scenario};

/// Loads the CLI configuration from the given TOML file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file, deserializes it into our strongly-typed `Config`
/// struct, validates it, and returns it.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

/// Business-rule checks that type-level deserialization cannot express.
fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.defaults.reference_price <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "defaults.reference_price must be greater than 0".to_string(),
        ));
    }

    for (i, scenario) in config.scenarios.iter().enumerate() {
        if scenario.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "scenario #{} has an empty name",
                i + 1
            )));
        }
        if scenario.exit_amount < Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "scenario '{}' has a negative exit amount",
                scenario.name
            )));
        }
        let duplicated = config.scenarios[..i]
            .iter()
            .any(|earlier| earlier.name == scenario.name);
        if duplicated {
            return Err(ConfigError::ValidationError(format!(
                "duplicate scenario name '{}'",
                scenario.name
            )));
        }
    }

    Ok(())
}
