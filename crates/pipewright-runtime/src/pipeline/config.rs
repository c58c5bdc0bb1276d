//! Pipeline configuration.

use derive_builder::Builder;
use pipewright_core::{Error, Result};
use uuid::Uuid;

/// Configuration for a pipeline.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct PipelineConfig {
    /// Name used in logs and timing keys.
    #[builder(default = "default_name()")]
    pub name: String,

    /// Nesting depth of the pipeline, used for log indentation only.
    #[builder(default = "0")]
    pub depth: usize,
}

impl PipelineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.name {
            Some(name) => check_name(name),
            None => Ok(()),
        }
    }
}

impl PipelineConfig {
    /// Returns a builder for a pipeline configuration.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Creates a configuration with the given name at depth zero.
    ///
    /// Fails with a configuration error if the name is blank.
    pub fn named(name: impl Into<String>) -> Result<Self> {
        Self::builder()
            .name(name)
            .build()
            .map_err(|error| Error::configuration(error.to_string()))
    }

    /// Validates a configuration that may have been assembled by hand.
    pub fn validate(&self) -> Result<()> {
        check_name(&self.name).map_err(Error::configuration)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            depth: 0,
        }
    }
}

fn check_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("pipeline name must not be empty".into());
    }
    Ok(())
}

fn default_name() -> String {
    format!("Pipeline-{}", Uuid::now_v7())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_name_is_unique() {
        let first = PipelineConfig::default();
        let second = PipelineConfig::default();

        assert!(first.name.starts_with("Pipeline-"));
        assert_ne!(first.name, second.name);
        assert_eq!(first.depth, 0);
    }

    #[test]
    fn builder_applies_defaults() {
        let config = PipelineConfig::builder().depth(2_usize).build().unwrap();
        assert!(config.name.starts_with("Pipeline-"));
        assert_eq!(config.depth, 2);
    }

    #[test]
    fn builder_rejects_blank_name() {
        let result = PipelineConfig::builder().name("  ").build();
        assert!(result.is_err());

        assert!(PipelineConfig::named("").unwrap_err().is_configuration());
        assert_eq!(PipelineConfig::named("build").unwrap().name, "build");
    }

    #[test]
    fn validate_catches_hand_built_config() {
        let config = PipelineConfig {
            name: " ".into(),
            depth: 0,
        };
        assert!(config.validate().unwrap_err().is_configuration());
        assert!(PipelineConfig::default().validate().is_ok());
    }
}
