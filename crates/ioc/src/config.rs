//! Container configuration.
//!
//! Sources, lowest priority first: `Default`, a TOML document, then
//! `IOC_*` environment variables.

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

use crate::errors::{ContainerError, Result};

pub const ENV_PREFIX: &str = "IOC";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Shown in logs
    pub name: String,
    /// Fail with `CyclicDependency` instead of recursing forever
    pub detect_cycles: bool,
    /// Warn when a binding is replaced by a different concrete class
    pub warn_on_rebind: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            detect_cycles: true,
            warn_on_rebind: true,
        }
    }
}

impl ContainerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ContainerError::configuration(e.to_string()))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ContainerError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults overridden by the environment
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        let prefix = format!("{}_", ENV_PREFIX);
        for (key, value) in env::vars() {
            if let Some(field) = key.strip_prefix(&prefix) {
                self.apply_env_var(field, &value)?;
            }
        }
        Ok(())
    }

    /// Unknown keys are ignored
    pub fn apply_env_var(&mut self, key: &str, value: &str) -> Result<()> {
        match key.to_uppercase().as_str() {
            "NAME" => self.name = value.to_string(),
            "DETECT_CYCLES" => self.detect_cycles = parse_flag(key, value)?,
            "WARN_ON_REBIND" => self.warn_on_rebind = parse_flag(key, value)?,
            _ => {}
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ContainerError::configuration(e.to_string()))
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ContainerError::configuration(format!(
            "invalid boolean '{}' for {}_{}",
            other, ENV_PREFIX, key
        ))),
    }
}
