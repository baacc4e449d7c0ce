//! Optimizer configuration.
//!
//! A config is read from an inline JSON string or from a JSON/YAML file, then
//! CLI flags are layered on top of it.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::datauri::DataUriKind;
use crate::error::OptsvgError;
use crate::plugins::{OverrideRequest, PluginConfig, PluginDescriptor, resolve};
use crate::serialize::Js2Svg;

/// Largest accepted global precision.
pub const MAX_PRECISION: i64 = 20;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Only listed plugins run
    pub full: bool,
    pub plugins: Option<Vec<PluginDescriptor>>,
    /// Overrides every plugin's `floatPrecision`
    pub float_precision: Option<u8>,
    /// Repeat optimization while the output keeps shrinking
    pub multipass: bool,
    pub js2svg: Js2Svg,
    pub datauri: Option<DataUriKind>,
}

impl Config {
    /// Load from the `--config` argument: inline JSON when it starts with `{`,
    /// otherwise a file path.
    pub fn load(arg: &str) -> Result<Self, OptsvgError> {
        if arg.starts_with('{') {
            Self::from_json(arg)
        } else {
            Self::load_file(Path::new(arg))
        }
    }

    /// Read a config file, trying JSON first and YAML second.
    pub fn load_file(path: &Path) -> Result<Self, OptsvgError> {
        let data = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => OptsvgError::ConfigNotFound(path.to_path_buf()),
            ErrorKind::IsADirectory => OptsvgError::ConfigIsDir(path.to_path_buf()),
            _ => OptsvgError::Io(e),
        })?;

        let result = if serde_json::from_str::<serde_json::Value>(&data).is_ok() {
            Self::from_json(&data)
        } else {
            Self::from_yaml(&data)
        };
        result.map_err(|e| match e {
            OptsvgError::ConfigNotMapping => OptsvgError::InvalidConfig(path.to_path_buf()),
            e => e,
        })
    }

    pub fn from_json(s: &str) -> Result<Self, OptsvgError> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        if !value.is_object() {
            return Err(OptsvgError::ConfigNotMapping);
        }
        Ok(serde_ignored::deserialize(value, warn_ignored)?)
    }

    pub fn from_yaml(s: &str) -> Result<Self, OptsvgError> {
        let value: serde_yaml::Value = serde_yaml::from_str(s)?;
        if !value.is_mapping() {
            return Err(OptsvgError::ConfigNotMapping);
        }
        Ok(serde_ignored::deserialize(value, warn_ignored)?)
    }

    /// Set the global precision, clamped to `0..=20`.
    pub fn set_float_precision(&mut self, precision: i64) {
        let clamped = precision.clamp(0, MAX_PRECISION);
        self.float_precision = u8::try_from(clamped).ok();
    }

    /// Snapshot of the plugin manifest and `full` flag.
    pub fn plugin_config(&self) -> PluginConfig {
        PluginConfig {
            plugins: self.plugins.clone(),
            full: self.full,
        }
    }

    /// Fold `--enable` / `--disable` batches into the manifest, in order.
    pub fn apply_overrides(&mut self, overrides: &[OverrideRequest]) {
        if overrides.is_empty() {
            return;
        }
        let base = PluginConfig {
            plugins: self.plugins.take(),
            full: self.full,
        };
        self.plugins = resolve(base, overrides).plugins;
    }
}

fn warn_ignored(path: serde_ignored::Path<'_>) {
    warn!("unknown config key '{path}', ignoring");
}
