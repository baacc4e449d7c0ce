//! Plugin descriptors and override resolution.
//!
//! A plugin manifest is an ordered list of [`PluginDescriptor`]s. The order is
//! the execution order of the passes that later run over a document. CLI
//! `--enable` / `--disable` flags are folded into a manifest by [`resolve`].

pub mod builtin;
pub mod cleanup;
pub mod list_of_values;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::OptsvgError;

/// Activation state of a plugin, with optional parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginParams {
    Disabled,
    Enabled,
    /// Enabled with a parameter mapping. Re-enabling keeps the mapping.
    EnabledWithParams(Map<String, Value>),
}

impl PluginParams {
    pub fn is_active(&self) -> bool {
        !matches!(self, PluginParams::Disabled)
    }

    fn from_state(state: bool) -> Self {
        if state {
            PluginParams::Enabled
        } else {
            PluginParams::Disabled
        }
    }
}

/// A named plugin entry in a manifest.
///
/// In config files an entry is either a bare `"name"` or a single-key mapping
/// `{ name: true | false | { params } }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawPlugin")]
pub struct PluginDescriptor {
    pub name: String,
    pub params: PluginParams,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, params: PluginParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn is_active(&self) -> bool {
        self.params.is_active()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPlugin {
    Name(String),
    Entry(Map<String, Value>),
}

impl TryFrom<RawPlugin> for PluginDescriptor {
    type Error = OptsvgError;

    fn try_from(raw: RawPlugin) -> Result<Self, Self::Error> {
        match raw {
            RawPlugin::Name(name) => Ok(Self::new(name, PluginParams::Enabled)),
            RawPlugin::Entry(entry) => {
                let count = entry.len();
                let mut entries = entry.into_iter();
                let (Some((name, value)), None) = (entries.next(), entries.next()) else {
                    return Err(OptsvgError::InvalidPlugin(format!(
                        "expected exactly one plugin name per entry, got {count}"
                    )));
                };
                let params = match value {
                    Value::Bool(state) => PluginParams::from_state(state),
                    Value::Null => PluginParams::Enabled,
                    Value::Object(map) => PluginParams::EnabledWithParams(map),
                    other => {
                        return Err(OptsvgError::InvalidPlugin(format!(
                            "plugin '{name}' must be a boolean or a mapping, got {other}"
                        )));
                    }
                };
                Ok(Self::new(name, params))
            }
        }
    }
}

/// A plugin manifest plus its `full` flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginConfig {
    /// `None` when no manifest was configured at all.
    pub plugins: Option<Vec<PluginDescriptor>>,
    /// Only listed plugins may be active; overrides cannot append new names.
    pub full: bool,
}

/// One `--enable` or `--disable` batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRequest {
    /// Raw tokens, possibly comma-joined (`"a,b,c"`).
    pub names: Vec<String>,
    pub state: bool,
}

impl OverrideRequest {
    pub fn enable<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            state: true,
        }
    }

    pub fn disable<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            state: false,
        }
    }
}

/// Expand comma-joined tokens.
///
/// The first name of a joined token stays in place; the rest go to the end.
pub fn flatten_plugin_names(tokens: &[String]) -> Vec<String> {
    let mut names = Vec::with_capacity(tokens.len());
    let mut tail = Vec::new();

    for token in tokens {
        let mut parts = token.split(',');
        if let Some(first) = parts.next() {
            names.push(first.to_string());
        }
        tail.extend(parts.map(str::to_string));
    }

    names.extend(tail);
    names.retain(|name| !name.is_empty());
    names
}

/// Apply override batches to a manifest, in the order given.
///
/// Never fails: unknown names are appended, or dropped in `full` mode.
pub fn resolve(base: PluginConfig, overrides: &[OverrideRequest]) -> PluginConfig {
    let PluginConfig { plugins, full } = base;
    let mut plugins = plugins;

    for request in overrides {
        let names = flatten_plugin_names(&request.names);

        match plugins.as_mut() {
            Some(existing) => {
                for name in names {
                    merge_state(existing, name, request.state, full);
                }
            }
            // nothing configured yet: the batch alone becomes the manifest
            None => plugins = Some(fresh_manifest(names, request.state)),
        }
    }

    PluginConfig { plugins, full }
}

fn fresh_manifest(names: Vec<String>, state: bool) -> Vec<PluginDescriptor> {
    let mut plugins: Vec<PluginDescriptor> = Vec::with_capacity(names.len());
    for name in names {
        match plugins.iter_mut().find(|p| p.name == name) {
            Some(plugin) => plugin.params = PluginParams::from_state(state),
            None => plugins.push(PluginDescriptor::new(name, PluginParams::from_state(state))),
        }
    }
    plugins
}

fn merge_state(plugins: &mut Vec<PluginDescriptor>, name: String, state: bool, full: bool) {
    let mut matched = false;

    for plugin in plugins.iter_mut().filter(|p| p.name == name) {
        // don't replace plugin params with a bare `true`
        if !state || !matches!(plugin.params, PluginParams::EnabledWithParams(_)) {
            plugin.params = PluginParams::from_state(state);
        }
        matched = true;
    }

    if !matched && !full {
        plugins.push(PluginDescriptor::new(name, PluginParams::from_state(state)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(plugins: &[PluginDescriptor]) -> Vec<&str> {
        plugins.iter().map(|p| p.name.as_str()).collect()
    }

    fn params(value: Value) -> PluginParams {
        match value {
            Value::Object(map) => PluginParams::EnabledWithParams(map),
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_flatten_plugin_names() {
        let tokens = vec!["a,b".to_string(), "c".to_string(), "d,e,f".to_string()];
        assert_eq!(
            flatten_plugin_names(&tokens),
            vec!["a", "c", "d", "b", "e", "f"]
        );
    }

    #[test]
    fn test_flatten_drops_empty_names() {
        let tokens = vec!["a,,b,".to_string()];
        assert_eq!(flatten_plugin_names(&tokens), vec!["a", "b"]);
    }

    #[test]
    fn test_resolve_empty_config_appends_in_order() {
        let resolved = resolve(
            PluginConfig::default(),
            &[OverrideRequest::enable(["foo,bar"])],
        );
        let plugins = resolved.plugins.unwrap();
        assert_eq!(names(&plugins), vec!["foo", "bar"]);
        assert!(plugins.iter().all(|p| p.params == PluginParams::Enabled));
    }

    #[test]
    fn test_resolve_full_mode_drops_unknown_names() {
        let base = PluginConfig {
            plugins: Some(vec![PluginDescriptor::new("foo", PluginParams::Enabled)]),
            full: true,
        };
        let resolved = resolve(base.clone(), &[OverrideRequest::enable(["baz"])]);
        assert_eq!(resolved, base);
    }

    #[test]
    fn test_resolve_appends_unknown_names_when_not_full() {
        let base = PluginConfig {
            plugins: Some(vec![PluginDescriptor::new("foo", PluginParams::Enabled)]),
            full: false,
        };
        let resolved = resolve(base, &[OverrideRequest::disable(["baz"])]);
        let plugins = resolved.plugins.unwrap();
        assert_eq!(names(&plugins), vec!["foo", "baz"]);
        assert_eq!(plugins[1].params, PluginParams::Disabled);
    }

    #[test]
    fn test_reenable_keeps_params() {
        let base = PluginConfig {
            plugins: Some(vec![PluginDescriptor::new("qux", params(json!({"a": 1})))]),
            full: false,
        };

        let enabled = resolve(base.clone(), &[OverrideRequest::enable(["qux"])]);
        assert_eq!(
            enabled.plugins.unwrap()[0].params,
            params(json!({"a": 1}))
        );

        let disabled = resolve(base, &[OverrideRequest::disable(["qux"])]);
        assert_eq!(disabled.plugins.unwrap()[0].params, PluginParams::Disabled);
    }

    #[test]
    fn test_batches_apply_in_given_order() {
        let base = PluginConfig {
            plugins: Some(vec![PluginDescriptor::new("foo", PluginParams::Enabled)]),
            full: false,
        };

        let disable_then_enable = resolve(
            base.clone(),
            &[
                OverrideRequest::disable(["foo"]),
                OverrideRequest::enable(["foo"]),
            ],
        );
        assert!(disable_then_enable.plugins.unwrap()[0].is_active());

        let enable_then_disable = resolve(
            base,
            &[
                OverrideRequest::enable(["foo"]),
                OverrideRequest::disable(["foo"]),
            ],
        );
        assert!(!enable_then_disable.plugins.unwrap()[0].is_active());
    }

    #[test]
    fn test_second_batch_merges_into_fresh_manifest() {
        let resolved = resolve(
            PluginConfig::default(),
            &[
                OverrideRequest::disable(["a,b"]),
                OverrideRequest::enable(["b", "c"]),
            ],
        );
        let plugins = resolved.plugins.unwrap();
        assert_eq!(names(&plugins), vec!["a", "b", "c"]);
        assert_eq!(plugins[0].params, PluginParams::Disabled);
        assert_eq!(plugins[1].params, PluginParams::Enabled);
        assert_eq!(plugins[2].params, PluginParams::Enabled);
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let resolved = resolve(
            PluginConfig::default(),
            &[OverrideRequest::enable(["x,x"])],
        );
        assert_eq!(resolved.plugins.unwrap().len(), 1);
    }

    #[test]
    fn test_base_is_not_aliased() {
        let base = PluginConfig {
            plugins: Some(vec![PluginDescriptor::new("foo", PluginParams::Enabled)]),
            full: false,
        };
        let snapshot = base.clone();
        let _ = resolve(base.clone(), &[OverrideRequest::disable(["foo"])]);
        assert_eq!(base, snapshot);
    }

    #[test]
    fn test_deserialize_plugin_entries() {
        let plugins: Vec<PluginDescriptor> = serde_json::from_value(json!([
            "removeComments",
            {"convertColors": false},
            {"cleanupListOfValues": {"floatPrecision": 1}},
        ]))
        .unwrap();

        assert_eq!(plugins[0].params, PluginParams::Enabled);
        assert_eq!(plugins[1].params, PluginParams::Disabled);
        assert_eq!(
            plugins[2].params,
            params(json!({"floatPrecision": 1}))
        );
    }

    #[test]
    fn test_deserialize_rejects_multi_key_entry() {
        let result: Result<Vec<PluginDescriptor>, _> =
            serde_json::from_value(json!([{"a": true, "b": true}]));
        assert!(result.is_err());
    }
}
