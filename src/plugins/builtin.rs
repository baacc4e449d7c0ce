//! Built-in plugin registry.

use serde_json::{Map, Value, json};
use tracing::warn;

use super::{PluginConfig, PluginParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    RemoveDoctype,
    RemoveXmlProcInst,
    RemoveComments,
    RemoveMetadata,
    RemoveEditorsNsData,
    ConvertColors,
    CleanupListOfValues,
}

/// Registry entry: name, one-line description and default activation.
#[derive(Debug, Clone, Copy)]
pub struct PluginInfo {
    pub plugin: Builtin,
    pub name: &'static str,
    pub description: &'static str,
    pub active: bool,
}

/// Built-in plugins in default execution order.
pub const BUILTIN_PLUGINS: [PluginInfo; 7] = [
    PluginInfo {
        plugin: Builtin::RemoveDoctype,
        name: "removeDoctype",
        description: "removes doctype declaration",
        active: true,
    },
    PluginInfo {
        plugin: Builtin::RemoveXmlProcInst,
        name: "removeXMLProcInst",
        description: "removes XML processing instructions",
        active: true,
    },
    PluginInfo {
        plugin: Builtin::RemoveComments,
        name: "removeComments",
        description: "removes comments",
        active: true,
    },
    PluginInfo {
        plugin: Builtin::RemoveMetadata,
        name: "removeMetadata",
        description: "removes <metadata>",
        active: true,
    },
    PluginInfo {
        plugin: Builtin::RemoveEditorsNsData,
        name: "removeEditorsNSData",
        description: "removes editors namespaces, elements and attributes",
        active: true,
    },
    PluginInfo {
        plugin: Builtin::ConvertColors,
        name: "convertColors",
        description: "converts colors: rgb() to #rrggbb and #rrggbb to #rgb",
        active: true,
    },
    PluginInfo {
        plugin: Builtin::CleanupListOfValues,
        name: "cleanupListOfValues",
        description: "rounds list of values to the fixed precision",
        active: false,
    },
];

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        BUILTIN_PLUGINS
            .iter()
            .find(|info| info.name == name)
            .map(|info| info.plugin)
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn info(self) -> &'static PluginInfo {
        // variants are declared in registry order
        &BUILTIN_PLUGINS[self as usize]
    }

    pub fn default_params(self) -> Map<String, Value> {
        match self {
            Builtin::CleanupListOfValues => match json!({
                "floatPrecision": 3,
                "leadingZero": true,
                "defaultPx": true,
                "convertToPx": true,
            }) {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            _ => Map::new(),
        }
    }
}

/// A plugin the engine will run, with its merged params.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePlugin {
    pub plugin: Builtin,
    pub params: Map<String, Value>,
}

impl ActivePlugin {
    fn new(plugin: Builtin, user: Option<&Map<String, Value>>) -> Self {
        let mut params = plugin.default_params();
        if let Some(user) = user {
            params.extend(user.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Self { plugin, params }
    }
}

/// Build the ordered list of plugins to run from a resolved manifest.
///
/// Outside `full` mode the manifest adjusts the registry defaults; in `full`
/// mode only the active listed plugins run, in listed order. A global
/// `float_precision` replaces every plugin's own `floatPrecision`.
pub fn effective_plugins(config: &PluginConfig, float_precision: Option<u8>) -> Vec<ActivePlugin> {
    let listed = config.plugins.as_deref().unwrap_or_default();

    let mut table: Vec<ActivePlugin> = if config.full {
        listed
            .iter()
            .filter_map(|desc| {
                let plugin = lookup(&desc.name)?;
                match &desc.params {
                    PluginParams::Disabled => None,
                    PluginParams::Enabled => Some(ActivePlugin::new(plugin, None)),
                    PluginParams::EnabledWithParams(map) => {
                        Some(ActivePlugin::new(plugin, Some(map)))
                    }
                }
            })
            .collect()
    } else {
        let mut slots: Vec<(ActivePlugin, bool)> = BUILTIN_PLUGINS
            .iter()
            .map(|info| (ActivePlugin::new(info.plugin, None), info.active))
            .collect();

        for desc in listed {
            let Some(plugin) = lookup(&desc.name) else {
                continue;
            };
            let Some(slot) = slots.iter_mut().find(|(p, _)| p.plugin == plugin) else {
                continue;
            };
            *slot = match &desc.params {
                PluginParams::Disabled => (ActivePlugin::new(plugin, None), false),
                PluginParams::Enabled => (ActivePlugin::new(plugin, None), true),
                PluginParams::EnabledWithParams(map) => (ActivePlugin::new(plugin, Some(map)), true),
            };
        }

        slots
            .into_iter()
            .filter_map(|(plugin, active)| active.then_some(plugin))
            .collect()
    };

    if let Some(precision) = float_precision {
        for active in &mut table {
            if active.params.contains_key("floatPrecision") {
                active
                    .params
                    .insert("floatPrecision".into(), Value::from(precision));
            }
        }
    }

    table
}

fn lookup(name: &str) -> Option<Builtin> {
    let plugin = Builtin::from_name(name);
    if plugin.is_none() {
        warn!("unknown plugin '{name}', skipping");
    }
    plugin
}
