//! optsvg - an SVG optimizer driven by a plugin manifest.
//!
//! A [`Config`] names the plugins to run; `--enable`/`--disable` overrides
//! are folded into it with [`resolve`]. The numeric list canonicalizer used by
//! `cleanupListOfValues` is available on its own as [`canonicalize`].

mod ast;
pub mod config;
pub mod datauri;
mod error;
pub mod files;
mod optimize;
mod parse;
pub mod plugins;
mod serialize;

use tracing::debug;

pub use ast::*;
pub use config::Config;
pub use error::*;
pub use optimize::*;
pub use parse::*;
pub use plugins::builtin::{ActivePlugin, BUILTIN_PLUGINS, Builtin, PluginInfo, effective_plugins};
pub use plugins::list_of_values::{CanonicalizationParams, canonicalize};
pub use plugins::{OverrideRequest, PluginConfig, PluginDescriptor, PluginParams, resolve};
pub use serialize::*;

/// Upper bound on optimization passes in multipass mode.
pub const MAX_PASSES: usize = 10;

/// Optimize an SVG string with the default plugin set.
pub fn optimize_default(svg: &str) -> Result<String, OptsvgError> {
    optimize_str(svg, &Config::default())
}

/// Optimize an SVG string with the given config.
///
/// With `multipass` the document is optimized again while the output keeps
/// getting shorter.
pub fn optimize_str(svg: &str, config: &Config) -> Result<String, OptsvgError> {
    let plugins = effective_plugins(&config.plugin_config(), config.float_precision);

    let mut output = optimize_once(svg, &plugins, &config.js2svg)?;
    if config.multipass {
        for pass in 2..=MAX_PASSES {
            let next = optimize_once(&output, &plugins, &config.js2svg)?;
            if next.len() >= output.len() {
                break;
            }
            debug!(pass, size = next.len(), "multipass");
            output = next;
        }
    }

    Ok(output)
}

fn optimize_once(svg: &str, plugins: &[ActivePlugin], js2svg: &Js2Svg) -> Result<String, OptsvgError> {
    let mut doc = parse_svg(svg)?;
    optimize(&mut doc, plugins);
    Ok(serialize(&doc, js2svg))
}
