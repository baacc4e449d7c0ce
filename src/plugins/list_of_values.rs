//! `cleanupListOfValues`: rounds numeric lists to a fixed precision.
//!
//! Applies to `points`, `viewBox`, `enable-background`, `stroke-dasharray`,
//! `dx`, `dy`, `x` and `y`. Absolute lengths are rewritten in pixels when that
//! is shorter; anything that is not a number is left alone.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::ast::Element;

/// Attributes whose values are numeric lists.
pub const TARGET_ATTRIBUTES: [&str; 8] = [
    "points",
    "enable-background",
    "viewBox",
    "stroke-dasharray",
    "dx",
    "dy",
    "x",
    "y",
];

/// Pixels per unit for the absolute length units.
pub const ABSOLUTE_LENGTHS: [(&str, f64); 5] = [
    ("cm", 96.0 / 2.54),
    ("mm", 96.0 / 25.4),
    ("in", 96.0),
    ("pt", 4.0 / 3.0),
    ("pc", 16.0),
];

/// Above this magnitude every f64 is an integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

static NUMERIC_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)(px|pt|pc|mm|cm|m|in|ft|em|ex|%)?$")
        .unwrap()
});

static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+,?\s*|,\s*").unwrap());

/// Parameters of `cleanupListOfValues`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanonicalizationParams {
    /// Number of fractional digits to keep
    pub float_precision: u8,
    /// `0.5` -> `.5`
    pub leading_zero: bool,
    /// Drop `px` units
    pub default_px: bool,
    /// Rewrite cm/mm/in/pt/pc in pixels when shorter
    pub convert_to_px: bool,
}

impl Default for CanonicalizationParams {
    fn default() -> Self {
        Self {
            float_precision: 3,
            leading_zero: true,
            default_px: true,
            convert_to_px: true,
        }
    }
}

impl CanonicalizationParams {
    /// Read params from a plugin mapping, falling back to defaults for
    /// missing keys.
    pub fn from_params(params: &Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(params.clone())).unwrap_or_else(|err| {
            warn!("ignoring invalid cleanupListOfValues params: {err}");
            Self::default()
        })
    }
}

/// Pixel factor of an absolute unit, `None` for px and relative units.
pub fn px_per_unit(unit: &str) -> Option<f64> {
    ABSOLUTE_LENGTHS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, factor)| *factor)
}

/// Canonicalize every targeted attribute of one element.
pub fn cleanup_list_of_values(elem: &mut Element, params: &CanonicalizationParams) {
    for attr in &mut elem.attributes {
        if TARGET_ATTRIBUTES.contains(&attr.name.as_str()) {
            attr.value = canonicalize(&attr.value, params);
        }
    }
}

/// Rewrite a whitespace/comma separated list of numbers in its shortest form.
///
/// Tokens are joined with single spaces; tokens that are not numbers are
/// kept verbatim.
pub fn canonicalize(raw: &str, params: &CanonicalizationParams) -> String {
    SEPARATOR
        .split(raw)
        .filter(|token| !token.is_empty())
        .map(|token| canonicalize_token(token, params))
        .collect::<Vec<_>>()
        .join(" ")
}

fn canonicalize_token(token: &str, params: &CanonicalizationParams) -> String {
    // `enable-background="new x y w h"`
    if token == "new" {
        return token.to_string();
    }

    let Some(caps) = NUMERIC_VALUE.captures(token) else {
        return token.to_string();
    };
    let value = match caps[1].parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => return token.to_string(),
    };
    let unit = caps.get(2).map_or("", |m| m.as_str());
    let rendered = render(round_to(value, params.float_precision), unit, params);

    if params.convert_to_px
        && let Some(factor) = px_per_unit(unit)
    {
        let px = round_to(factor * value, params.float_precision);
        if px.is_finite() {
            // compare what would actually be written, suffix included
            let converted = render(px, "px", params);
            if converted.len() < token.len() {
                return converted;
            }
        }
    }

    rendered
}

fn render(number: f64, unit: &str, params: &CanonicalizationParams) -> String {
    let mut out = format_number(number);
    if params.leading_zero {
        out = remove_leading_zero(&out);
    }
    if !(params.default_px && unit == "px") {
        out.push_str(unit);
    }
    out
}

/// Round half away from zero to `precision` fractional digits.
fn round_to(value: f64, precision: u8) -> f64 {
    let factor = 10f64.powi(i32::from(precision));
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= MAX_SAFE_INTEGER {
        return value;
    }

    let rounded = scaled.round() / factor;
    // -0 prints as "-0"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Shortest string that reads back as `n`.
fn format_number(n: f64) -> String {
    let mut buffer = ryu::Buffer::new();
    let s = buffer.format_finite(n);
    s.strip_suffix(".0").unwrap_or(s).to_string()
}

/// `0.5` -> `.5`, `-0.5` -> `-.5`
fn remove_leading_zero(s: &str) -> String {
    if let Some(rest) = s.strip_prefix("0.") {
        format!(".{rest}")
    } else if let Some(rest) = s.strip_prefix("-0.") {
        format!("-.{rest}")
    } else {
        s.to_string()
    }
}
