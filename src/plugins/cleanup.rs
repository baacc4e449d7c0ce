//! Document-level cleanup plugins.

use crate::ast::*;

/// Namespaces written by editors, never needed for rendering.
const EDITOR_NAMESPACES: [&str; 7] = [
    "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd",
    "http://inkscape.sourceforge.net/DTD/sodipodi-0.dtd",
    "http://www.inkscape.org/namespaces/inkscape",
    "http://www.bohemiancoding.com/sketch/ns",
    "http://ns.adobe.com/AdobeIllustrator/10.0/",
    "http://ns.adobe.com/Graphs/1.0/",
    "http://www.serif.com/",
];

const COLOR_ATTRS: [&str; 6] = [
    "fill",
    "stroke",
    "stop-color",
    "flood-color",
    "lighting-color",
    "color",
];

/// `removeDoctype`
pub fn remove_doctype(doc: &mut Document) {
    doc.doctype = None;
}

/// `removeXMLProcInst`
pub fn remove_xml_proc_inst(doc: &mut Document) {
    doc.xml_declaration = None;
}

/// `removeComments`: keeps `<!--! ... -->` legal comments.
pub fn remove_comments(elem: &mut Element) {
    elem.children
        .retain(|node| !matches!(node, Node::Comment(c) if !c.starts_with('!')));

    for child in elem.child_elements_mut() {
        remove_comments(child);
    }
}

/// `removeMetadata`
pub fn remove_metadata(elem: &mut Element) {
    elem.children
        .retain(|node| !matches!(node, Node::Element(e) if e.is("metadata")));

    for child in elem.child_elements_mut() {
        remove_metadata(child);
    }
}

/// `removeEditorsNSData`: drops editor namespace declarations on the root
/// and every element or attribute using their prefixes.
pub fn remove_editors_ns_data(root: &mut Element) {
    let prefixes: Vec<String> = root
        .attributes
        .iter()
        .filter(|a| a.prefix() == Some("xmlns") && EDITOR_NAMESPACES.contains(&a.value.as_str()))
        .filter_map(|a| a.name.split_once(':').map(|(_, local)| local.to_string()))
        .collect();

    if prefixes.is_empty() {
        return;
    }

    root.attributes.retain(|a| {
        !(a.prefix() == Some("xmlns") && EDITOR_NAMESPACES.contains(&a.value.as_str()))
    });
    strip_prefixed(root, &prefixes);
}

fn strip_prefixed(elem: &mut Element, prefixes: &[String]) {
    let uses_prefix = |prefix: Option<&str>| prefix.is_some_and(|p| prefixes.iter().any(|x| x == p));

    elem.attributes.retain(|a| !uses_prefix(a.prefix()));
    elem.children
        .retain(|node| !matches!(node, Node::Element(e) if uses_prefix(e.prefix())));

    for child in elem.child_elements_mut() {
        strip_prefixed(child, prefixes);
    }
}

/// `convertColors`: `rgb()` to hex, hex to its shortest form.
pub fn convert_colors(elem: &mut Element) {
    for attr in &mut elem.attributes {
        if COLOR_ATTRS.contains(&attr.name.as_str()) {
            attr.value = convert_color(&attr.value);
        }
    }

    if let Some(style) = elem.get_attr("style").map(|s| s.to_string()) {
        elem.set_attr("style", convert_style_colors(&style));
    }

    for child in elem.child_elements_mut() {
        convert_colors(child);
    }
}

fn convert_color(color: &str) -> String {
    let color = color.trim();
    let lower = color.to_ascii_lowercase();

    let hex = if let Some(args) = lower
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        match rgb_to_hex(args) {
            Some(hex) => hex,
            None => return color.to_string(),
        }
    } else if lower.starts_with('#') {
        lower
    } else {
        return color.to_string();
    };

    let hex = shorten_hex(&hex);
    match hex.as_str() {
        // names shorter than their hex
        "#f00" => "red".into(),
        "#c0c0c0" => "silver".into(),
        "#808080" => "gray".into(),
        "#800000" => "maroon".into(),
        "#800080" => "purple".into(),
        "#008000" => "green".into(),
        "#808000" => "olive".into(),
        "#000080" => "navy".into(),
        "#008080" => "teal".into(),
        "#ffa500" => "orange".into(),
        _ => hex,
    }
}

fn rgb_to_hex(args: &str) -> Option<String> {
    let mut channels = [0u8; 3];
    let mut parts = args.split(',');

    for channel in &mut channels {
        let part = parts.next()?.trim();
        let value = match part.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f64>().ok()? * 2.55,
            None => part.parse::<f64>().ok()?,
        };
        *channel = value.round().clamp(0.0, 255.0) as u8;
    }

    if parts.next().is_some() {
        return None;
    }

    let [r, g, b] = channels;
    Some(format!("#{r:02x}{g:02x}{b:02x}"))
}

/// `#aabbcc` -> `#abc`
fn shorten_hex(hex: &str) -> String {
    let bytes = hex.as_bytes();
    if bytes.len() == 7
        && bytes[1..].iter().all(u8::is_ascii_hexdigit)
        && bytes[1] == bytes[2]
        && bytes[3] == bytes[4]
        && bytes[5] == bytes[6]
    {
        let short = [bytes[1], bytes[3], bytes[5]];
        return format!("#{}", String::from_utf8_lossy(&short));
    }
    hex.to_string()
}

fn convert_style_colors(style: &str) -> String {
    style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .map(|decl| match decl.split_once(':') {
            Some((prop, value)) if COLOR_ATTRS.contains(&prop.trim()) => {
                format!("{}:{}", prop.trim(), convert_color(value))
            }
            _ => decl.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}
