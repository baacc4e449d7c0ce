//! SVG serialization, minified or pretty-printed.

use serde::Deserialize;

use crate::ast::*;

/// Output formatting options (the `js2svg` config section).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Js2Svg {
    /// One node per line, nested elements indented
    pub pretty: bool,
    /// Spaces per nesting level when pretty printing
    pub indent: usize,
}

impl Default for Js2Svg {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: 4,
        }
    }
}

/// Serialize a Document to a string.
pub fn serialize(doc: &Document, options: &Js2Svg) -> String {
    let mut out = String::new();

    if let Some(ref decl) = doc.xml_declaration {
        out.push_str("<?xml version=\"");
        out.push_str(&decl.version);
        out.push('"');
        if let Some(ref enc) = decl.encoding {
            out.push_str(" encoding=\"");
            out.push_str(enc);
            out.push('"');
        }
        if let Some(standalone) = decl.standalone {
            out.push_str(" standalone=\"");
            out.push_str(if standalone { "yes" } else { "no" });
            out.push('"');
        }
        out.push_str("?>");
        newline(&mut out, options);
    }

    if let Some(ref dt) = doc.doctype {
        out.push_str("<!DOCTYPE ");
        out.push_str(dt);
        out.push('>');
        newline(&mut out, options);
    }

    serialize_element(&mut out, &doc.root, options, 0);
    newline(&mut out, options);

    out
}

fn newline(out: &mut String, options: &Js2Svg) {
    if options.pretty {
        out.push('\n');
    }
}

fn indent(out: &mut String, options: &Js2Svg, depth: usize) {
    if options.pretty {
        out.extend(std::iter::repeat_n(' ', options.indent * depth));
    }
}

fn serialize_element(out: &mut String, elem: &Element, options: &Js2Svg, depth: usize) {
    indent(out, options, depth);
    out.push('<');
    out.push_str(&elem.name);

    for attr in &elem.attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        push_escaped_attr(out, &attr.value);
        out.push('"');
    }

    if elem.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');

    // text content stays inline so pretty printing doesn't add whitespace to it
    let inline = elem
        .children
        .iter()
        .any(|n| matches!(n, Node::Text(_) | Node::CData(_)));

    if inline {
        for child in &elem.children {
            serialize_node(out, child, &Js2Svg::default(), 0);
        }
    } else {
        for child in &elem.children {
            newline(out, options);
            serialize_node(out, child, options, depth + 1);
        }
        newline(out, options);
        indent(out, options, depth);
    }

    out.push_str("</");
    out.push_str(&elem.name);
    out.push('>');
}

fn serialize_node(out: &mut String, node: &Node, options: &Js2Svg, depth: usize) {
    match node {
        Node::Element(elem) => serialize_element(out, elem, options, depth),
        Node::Text(text) => push_escaped_text(out, text),
        Node::Comment(comment) => {
            indent(out, options, depth);
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        Node::ProcessingInstruction { target, content } => {
            indent(out, options, depth);
            out.push_str("<?");
            out.push_str(target);
            if let Some(c) = content {
                out.push(' ');
                out.push_str(c);
            }
            out.push_str("?>");
        }
    }
}

fn push_escaped_attr(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn push_escaped_text(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_svg;

    #[test]
    fn test_serialize_minified() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <g>
    <rect width="1"/>
  </g>
</svg>"#;
        let doc = parse_svg(svg).unwrap();
        let out = serialize(&doc, &Js2Svg::default());
        assert_eq!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g><rect width="1"/></g></svg>"#
        );
    }

    #[test]
    fn test_serialize_pretty() {
        let svg = r#"<svg><g><rect/><text>a &amp; b</text></g></svg>"#;
        let doc = parse_svg(svg).unwrap();
        let options = Js2Svg {
            pretty: true,
            indent: 2,
        };
        let out = serialize(&doc, &options);
        assert_eq!(
            out,
            "<svg>\n  <g>\n    <rect/>\n    <text>a &amp; b</text>\n  </g>\n</svg>\n"
        );
    }

    #[test]
    fn test_serialize_keeps_declaration() {
        let svg = r#"<?xml version="1.0" standalone="no"?><svg/>"#;
        let doc = parse_svg(svg).unwrap();
        let out = serialize(&doc, &Js2Svg::default());
        assert_eq!(out, r#"<?xml version="1.0" standalone="no"?><svg/>"#);
    }

    #[test]
    fn test_serialize_escapes_attributes() {
        let svg = r#"<svg data-x="a &quot;b&quot; &lt;c&gt;"/>"#;
        let doc = parse_svg(svg).unwrap();
        let out = serialize(&doc, &Js2Svg::default());
        assert_eq!(out, r#"<svg data-x="a &quot;b&quot; &lt;c&gt;"/>"#);
    }
}
