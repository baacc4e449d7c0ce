//! SVG parsing from XML.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::ast::*;
use crate::error::OptsvgError;

/// Parse an SVG string into a Document.
///
/// Whitespace-only text nodes are dropped.
pub fn parse_svg(svg: &str) -> Result<Document, OptsvgError> {
    let mut reader = Reader::from_str(svg);

    let mut xml_declaration = None;
    let mut doctype = None;
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Decl(decl) => {
                xml_declaration = Some(XmlDeclaration {
                    version: String::from_utf8_lossy(decl.version()?.as_ref()).into_owned(),
                    encoding: decl
                        .encoding()
                        .transpose()
                        .ok()
                        .flatten()
                        .map(|e| String::from_utf8_lossy(e.as_ref()).into_owned()),
                    standalone: decl
                        .standalone()
                        .transpose()
                        .ok()
                        .flatten()
                        .map(|s| String::from_utf8_lossy(s.as_ref()) == "yes"),
                });
            }
            Event::DocType(dt) => {
                doctype = Some(String::from_utf8_lossy(&dt).trim().to_string());
            }
            Event::Start(start) => {
                root = Some(parse_element(&mut reader, &start)?);
                break;
            }
            Event::Empty(start) => {
                root = Some(parse_element_start(&start)?);
                break;
            }
            Event::Eof => break,
            // comments and whitespace before the root are not kept
            _ => {}
        }
    }

    let root = root.ok_or_else(|| OptsvgError::InvalidSvg("No root element found".into()))?;

    Ok(Document {
        xml_declaration,
        doctype,
        root,
    })
}

fn parse_element(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Element, OptsvgError> {
    let mut element = parse_element_start(start)?;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                element
                    .children
                    .push(Node::Element(parse_element(reader, &start)?));
            }
            Event::Empty(start) => {
                element
                    .children
                    .push(Node::Element(parse_element_start(&start)?));
            }
            Event::End(_) => break,
            Event::Text(text) => {
                let text = text.unescape()?;
                if !text.trim().is_empty() {
                    element.children.push(Node::Text(text.into_owned()));
                }
            }
            Event::Comment(comment) => {
                element
                    .children
                    .push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
            }
            Event::CData(cdata) => {
                element
                    .children
                    .push(Node::CData(String::from_utf8_lossy(&cdata).into_owned()));
            }
            Event::PI(pi) => {
                let content = String::from_utf8_lossy(&pi).into_owned();
                let (target, rest) = content
                    .split_once(char::is_whitespace)
                    .map(|(t, r)| (t.to_string(), Some(r.trim().to_string())))
                    .unwrap_or_else(|| (content, None));
                element
                    .children
                    .push(Node::ProcessingInstruction { target, content: rest });
            }
            Event::Eof => {
                return Err(OptsvgError::InvalidSvg(format!(
                    "Unexpected end of file inside <{}>",
                    element.name
                )));
            }
            _ => {}
        }
    }

    Ok(element)
}

fn parse_element_start(start: &BytesStart) -> Result<Element, OptsvgError> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr =
            attr.map_err(|e| OptsvgError::InvalidSvg(format!("Invalid attribute: {}", e)))?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?;
        element.attributes.push(Attribute::new(key, value.into_owned()));
    }

    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_declaration_and_doctype() {
        let svg = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
    <polygon points="0,0 10,10"/>
</svg>"#;

        let doc = parse_svg(svg).unwrap();
        let decl = doc.xml_declaration.unwrap();
        assert_eq!(decl.version, "1.0");
        assert_eq!(decl.encoding.as_deref(), Some("UTF-8"));
        assert!(doc.doctype.unwrap().starts_with("svg PUBLIC"));
        assert!(doc.root.is("svg"));
        assert_eq!(doc.root.get_attr("viewBox"), Some("0 0 100 100"));
        assert_eq!(doc.root.child_elements().count(), 1);
    }

    #[test]
    fn test_parse_drops_whitespace_text() {
        let svg = r#"<svg>
    <!-- note -->
    <text>hi</text>
</svg>"#;

        let doc = parse_svg(svg).unwrap();
        assert_eq!(doc.root.children.len(), 2);
        assert!(matches!(doc.root.children[0], Node::Comment(_)));
    }

    #[test]
    fn test_parse_prefixed_names() {
        let svg = r##"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a"/></svg>"##;

        let doc = parse_svg(svg).unwrap();
        let child = doc.root.child_elements().next().unwrap();
        assert_eq!(child.get_attr("xlink:href"), Some("#a"));
        assert_eq!(child.attributes[0].prefix(), Some("xlink"));
    }

    #[test]
    fn test_parse_rejects_missing_root() {
        assert!(matches!(
            parse_svg("<!-- nothing -->"),
            Err(OptsvgError::InvalidSvg(_))
        ));
    }
}
