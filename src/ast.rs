//! SVG document tree.
//!
//! Element and attribute names are kept as written (`prefix:local`).

/// A parsed SVG document.
#[derive(Debug, Clone)]
pub struct Document {
    /// `<?xml ...?>` declaration, if present
    pub xml_declaration: Option<XmlDeclaration>,
    /// DOCTYPE body, without `<!DOCTYPE` and `>`
    pub doctype: Option<String>,
    pub root: Element,
}

#[derive(Debug, Clone)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    /// Attributes in source order
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Namespace prefix, e.g. `xlink` for `xlink:href`.
    pub fn prefix(&self) -> Option<&str> {
        split_prefix(&self.name)
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    CData(String),
    ProcessingInstruction { target: String, content: Option<String> },
}

fn split_prefix(name: &str) -> Option<&str> {
    name.split_once(':').map(|(prefix, _)| prefix)
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        split_prefix(&self.name)
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute value, appending the attribute if missing.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if let Some(attr) = self.attributes.iter_mut().find(|a| a.name == name) {
            attr.value = value.into();
        } else {
            self.attributes.push(Attribute::new(name, value));
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }
}

impl Document {
    /// Visit every element, parents before children.
    pub fn for_each_element_mut(&mut self, mut f: impl FnMut(&mut Element)) {
        fn visit(elem: &mut Element, f: &mut impl FnMut(&mut Element)) {
            f(elem);
            for child in elem.child_elements_mut() {
                visit(child, f);
            }
        }
        visit(&mut self.root, &mut f);
    }
}
