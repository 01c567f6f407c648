//! A small owned SVG element tree.
//!
//! Documents are built, merged and rewritten as [`Element`] trees and
//! serialized with two-space indentation. Parsing goes through `roxmltree`;
//! names in the SVG, XLink, Inkscape, Sodipodi and XML namespaces keep their
//! conventional prefixes, anything in another namespace is dropped.

use anyhow::{Context, Result};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Known namespaces and the prefixes they are written with.
pub const NAMESPACES: &[(&str, &str)] = &[
    ("xlink", "http://www.w3.org/1999/xlink"),
    ("inkscape", "http://www.inkscape.org/namespaces/inkscape"),
    ("sodipodi", "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd"),
    ("xml", "http://www.w3.org/XML/1998/namespace"),
];

/// Elements whose whitespace-only text is significant.
const TEXT_ELEMENTS: &[&str] = &["text", "tspan", "textPath", "style", "title", "desc"];

/// A child of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Nested element
    Element(Element),
    /// Character data
    Text(String),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Qualified name, e.g. `svg` or `sodipodi:namedview`
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element without attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds (or replaces) an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Appends several child elements.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children.into_iter().map(Node::Element));
        self
    }

    /// Appends a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Appends a child element in place.
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Removes an attribute, returning its value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(index).1)
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Returns true if the `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|token| token == class))
    }

    /// Value of a property in the inline `style` attribute.
    pub fn style_property(&self, property: &str) -> Option<&str> {
        self.attr("style")?.split(';').find_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            (name.trim() == property).then(|| value.trim())
        })
    }

    /// Removes a property from the inline `style` attribute, returning its
    /// value. An emptied `style` is removed.
    pub fn remove_style_property(&mut self, property: &str) -> Option<String> {
        let style = self.attr("style")?;
        let mut removed = None;
        let kept: Vec<&str> = style
            .split(';')
            .filter(|declaration| {
                let Some((name, value)) = declaration.split_once(':') else {
                    return !declaration.trim().is_empty();
                };
                if name.trim() == property {
                    removed = Some(value.trim().to_string());
                    return false;
                }
                true
            })
            .collect();
        removed.as_ref()?;

        let style = kept.join(";");
        if style.trim().is_empty() {
            self.remove_attr("style");
        } else {
            self.set_attr("style", style);
        }
        removed
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Mutable child elements, skipping text.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Depth-first search for an element with the given id, including `self`.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.elements().find_map(|child| child.find_by_id(id))
    }

    /// Mutable variant of [`Element::find_by_id`].
    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.elements_mut().find_map(|child| child.find_by_id_mut(id))
    }

    /// Removes the first descendant with the given id.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Element> {
        if let Some(index) = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(e) if e.id() == Some(id)))
        {
            return match self.children.remove(index) {
                Node::Element(element) => Some(element),
                Node::Text(_) => None,
            };
        }
        self.elements_mut().find_map(|child| child.remove_by_id(id))
    }

    /// Removes every descendant element (with its subtree) for which `keep`
    /// returns false. Returns how many were removed.
    pub fn retain_elements(&mut self, keep: &mut dyn FnMut(&Element) -> bool) -> usize {
        let before = self.children.len();
        self.children.retain(|node| match node {
            Node::Element(element) => keep(element),
            Node::Text(_) => true,
        });
        let mut removed = before - self.children.len();
        for child in self.elements_mut() {
            removed += child.retain_elements(keep);
        }
        removed
    }

    /// Visits `self` and every descendant element, pre-order.
    pub fn visit(&self, f: &mut dyn FnMut(&Element)) {
        f(self);
        for child in self.elements() {
            child.visit(f);
        }
    }

    /// Mutably visits `self` and every descendant element, pre-order.
    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        f(self);
        for child in self.elements_mut() {
            child.visit_mut(f);
        }
    }

    /// Parses an XML document and returns its root element.
    ///
    /// # Errors
    ///
    /// Returns an error if the text isn't well-formed XML.
    pub fn parse(text: &str) -> Result<Self> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let document = roxmltree::Document::parse_with_options(text, options)
            .context("Failed to parse SVG")?;
        Self::from_node(document.root_element())
            .context("SVG root element is in an unsupported namespace")
    }

    /// Converts a parsed node into an owned element.
    ///
    /// Returns `None` if the node isn't an element or lives in an unknown
    /// namespace.
    pub fn from_node(node: roxmltree::Node<'_, '_>) -> Option<Self> {
        if !node.is_element() {
            return None;
        }
        let tag = node.tag_name();
        let name = qualified_name(tag.namespace(), tag.name())?;

        let attributes = node
            .attributes()
            .filter_map(|attr| {
                qualified_name(attr.namespace(), attr.name())
                    .map(|name| (name, attr.value().to_string()))
            })
            .collect();

        let keep_whitespace = TEXT_ELEMENTS.contains(&tag.name());
        let children = node
            .children()
            .filter_map(|child| {
                if child.is_element() {
                    Self::from_node(child).map(Node::Element)
                } else if child.is_text() {
                    let text = child.text().unwrap_or_default();
                    (keep_whitespace || !text.trim().is_empty())
                        .then(|| Node::Text(text.to_string()))
                } else {
                    None
                }
            })
            .collect();

        Some(Self {
            name,
            attributes,
            children,
        })
    }

    /// Serializes the element with two-space indentation.
    pub fn to_pretty_string(&self) -> String {
        self.to_indented_string("  ")
    }

    /// Serializes the element, indenting each nesting level with `unit`.
    pub fn to_indented_string(&self, unit: &str) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0, unit);
        out
    }

    /// Serializes a whole document, optionally with an XML declaration.
    pub fn to_document(&self, xml_declaration: bool) -> String {
        let mut out = String::new();
        if xml_declaration {
            out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        }
        self.write_pretty(&mut out, 0, "  ");
        out.push('\n');
        out
    }

    fn write_pretty(&self, out: &mut String, depth: usize, unit: &str) {
        let indent = unit.repeat(depth);
        out.push_str(&indent);
        self.write_start(out);

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');

        let inline = TEXT_ELEMENTS.contains(&self.name.as_str())
            || self.children.iter().any(|c| matches!(c, Node::Text(_)));
        if inline {
            for child in &self.children {
                write_inline(child, out);
            }
        } else {
            for child in self.elements() {
                out.push('\n');
                child.write_pretty(out, depth + 1, unit);
            }
            out.push('\n');
            out.push_str(&indent);
        }

        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    fn write_start(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
    }
}

fn write_inline(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Element(element) => {
            element.write_start(out);
            if element.children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in &element.children {
                write_inline(child, out);
            }
            out.push_str("</");
            out.push_str(&element.name);
            out.push('>');
        }
    }
}

fn qualified_name(namespace: Option<&str>, local: &str) -> Option<String> {
    match namespace {
        None | Some(SVG_NS) => Some(local.to_string()),
        Some(uri) => NAMESPACES
            .iter()
            .find(|(_, known)| *known == uri)
            .map(|(prefix, _)| format!("{prefix}:{local}")),
    }
}

/// Escapes text for use inside a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escapes character data.
pub fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_serialization() {
        let svg = Element::new("svg")
            .with_attr("viewBox", "0 0 100 100")
            .with_child(
                Element::new("g")
                    .with_attr("id", "a")
                    .with_child(Element::new("rect").with_attr("width", "10")),
            )
            .with_child(
                Element::new("text").with_child(Element::new("tspan").with_text("A & B")),
            );

        assert_eq!(
            svg.to_pretty_string(),
            "<svg viewBox=\"0 0 100 100\">\n  <g id=\"a\">\n    <rect width=\"10\"/>\n  </g>\n  <text><tspan>A &amp; B</tspan></text>\n</svg>"
        );
    }

    #[test]
    fn test_parse_maps_namespaces() {
        let source = r##"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
     xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:RDF/>
  <use xlink:href="#x" inkscape:label="L" rdf:about="gone"/>
</svg>"##;
        let svg = Element::parse(source).unwrap();
        assert_eq!(svg.elements().count(), 1);
        let use_element = svg.elements().next().unwrap();
        assert_eq!(use_element.attr("xlink:href"), Some("#x"));
        assert_eq!(use_element.attr("inkscape:label"), Some("L"));
        assert_eq!(use_element.attributes.len(), 2);
    }

    #[test]
    fn test_parse_keeps_text_whitespace() {
        let svg = Element::parse(
            "<svg xmlns=\"http://www.w3.org/2000/svg\"><text xml:space=\"preserve\"> <tspan>a b</tspan></text></svg>",
        )
        .unwrap();
        let text = svg.elements().next().unwrap();
        assert_eq!(text.attr("xml:space"), Some("preserve"));
        assert_eq!(text.children.len(), 2);
        assert_eq!(text.text_content(), " a b");
    }

    #[test]
    fn test_find_and_remove_by_id() {
        let mut root = Element::new("svg").with_child(
            Element::new("defs")
                .with_attr("id", "defs")
                .with_child(Element::new("mask").with_attr("id", "m")),
        );
        assert!(root.find_by_id("m").is_some());
        root.find_by_id_mut("m").unwrap().set_attr("x", "1");
        let removed = root.remove_by_id("m").unwrap();
        assert_eq!(removed.attr("x"), Some("1"));
        assert!(root.find_by_id("m").is_none());
        assert!(root.find_by_id("defs").is_some());
    }

    #[test]
    fn test_retain_elements() {
        let mut root = Element::new("svg")
            .with_child(Element::new("use").with_attr("class", "outline shaded"))
            .with_child(
                Element::new("g")
                    .with_attr("class", "wrap")
                    .with_child(Element::new("rect"))
                    .with_child(Element::new("circle")),
            );

        assert_eq!(root.retain_elements(&mut |e| !e.has_class("outline")), 1);
        assert_eq!(root.retain_elements(&mut |e| e.name != "circle"), 1);
        let names: Vec<_> = root.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["g"]);
    }

    #[test]
    fn test_style_property() {
        let e = Element::new("g").with_attr("style", "fill:red; visibility : hidden;");
        assert_eq!(e.style_property("visibility"), Some("hidden"));
        assert_eq!(e.style_property("stroke"), None);
    }

    #[test]
    fn test_remove_style_property() {
        let mut e = Element::new("g").with_attr("style", "fill:red; transform-origin: center;");
        assert_eq!(e.remove_style_property("transform-origin").as_deref(), Some("center"));
        assert_eq!(e.attr("style"), Some("fill:red"));
        assert_eq!(e.remove_style_property("stroke"), None);
        assert_eq!(e.attr("style"), Some("fill:red"));
        assert_eq!(e.remove_style_property("fill").as_deref(), Some("red"));
        assert_eq!(e.attr("style"), None);
    }

    #[test]
    fn test_set_attr_keeps_position() {
        let mut e = Element::new("rect").with_attr("x", "0").with_attr("y", "0");
        e.set_attr("x", "5");
        assert_eq!(e.attributes[0], ("x".to_string(), "5".to_string()));
        assert_eq!(e.remove_attr("y").as_deref(), Some("0"));
        assert_eq!(e.attributes.len(), 1);
    }

    #[test]
    fn test_to_document_has_declaration() {
        let doc = Element::new("svg").to_document(true);
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg/>"));
    }
}
