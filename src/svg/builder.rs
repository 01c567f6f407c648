//! Builders for whole SVG documents, `<style>` elements and palette swatches.

use super::element::{Element, NAMESPACES};
use crate::constants::PALETTE_DEFS_ID;
use crate::models::{Paint, Palette, ViewBox};

/// Assembles a standalone SVG document.
#[derive(Debug, Clone, Default)]
pub struct SvgDocumentBuilder {
    view_box: Option<ViewBox>,
    palette: Option<Palette>,
    elements: Vec<Element>,
}

impl SvgDocumentBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document's `viewBox`.
    pub fn view_box(mut self, view_box: ViewBox) -> Self {
        self.view_box = Some(view_box);
        self
    }

    /// Emits palette swatches as the first child.
    pub fn palette(mut self, palette: &Palette) -> Self {
        self.palette = Some(palette.clone());
        self
    }

    /// Appends an element.
    pub fn element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    /// Appends several elements.
    pub fn elements(mut self, elements: impl IntoIterator<Item = Element>) -> Self {
        self.elements.extend(elements);
        self
    }

    /// Builds the root `<svg>` element.
    ///
    /// The root carries `version`, `viewBox` and the namespace declarations
    /// of every prefix the element model writes.
    pub fn build(self) -> Element {
        let mut root = Element::new("svg").with_attr("version", "1.1");
        if let Some(view_box) = self.view_box {
            root.set_attr("viewBox", view_box.to_string());
        }
        root.set_attr("xmlns", "http://www.w3.org/2000/svg");
        for (prefix, uri) in NAMESPACES {
            // The xml prefix is predeclared.
            if *prefix != "xml" {
                root.set_attr(format!("xmlns:{prefix}"), *uri);
            }
        }

        if let Some(palette) = &self.palette {
            root.push(build_palette_defs(palette));
        }
        root.with_children(self.elements)
    }
}

/// Builds a `<style type="text/css">` element from CSS statements.
#[derive(Debug, Clone, Default)]
pub struct SvgStyleBuilder {
    attributes: Vec<(String, String)>,
    statements: Vec<String>,
    indentation: Option<(usize, String)>,
}

impl SvgStyleBuilder {
    /// Creates an empty style builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute to the `<style>` element.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends CSS statements (rules or at-rules).
    pub fn statements(mut self, statements: impl IntoIterator<Item = String>) -> Self {
        self.statements.extend(statements);
        self
    }

    /// Indents the CSS as if the `<style>` element sat at `depth` in a
    /// document indented with `unit`.
    pub fn indentation(mut self, depth: usize, unit: impl Into<String>) -> Self {
        self.indentation = Some((depth, unit.into()));
        self
    }

    /// Builds the element.
    pub fn build(self) -> Element {
        let (depth, unit) = self.indentation.clone().unwrap_or((0, String::new()));
        let line_indent = unit.repeat(depth + 1);

        let body = self
            .statements
            .iter()
            .map(|statement| {
                statement
                    .trim_end_matches('\n')
                    .lines()
                    .map(|line| format!("{line_indent}{line}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n");

        let text = if self.indentation.is_some() {
            format!("\n{body}\n{}", unit.repeat(depth))
        } else {
            body
        };

        let mut style = Element::new("style").with_attr("type", "text/css");
        for (name, value) in self.attributes {
            style.set_attr(name, value);
        }
        style.with_text(text)
    }
}

/// Value of a swatch's `style` attribute.
///
/// Hidden colors become a fully transparent stop so that every consumer
/// treats them as invisible.
#[must_use]
pub fn swatch_style(paint: Paint) -> String {
    match paint {
        Paint::Color(color) => format!("stop-color:{};", color.to_hex()),
        Paint::Hidden => "stop-color:#000000;stop-opacity:0;".to_string(),
    }
}

/// One solid `<linearGradient>` swatch.
#[must_use]
pub fn build_swatch(name: &str, paint: Paint) -> Element {
    Element::new("linearGradient")
        .with_attr("id", name)
        .with_attr("inkscape:swatch", "solid")
        .with_child(Element::new("stop").with_attr("style", swatch_style(paint)))
}

/// `<defs id="palette-colors">` with one swatch per palette color, in
/// declaration order.
#[must_use]
pub fn build_palette_defs(palette: &Palette) -> Element {
    Element::new("defs")
        .with_attr("id", PALETTE_DEFS_ID)
        .with_children(palette.iter().map(|(name, paint)| build_swatch(name, paint)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RgbColor, Vec2};

    fn palette() -> Palette {
        Palette::from_entries([
            ("bg_main", Paint::Color(RgbColor::new(0xff, 0xff, 0xff))),
            ("fg_1", Paint::Hidden),
        ])
    }

    #[test]
    fn test_palette_defs() {
        let defs = build_palette_defs(&palette());
        assert_eq!(defs.id(), Some(PALETTE_DEFS_ID));
        let swatches: Vec<_> = defs.elements().collect();
        assert_eq!(swatches.len(), 2);
        assert_eq!(swatches[0].id(), Some("bg_main"));
        assert_eq!(swatches[0].attr("inkscape:swatch"), Some("solid"));
        let stop = swatches[0].elements().next().unwrap();
        assert_eq!(stop.attr("style"), Some("stop-color:#FFFFFF;"));
        let stop = swatches[1].elements().next().unwrap();
        assert_eq!(stop.attr("style"), Some("stop-color:#000000;stop-opacity:0;"));
    }

    #[test]
    fn test_document_root() {
        let root = SvgDocumentBuilder::new()
            .view_box(ViewBox::new(Vec2::new(-40.0, -40.0), Vec2::new(180.0, 180.0)))
            .palette(&palette())
            .element(Element::new("g"))
            .build();

        assert_eq!(root.attr("version"), Some("1.1"));
        assert_eq!(root.attr("viewBox"), Some("-40 -40 180 180"));
        assert_eq!(root.attr("xmlns"), Some("http://www.w3.org/2000/svg"));
        assert!(root.attr("xmlns:inkscape").is_some());
        assert!(root.attr("xmlns:xml").is_none());
        let names: Vec<_> = root.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["defs", "g"]);
    }

    #[test]
    fn test_style_indentation() {
        let style = SvgStyleBuilder::new()
            .attribute("id", "fonts")
            .statements(["a {\n  b: c;\n}".to_string()])
            .indentation(1, "  ")
            .build();
        assert_eq!(style.attr("type"), Some("text/css"));
        assert_eq!(style.attr("id"), Some("fonts"));
        assert_eq!(style.text_content(), "\n    a {\n      b: c;\n    }\n  ");
    }
}
