//! Keycap icons: generated text legends, icon files and template outlines.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_FOREGROUND, ICON_UNIT_PX};
use crate::font::{centered_baseline, FontFace};
use crate::models::geometry::fmt_num;
use crate::models::{KeycapGeometry, Orientation, Theme, Transform, Vec2, ViewBox};
use crate::svg::{apply_transform, set_label, DefsSet, Element, SymbolSet};

/// An icon's nested `<svg>` element together with its rendered size.
#[derive(Debug, Clone, PartialEq)]
pub struct IconSvg {
    /// The `<svg>` element
    pub element: Element,
    /// Rendered width and height in px
    pub size: Vec2,
}

impl IconSvg {
    /// Wraps an `<svg>` element, taking its size from `width`/`height` or
    /// its `viewBox`.
    ///
    /// # Errors
    ///
    /// Returns an error if the element has neither a parsable size nor a
    /// `viewBox`.
    pub fn new(element: Element) -> Result<Self> {
        let size = match (element.attr("width"), element.attr("height")) {
            (Some(width), Some(height)) => parse_length(width)
                .zip(parse_length(height))
                .map(|(w, h)| Vec2::new(w, h)),
            _ => None,
        };
        let size = match size {
            Some(size) => size,
            None => Self::view_box_of(&element)?.size,
        };
        Ok(Self { element, size })
    }

    fn view_box_of(element: &Element) -> Result<ViewBox> {
        let value = element
            .attr("viewBox")
            .context("Icon <svg> element has neither a size nor a viewBox")?;
        ViewBox::parse(value)
    }

    /// Sizes the icon to `scale` times its view box.
    ///
    /// # Errors
    ///
    /// Returns an error if the element has no valid `viewBox`.
    pub fn set_scale(&mut self, scale: f64) -> Result<()> {
        let view_box = Self::view_box_of(&self.element)?;
        self.size = view_box.size * scale;
        self.element.set_attr("width", fmt_num(self.size.x));
        self.element.set_attr("height", fmt_num(self.size.y));
        Ok(())
    }

    /// Positions the icon's top-left corner.
    pub fn set_position(&mut self, pos: Vec2) {
        self.element.set_attr("x", fmt_num(pos.x));
        self.element.set_attr("y", fmt_num(pos.y));
    }
}

fn parse_length(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").parse().ok()
}

fn icon_element_id(id: &str) -> String {
    if id.is_empty() {
        "icon".to_string()
    } else {
        format!("icon_{id}")
    }
}

/// Generates an icon showing `text`, centered on the cap height of `font`.
///
/// The icon's id is `icon_<id>` (`id` defaults to the text; an empty id
/// yields plain `icon`). Its view box is `keycap_size` × 100 px and the text
/// is filled with the `foreground` palette color, `fg_main` by default.
#[must_use]
pub fn create_text_icon(
    text: &str,
    id: Option<&str>,
    keycap_size: Vec2,
    font: &FontFace,
    font_size_px: f64,
    foreground: Option<&str>,
) -> IconSvg {
    let size = keycap_size * ICON_UNIT_PX;
    let baseline = centered_baseline(size.y, font_size_px, &font.metrics);
    let style = format!(
        "font-weight:{};font-size:{}px;font-family:{};fill:url(#{});white-space:normal;white-space-collapse:collapse;text-wrap:nowrap;",
        font.weight,
        fmt_num(font_size_px),
        font.family,
        foreground.unwrap_or(DEFAULT_FOREGROUND),
    );

    let text_element = Element::new("text")
        .with_attr("style", style)
        .with_attr("x", fmt_num(size.x / 2.0))
        .with_attr("y", fmt_num(baseline))
        .with_attr("text-anchor", "middle")
        .with_attr("xml:space", "preserve")
        .with_child(Element::new("tspan").with_text(text));

    let element = Element::new("svg")
        .with_attr("id", icon_element_id(id.unwrap_or(text)))
        .with_attr("viewBox", ViewBox::new(Vec2::default(), size).to_string())
        .with_attr("width", fmt_num(size.x))
        .with_attr("height", fmt_num(size.y))
        .with_attr("style", "overflow:visible;")
        .with_child(text_element);

    IconSvg { element, size }
}

/// An empty icon standing in for a missing icon file.
#[must_use]
pub fn default_icon(id: &str, keycap_size: Vec2) -> IconSvg {
    let size = keycap_size * ICON_UNIT_PX;
    let element = Element::new("svg")
        .with_attr("id", icon_element_id(id))
        .with_attr("viewBox", ViewBox::new(Vec2::default(), size).to_string())
        .with_attr("width", fmt_num(size.x))
        .with_attr("height", fmt_num(size.y));
    IconSvg { element, size }
}

/// The keycap's top-surface outline in icon coordinates (100 px per u).
///
/// The template path is centered on the keycap, scaled by
/// `top_size / unit_size` and rotated for vertical keys. It is stroked with
/// `stroke` at half opacity and labelled `Outline`.
///
/// # Errors
///
/// Returns an error if the templates have no top surface for `geometry`.
pub fn create_icon_outline(
    geometry: &KeycapGeometry,
    theme: &Theme,
    templates: &SymbolSet,
    stroke: &str,
) -> Result<Element> {
    let mut outline = templates.top_surface_path(geometry)?;
    let rotation = match geometry.orientation {
        Orientation::Horizontal => 0.0,
        Orientation::Vertical => 90.0,
    };
    apply_transform(
        &mut outline,
        &Transform {
            translate: Some(geometry.size().scale(Vec2::splat(ICON_UNIT_PX / 2.0))),
            rotate: Some(rotation),
            scale: Some(Vec2::splat(theme.top_size / theme.unit_size)),
        },
    );
    outline.set_attr("stroke", stroke);
    outline.set_attr("stroke-opacity", "0.5");
    outline.set_attr("fill", "none");
    outline.set_attr("style", "pointer-events: none;");
    outline.remove_attr("class");
    set_label(&mut outline, "Outline");
    Ok(outline)
}

/// The directory of hand-authored `[name].svg` icon files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconLibrary {
    dir: PathBuf,
}

impl IconLibrary {
    /// Opens the icon directory (it need not exist yet).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The icon directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file for icon `name`: `<dir>/[name].svg`.
    pub fn icon_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("[{name}].svg"))
    }

    /// Names of all icons in the directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory can't be read.
    pub fn names(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.dir)
            .context(format!("Failed to read icons directory: {}", self.dir.display()))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(name) = icon_name_from_file(file_name) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Loads icon `name`, pulling the definitions it references into `defs`.
    ///
    /// The file's `<svg id="icon">` element is returned renamed to
    /// `icon_<name>`. Returns `Ok(None)` if there is no file for the icon.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or parsed, or has no
    /// `<svg id="icon">` element.
    pub fn lookup(&self, name: &str, defs: &mut DefsSet) -> Result<Option<IconSvg>> {
        let path = self.icon_path(name);
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .context(format!("Failed to read icon file: {}", path.display()))?;
        let document = Element::parse(&content)
            .context(format!("Failed to parse icon file: {}", path.display()))?;

        let Some(icon) = document.find_by_id("icon") else {
            bail!("Icon file has no element with id 'icon': {}", path.display());
        };
        if icon.name != "svg" {
            bail!(
                "Element 'icon' must be an <svg>, found <{}>: {}",
                icon.name,
                path.display()
            );
        }

        defs.extract_references(icon, &document);
        let mut element = icon.clone();
        element.set_attr("id", icon_element_id(name));
        IconSvg::new(element)
            .context(format!("Invalid icon element: {}", path.display()))
            .map(Some)
    }
}

/// Icon name of a `[name].svg` file name.
#[must_use]
pub fn icon_name_from_file(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(".svg")?
        .strip_prefix('[')?
        .strip_suffix(']')
}

/// Icon name selected by a `[name]` legend, if the legend is one.
///
/// Anything after the closing bracket is ignored.
#[must_use]
pub fn icon_reference(label: &str) -> Option<&str> {
    let rest = label.strip_prefix('[')?;
    rest.rfind(']').map(|end| &rest[..end])
}
