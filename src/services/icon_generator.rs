//! Blank icon documents for authoring new keycap legends.
//!
//! A generated document shows the keycap's top-surface outline and bounds
//! around a centered `_` placeholder inside `<svg id="icon">`. The designer
//! replaces the placeholder in an SVG editor; only the `icon` element (and
//! the definitions it references) is later placed on keycaps.

use anyhow::{bail, Context, Result};

use crate::constants::{DEFAULT_BACKGROUND, ICON_UNIT_PX};
use crate::font::FontSet;
use crate::keycap::{create_icon_outline, create_text_icon};
use crate::models::geometry::fmt_num;
use crate::models::{KeycapGeometry, Theme, Vec2, ViewBox};
use crate::svg::{set_label, Element, SvgDocumentBuilder, SvgStyleBuilder, SymbolSet};

/// Id of the `<style>` embedding the fonts in an icon document.
pub const ICON_FONT_STYLE_ID: &str = "font_style";

/// Parses a keycap size such as `1u`, `1.5u` or `1x2u`.
///
/// The height defaults to 1 and at least one dimension must be 1.
///
/// # Examples
///
/// ```
/// use kittencaps::models::Vec2;
/// use kittencaps::services::icon_generator::parse_icon_size;
///
/// assert_eq!(parse_icon_size("1.5u").unwrap(), Vec2::new(1.5, 1.0));
/// assert_eq!(parse_icon_size("1x2u").unwrap(), Vec2::new(1.0, 2.0));
/// assert!(parse_icon_size("2x2u").is_err());
/// ```
///
/// # Errors
///
/// Returns an error describing why the size is invalid.
pub fn parse_icon_size(size: &str) -> Result<Vec2> {
    let Some(dimensions) = size.strip_suffix('u') else {
        bail!("The given keycap size '{size}' is not valid: it must be suffixed with a 'u'");
    };
    if dimensions.is_empty() {
        bail!("The given keycap size '{size}' is not valid: no size was given");
    }

    let components = dimensions
        .split('x')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("The given keycap size '{size}' does not contain valid numbers"))?;

    let size_vec = match components.as_slice() {
        [width] => Vec2::new(*width, 1.0),
        [width, height] => Vec2::new(*width, *height),
        _ => bail!(
            "The given keycap size '{size}' is not valid: you can not specify more than two dimensions"
        ),
    };
    if size_vec.x <= 0.0 || size_vec.y <= 0.0 {
        bail!("The given keycap size '{size}' is not valid: dimensions must be positive");
    }
    if KeycapGeometry::from_dimensions(size_vec.x, size_vec.y).is_none() {
        bail!("The given keycap size '{size}' is not valid: neither of its dimensions are 1u");
    }
    Ok(size_vec)
}

/// Parameters of a generated icon document.
#[derive(Debug, Clone, Copy)]
pub struct IconRequest<'a> {
    /// Keycap size in u
    pub size: Vec2,
    /// Palette color of the visible background, if any
    pub background: Option<&'a str>,
    /// Extra space around the icon in px
    pub margin: f64,
}

/// Builds an icon document.
///
/// # Arguments
///
/// * `request` - Size, background and margin
/// * `fonts` - Faces to embed; the default face sets the placeholder
/// * `theme` - Palette, font size and surface proportions
/// * `templates` - Top-surface symbols
///
/// # Errors
///
/// Returns an error if the background isn't a palette color, the size
/// isn't 1u in either dimension, the templates lack the size, or a font
/// can't be embedded.
pub fn generate_icon_document(
    request: &IconRequest<'_>,
    fonts: &FontSet,
    theme: &Theme,
    templates: &SymbolSet,
) -> Result<Element> {
    let size = request.size;
    let margin = request.margin;
    let geometry = KeycapGeometry::from_dimensions(size.x, size.y).with_context(|| {
        format!(
            "Icon was not 1u in either width or height, given key dimensions: ({}, {})",
            size.x, size.y
        )
    })?;
    if let Some(background) = request.background {
        if !theme.palette.contains(background) {
            bail!("Background color '{background}' is not part of the theme palette");
        }
    }

    let pixel_size = size * ICON_UNIT_PX;
    let view_box = ViewBox::new(
        Vec2::splat(-margin),
        pixel_size + Vec2::splat(margin * 2.0),
    );

    let font_style = SvgStyleBuilder::new()
        .attribute("id", ICON_FONT_STYLE_ID)
        .statements(fonts.css_rules()?)
        .indentation(1, "  ")
        .build();

    let outline = create_icon_outline(&geometry, theme, templates, "black")?;

    let mut bounds = Element::new("rect")
        .with_attr("width", fmt_num(pixel_size.x))
        .with_attr("height", fmt_num(pixel_size.y))
        .with_attr("fill", "none")
        .with_attr("stroke", "black")
        .with_attr("stroke-opacity", "0.5")
        .with_attr("stroke-width", "0.65")
        .with_attr("style", "pointer-events: none;");
    set_label(&mut bounds, "Bounds");

    let mut background = Element::new("rect").with_attr("class", "icon-bg");
    if margin != 0.0 {
        background.set_attr("x", fmt_num(-margin));
        background.set_attr("y", fmt_num(-margin));
    }
    background.set_attr("width", fmt_num(pixel_size.x + margin * 2.0));
    background.set_attr("height", fmt_num(pixel_size.y + margin * 2.0));
    background.set_attr(
        "fill",
        format!("url(#{})", request.background.unwrap_or(DEFAULT_BACKGROUND)),
    );
    if request.background.is_none() {
        background.set_attr("visibility", "hidden");
    }
    set_label(&mut background, "BG");

    let icon = create_text_icon("_", Some(""), size, &fonts.default, theme.font_size_px, None);

    tracing::debug!("Generated {} icon document", geometry.size_u());
    Ok(SvgDocumentBuilder::new()
        .view_box(view_box)
        .palette(&theme.palette)
        .element(font_style)
        .element(background)
        .element(icon.element)
        .element(outline)
        .element(bounds)
        .build())
}
