//! Post-processing of composed keyboard documents.
//!
//! The texture and print variants are consumed by tools with a narrower
//! SVG feature set than browsers: no palette swatches, no filters, no
//! hidden helpers. These passes strip a preview document down accordingly.
//! Documents headed for the rasterizer also lose CSS Color 4 functions and
//! `transform-origin`.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use regex::Regex;

use crate::constants::PALETTE_DEFS_ID;
use crate::keycap::factory::create_keycap_mask;
use crate::keycap::keyboard::FONTS_STYLE_ID;
use crate::models::geometry::fmt_num;
use crate::models::{Bounds, Palette, RgbColor, Theme, Vec2, ViewBox};
use crate::svg::{replace_in_attributes, Element};

/// Class of keycap outline elements.
pub const OUTLINE_CLASS: &str = "outline";

/// CSS Color 4 functions the rasterizer doesn't understand.
const COLOR_FUNCTION_PATTERN: &str = r"\b(oklab|oklch|lab|lch)\((-?\d+(?:\.\d+)?) (-?\d+(?:\.\d+)?) (-?\d+(?:\.\d+)?)(?: / (\d+(?:\.\d+)?))?\)";

/// Replaces `url(#name)` palette references with literal colors and removes
/// the palette swatches.
///
/// Hidden colors become `none`.
///
/// # Errors
///
/// Returns an error if the document has no `palette-colors` element.
pub fn inline_palette_references(root: &mut Element, palette: &Palette) -> Result<()> {
    let mut mappings = IndexMap::new();
    for (name, value) in palette.css_colors() {
        mappings.insert(format!("url(\"#{name}\")"), value.clone());
        mappings.insert(format!("url(#{name})"), value);
    }
    replace_in_attributes(root, &mappings);

    if root.remove_by_id(PALETTE_DEFS_ID).is_none() {
        bail!("Could not find #{PALETTE_DEFS_ID}");
    }
    Ok(())
}

/// Returns true if the element is hidden through its attribute or style.
pub fn is_hidden(element: &Element) -> bool {
    element.attr("visibility") == Some("hidden")
        || element.style_property("visibility") == Some("hidden")
}

/// Prepares a preview document for use as a texture.
///
/// Removes the embedded fonts, the side shading and hidden elements,
/// widens keycap masks to cover the icon margin, and inlines palette colors.
///
/// # Errors
///
/// Returns an error if the root has no valid `viewBox` or no palette.
pub fn normalize_for_texture(root: &mut Element, theme: &Theme, icon_margin: f64) -> Result<()> {
    let view_box = root
        .attr("viewBox")
        .context("Expected the document root to have a viewBox")?;
    ViewBox::parse(view_box)?;

    root.remove_by_id(FONTS_STYLE_ID);
    let shading = root.retain_elements(&mut |e| e.attr("filter") != Some("url(#sideShading)"));
    tracing::debug!("Removed {shading} shading elements");

    widen_keycap_masks(root, theme.unit_size, icon_margin);

    let hidden = root.retain_elements(&mut |e| !is_hidden(e));
    tracing::debug!("Removed {hidden} hidden elements");

    inline_palette_references(root, &theme.palette)
}

/// Makes every `_<size>u-base` mask cover the whole keycap including the
/// icon margin.
pub fn widen_keycap_masks(root: &mut Element, unit_size: f64, icon_margin: f64) {
    let Ok(pattern) = Regex::new(r"^_([0-9]+(?:\.[0-9]+)?)u-base$") else {
        return;
    };
    root.visit_mut(&mut |element| {
        if element.name != "mask" {
            return;
        }
        let Some(size) = element
            .id()
            .and_then(|id| pattern.captures(id))
            .and_then(|caps| caps[1].parse::<f64>().ok())
        else {
            return;
        };
        let id = element.id().unwrap_or_default().to_string();
        let widened = create_keycap_mask(&id, size, unit_size + icon_margin * 2.0, unit_size);
        element.children = widened.children;
    });
}

/// Removes keycap outlines. Returns how many were removed.
pub fn remove_outlines(root: &mut Element) -> usize {
    root.retain_elements(&mut |e| !e.has_class(OUTLINE_CLASS))
}

/// Makes keycap outlines visible.
pub fn show_outlines(root: &mut Element) {
    root.visit_mut(&mut |e| {
        if e.has_class(OUTLINE_CLASS) {
            e.set_attr("visibility", "visible");
        }
    });
}

/// Rewrites `lab()`, `lch()`, `oklab()` and `oklch()` colors in attribute
/// values as sRGB hex. Translucent colors become `#RRGGBBAA`.
pub fn reduce_color_spaces_to_srgb(root: &mut Element) {
    let Ok(pattern) = Regex::new(COLOR_FUNCTION_PATTERN) else {
        return;
    };
    root.visit_mut(&mut |element| {
        for (_, value) in &mut element.attributes {
            if pattern.is_match(value) {
                *value = pattern
                    .replace_all(value, |caps: &regex::Captures<'_>| color_function_to_hex(caps))
                    .into_owned();
            }
        }
    });
}

fn color_function_to_hex(caps: &regex::Captures<'_>) -> String {
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<f64>().ok());
    let (Some(lightness), Some(first), Some(second)) = (number(2), number(3), number(4)) else {
        return caps[0].to_string();
    };
    let polar = || {
        let hue = second.to_radians();
        (first * hue.cos(), first * hue.sin())
    };
    let color = match &caps[1] {
        "lab" => RgbColor::from_lab(lightness, first, second),
        "lch" => {
            let (a, b) = polar();
            RgbColor::from_lab(lightness, a, b)
        }
        "oklab" => RgbColor::from_oklab(lightness, first, second),
        _ => {
            let (a, b) = polar();
            RgbColor::from_oklab(lightness, a, b)
        }
    };

    match number(5) {
        Some(alpha) if alpha < 1.0 => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let alpha = (alpha * 255.0).round() as u8;
            format!("{}{alpha:02X}", color.to_hex())
        }
        _ => color.to_hex(),
    }
}

/// Bakes every `transform-origin` into the element's `transform` by wrapping
/// it in a pair of translations, then drops `transform-origin` and
/// `transform-box`.
///
/// The reference box is the closest `viewBox` unless `transform-box` asks
/// for the element's own `fill-box` or `stroke-box`.
///
/// # Errors
///
/// Returns an error for a `transform-box` other than `view-box`, `fill-box`
/// or `stroke-box`, an origin in units other than px or %, or an element
/// whose bounds can't be computed.
pub fn reduce_transform_origin(root: &mut Element) -> Result<()> {
    let mut any = false;
    root.visit(&mut |e| any |= origin_property(e, "transform-origin").is_some());
    if !any {
        return Ok(());
    }
    // Unchanged copy for resolving <use> references.
    let document = root.clone();
    reduce_transform_origin_in(root, None, &document)
}

fn reduce_transform_origin_in(
    element: &mut Element,
    view_box: Option<&str>,
    document: &Element,
) -> Result<()> {
    let view_box = element.attr("viewBox").map(str::to_string).or(view_box.map(str::to_string));
    bake_transform_origin(element, view_box.as_deref(), document)?;
    for child in element.elements_mut() {
        reduce_transform_origin_in(child, view_box.as_deref(), document)?;
    }
    Ok(())
}

fn bake_transform_origin(
    element: &mut Element,
    view_box: Option<&str>,
    document: &Element,
) -> Result<()> {
    let Some(origin) = origin_property(element, "transform-origin") else {
        return Ok(());
    };
    let transform_box = origin_property(element, "transform-box");
    let reference = match transform_box.as_deref().unwrap_or("view-box") {
        "view-box" => {
            let view_box =
                ViewBox::parse(view_box.context("transform-origin needs a viewBox to refer to")?)?;
            Bounds {
                min: view_box.pos,
                max: view_box.pos + view_box.size,
            }
        }
        "fill-box" => shape_bounds(element, document)?,
        "stroke-box" => {
            let bounds = shape_bounds(element, document)?;
            let width = match origin_property(element, "stroke-width") {
                Some(value) => parse_px(&value)?,
                None => 1.0,
            };
            let margin = Vec2::splat(width / 2.0);
            Bounds {
                min: bounds.min - margin,
                max: bounds.max + margin,
            }
        }
        other => bail!("Unsupported transform-box '{other}'"),
    };
    let origin = reference.min + parse_transform_origin(&origin, reference.size())?;

    if let Some(transform) = origin_property(element, "transform") {
        element.remove_style_property("transform");
        element.set_attr(
            "transform",
            format!(
                "translate({} {}) {transform} translate({} {})",
                fmt_num(origin.x),
                fmt_num(origin.y),
                fmt_num(-origin.x),
                fmt_num(-origin.y)
            ),
        );
    }
    for property in ["transform-origin", "transform-box"] {
        element.remove_attr(property);
        element.remove_style_property(property);
    }
    Ok(())
}

/// A presentation property, the inline style taking precedence.
fn origin_property(element: &Element, name: &str) -> Option<String> {
    element
        .style_property(name)
        .or_else(|| element.attr(name))
        .map(str::to_string)
}

fn parse_px(value: &str) -> Result<f64> {
    let value = value.trim();
    value
        .strip_suffix("px")
        .unwrap_or(value)
        .parse()
        .with_context(|| format!("Unsupported length '{value}', only px is supported"))
}

/// Offset of the origin from the top-left corner of a box of `size`.
fn parse_transform_origin(value: &str, size: Vec2) -> Result<Vec2> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    let (x, y) = match parts.as_slice() {
        [x] => (*x, "center"),
        // Keywords may come in either order
        [x, y] if matches!(*x, "top" | "bottom") || matches!(*y, "left" | "right") => (*y, *x),
        [x, y] => (*x, *y),
        _ => bail!("Unsupported transform-origin '{value}'"),
    };
    if matches!(x, "top" | "bottom") || matches!(y, "left" | "right") {
        bail!("Invalid transform-origin '{value}'");
    }

    let component = |part: &str, length: f64| -> Result<f64> {
        Ok(match part {
            "left" | "top" => 0.0,
            "center" => length / 2.0,
            "right" | "bottom" => length,
            _ => match part.strip_suffix('%') {
                Some(percent) => {
                    let percent: f64 = percent
                        .parse()
                        .with_context(|| format!("Invalid percentage in transform-origin '{value}'"))?;
                    percent / 100.0 * length
                }
                None => parse_px(part)
                    .with_context(|| format!("Unsupported transform-origin '{value}'"))?,
            },
        })
    };
    Ok(Vec2::new(component(x, size.x)?, component(y, size.y)?))
}

/// Geometric bounds of a basic shape, path or `<use>`, without stroke.
fn shape_bounds(element: &Element, document: &Element) -> Result<Bounds> {
    let length = |name: &str| element.attr(name).map_or(Ok(0.0), parse_px);
    let point = |x: &str, y: &str| -> Result<Vec2> { Ok(Vec2::new(length(x)?, length(y)?)) };

    let bounds = match element.name.as_str() {
        "rect" => {
            let min = point("x", "y")?;
            Bounds {
                min,
                max: min + point("width", "height")?,
            }
        }
        "circle" => {
            let radius = Vec2::splat(length("r")?);
            let center = point("cx", "cy")?;
            Bounds {
                min: center - radius,
                max: center + radius,
            }
        }
        "ellipse" => {
            let radius = point("rx", "ry")?;
            let center = point("cx", "cy")?;
            Bounds {
                min: center - radius,
                max: center + radius,
            }
        }
        "line" => Bounds::from_points([point("x1", "y1")?, point("x2", "y2")?])
            .context("A line has two points")?,
        "polyline" | "polygon" => {
            let points = element.attr("points").unwrap_or_default();
            Bounds::from_points(
                svgtypes::PointsParser::from(points).map(|(x, y)| Vec2::new(x, y)),
            )
            .with_context(|| format!("<{}> has no points", element.name))?
        }
        "path" => path_bounds(element.attr("d").unwrap_or_default())?,
        "use" => {
            let href = element
                .attr("href")
                .or_else(|| element.attr("xlink:href"))
                .context("<use> without href")?;
            let id = href
                .strip_prefix('#')
                .with_context(|| format!("Unsupported <use> reference '{href}'"))?;
            let target = document
                .find_by_id(id)
                .with_context(|| format!("<use> refers to missing #{id}"))?;
            let bounds = shape_bounds(target, document)?;
            let offset = point("x", "y")?;
            Bounds {
                min: bounds.min + offset,
                max: bounds.max + offset,
            }
        }
        other => bail!("Can't compute the bounds of <{other}>"),
    };
    Ok(bounds)
}

fn path_bounds(data: &str) -> Result<Bounds> {
    use svgtypes::SimplePathSegment as Segment;

    let mut points = Vec::new();
    let mut current = Vec2::default();
    let mut start = Vec2::default();
    for segment in svgtypes::SimplifyingPathParser::from(data) {
        let segment = segment.map_err(|e| anyhow::anyhow!("Invalid path data '{data}': {e}"))?;
        current = match segment {
            Segment::MoveTo { x, y } => {
                start = Vec2::new(x, y);
                start
            }
            Segment::LineTo { x, y } => Vec2::new(x, y),
            Segment::CurveTo { x1, y1, x2, y2, x, y } => {
                let (c1, c2, end) = (Vec2::new(x1, y1), Vec2::new(x2, y2), Vec2::new(x, y));
                let roots = cubic_extrema(current.x, c1.x, c2.x, end.x)
                    .into_iter()
                    .chain(cubic_extrema(current.y, c1.y, c2.y, end.y));
                let p0 = current;
                points.extend(roots.map(|t| {
                    let mt = 1.0 - t;
                    p0 * mt.powi(3) + c1 * (3.0 * mt * mt * t) + c2 * (3.0 * mt * t * t) + end * t.powi(3)
                }));
                end
            }
            Segment::Quadratic { x1, y1, x, y } => {
                let (control, end) = (Vec2::new(x1, y1), Vec2::new(x, y));
                let p0 = current;
                let roots = [
                    quadratic_extremum(p0.x, control.x, end.x),
                    quadratic_extremum(p0.y, control.y, end.y),
                ];
                points.extend(roots.into_iter().flatten().map(|t| {
                    let mt = 1.0 - t;
                    p0 * (mt * mt) + control * (2.0 * mt * t) + end * (t * t)
                }));
                end
            }
            Segment::ClosePath => start,
        };
        points.push(current);
    }
    Bounds::from_points(points).with_context(|| format!("Path '{data}' is empty"))
}

/// Parameters in (0, 1) where a cubic Bézier coordinate has a local extremum.
fn cubic_extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> Vec<f64> {
    // Derivative / 3 = a t² + b t + c
    let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
    let b = 2.0 * (p0 - 2.0 * p1 + p2);
    let c = p1 - p0;
    let roots = if a.abs() < f64::EPSILON {
        if b.abs() < f64::EPSILON {
            Vec::new()
        } else {
            vec![-c / b]
        }
    } else {
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            Vec::new()
        } else {
            let root = discriminant.sqrt();
            vec![(-b + root) / (2.0 * a), (-b - root) / (2.0 * a)]
        }
    };
    roots.into_iter().filter(|t| *t > 0.0 && *t < 1.0).collect()
}

fn quadratic_extremum(p0: f64, p1: f64, p2: f64) -> Option<f64> {
    let denominator = p0 - 2.0 * p1 + p2;
    if denominator.abs() < f64::EPSILON {
        return None;
    }
    let t = (p0 - p1) / denominator;
    (t > 0.0 && t < 1.0).then_some(t)
}
