//! Building the SVG group of a single keycap.
//!
//! A keycap is drawn in its own frame: the surface rect spans
//! `unit_size × major_size` by `unit_size`, horizontally. Vertical keys are
//! drawn the same way and rotated into place by the group transform, while
//! the icon is counter-rotated so it stays upright.
//!
//! ```text
//! ,-origin                    ,-origin
//! +----------------------+    +----------+
//! |                      |    |          |
//! |         icon         |    |   icon   |
//! |                      |    |          |
//! +----------------------+    |          |
//!                             +----------+
//! ```

use anyhow::{bail, Result};
use std::collections::BTreeMap;

use super::icon::{create_icon_outline, create_text_icon, default_icon, icon_reference, IconLibrary, IconSvg};
use super::info::KeycapInfo;
use crate::constants::ICON_UNIT_PX;
use crate::font::FontFace;
use crate::models::geometry::fmt_num;
use crate::models::{KeycapGeometry, Orientation, Theme, Transform, Vec2};
use crate::svg::{apply_transform, replace_in_attributes, DefsSet, Element, SymbolSet};

/// Whether and how keycaps carry the top-surface outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlineOption {
    /// No outline element
    #[default]
    Exclude,
    /// Outline present with `visibility="hidden"`
    IncludeHidden,
    /// Outline visible
    Show,
}

/// Knobs that differ between the output variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeycapRenderingOptions {
    /// Adds the side shading `<use>` (needs the `sideShading` filter)
    pub shading: bool,
    /// Outline handling
    pub outline: OutlineOption,
    /// Widens the keycap mask to include the icon margin
    pub include_margin: bool,
}

/// An element with the size it occupies before any transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SizedElement {
    /// The element
    pub element: Element,
    /// Width and height in px
    pub size: Vec2,
}

/// Shared inputs for rendering keycaps.
#[derive(Debug, Clone, Copy)]
pub struct KeycapAssets<'a> {
    /// Sizes and palette
    pub theme: &'a Theme,
    /// Face used for text legends
    pub font: &'a FontFace,
    /// Top-surface symbols
    pub templates: &'a SymbolSet,
    /// Icon files
    pub icons: &'a IconLibrary,
}

/// Creates keycap groups and collects the masks and definitions they need.
#[derive(Debug)]
pub struct KeycapFactory<'a> {
    assets: KeycapAssets<'a>,
    icon_margin: f64,
    options: KeycapRenderingOptions,
    defs: DefsSet,
    masks: BTreeMap<String, Element>,
    shading_masks: BTreeMap<String, Element>,
    next_id: usize,
    warnings: Vec<String>,
}

impl<'a> KeycapFactory<'a> {
    /// Creates a factory. Palette swatches are never imported from icon files.
    pub fn new(assets: KeycapAssets<'a>, icon_margin: f64) -> Self {
        Self {
            defs: DefsSet::new(assets.theme.palette.names().map(str::to_string)),
            assets,
            icon_margin,
            options: KeycapRenderingOptions::default(),
            masks: BTreeMap::new(),
            shading_masks: BTreeMap::new(),
            next_id: 0,
            warnings: Vec::new(),
        }
    }

    /// Sets the rendering options for subsequently created keycaps.
    #[must_use]
    pub fn configure(mut self, options: KeycapRenderingOptions) -> Self {
        self.options = options;
        self
    }

    /// Current rendering options.
    pub fn options(&self) -> KeycapRenderingOptions {
        self.options
    }

    /// Warnings raised so far (missing icon files).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Masks (by size), shading masks (by size), then imported icon
    /// definitions.
    pub fn defs(&self) -> impl Iterator<Item = &Element> {
        self.masks
            .values()
            .chain(self.shading_masks.values())
            .chain(self.defs.defs())
    }

    /// Builds the group for one keycap.
    ///
    /// # Errors
    ///
    /// Returns an error if the key's color isn't in the palette, an icon file
    /// is malformed, or the templates lack the key's top surface.
    pub fn create(&mut self, key: &KeycapInfo) -> Result<SizedElement> {
        let theme = self.assets.theme;
        let unit = theme.unit_size;
        let margin = self.icon_margin;
        let size_u = key.geometry.size_u();

        let dimensions = key.size() * unit;
        let (frame_pos, frame_rotation) = match key.geometry.orientation {
            Orientation::Horizontal => (Vec2::default(), 0.0),
            Orientation::Vertical => (Vec2::new(unit, 0.0), 90.0),
        };

        if !theme.palette.contains(&key.color) {
            bail!("Found unknown key color name '{}'", key.color);
        }

        let mut base = Element::new("rect").with_attr("class", "surface");
        if margin != 0.0 {
            base.set_attr("x", fmt_num(-margin));
            base.set_attr("y", fmt_num(-margin));
        }
        base.set_attr("width", fmt_num(unit * key.geometry.major_size + margin * 2.0));
        base.set_attr("height", fmt_num(unit + margin * 2.0));
        base.set_attr("fill", format!("url(#{})", key.color));

        let mut icon = self.create_icon(key)?;
        replace_in_attributes(&mut icon.element, &key.color_mappings);
        icon.set_scale(unit / ICON_UNIT_PX)?;
        icon.set_position(dimensions / 2.0 - icon.size / 2.0);

        let mut icon_wrapper = Element::new("g").with_child(icon.element);
        if let Some(outline) = self.create_outline(&key.geometry)? {
            icon_wrapper.push(outline);
        }
        apply_transform(
            &mut icon_wrapper,
            &Transform::placement(frame_pos.swap(), -frame_rotation),
        );

        let unshaded_id = format!("keycap-unshaded-{}", self.next_id);
        self.next_id += 1;
        let unshaded = Element::new("g")
            .with_attr("id", unshaded_id.as_str())
            .with_child(base)
            .with_child(icon_wrapper);

        let shading = if self.options.shading {
            let mask_id = self.shading_mask(&size_u, key.geometry.rounded_major_size());
            Some(
                Element::new("use")
                    .with_attr("href", format!("#{unshaded_id}"))
                    .with_attr("mask", format!("url(#{mask_id})"))
                    .with_attr("filter", "url(#sideShading)"),
            )
        } else {
            None
        };

        let mask_id = self.size_mask(&size_u, key.geometry.rounded_major_size());
        let mut group = Element::new("g")
            .with_attr("class", format!("keycap-color-{}", key.color))
            .with_attr("mask", format!("url(#{mask_id})"));
        apply_transform(&mut group, &Transform::placement(frame_pos, frame_rotation));
        group.push(unshaded);
        if let Some(shading) = shading {
            group.push(shading);
        }

        Ok(SizedElement {
            element: group,
            size: dimensions,
        })
    }

    fn create_icon(&mut self, key: &KeycapInfo) -> Result<IconSvg> {
        let Some(name) = icon_reference(&key.icon_id) else {
            return Ok(create_text_icon(
                &key.icon_id,
                None,
                Vec2::splat(1.0),
                self.assets.font,
                self.assets.theme.font_size_px,
                key.foreground_color.as_deref(),
            ));
        };

        match self.assets.icons.lookup(name, &mut self.defs)? {
            Some(icon) => Ok(icon),
            None => {
                let path = self.assets.icons.icon_path(name);
                tracing::warn!("Icon file not found, using a blank icon: {}", path.display());
                self.warnings
                    .push(format!("missing icon '{name}' ({})", path.display()));
                Ok(default_icon(name, Vec2::splat(1.0)))
            }
        }
    }

    fn create_outline(&self, geometry: &KeycapGeometry) -> Result<Option<Element>> {
        if self.options.outline == OutlineOption::Exclude {
            return Ok(None);
        }

        let theme = self.assets.theme;
        let mut outline = create_icon_outline(geometry, theme, self.assets.templates, "red")?;
        outline.set_attr("class", "outline");
        if self.options.outline == OutlineOption::IncludeHidden {
            outline.set_attr("visibility", "hidden");
        }
        apply_transform(&mut outline, &Transform::scaling(theme.unit_size / ICON_UNIT_PX));
        Ok(Some(outline))
    }

    /// Id of the `_<size>-base` mask clipping keycaps of this size.
    fn size_mask(&mut self, size_u: &str, size: f64) -> String {
        let id = format!("_{size_u}-base");
        if !self.masks.contains_key(size_u) {
            let theme = self.assets.theme;
            let mask_size = if self.options.include_margin {
                theme.unit_size + self.icon_margin * 2.0
            } else {
                theme.base_size
            };
            self.masks.insert(
                size_u.to_string(),
                create_keycap_mask(&id, size, mask_size, theme.unit_size),
            );
        }
        id
    }

    /// Id of the `_<size>-shading` mask covering the sides of a keycap.
    fn shading_mask(&mut self, size_u: &str, size: f64) -> String {
        let id = format!("_{size_u}-shading");
        if !self.shading_masks.contains_key(size_u) {
            let theme = self.assets.theme;
            let offset = (theme.unit_size - theme.top_size) / 2.0;
            let mask = Element::new("mask")
                .with_attr("id", id.as_str())
                .with_child(
                    Element::new("rect")
                        .with_attr("width", fmt_num(theme.unit_size * size))
                        .with_attr("height", fmt_num(theme.unit_size))
                        .with_attr("fill", "white"),
                )
                .with_child(
                    Element::new("use")
                        .with_attr("width", fmt_num(theme.unit_size * size - offset * 2.0))
                        .with_attr("height", fmt_num(theme.top_size))
                        .with_attr("x", fmt_num(offset))
                        .with_attr("y", fmt_num(offset))
                        .with_attr("href", format!("#_{size_u}-top"))
                        .with_attr("fill", "black"),
                );
            self.shading_masks.insert(size_u.to_string(), mask);
        }
        id
    }
}

/// A `<mask>` with a white rect of height `mask_size`, centered in a keycap
/// of `size` u.
#[must_use]
pub fn create_keycap_mask(id: &str, size: f64, mask_size: f64, unit_size: f64) -> Element {
    let offset = (unit_size - mask_size) / 2.0;
    Element::new("mask").with_attr("id", id).with_child(
        Element::new("rect")
            .with_attr("width", fmt_num(unit_size * size - offset * 2.0))
            .with_attr("height", fmt_num(mask_size))
            .with_attr("x", fmt_num(offset))
            .with_attr("y", fmt_num(offset))
            .with_attr("fill", "white"),
    )
}
