//! Composing keycaps into a whole keyboard document.

use anyhow::{Context, Result};
use indexmap::IndexMap;

use super::factory::{KeycapAssets, KeycapFactory, KeycapRenderingOptions, OutlineOption, SizedElement};
use super::info::KeycapInfo;
use crate::constants::{KEYBOARD_PADDING, PRINT_MAX_ROW_WIDTH};
use crate::font::FontSet;
use crate::models::{Bounds, Key, Keyboard, Orientation, Transform, ViewBox};
use crate::svg::{apply_transform, Element, SvgDocumentBuilder, SvgStyleBuilder};

/// Id of the `<defs>` holding masks and imported icon definitions.
pub const FACTORY_DEFS_ID: &str = "factory-elements";

/// Id of the `<style>` embedding the fonts.
pub const FONTS_STYLE_ID: &str = "fonts";

/// A sized element with its placement in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedComponent {
    /// The element and its untransformed size
    pub element: SizedElement,
    /// Placement, prepended to the element's own transform
    pub transform: Transform,
}

impl PlacedComponent {
    /// The element with its placement applied.
    #[must_use]
    pub fn realize(self) -> Element {
        let mut element = self.element.element;
        apply_transform(&mut element, &self.transform);
        element
    }

    /// Bounds of the placed element, rotated around its translation.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        let origin = self.transform.translation();
        Bounds::of_rotated_rect(
            origin,
            self.element.size.scale(self.transform.scale_factor()),
            self.transform.rotation(),
            origin,
        )
    }
}

/// Placement of every key: its rotated KLE position times `unit_size`, and
/// its rotation.
pub fn place_keys(keys: &[Key], unit_size: f64) -> impl Iterator<Item = (&Key, Transform)> {
    keys.iter().map(move |key| {
        let pos = key.resolved_position() * unit_size;
        (key, Transform::placement(pos, key.rotation_angle))
    })
}

/// A composed keyboard document.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardSvg {
    /// Root `<svg>` element
    pub root: Element,
    /// Number of keycap groups
    pub key_count: usize,
    /// Non-fatal problems, such as missing icon files
    pub warnings: Vec<String>,
}

/// Builds a keyboard document from keys and other components.
#[derive(Debug)]
pub struct KeyboardBuilder<'a> {
    assets: KeycapAssets<'a>,
    fonts: &'a FontSet,
    icon_margin: f64,
    factory: KeycapFactory<'a>,
    components: Vec<PlacedComponent>,
    embed_fonts: bool,
    key_count: usize,
}

impl<'a> KeyboardBuilder<'a> {
    /// Creates a builder. Keys are spaced `unit_size + 2·icon_margin` apart.
    pub fn new(assets: KeycapAssets<'a>, fonts: &'a FontSet, icon_margin: f64) -> Self {
        Self {
            factory: KeycapFactory::new(assets, icon_margin),
            assets,
            fonts,
            icon_margin,
            components: Vec::new(),
            embed_fonts: true,
            key_count: 0,
        }
    }

    /// Sets the keycap rendering options for keys added afterwards.
    #[must_use]
    pub fn configure_factory(mut self, options: KeycapRenderingOptions) -> Self {
        self.factory = self.factory.configure(options);
        self
    }

    /// Embeds the font set into the document (when the set allows it).
    #[must_use]
    pub fn embed_fonts(mut self, value: bool) -> Self {
        self.embed_fonts = value;
        self
    }

    /// Adds a keycap for every key.
    ///
    /// # Errors
    ///
    /// Returns an error if a key can't be rendered.
    pub fn keys(mut self, keys: &[Key]) -> Result<Self> {
        let unit_size = self.assets.theme.unit_size + self.icon_margin * 2.0;
        for (index, (key, transform)) in place_keys(keys, unit_size).enumerate() {
            let info = KeycapInfo::from_key(key, &self.assets.theme.palette)
                .with_context(|| format!("Invalid key {index}"))?;
            let element = self
                .factory
                .create(&info)
                .with_context(|| format!("Failed to render key {index} ('{}')", info.icon_id))?;
            self.components.push(PlacedComponent { element, transform });
            self.key_count += 1;
        }
        Ok(self)
    }

    /// Adds an arbitrary placed component.
    #[must_use]
    pub fn component(mut self, component: PlacedComponent) -> Self {
        self.components.push(component);
        self
    }

    /// Assembles the document.
    ///
    /// Children in order: palette swatches, template styles, symbols and
    /// filters, `defs#factory-elements`, the embedded fonts, then the
    /// components. The view box covers every component plus 40 px.
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to draw or a font file can't be
    /// read for embedding.
    pub fn build(self) -> Result<KeyboardSvg> {
        let bounds = self
            .components
            .iter()
            .map(PlacedComponent::bounds)
            .reduce(Bounds::combine)
            .context("The layout has no keys to draw")?;
        let view_box = ViewBox::from_bounds(bounds).with_padding(KEYBOARD_PADDING);

        let mut builder = SvgDocumentBuilder::new()
            .view_box(view_box)
            .palette(&self.assets.theme.palette)
            .elements(self.assets.templates.document_elements().cloned())
            .element(
                Element::new("defs")
                    .with_attr("id", FACTORY_DEFS_ID)
                    .with_children(self.factory.defs().cloned()),
            );

        if self.embed_fonts && self.fonts.embed {
            builder = builder.element(
                SvgStyleBuilder::new()
                    .attribute("id", FONTS_STYLE_ID)
                    .statements(self.fonts.css_rules()?)
                    .indentation(1, "  ")
                    .build(),
            );
        }

        let warnings = self.factory.warnings().to_vec();
        let root = builder
            .elements(self.components.into_iter().map(PlacedComponent::realize))
            .build();

        tracing::debug!("Composed keyboard document with {} keys", self.key_count);
        Ok(KeyboardSvg {
            root,
            key_count: self.key_count,
            warnings,
        })
    }
}

/// The preview document: shading, hidden outlines, unwidened masks.
///
/// # Errors
///
/// Returns an error if a key can't be rendered.
pub fn build_keyboard_svg(
    keyboard: &Keyboard,
    assets: KeycapAssets<'_>,
    fonts: &FontSet,
) -> Result<KeyboardSvg> {
    KeyboardBuilder::new(assets, fonts, keyboard.icon_margin)
        .configure_factory(KeycapRenderingOptions {
            shading: true,
            outline: OutlineOption::IncludeHidden,
            include_margin: false,
        })
        .keys(&keyboard.keys)?
        .build()
}

/// Rearranges the keys for printing: grouped by size (in order of first
/// appearance), unrotated, in rows of at most 10u.
///
/// # Errors
///
/// Returns an error if a key isn't 1u in either dimension.
pub fn pack_keys_for_print(keyboard: &Keyboard) -> Result<Keyboard> {
    let mut packed = keyboard.clone();

    let mut groups: IndexMap<(u64, Orientation), Vec<&mut Key>> = IndexMap::new();
    for key in &mut packed.keys {
        let geometry = key
            .geometry()
            .with_context(|| format!("Key '{}' is not 1u in either width or height", key.center_label()))?;
        groups
            .entry((geometry.major_size.to_bits(), geometry.orientation))
            .or_default()
            .push(key);
    }

    let mut next_y = 0.0;
    for (_, keys) in groups {
        let mut row_height = 1.0;
        let mut next_x = 0.0;
        for key in keys {
            let size = (key.width, key.height);
            row_height = size.1;
            key.x = next_x;
            key.y = next_y;
            key.rotation_x = 0.0;
            key.rotation_y = 0.0;
            key.rotation_angle = 0.0;

            next_x += size.0;
            if next_x >= PRINT_MAX_ROW_WIDTH {
                next_x = 0.0;
                next_y += size.1;
            }
        }
        next_y += row_height;
    }

    Ok(packed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycap::testing::Fixture;
    use crate::models::Vec2;

    fn keyboard(keys: Vec<Key>) -> Keyboard {
        Keyboard {
            keys,
            ..Keyboard::default()
        }
    }

    #[test]
    fn test_place_keys() {
        let fixture = Fixture::new();
        let mut rotated = fixture.key("B", 1.0, 1.0);
        rotated.x = 1.0;
        rotated.rotation_angle = 90.0;
        let keys = vec![fixture.key("A", 1.0, 1.0), rotated];

        let placements: Vec<_> = place_keys(&keys, 100.0).map(|(_, t)| t).collect();
        assert_eq!(placements[0].to_svg_value(), "");
        assert_eq!(placements[1].to_svg_value(), "translate(0, 100) rotate(90)");
    }

    #[test]
    fn test_one_group_per_key() {
        let fixture = Fixture::new();
        let mut second = fixture.key("B", 2.0, 1.0);
        second.x = 1.0;
        let keyboard = keyboard(vec![fixture.key("A", 1.0, 1.0), second]);

        let document = build_keyboard_svg(&keyboard, fixture.assets(), &fixture.fonts).unwrap();
        assert_eq!(document.key_count, 2);
        assert!(document.warnings.is_empty());

        let root = &document.root;
        assert_eq!(root.attr("viewBox"), Some("-40 -40 380 180"));
        let groups: Vec<_> = root
            .elements()
            .filter(|e| e.has_class("keycap-color-bg_main"))
            .collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].attr("transform"), Some("translate(100, 0)"));

        let names: Vec<_> = root.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["defs", "style", "symbol", "symbol", "filter", "defs", "g", "g"]);
        assert!(root.find_by_id(FONTS_STYLE_ID).is_none());
        let factory_defs = root.find_by_id(FACTORY_DEFS_ID).unwrap();
        let ids: Vec<_> = factory_defs.elements().filter_map(Element::id).collect();
        assert_eq!(ids, ["_1u-base", "_2u-base", "_1u-shading", "_2u-shading"]);
    }

    #[test]
    fn test_icon_margin_spacing() {
        let fixture = Fixture::new();
        let mut second = fixture.key("B", 1.0, 1.0);
        second.x = 1.0;
        let mut keyboard = keyboard(vec![fixture.key("A", 1.0, 1.0), second]);
        keyboard.icon_margin = 10.0;

        let document = build_keyboard_svg(&keyboard, fixture.assets(), &fixture.fonts).unwrap();
        let group = document.root.elements().last().unwrap();
        assert_eq!(group.attr("transform"), Some("translate(120, 0)"));
    }

    #[test]
    fn test_empty_layout_fails() {
        let fixture = Fixture::new();
        let keyboard = keyboard(Vec::new());
        assert!(build_keyboard_svg(&keyboard, fixture.assets(), &fixture.fonts).is_err());
    }

    #[test]
    fn test_component_bounds() {
        let component = PlacedComponent {
            element: SizedElement {
                element: Element::new("g"),
                size: Vec2::new(200.0, 100.0),
            },
            transform: Transform::placement(Vec2::new(100.0, 0.0), 90.0),
        };
        let bounds = component.bounds();
        assert!((bounds.min.x - 0.0).abs() < 1e-9);
        assert!((bounds.max.y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_pack_keys_for_print() {
        let fixture = Fixture::new();
        let mut keys: Vec<Key> = (0..11).map(|i| fixture.key(&i.to_string(), 1.0, 1.0)).collect();
        let mut wide = fixture.key("Space", 2.0, 1.0);
        wide.rotation_angle = 30.0;
        keys.insert(3, wide);
        let packed = pack_keys_for_print(&keyboard(keys)).unwrap();

        let positions: Vec<_> = packed.keys.iter().map(|k| (k.x, k.y)).collect();
        assert_eq!(positions[0], (0.0, 0.0));
        assert_eq!(positions[2], (2.0, 0.0));
        // The 2u key starts its own group below the 1u rows.
        assert_eq!(positions[3], (0.0, 2.0));
        assert_eq!(positions[4], (3.0, 0.0));
        assert_eq!(positions[10], (9.0, 0.0));
        assert_eq!(positions[11], (0.0, 1.0));
        assert_eq!(packed.keys[3].rotation_angle, 0.0);
    }
}
