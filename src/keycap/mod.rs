//! Keycap rendering.
//!
//! [`info`] interprets layout keys, [`icon`] produces their legends,
//! [`factory`] turns one key into a masked, shaded SVG group and
//! [`keyboard`] places every keycap into a single document.

pub mod factory;
pub mod icon;
pub mod info;
pub mod keyboard;

#[cfg(test)]
pub(crate) mod testing;

pub use factory::{KeycapAssets, KeycapFactory, KeycapRenderingOptions, OutlineOption, SizedElement};
pub use icon::{create_icon_outline, create_text_icon, IconLibrary, IconSvg};
pub use info::{parse_color_mappings, ForegroundSpec, KeycapInfo};
pub use keyboard::{build_keyboard_svg, pack_keys_for_print, place_keys, KeyboardBuilder, KeyboardSvg, PlacedComponent};
