//! Kittencaps library
//!
//! Generates keycap artwork from keyboard-layout-editor layouts: themed
//! SVG previews, print sheets and textures, per-key image archives and the
//! icon files the keycaps are decorated with.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod font;
pub mod keycap;
pub mod models;
pub mod parser;
pub mod schema;
pub mod services;
pub mod svg;
