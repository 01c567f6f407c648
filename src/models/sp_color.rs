//! Signature Plastics PBT color codes.
//!
//! Reference values as published by the manufacturer. They are approximate
//! and meant for previews, not color matching.

use super::RgbColor;

/// Known color codes, sorted by color group.
const SP_COLOR_TABLE: &[(&str, RgbColor)] = &[
    // Blue
    ("BCT", RgbColor::new(0x00, 0x7D, 0xB7)),
    ("BDJ", RgbColor::new(0x4A, 0x93, 0xC6)),
    ("BDO", RgbColor::new(0x28, 0xA1, 0xCF)),
    ("BFC", RgbColor::new(0xAA, 0xD0, 0xDB)),
    ("BFE", RgbColor::new(0x9F, 0xC4, 0xEF)),
    ("BFG", RgbColor::new(0x7D, 0xB3, 0xE9)),
    ("BFH", RgbColor::new(0x48, 0x8A, 0xAF)),
    ("BFV", RgbColor::new(0x7F, 0xD2, 0xDF)),
    ("BFW", RgbColor::new(0x4D, 0xA9, 0xBE)),
    // Brown
    ("TGJ", RgbColor::new(0x76, 0x43, 0x2B)),
    ("TGL", RgbColor::new(0xCD, 0xB3, 0x99)),
    ("TGM", RgbColor::new(0xC8, 0xA6, 0x80)),
    ("TT", RgbColor::new(0xC2, 0xA9, 0x86)),
    // Gray/Black
    ("GAH", RgbColor::new(0x73, 0x73, 0x6F)),
    ("GCA", RgbColor::new(0xB1, 0xB0, 0xA8)),
    ("GDE", RgbColor::new(0x8F, 0x93, 0x95)),
    ("GDM", RgbColor::new(0xCA, 0xC8, 0xBC)),
    ("GEC", RgbColor::new(0x96, 0x96, 0x94)),
    ("GJW", RgbColor::new(0x8B, 0x84, 0x7C)),
    ("GKK", RgbColor::new(0xC3, 0xC7, 0xC2)),
    ("GMC", RgbColor::new(0xA7, 0xA9, 0xA8)),
    ("GQC", RgbColor::new(0x9F, 0x9B, 0x8F)),
    ("GQJ", RgbColor::new(0xB9, 0xBB, 0xBA)),
    ("GQN", RgbColor::new(0xC5, 0xBB, 0xAB)),
    ("GQP", RgbColor::new(0xA3, 0x9D, 0x97)),
    ("GQT", RgbColor::new(0x5A, 0x5D, 0x5F)),
    ("GRZ", RgbColor::new(0xB0, 0xB1, 0xB1)),
    ("GSE", RgbColor::new(0x7C, 0x7A, 0x75)),
    ("GSF", RgbColor::new(0x3E, 0x40, 0x45)),
    ("GSH", RgbColor::new(0xD7, 0xD6, 0xD0)),
    ("GSJ", RgbColor::new(0xBF, 0xBF, 0xC0)),
    ("GSN", RgbColor::new(0xB7, 0xB6, 0xAC)),
    ("GSQ", RgbColor::new(0x84, 0x87, 0x88)),
    ("GTK", RgbColor::new(0xC7, 0xC2, 0xB0)),
    ("GTW", RgbColor::new(0x70, 0x78, 0x84)),
    ("NEM", RgbColor::new(0x28, 0x2A, 0x2E)),
    // Green
    ("VAL", RgbColor::new(0x61, 0x94, 0x90)),
    ("VAZ", RgbColor::new(0x00, 0x8C, 0x56)),
    ("VCC", RgbColor::new(0x34, 0xB7, 0x64)),
    ("VCD", RgbColor::new(0x00, 0x72, 0x5D)),
    ("VCE", RgbColor::new(0x76, 0xE1, 0xC0)),
    ("VCH", RgbColor::new(0x00, 0x9C, 0x69)),
    ("VCR", RgbColor::new(0x00, 0x8B, 0x45)),
    ("VDH", RgbColor::new(0x00, 0x76, 0x3A)),
    ("VDJ", RgbColor::new(0xAD, 0xDC, 0x77)),
    ("VS", RgbColor::new(0x25, 0x55, 0x46)),
    // Orange
    ("OAX", RgbColor::new(0xFF, 0x7A, 0x24)),
    ("OAY", RgbColor::new(0xFF, 0xB6, 0x7F)),
    ("OAZ", RgbColor::new(0xEF, 0x71, 0x44)),
    ("OBB", RgbColor::new(0xFF, 0x7C, 0x21)),
    ("OT", RgbColor::new(0xF3, 0x79, 0x1F)),
    ("OW", RgbColor::new(0xBA, 0x4C, 0x36)),
    // Red/Pink/Purple
    ("RAA", RgbColor::new(0xBC, 0x33, 0x31)),
    ("RAG", RgbColor::new(0xE7, 0x6C, 0x5E)),
    ("RAR", RgbColor::new(0xC1, 0x1C, 0x06)),
    ("RBH", RgbColor::new(0xBC, 0x25, 0x2F)),
    ("RCA", RgbColor::new(0xD7, 0x92, 0xBA)),
    ("RCB", RgbColor::new(0x89, 0x81, 0xB2)),
    ("RCE", RgbColor::new(0x83, 0x7C, 0x9A)),
    ("RCF", RgbColor::new(0xC9, 0x48, 0x54)),
    ("RCG", RgbColor::new(0xFF, 0xB8, 0xDE)),
    ("RCL", RgbColor::new(0xF7, 0x9C, 0xB2)),
    ("RCM", RgbColor::new(0xA1, 0x66, 0x87)),
    ("RCP", RgbColor::new(0xD2, 0x2F, 0x2F)),
    ("RDP", RgbColor::new(0x7F, 0x4A, 0x8B)),
    // White
    ("UP", RgbColor::new(0xF0, 0xF0, 0xEF)),
    ("WAN", RgbColor::new(0xEB, 0xEB, 0xE9)),
    ("WAS", RgbColor::new(0xDF, 0xDB, 0xD1)),
    ("WAT", RgbColor::new(0xC9, 0xC6, 0xB9)),
    ("WBK", RgbColor::new(0xE3, 0xDE, 0xCE)),
    ("WFJ", RgbColor::new(0xE6, 0xE4, 0xEE)),
    ("WFN", RgbColor::new(0xCC, 0xCB, 0xBB)),
    ("WGB", RgbColor::new(0xF0, 0xEE, 0xE9)),
    ("WGD", RgbColor::new(0xF4, 0xE7, 0xCE)),
    // Yellow
    ("YAF", RgbColor::new(0xFF, 0xE3, 0x84)),
    ("YAM", RgbColor::new(0xFD, 0xD8, 0x0F)),
    ("YBT", RgbColor::new(0xF6, 0xE4, 0x9F)),
    ("YBX", RgbColor::new(0xFF, 0xE1, 0x49)),
    ("YBZ", RgbColor::new(0xCD, 0x83, 0x17)),
    ("YCJ", RgbColor::new(0xE2, 0xAB, 0x00)),
    ("YCR", RgbColor::new(0xFF, 0xC0, 0x37)),
    ("YR", RgbColor::new(0xFF, 0xC7, 0x00)),
];

/// Looks up the sRGB value of a Signature Plastics color code (e.g. `"BCT"`).
///
/// Returns `None` for unknown codes.
#[must_use]
pub fn lookup(code: &str) -> Option<RgbColor> {
    SP_COLOR_TABLE
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, color)| *color)
}

/// Iterates over every known color code.
pub fn codes() -> impl Iterator<Item = &'static str> {
    SP_COLOR_TABLE.iter().map(|(code, _)| *code)
}
