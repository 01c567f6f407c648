//! Planar geometry for keycap placement.
//!
//! All angles are in degrees and rotate clockwise, matching SVG's +y-down
//! coordinate system.

use anyhow::{Context, Result};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Formats a number the way it is written into SVG attributes.
///
/// Integral values drop the fractional part (`1.0` → `"1"`), everything else
/// is rounded to 6 decimals with trailing zeros removed.
#[must_use]
pub fn fmt_num(value: f64) -> String {
    let rounded = (value * 1_000_000.0).round() / 1_000_000.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = format!("{rounded:.6}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}

/// A 2D point or vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    /// Horizontal component
    pub x: f64,
    /// Vertical component (down is positive)
    pub y: f64,
}

impl Vec2 {
    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Creates a vector with both components set to `value`.
    #[must_use]
    pub const fn splat(value: f64) -> Self {
        Self { x: value, y: value }
    }

    /// Returns the vector with its components swapped.
    #[must_use]
    pub const fn swap(self) -> Self {
        Self { x: self.y, y: self.x }
    }

    /// Multiplies component-wise.
    #[must_use]
    pub fn scale(self, factor: Self) -> Self {
        Self::new(self.x * factor.x, self.y * factor.y)
    }

    /// Rotates this point clockwise by `angle` degrees around `origin`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kittencaps::models::geometry::Vec2;
    ///
    /// let p = Vec2::new(1.0, 0.0).rotate_around(Vec2::new(0.0, 0.0), 90.0);
    /// assert!((p.x - 0.0).abs() < 1e-9);
    /// assert!((p.y - 1.0).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn rotate_around(self, origin: Self, angle: f64) -> Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        let d = self - origin;
        Self::new(
            origin.x + cos * d.x - sin * d.y,
            origin.y + sin * d.x + cos * d.y,
        )
    }

    /// Returns true when both components are zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Top-left corner
    pub min: Vec2,
    /// Bottom-right corner
    pub max: Vec2,
}

impl Bounds {
    /// Smallest bounds containing all points. Returns `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self { min: first, max: first }, |acc, p| Self {
            min: Vec2::new(acc.min.x.min(p.x), acc.min.y.min(p.y)),
            max: Vec2::new(acc.max.x.max(p.x), acc.max.y.max(p.y)),
        }))
    }

    /// Bounds of a rectangle at `pos` with `size`, rotated by `rotation`
    /// degrees around `origin`.
    #[must_use]
    pub fn of_rotated_rect(pos: Vec2, size: Vec2, rotation: f64, origin: Vec2) -> Self {
        let max = pos + size;
        let corners = [
            pos,
            Vec2::new(pos.x, max.y),
            max,
            Vec2::new(max.x, pos.y),
        ];
        let rotated = corners.map(|corner| corner.rotate_around(origin, rotation));
        // Four corners always yield bounds.
        Self::from_points(rotated).unwrap_or(Self { min: pos, max })
    }

    /// Union of two bounds.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        Self {
            min: Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Width and height.
    #[must_use]
    pub fn size(self) -> Vec2 {
        self.max - self.min
    }
}

/// An SVG `viewBox` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    /// Top-left corner
    pub pos: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl ViewBox {
    /// Creates a view box from position and size.
    #[must_use]
    pub const fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// View box exactly covering `bounds`.
    #[must_use]
    pub fn from_bounds(bounds: Bounds) -> Self {
        Self::new(bounds.min, bounds.size())
    }

    /// Grows the view box by `padding` on every side.
    #[must_use]
    pub fn with_padding(self, padding: f64) -> Self {
        Self::new(
            self.pos - Vec2::splat(padding),
            self.size + Vec2::splat(padding * 2.0),
        )
    }

    /// Parses a `viewBox` attribute value (whitespace and/or comma separated).
    pub fn parse(value: &str) -> Result<Self> {
        let components = value
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<f64>()
                    .context(format!("Non-numeric viewBox component '{part}' in '{value}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        match components.as_slice() {
            [x, y, width, height] => Ok(Self::new(Vec2::new(*x, *y), Vec2::new(*width, *height))),
            _ => anyhow::bail!(
                "viewBox '{value}' must have 4 components, got {}",
                components.len()
            ),
        }
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            fmt_num(self.pos.x),
            fmt_num(self.pos.y),
            fmt_num(self.size.x),
            fmt_num(self.size.y)
        )
    }
}

/// An SVG transform made of an optional translation, rotation and scale,
/// applied in that order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    /// Translation
    pub translate: Option<Vec2>,
    /// Clockwise rotation in degrees
    pub rotate: Option<f64>,
    /// Scale factors
    pub scale: Option<Vec2>,
}

impl Transform {
    /// Transform with translation and rotation only.
    #[must_use]
    pub const fn placement(translate: Vec2, rotate: f64) -> Self {
        Self {
            translate: Some(translate),
            rotate: Some(rotate),
            scale: None,
        }
    }

    /// Uniform scale.
    #[must_use]
    pub const fn scaling(factor: f64) -> Self {
        Self {
            translate: None,
            rotate: None,
            scale: Some(Vec2::splat(factor)),
        }
    }

    /// Translation component, zero when absent.
    #[must_use]
    pub fn translation(&self) -> Vec2 {
        self.translate.unwrap_or_default()
    }

    /// Rotation component, zero when absent.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotate.unwrap_or(0.0)
    }

    /// Scale component, one when absent.
    #[must_use]
    pub fn scale_factor(&self) -> Vec2 {
        self.scale.unwrap_or(Vec2::splat(1.0))
    }

    /// Renders the transform attribute value, omitting identity parts.
    ///
    /// # Examples
    ///
    /// ```
    /// use kittencaps::models::geometry::{Transform, Vec2};
    ///
    /// let t = Transform::placement(Vec2::new(100.0, 0.0), 90.0);
    /// assert_eq!(t.to_svg_value(), "translate(100, 0) rotate(90)");
    /// assert_eq!(Transform::default().to_svg_value(), "");
    /// ```
    #[must_use]
    pub fn to_svg_value(&self) -> String {
        let mut parts = Vec::new();
        if let Some(t) = self.translate.filter(|t| !t.is_zero()) {
            parts.push(format!("translate({}, {})", fmt_num(t.x), fmt_num(t.y)));
        }
        if let Some(r) = self.rotate.filter(|r| *r != 0.0) {
            parts.push(format!("rotate({})", fmt_num(r)));
        }
        if let Some(s) = self.scale.filter(|s| *s != Vec2::splat(1.0)) {
            parts.push(format!("scale({}, {})", fmt_num(s.x), fmt_num(s.y)));
        }
        parts.join(" ")
    }
}

/// Which axis of a keycap is longer than 1u.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Height is 1u
    Horizontal,
    /// Width is 1u
    Vertical,
}

/// Size class of a keycap: one dimension is always 1u, the other is the major size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeycapGeometry {
    /// Length of the long side in u
    pub major_size: f64,
    /// Direction of the long side
    pub orientation: Orientation,
}

impl KeycapGeometry {
    /// Derives the geometry from a width and height in u.
    ///
    /// Returns `None` if neither dimension is 1u.
    #[must_use]
    #[allow(clippy::float_cmp)] // exact 1u is what layouts declare
    pub fn from_dimensions(width: f64, height: f64) -> Option<Self> {
        if height == 1.0 {
            Some(Self {
                major_size: width,
                orientation: Orientation::Horizontal,
            })
        } else if width == 1.0 {
            Some(Self {
                major_size: height,
                orientation: Orientation::Vertical,
            })
        } else {
            None
        }
    }

    /// Major size in `u` notation with two significant digits: `1u`, `1.5u`, `2u`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kittencaps::models::geometry::KeycapGeometry;
    ///
    /// assert_eq!(KeycapGeometry::from_dimensions(1.0, 1.0).unwrap().size_u(), "1u");
    /// assert_eq!(KeycapGeometry::from_dimensions(1.5, 1.0).unwrap().size_u(), "1.5u");
    /// assert_eq!(KeycapGeometry::from_dimensions(1.0, 2.0).unwrap().size_u(), "2u");
    /// ```
    #[must_use]
    pub fn size_u(&self) -> String {
        format!("{}u", fmt_num(self.rounded_major_size()))
    }

    /// Major size rounded the way [`size_u`](Self::size_u) names it.
    ///
    /// Keys sharing a size name share masks, so mask geometry is derived from
    /// this value rather than the exact width.
    #[must_use]
    pub fn rounded_major_size(&self) -> f64 {
        round_significant(self.major_size, 2)
    }

    /// Width and height in u.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        match self.orientation {
            Orientation::Horizontal => Vec2::new(self.major_size, 1.0),
            Orientation::Vertical => Vec2::new(1.0, self.major_size),
        }
    }
}

/// Rounds to `digits` significant digits.
///
/// Ties round to even on the exact binary value, so `1.25` becomes `1.2`
/// and `1.35` (stored just above the tie) becomes `1.4`.
///
/// # Examples
///
/// ```
/// use kittencaps::models::geometry::round_significant;
///
/// assert_eq!(round_significant(1.25, 2), 1.2);
/// assert_eq!(round_significant(1.75, 2), 1.8);
/// assert_eq!(round_significant(12.25, 3), 12.2);
/// ```
#[must_use]
pub fn round_significant(value: f64, digits: usize) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let precision = digits.saturating_sub(1);
    format!("{value:.precision$e}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(1.0), "1");
        assert_eq!(fmt_num(-40.0), "-40");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(0.1 + 0.2), "0.3");
        assert_eq!(fmt_num(-0.0), "0");
    }

    #[test]
    fn test_rotate_around_origin() {
        let p = Vec2::new(2.0, 1.0).rotate_around(Vec2::new(1.0, 1.0), 180.0);
        assert!(approx(p, Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn test_rotated_rect_bounds() {
        let bounds = Bounds::of_rotated_rect(
            Vec2::new(0.0, 0.0),
            Vec2::new(200.0, 100.0),
            90.0,
            Vec2::new(0.0, 0.0),
        );
        assert!(approx(bounds.min, Vec2::new(-100.0, 0.0)));
        assert!(approx(bounds.max, Vec2::new(0.0, 200.0)));
    }

    #[test]
    fn test_viewbox_padding_and_display() {
        let bounds = Bounds {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(100.0, 50.0),
        };
        let view_box = ViewBox::from_bounds(bounds).with_padding(40.0);
        assert_eq!(view_box.to_string(), "-40 -40 180 130");
        assert_eq!(ViewBox::parse("-40 -40 180 130").unwrap(), view_box);
        assert_eq!(ViewBox::parse("0,0, 10 10").unwrap().size, Vec2::new(10.0, 10.0));
        assert!(ViewBox::parse("0 0 10").is_err());
    }

    #[test]
    fn test_transform_svg_value() {
        let t = Transform {
            translate: Some(Vec2::new(50.0, 50.0)),
            rotate: Some(90.0),
            scale: Some(Vec2::splat(0.8)),
        };
        assert_eq!(t.to_svg_value(), "translate(50, 50) rotate(90) scale(0.8, 0.8)");
        assert_eq!(Transform::scaling(1.0).to_svg_value(), "");
    }

    #[test]
    fn test_keycap_geometry() {
        let g = KeycapGeometry::from_dimensions(2.25, 1.0).unwrap();
        assert_eq!(g.orientation, Orientation::Horizontal);
        assert_eq!(g.size(), Vec2::new(2.25, 1.0));

        let g = KeycapGeometry::from_dimensions(1.0, 1.5).unwrap();
        assert_eq!(g.orientation, Orientation::Vertical);
        assert_eq!(g.size_u(), "1.5u");

        assert!(KeycapGeometry::from_dimensions(2.0, 2.0).is_none());
    }

    #[test]
    fn test_size_u_two_significant_digits() {
        let g = KeycapGeometry::from_dimensions(6.0, 1.0).unwrap();
        assert_eq!(g.size_u(), "6u");
        let g = KeycapGeometry::from_dimensions(1.75, 1.0).unwrap();
        assert_eq!(g.size_u(), "1.8u");
    }

    #[test]
    fn test_size_u_rounds_ties_to_even() {
        for (size, expected) in [(1.25, "1.2u"), (2.25, "2.2u"), (6.25, "6.2u"), (2.75, "2.8u")] {
            let g = KeycapGeometry::from_dimensions(size, 1.0).unwrap();
            assert_eq!(g.size_u(), expected, "size {size}");
        }
        let g = KeycapGeometry::from_dimensions(1.0, 1.25).unwrap();
        assert_eq!(g.size_u(), "1.2u");
        assert!((g.rounded_major_size() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_round_significant() {
        assert_eq!(round_significant(12.25, 3), 12.2);
        assert_eq!(round_significant(0.125, 3), 0.125);
        assert_eq!(round_significant(0.375, 2), 0.38);
        assert_eq!(round_significant(0.625, 2), 0.62);
        assert_eq!(round_significant(-2.25, 2), -2.2);
        assert_eq!(round_significant(1234.0, 2), 1200.0);
        assert_eq!(round_significant(0.0, 3), 0.0);
    }
}
