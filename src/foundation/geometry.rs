use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{CollageError, CollageResult};

/// Width/height pair in pixels. `{0,0}` means "unspecified, to be inferred".
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Construct from width and height.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when both axes are zero.
    pub fn is_unspecified(self) -> bool {
        self.width == 0 && self.height == 0
    }

    /// Pixel area as `u64`.
    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Parse a plain `WxH` descriptor.
    ///
    /// Offsets and percentages are rejected; `"0x0"` yields the unspecified value.
    pub fn parse(s: &str) -> CollageResult<Self> {
        match Geometry::parse(s)? {
            Geometry::Unspecified => Ok(Self::default()),
            Geometry::Absolute(v) if v.x_offset == 0 && v.y_offset == 0 => {
                Ok(Self::new(v.width, v.height))
            }
            Geometry::Absolute(_) => Err(CollageError::parse(format!(
                "dimensions '{s}' must not carry offsets"
            ))),
            Geometry::Percentage(_) => Err(CollageError::parse(format!(
                "dimensions '{s}' must be absolute, not a percentage"
            ))),
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = CollageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Signed canvas-space position of an image's top-left corner.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: i64,
    /// Vertical coordinate.
    pub y: i64,
}

impl Position {
    /// Construct from coordinates.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Shift by `(dx, dy)`, or `None` if either coordinate overflows.
    pub fn checked_translate(self, dx: i64, dy: i64) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

/// Numeric fields of a specified geometry descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GeometryValue {
    /// Width component (never negative).
    pub width: u32,
    /// Height component (never negative).
    pub height: u32,
    /// Signed horizontal offset.
    pub x_offset: i64,
    /// Signed vertical offset.
    pub y_offset: i64,
}

/// Size/offset/ratio descriptor parsed from `[W]x[H][%][+X][+Y]`.
///
/// The tri-state keeps "not given" distinct from a legitimately zero-sized value: only a
/// descriptor whose every field is zero (canonically `"0x0"`) becomes [`Geometry::Unspecified`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Geometry {
    /// Unconstrained; the consumer decides.
    #[default]
    Unspecified,
    /// Absolute pixel units.
    Absolute(GeometryValue),
    /// Width and height are percentages of a reference dimension.
    Percentage(GeometryValue),
}

impl Geometry {
    /// Shorthand for an absolute `WxH` geometry without offsets.
    pub fn absolute(width: u32, height: u32) -> Self {
        Self::from_parts(width, height, 0, 0, false)
    }

    /// Shorthand for a `WxH%` geometry without offsets.
    pub fn percentage(width: u32, height: u32) -> Self {
        Self::from_parts(width, height, 0, 0, true)
    }

    fn from_parts(width: u32, height: u32, x_offset: i64, y_offset: i64, percent: bool) -> Self {
        if width == 0 && height == 0 && x_offset == 0 && y_offset == 0 {
            return Self::Unspecified;
        }
        let v = GeometryValue {
            width,
            height,
            x_offset,
            y_offset,
        };
        if percent {
            Self::Percentage(v)
        } else {
            Self::Absolute(v)
        }
    }

    /// Parse a compact geometry descriptor.
    pub fn parse(s: &str) -> CollageResult<Self> {
        let text = s.trim();
        let Some((w_str, rest)) = text.split_once('x') else {
            return Err(CollageError::parse(format!(
                "geometry '{s}' is missing the 'x' separator"
            )));
        };

        let width = parse_extent(w_str, "width", s)?;

        let h_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (h_str, mut tail) = rest.split_at(h_end);
        if h_str.is_empty() && tail.starts_with('-') {
            return Err(CollageError::parse(format!(
                "geometry '{s}' height must not be negative"
            )));
        }
        let height = parse_extent(h_str, "height", s)?;

        let mut percent = false;
        if let Some(t) = tail.strip_prefix('%') {
            percent = true;
            tail = t;
        }

        let mut offsets = [0i64; 2];
        let mut n = 0usize;
        while !tail.is_empty() {
            if n == offsets.len() {
                return Err(CollageError::parse(format!(
                    "geometry '{s}' has trailing characters '{tail}'"
                )));
            }
            let negative = match tail.as_bytes()[0] {
                b'+' => false,
                b'-' => true,
                _ => {
                    return Err(CollageError::parse(format!(
                        "geometry '{s}' has unexpected characters '{tail}'"
                    )));
                }
            };
            let body = &tail[1..];
            let end = body
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(body.len());
            if end == 0 {
                return Err(CollageError::parse(format!(
                    "geometry '{s}' has a dangling offset sign"
                )));
            }
            let magnitude: i64 = body[..end]
                .parse()
                .map_err(|_| CollageError::parse(format!("geometry '{s}' offset out of range")))?;
            offsets[n] = if negative { -magnitude } else { magnitude };
            n += 1;
            tail = &body[end..];
        }

        Ok(Self::from_parts(
            width, height, offsets[0], offsets[1], percent,
        ))
    }

    /// Return `true` for [`Geometry::Unspecified`].
    pub fn is_unspecified(self) -> bool {
        matches!(self, Self::Unspecified)
    }

    /// Return `true` for [`Geometry::Percentage`].
    pub fn is_percentage(self) -> bool {
        matches!(self, Self::Percentage(_))
    }

    /// Numeric fields, if any were specified.
    pub fn value(self) -> Option<GeometryValue> {
        match self {
            Self::Unspecified => None,
            Self::Absolute(v) | Self::Percentage(v) => Some(v),
        }
    }

    /// Resolve width/height to pixels.
    ///
    /// Percentages are taken of `reference` and rounded half-up; unspecified resolves to `0x0`.
    pub fn resolve(self, reference: Dimensions) -> Dimensions {
        match self {
            Self::Unspecified => Dimensions::default(),
            Self::Absolute(v) => Dimensions::new(v.width, v.height),
            Self::Percentage(v) => Dimensions::new(
                percent_of(reference.width, v.width),
                percent_of(reference.height, v.height),
            ),
        }
    }

    /// Interpret as a `width:height` ratio.
    ///
    /// Returns `Ok(None)` when unspecified. A ratio with one zero term is rejected.
    pub fn ratio(self) -> CollageResult<Option<(u32, u32)>> {
        match self.value() {
            None => Ok(None),
            Some(v) if v.width > 0 && v.height > 0 => Ok(Some((v.width, v.height))),
            Some(_) => Err(CollageError::parse(format!(
                "aspect ratio '{self}' needs both terms non-zero"
            ))),
        }
    }
}

fn parse_extent(field: &str, what: &str, whole: &str) -> CollageResult<u32> {
    if field.is_empty() {
        return Ok(0);
    }
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CollageError::parse(format!(
            "geometry '{whole}' {what} '{field}' is not a non-negative integer"
        )));
    }
    field
        .parse()
        .map_err(|_| CollageError::parse(format!("geometry '{whole}' {what} out of range")))
}

fn percent_of(reference: u32, pct: u32) -> u32 {
    let v = (u64::from(reference) * u64::from(pct) + 50) / 100;
    u32::try_from(v).unwrap_or(u32::MAX)
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (v, pct) = match self {
            Self::Unspecified => return f.write_str("0x0"),
            Self::Absolute(v) => (v, ""),
            Self::Percentage(v) => (v, "%"),
        };
        write!(f, "{}x{}{pct}", v.width, v.height)?;
        if v.x_offset != 0 || v.y_offset != 0 {
            write!(f, "{:+}{:+}", v.x_offset, v.y_offset)?;
        }
        Ok(())
    }
}

impl FromStr for Geometry {
    type Err = CollageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Geometry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Geometry {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/geometry.rs"]
mod tests;
