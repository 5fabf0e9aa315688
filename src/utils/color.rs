//! Deterministic per-domain tile colors

use serde::{Serialize, Serializer};
use std::fmt;

/// Saturation band (percent) kept vibrant behind white text
const SATURATION_BASE: i64 = 70;
const SATURATION_SPAN: i64 = 15;
/// Lightness band (percent) kept legible behind white text
const LIGHTNESS_BASE: i64 = 50;
const LIGHTNESS_SPAN: i64 = 10;

/// An HSL color, rendered as a CSS `hsl(h, s%, l%)` string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HslColor {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl fmt::Display for HslColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

impl Serialize for HslColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Order-sensitive rolling hash over UTF-16 code units (`h = c + 31h`, 32-bit shift)
///
/// The shift wraps at 32 bits while the accumulator does not, so the result
/// stays stable for colors already shown to users.
pub fn domain_hash(domain: &str) -> i64 {
    domain.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        i64::from(unit) + shifted - hash
    })
}

/// Derive the fallback tile color for a domain
pub fn color_for_domain(domain: &str) -> HslColor {
    let hash = domain_hash(domain);
    let magnitude = hash.abs();

    HslColor {
        hue: (hash % 360).unsigned_abs() as u16,
        saturation: (SATURATION_BASE + magnitude % SATURATION_SPAN) as u8,
        lightness: (LIGHTNESS_BASE + magnitude % LIGHTNESS_SPAN) as u8,
    }
}
