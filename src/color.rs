// SPDX-License-Identifier: PMPL-1.0-or-later
//! Color model: parsing, source-over compositing, WCAG luminance and contrast.
//!
//! Channels are kept as `f64` so that compositing several translucent layers
//! does not accumulate rounding error. They are clamped and rounded only when
//! serialized to hex.
//!
//! <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>
//! <https://www.w3.org/TR/WCAG21/#dfn-contrast-ratio>

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static RGB_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^rgba?\(([^)]*)\)$").unwrap());

/// An sRGB color with straight (non-premultiplied) alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    /// Opacity in [0, 1]
    pub a: f64,
}

/// Returned by `Color::from_str` for anything `parse_color` rejects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized color: {0:?}")]
pub struct ColorParseError(pub String);

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(255.0, 255.0, 255.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Opaque color from channel values
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color with explicit alpha
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Whether the color covers whatever is behind it
    pub fn is_opaque(&self) -> bool {
        self.a >= OPAQUE_THRESHOLD
    }

    /// Lowercase `#rrggbb`; alpha is dropped
    pub fn to_hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            channel_byte(self.r),
            channel_byte(self.g),
            channel_byte(self.b)
        )
    }

    /// Convert to (hue in degrees, saturation, lightness), both in [0, 1]
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let r = clamp_channel(self.r) / 255.0;
        let g = clamp_channel(self.g) / 255.0;
        let b = clamp_channel(self.b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return (0.0, 0.0, l);
        }

        let d = max - min;
        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        (h / 6.0 * 360.0, s, l)
    }

    /// Build an opaque color from hue (degrees), saturation and lightness
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        if s == 0.0 {
            let v = l * 255.0;
            return Self::rgb(v, v, v);
        }

        let h = h / 360.0;
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        Self::rgb(
            hue_to_channel(p, q, h + 1.0 / 3.0) * 255.0,
            hue_to_channel(p, q, h) * 255.0,
            hue_to_channel(p, q, h - 1.0 / 3.0) * 255.0,
        )
    }
}

/// Accumulated alpha at or above this is treated as fully opaque
pub const OPAQUE_THRESHOLD: f64 = 0.999;

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s).ok_or_else(|| ColorParseError(s.to_string()))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn clamp_channel(v: f64) -> f64 {
    v.clamp(0.0, 255.0)
}

fn channel_byte(v: f64) -> u8 {
    clamp_channel(v.round()) as u8
}

/// Parse a CSS hex color (#rgb, #rrggbb)
fn parse_hex_color(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => hex.to_string(),
        _ => return None,
    };
    let num = u32::from_str_radix(&expanded, 16).ok()?;
    Some(Color::rgb(
        ((num >> 16) & 0xff) as f64,
        ((num >> 8) & 0xff) as f64,
        (num & 0xff) as f64,
    ))
}

/// Parse `rgb(r, g, b)` or `rgba(r, g, b, a)`; components may be out of range
fn parse_rgb_function(value: &str) -> Option<Color> {
    let caps = RGB_FUNCTION.captures(value)?;
    let parts: Vec<&str> = caps[1].split(',').map(str::trim).collect();
    if parts.len() < 3 {
        return None;
    }

    let mut channels = [0.0; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        let v: f64 = part.parse().ok()?;
        if !v.is_finite() {
            return None;
        }
        *slot = v;
    }

    let alpha = parts
        .get(3)
        .and_then(|a| a.parse::<f64>().ok())
        .filter(|a| !a.is_nan())
        .map(|a| a.clamp(0.0, 1.0))
        .unwrap_or(1.0);

    Some(Color::rgba(channels[0], channels[1], channels[2], alpha))
}

/// Parse a textual color. Unknown formats yield `None`, never an error;
/// callers substitute their own conservative default.
pub fn parse_color(input: &str) -> Option<Color> {
    let value = input.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        parse_hex_color(hex)
    } else if value.starts_with("rgb") {
        parse_rgb_function(&value)
    } else if value == "transparent" {
        Some(Color::TRANSPARENT)
    } else {
        None
    }
}

/// Source-over compositing of `fg` on top of `bg`
pub fn composite(fg: Color, bg: Color) -> Color {
    let a = fg.a + bg.a * (1.0 - fg.a);
    if a == 0.0 {
        return Color::TRANSPARENT;
    }
    let mix = |f: f64, b: f64| (f * fg.a + b * bg.a * (1.0 - fg.a)) / a;
    Color::rgba(mix(fg.r, bg.r), mix(fg.g, bg.g), mix(fg.b, bg.b), a)
}

/// Calculate relative luminance per WCAG 2.x; alpha is ignored
pub fn relative_luminance(color: Color) -> f64 {
    let linear = [color.r, color.g, color.b].map(|c| {
        let v = clamp_channel(c) / 255.0;
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    });
    0.2126 * linear[0] + 0.7152 * linear[1] + 0.0722 * linear[2]
}

/// Contrast ratio between two colors, rounded to 2 decimals.
/// Returns a ratio in [1.0, 21.0] regardless of argument order.
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la > lb { (la, lb) } else { (lb, la) };
    round_to((lighter + 0.05) / (darker + 0.05), 2)
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_color("#fff"), Some(Color::WHITE));
        assert_eq!(parse_color("#000"), Some(Color::BLACK));
        assert_eq!(parse_color("#ff0000"), Some(Color::rgb(255.0, 0.0, 0.0)));
        assert_eq!(parse_color("  #00FF00 "), Some(Color::rgb(0.0, 255.0, 0.0)));
    }

    #[test]
    fn test_parse_rejects_bad_hex() {
        assert_eq!(parse_color("#ff00"), None);
        assert_eq!(parse_color("#gggggg"), None);
        assert_eq!(parse_color("#é0"), None);
        assert_eq!(parse_color("#"), None);
    }

    #[test]
    fn test_hex_roundtrip() {
        for hex in ["#000000", "#ffffff", "#1e293b", "#a1a1aa", "#6b7280", "#8B5CF6"] {
            let parsed = parse_color(hex).expect("valid hex");
            assert_eq!(parsed.to_hex(), hex.to_lowercase());
        }
        assert_eq!(parse_color("#abc").unwrap().to_hex(), "#aabbcc");
    }

    #[test]
    fn test_parse_rgb_color() {
        assert_eq!(parse_color("rgb(255, 0, 0)"), Some(Color::rgb(255.0, 0.0, 0.0)));
        assert_eq!(
            parse_color("rgba(0, 128, 0, 0.5)"),
            Some(Color::rgba(0.0, 128.0, 0.0, 0.5))
        );
        assert_eq!(parse_color("RGB(1,2,3)"), Some(Color::rgb(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_parse_rgb_unbounded_components() {
        let c = parse_color("rgb(300, -5, 12.5)").unwrap();
        assert_eq!(c.r, 300.0);
        assert_eq!(c.g, -5.0);
        assert_eq!(c.to_hex(), "#ff000d");
    }

    #[test]
    fn test_parse_rgba_alpha_handling() {
        assert_eq!(parse_color("rgba(0,0,0,2)").unwrap().a, 1.0);
        assert_eq!(parse_color("rgba(0,0,0,abc)").unwrap().a, 1.0);
        assert_eq!(parse_color("rgba(0,0,0,0)").unwrap().a, 0.0);
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        assert_eq!(parse_color("rgb(1, 2)"), None);
        assert_eq!(parse_color("rgb(a, b, c)"), None);
        assert_eq!(parse_color("rgb(inf, 0, 0)"), None);
        assert_eq!(parse_color("hsl(0, 100%, 50%)"), None);
        assert_eq!(parse_color("white"), None);
        assert_eq!(parse_color(""), None);
    }

    #[test]
    fn test_parse_transparent() {
        let c = parse_color("transparent").unwrap();
        assert_eq!(c.a, 0.0);
        assert!("Transparent".parse::<Color>().is_ok());
        assert!("nope".parse::<Color>().is_err());
    }

    #[test]
    fn test_composite_opaque_foreground_wins() {
        let fg = Color::rgb(10.0, 20.0, 30.0);
        let bg = Color::rgba(200.0, 100.0, 50.0, 0.7);
        assert_eq!(composite(fg, bg), fg);
    }

    #[test]
    fn test_composite_transparent_foreground_yields_background() {
        let fg = Color::rgba(10.0, 20.0, 30.0, 0.0);
        let bg = Color::rgba(200.0, 100.0, 50.0, 0.7);
        let out = composite(fg, bg);
        assert!(approx(out.r, bg.r) && approx(out.g, bg.g) && approx(out.b, bg.b));
        assert!(approx(out.a, bg.a));
    }

    #[test]
    fn test_composite_both_transparent() {
        let out = composite(Color::TRANSPARENT, Color::rgba(255.0, 255.0, 255.0, 0.0));
        assert_eq!(out, Color::TRANSPARENT);
    }

    #[test]
    fn test_composite_half_white_over_black() {
        let out = composite(Color::rgba(255.0, 255.0, 255.0, 0.5), Color::BLACK);
        assert!(approx(out.a, 1.0));
        assert!(approx(out.r, 127.5));
        assert_eq!(out.to_hex(), "#808080");
    }

    #[test]
    fn test_relative_luminance() {
        assert!((relative_luminance(Color::WHITE) - 1.0).abs() < 1e-9);
        assert!(relative_luminance(Color::BLACK).abs() < 1e-9);
        let red = relative_luminance(Color::rgb(255.0, 0.0, 0.0));
        assert!((red - 0.2126).abs() < 1e-9);
    }

    #[test]
    fn test_contrast_ratio_black_white() {
        assert_eq!(contrast_ratio(Color::BLACK, Color::WHITE), 21.0);
    }

    #[test]
    fn test_contrast_ratio_same_color() {
        let gray = Color::rgb(128.0, 128.0, 128.0);
        assert_eq!(contrast_ratio(gray, gray), 1.0);
    }

    #[test]
    fn test_contrast_ratio_order_independent() {
        let a = parse_color("#ff0000").unwrap();
        let b = parse_color("#ffffff").unwrap();
        assert_eq!(contrast_ratio(a, b), contrast_ratio(b, a));
        assert_eq!(contrast_ratio(a, b), 4.0);
    }

    #[test]
    fn test_contrast_ratio_known_values() {
        let white = Color::WHITE;
        assert_eq!(contrast_ratio(parse_color("#767676").unwrap(), white), 4.54);
        assert_eq!(contrast_ratio(parse_color("#1e293b").unwrap(), white), 14.63);
    }

    #[test]
    fn test_hsl_roundtrip() {
        for hex in ["#ff0000", "#336699", "#8b5cf6", "#808080", "#000000", "#ffffff"] {
            let color = parse_color(hex).unwrap();
            let (h, s, l) = color.to_hsl();
            assert_eq!(Color::from_hsl(h, s, l).to_hex(), hex);
        }
    }

    #[test]
    fn test_hsl_of_primaries() {
        let (h, s, l) = Color::rgb(0.0, 0.0, 255.0).to_hsl();
        assert!(approx(h, 240.0));
        assert!(approx(s, 1.0));
        assert!(approx(l, 0.5));
    }

    #[test]
    fn test_display_and_serialize_as_hex() {
        let c = Color::rgb(1.0, 2.0, 255.0);
        assert_eq!(c.to_string(), "#0102ff");
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#0102ff\"");
    }
}
