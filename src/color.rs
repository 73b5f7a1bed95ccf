use palette::{Hsv, IntoColor, Srgb, Srgba};
use tiny_skia::Color;

/// Brightness step applied to the base color for the dark end of the background gradient.
pub const GRADIENT_DARKEN: f32 = -0.15;
/// Brightness step applied to the base color for the light end of the background gradient.
pub const GRADIENT_LIGHTEN: f32 = 0.10;

/// Accent colors offered for the background, named like the platform's system palette.
pub const NAMED_COLORS: [(&str, [u8; 3]); 11] = [
	("blue", [0x00, 0x7A, 0xFF]),
	("purple", [0xAF, 0x52, 0xDE]),
	("pink", [0xFF, 0x2D, 0x55]),
	("red", [0xFF, 0x3B, 0x30]),
	("orange", [0xFF, 0x95, 0x00]),
	("yellow", [0xFF, 0xCC, 0x00]),
	("green", [0x34, 0xC7, 0x59]),
	("teal", [0x30, 0xB0, 0xC7]),
	("indigo", [0x58, 0x56, 0xD6]),
	("gray", [0x8E, 0x8E, 0x93]),
	("black", [0x00, 0x00, 0x00]),
];

/// Shift the brightness of `color` by `delta` in HSB space, clamped to [0, 1].
///
/// Hue, saturation and alpha pass through untouched, so saturated accents keep their hue at both ends of a gradient.
pub fn adjust_brightness(color: Color, delta: f32) -> Color {
	if delta == 0.0 {
		return color;
	}
	let rgb = Srgb::new(color.red(), color.green(), color.blue());
	let mut hsv: Hsv = rgb.into_color();
	hsv.value = (hsv.value + delta).clamp(0.0, 1.0);
	let adjusted: Srgb = hsv.into_color();
	Color::from_rgba(adjusted.red.clamp(0.0, 1.0), adjusted.green.clamp(0.0, 1.0), adjusted.blue.clamp(0.0, 1.0), color.alpha()).unwrap_or(color)
}

/// (hue in degrees, saturation, brightness)
pub fn hsb(color: Color) -> (f32, f32, f32) {
	let hsv: Hsv = Srgb::new(color.red(), color.green(), color.blue()).into_color();
	(hsv.hue.into_positive_degrees(), hsv.saturation, hsv.value)
}

/// Accepts a palette name (`blue`), `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_color(s: &str) -> Option<Color> {
	let s = s.trim();
	if let Some(hex) = s.strip_prefix('#') {
		// palette slices by byte offset
		if !hex.is_ascii() {
			return None;
		}
		return match hex.len() {
			6 => hex.parse::<Srgb<u8>>().ok().map(|c| Color::from_rgba8(c.red, c.green, c.blue, 255)),
			8 => hex.parse::<Srgba<u8>>().ok().map(|c| Color::from_rgba8(c.red, c.green, c.blue, c.alpha)),
			_ => None,
		};
	}
	let name = s.to_ascii_lowercase();
	NAMED_COLORS.iter().find(|(n, _)| *n == name).map(|(_, [r, g, b])| Color::from_rgba8(*r, *g, *b, 255))
}
