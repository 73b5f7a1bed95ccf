//! Text measurement, word wrapping and the body font-size fit.
//!
//! The fit is a single proportional correction: if the wrapped block at the clamped size is taller than the allowed share
//! of the region, the size is scaled by `allowed / measured` once. Wrapped height is close to linear in font size for body
//! text, so this lands near the target without iterating, but it is an approximation and can leave the block slightly
//! over or under the limit.

use derive_new::new;

use crate::style::FontWeight;

pub const MIN_FONT_SIZE: f32 = 16.0;
pub const MAX_FONT_SIZE: f32 = 60.0;
/// Ceiling relative to the text region width.
pub const MAX_FONT_WIDTH_RATIO: f32 = 0.08;
/// Share of the region height the body block may occupy before it is shrunk.
pub const MAX_BLOCK_HEIGHT_RATIO: f32 = 0.6;
/// Line box height in ems.
pub const LINE_HEIGHT: f32 = 1.2;
/// Extra gap between consecutive lines, in ems.
pub const LINE_SPACING: f32 = 0.2;

#[derive(Clone, Copy, Debug, Default, PartialEq, new)]
pub struct Rect {
	pub x: f32,
	pub y: f32,
	pub width: f32,
	pub height: f32,
}

impl Rect {
	pub fn right(&self) -> f32 {
		self.x + self.width
	}

	pub fn bottom(&self) -> f32 {
		self.y + self.height
	}
}

#[derive(Clone, Copy, Debug, PartialEq, new)]
pub struct FontSpec<'a> {
	pub family: &'a str,
	pub size: f32,
	pub weight: FontWeight,
}

/// Horizontal extent of a single line of text.
pub trait TextMetrics {
	fn line_width(&self, line: &str, font: &FontSpec<'_>) -> f32;
}

impl<M: TextMetrics + ?Sized> TextMetrics for &M {
	fn line_width(&self, line: &str, font: &FontSpec<'_>) -> f32 {
		(**self).line_width(line, font)
	}
}

/// Every character advances by a fixed share of the font size, like a monospace face.
///
/// Used where no font data is available, and in tests for layout that does not depend on installed fonts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvance {
	pub em_ratio: f32,
}

impl Default for FixedAdvance {
	fn default() -> Self {
		Self { em_ratio: 0.6 }
	}
}

impl TextMetrics for FixedAdvance {
	fn line_width(&self, line: &str, font: &FontSpec<'_>) -> f32 {
		line.chars().count() as f32 * font.size * self.em_ratio
	}
}

/// Greedy word wrap within `max_width`. Explicit newlines start a new line; a word wider than `max_width` gets a line of its own.
pub fn wrap_lines<M: TextMetrics + ?Sized>(metrics: &M, text: &str, font: &FontSpec<'_>, max_width: f32) -> Vec<String> {
	let mut lines = Vec::new();
	for paragraph in text.lines() {
		let mut current = String::new();
		for word in paragraph.split_whitespace() {
			if current.is_empty() {
				current.push_str(word);
				continue;
			}
			let candidate = format!("{current} {word}");
			if metrics.line_width(&candidate, font) <= max_width {
				current = candidate;
			} else {
				lines.push(std::mem::replace(&mut current, word.to_owned()));
			}
		}
		lines.push(current);
	}
	lines
}

/// Height of `line_count` lines at `font_size`, gaps included.
pub fn block_height(line_count: usize, font_size: f32) -> f32 {
	if line_count == 0 {
		return 0.0;
	}
	let n = line_count as f32;
	n * LINE_HEIGHT * font_size + (n - 1.0) * LINE_SPACING * font_size
}

/// Largest body size, starting from `requested`, that stays within the ceiling and keeps the wrapped block under
/// [`MAX_BLOCK_HEIGHT_RATIO`] of the region height. Never below [`MIN_FONT_SIZE`]; on regions too narrow for the ceiling to
/// reach the floor, the floor wins.
pub fn fit_font_size<M: TextMetrics + ?Sized>(metrics: &M, text: &str, region: Rect, requested: f32, weight: FontWeight, family: &str) -> f32 {
	let ceiling = (region.width * MAX_FONT_WIDTH_RATIO).min(MAX_FONT_SIZE);
	let requested = if requested.is_finite() { requested } else { MIN_FONT_SIZE };
	let mut size = requested.min(ceiling).max(MIN_FONT_SIZE);

	let font = FontSpec::new(family, size, weight);
	let measured = block_height(wrap_lines(metrics, text, &font, region.width).len(), size);
	let allowed = region.height * MAX_BLOCK_HEIGHT_RATIO;
	if measured > allowed && measured > 0.0 {
		size = (size * (allowed / measured)).max(MIN_FONT_SIZE);
	}
	tracing::debug!(requested, ceiling, measured, allowed, fitted = size, "fitted body font size");
	size
}

/// Escape markup and drop the characters XML 1.0 cannot carry at all: C0 controls other than tab, newline and CR, and
/// the noncharacters U+FFFE and U+FFFF.
pub(crate) fn escape_xml(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&apos;"),
			'\t' | '\n' | '\r' => out.push(c),
			c if c.is_ascii_control() && c != '\u{7f}' => {}
			'\u{fffe}' | '\u{ffff}' => {}
			c => out.push(c),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	const FAMILY: &str = "sans-serif";

	fn font(size: f32) -> FontSpec<'static> {
		FontSpec::new(FAMILY, size, FontWeight::Regular)
	}

	#[test]
	fn wraps_greedily_on_whitespace() {
		// 10px per char
		let metrics = FixedAdvance { em_ratio: 1.0 };
		let lines = wrap_lines(&metrics, "aaa bbb ccc dddd", &font(10.0), 75.0);
		assert_eq!(lines, vec!["aaa bbb", "ccc", "dddd"]);
		let lines = wrap_lines(&metrics, "aaa bbb ccc dddd", &font(10.0), 80.0);
		assert_eq!(lines, vec!["aaa bbb", "ccc dddd"]);
	}

	#[test]
	fn overlong_word_sits_alone() {
		let metrics = FixedAdvance { em_ratio: 1.0 };
		let lines = wrap_lines(&metrics, "a incomprehensibilities b", &font(10.0), 50.0);
		assert_eq!(lines, vec!["a", "incomprehensibilities", "b"]);
	}

	#[test]
	fn keeps_explicit_newlines() {
		let lines = wrap_lines(&FixedAdvance::default(), "first\nsecond", &font(10.0), 1000.0);
		assert_eq!(lines, vec!["first", "second"]);
	}

	#[test]
	fn block_height_adds_gaps_between_lines() {
		assert_eq!(block_height(0, 20.0), 0.0);
		assert!((block_height(1, 20.0) - 24.0).abs() < 1e-4);
		assert!((block_height(3, 20.0) - (72.0 + 8.0)).abs() < 1e-4);
	}

	#[test]
	fn short_text_keeps_clamped_request() {
		let region = Rect::new(0.0, 0.0, 1000.0, 1000.0);
		assert_eq!(fit_font_size(&FixedAdvance::default(), "Hi", region, 24.0, FontWeight::Regular, FAMILY), 24.0);
		// ceiling is min(80, 60)
		assert_eq!(fit_font_size(&FixedAdvance::default(), "Hi", region, 200.0, FontWeight::Regular, FAMILY), 60.0);
		// ceiling is 0.08 * 500
		let narrow = Rect::new(0.0, 0.0, 500.0, 1000.0);
		assert_eq!(fit_font_size(&FixedAdvance::default(), "Hi", narrow, 200.0, FontWeight::Regular, FAMILY), 40.0);
	}

	#[test]
	fn tall_text_is_scaled_once_by_height_ratio() {
		let metrics = FixedAdvance::default();
		let region = Rect::new(0.0, 0.0, 600.0, 600.0);
		let text = "word ".repeat(60);
		let size = 40.0;
		// 5 words per line, 12 lines
		let lines = wrap_lines(&metrics, &text, &font(size), region.width).len();
		assert_eq!(lines, 12);
		let measured = block_height(lines, size);
		let allowed = region.height * MAX_BLOCK_HEIGHT_RATIO;
		assert!(measured > allowed);
		let fitted = fit_font_size(&metrics, &text, region, size, FontWeight::Regular, FAMILY);
		assert_eq!(fitted, size * (allowed / measured));
		assert!(fitted > MIN_FONT_SIZE && fitted < size);
	}

	#[test]
	fn fitted_size_stays_within_bounds() {
		let metrics = FixedAdvance::default();
		let sentence = "The only way to do great work is to love what you do. ";
		for width in [250.0_f32, 500.0, 900.0, 1500.0] {
			for height in [200.0_f32, 800.0, 2400.0] {
				let region = Rect::new(0.0, 0.0, width, height);
				let ceiling = (width * 0.08).min(60.0);
				for repeats in [1, 4, 16, 64] {
					for requested in [8.0_f32, 24.0, 48.0, 120.0] {
						let size = fit_font_size(&metrics, &sentence.repeat(repeats), region, requested, FontWeight::Medium, FAMILY);
						assert!((MIN_FONT_SIZE..=ceiling).contains(&size), "{size} outside [16, {ceiling}] for {width}x{height}");
					}
				}
			}
		}
	}

	#[test]
	fn longer_text_never_fits_larger() {
		let metrics = FixedAdvance::default();
		let region = Rect::new(0.0, 0.0, 914.0, 914.0);
		let words: Vec<&str> = "Success is not final failure is not fatal it is the courage to continue that counts".split(' ').collect();
		let mut previous = f32::INFINITY;
		for n in 1..=words.len() * 6 {
			let text = (0..n).map(|i| words[i % words.len()]).collect::<Vec<_>>().join(" ");
			let size = fit_font_size(&metrics, &text, region, 60.0, FontWeight::Medium, FAMILY);
			assert!(size <= previous, "size grew from {previous} to {size} at {n} words");
			previous = size;
		}
	}

	#[test]
	fn escapes_markup() {
		assert_eq!(escape_xml(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
	}

	#[test]
	fn drops_controls_xml_cannot_carry() {
		assert_eq!(escape_xml("Bell\u{7} rings\u{0}\u{b}\u{c}\u{1f}"), "Bell rings");
		assert_eq!(escape_xml("tab\there\nnext\r"), "tab\there\nnext\r");
		assert_eq!(escape_xml("a\u{fffe}b\u{ffff}"), "ab");
		assert_eq!(escape_xml("caf\u{e9} \u{2014} ok"), "caf\u{e9} \u{2014} ok");
	}
}
