//! Quote + style in, finished wallpaper out.
//!
//! The background is painted straight onto a tiny-skia pixmap. Both text blocks are emitted as one SVG document (white
//! fill, drop shadow filter) and rasterized over it by resvg, using the same font database that measured them.
//!
//! The body and the attribution are anchored independently: the body sits slightly above the middle of the text region,
//! the attribution hangs from a fixed line near the bottom. Very long quotes can run into the attribution; nothing
//! checks for it.
//!
//! The requested family is resolved against the font database before anything is measured. An unknown family falls
//! back to `sans-serif`; a database with nothing to fall back to is an error rather than a blank wallpaper.

use std::{fmt::Write as _, sync::OnceLock};

use image::{Rgba, RgbaImage};
use tiny_skia::{Pixmap, Transform};

use crate::{
	background::paint_background,
	error::{ComposeError, ComposeResult},
	fonts::FontBook,
	quotes::Quote,
	style::{FontWeight, StyleConfig, TextAlign},
	text::{FontSpec, LINE_HEIGHT, LINE_SPACING, Rect, TextMetrics, block_height, escape_xml, fit_font_size, wrap_lines},
};

/// Padding as a share of canvas width, applied on all four sides.
pub const PADDING_RATIO: f32 = 0.08;
pub const MIN_PADDING: f32 = 40.0;
/// Where the body's free vertical space is split: 0.4 above, 0.6 below.
pub const BODY_VERTICAL_BIAS: f32 = 0.4;
pub const ATTRIBUTION_SCALE: f32 = 0.6;
pub const ATTRIBUTION_OPACITY: f32 = 0.9;
/// Gap between the attribution's bottom edge and the text region's bottom, as a share of region height.
pub const ATTRIBUTION_BOTTOM_INSET: f32 = 0.15;
pub const SHADOW_OPACITY: f32 = 0.4;
pub const SHADOW_OFFSET: (f32, f32) = (2.0, 2.0);
pub const SHADOW_BLUR_RADIUS: f32 = 4.0;
/// Baseline position inside a line box, in ems from its top.
const BASELINE: f32 = 0.95;

/// Canvas minus symmetric padding.
pub fn text_region(width: u32, height: u32) -> Rect {
	let (width, height) = (width as f32, height as f32);
	let padding = (width * PADDING_RATIO).max(MIN_PADDING);
	Rect::new(padding, padding, (width - 2.0 * padding).max(0.0), (height - 2.0 * padding).max(0.0))
}

/// One wrapped run of text and where it goes.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
	pub lines: Vec<String>,
	pub font_size: f32,
	pub weight: FontWeight,
	pub opacity: f32,
	/// Top edge of the first line box.
	pub top: f32,
	pub height: f32,
}

impl TextBlock {
	fn new<M: TextMetrics + ?Sized>(metrics: &M, text: &str, font: FontSpec<'_>, max_width: f32, opacity: f32) -> Self {
		let lines = wrap_lines(metrics, text, &font, max_width);
		let height = block_height(lines.len(), font.size);
		Self { lines, font_size: font.size, weight: font.weight, opacity, top: 0.0, height }
	}

	pub fn bottom(&self) -> f32 {
		self.top + self.height
	}

	fn write_svg(&self, svg: &mut String, family: &str, x: f32, anchor: &str) {
		let _ = write!(
			svg,
			r#"<g font-family="{}" font-size="{}" font-weight="{}" fill="white" fill-opacity="{}" text-anchor="{anchor}" filter="url(#shadow)">"#,
			escape_xml(family),
			self.font_size,
			self.weight.css(),
			self.opacity,
		);
		let pitch = (LINE_HEIGHT + LINE_SPACING) * self.font_size;
		for (i, line) in self.lines.iter().enumerate() {
			let baseline = self.top + i as f32 * pitch + BASELINE * self.font_size;
			let _ = write!(svg, r#"<text x="{x}" y="{baseline}">{}</text>"#, escape_xml(line));
		}
		svg.push_str("</g>");
	}
}

/// Resolved placement for a quote on a canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
	pub width: u32,
	/// Concrete family both blocks are measured and drawn with.
	pub family: String,
	pub height: u32,
	pub region: Rect,
	pub body: TextBlock,
	pub attribution: Option<TextBlock>,
}

impl Layout {
	fn anchor_x(&self, align: TextAlign) -> f32 {
		match align {
			TextAlign::Start => self.region.x,
			TextAlign::Center => self.region.x + self.region.width / 2.0,
			TextAlign::End => self.region.right(),
		}
	}

	/// Transparent SVG holding just the text blocks.
	pub fn to_svg(&self, align: TextAlign) -> String {
		let (width, height) = (self.width, self.height);
		let (dx, dy) = SHADOW_OFFSET;
		let mut svg = String::with_capacity(1024);
		let _ = write!(
			svg,
			r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><defs><filter id="shadow" filterUnits="userSpaceOnUse" x="0" y="0" width="{width}" height="{height}" color-interpolation-filters="sRGB"><feDropShadow dx="{dx}" dy="{dy}" stdDeviation="{}" flood-color="black" flood-opacity="{SHADOW_OPACITY}"/></filter></defs>"#,
			SHADOW_BLUR_RADIUS / 2.0,
		);
		let x = self.anchor_x(align);
		self.body.write_svg(&mut svg, &self.family, x, align.svg_anchor());
		if let Some(attribution) = &self.attribution {
			attribution.write_svg(&mut svg, &self.family, x, align.svg_anchor());
		}
		svg.push_str("</svg>");
		svg
	}
}

/// Final raster, straight (non-premultiplied) RGBA.
#[derive(Clone, Debug, PartialEq)]
pub struct Wallpaper {
	image: RgbaImage,
}

impl Wallpaper {
	fn from_pixmap(pixmap: &Pixmap) -> Self {
		let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
		for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
			let c = src.demultiply();
			*dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
		}
		Self { image }
	}

	pub fn width(&self) -> u32 {
		self.image.width()
	}

	pub fn height(&self) -> u32 {
		self.image.height()
	}

	/// `None` outside the canvas.
	pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
		self.image.get_pixel_checked(x, y).map(|p| p.0)
	}

	pub fn as_image(&self) -> &RgbaImage {
		&self.image
	}

	pub fn into_image(self) -> RgbaImage {
		self.image
	}
}

/// Stateless compositor. Holds only the immutable font database, so one instance can serve concurrent calls.
#[derive(Clone, Debug)]
pub struct Compositor<M = FontBook> {
	fonts: FontBook,
	metrics: M,
}

impl Compositor<FontBook> {
	pub fn new(fonts: FontBook) -> Self {
		Self { metrics: fonts.clone(), fonts }
	}
}

impl<M: TextMetrics> Compositor<M> {
	/// Lay text out with `metrics` instead of the font book's own measurements.
	pub fn with_metrics(fonts: FontBook, metrics: M) -> Self {
		Self { fonts, metrics }
	}

	pub fn fonts(&self) -> &FontBook {
		&self.fonts
	}

	/// Family to draw with: the requested one, else `sans-serif`.
	fn resolve_family(&self, style: &StyleConfig) -> ComposeResult<String> {
		if let Some(family) = self.fonts.resolve_family(&style.font_family, style.font_weight) {
			return Ok(family);
		}
		let fallback = self.fonts.resolve_family("sans-serif", style.font_weight);
		match fallback {
			Some(family) => {
				tracing::warn!(requested = %style.font_family, using = %family, "font family not installed, falling back");
				Ok(family)
			}
			None => Err(ComposeError::RenderingUnavailable(format!("no font available for `{}`", style.font_family))),
		}
	}

	/// Where every line of text goes for `quote` under `style`.
	pub fn layout(&self, quote: &Quote, style: &StyleConfig) -> ComposeResult<Layout> {
		let (width, height) = style.canvas.validated()?;
		let region = text_region(width, height);
		let family = self.resolve_family(style)?;
		let family = family.as_str();

		let body_size = fit_font_size(&self.metrics, &quote.text, region, style.font_size, style.font_weight, family);
		let mut body = TextBlock::new(&self.metrics, &quote.text, FontSpec::new(family, body_size, style.font_weight), region.width, 1.0);
		body.top = region.y + (region.height - body.height) * BODY_VERTICAL_BIAS;

		let attribution = quote.attribution().map(|author| {
			let font = FontSpec::new(family, body_size * ATTRIBUTION_SCALE, FontWeight::Light);
			let mut block = TextBlock::new(&self.metrics, &format!("\u{2014} {author}"), font, region.width, ATTRIBUTION_OPACITY);
			block.top = region.bottom() - region.height * ATTRIBUTION_BOTTOM_INSET - block.height;
			block
		});

		tracing::debug!(quote = %quote.id, width, height, family, body_size, body_lines = body.lines.len(), attributed = attribution.is_some(), "laid out wallpaper");
		Ok(Layout { width, height, family: family.to_owned(), region, body, attribution })
	}

	/// Render `quote` under `style`. Same inputs give the same pixels.
	pub fn compose(&self, quote: &Quote, style: &StyleConfig) -> ComposeResult<Wallpaper> {
		let layout = self.layout(quote, style)?;
		let mut pixmap = Pixmap::new(layout.width, layout.height)
			.ok_or_else(|| ComposeError::RenderingUnavailable(format!("cannot allocate a {}x{} canvas", layout.width, layout.height)))?;

		paint_background(&mut pixmap, &style.background)?;

		let svg = layout.to_svg(style.align);
		let tree = usvg::Tree::from_str(&svg, &self.fonts.usvg_options()).map_err(|e| ComposeError::RenderingUnavailable(format!("text layer: {e}")))?;
		resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

		Ok(Wallpaper::from_pixmap(&pixmap))
	}
}

/// Compose with the process-wide system font book, loaded on first use.
pub fn compose(quote: &Quote, style: &StyleConfig) -> ComposeResult<Wallpaper> {
	static COMPOSITOR: OnceLock<Compositor> = OnceLock::new();
	COMPOSITOR.get_or_init(|| Compositor::new(FontBook::system())).compose(quote, style)
}
