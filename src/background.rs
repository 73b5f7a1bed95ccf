use image::{RgbaImage, imageops};
use tiny_skia::{Color, ColorU8, GradientStop, LinearGradient, Paint, Pixmap, Point, SpreadMode, Transform};

use crate::{
	color::{GRADIENT_DARKEN, GRADIENT_LIGHTEN, adjust_brightness},
	error::{ComposeError, ComposeResult},
	style::Background,
};

/// Opacity of the base-color wash laid over a background image.
pub const IMAGE_TINT_OPACITY: f32 = 0.3;

/// Fill the whole pixmap with the background layer.
pub fn paint_background(pixmap: &mut Pixmap, background: &Background) -> ComposeResult<()> {
	match background {
		Background::Color(base) => paint_gradient(pixmap, *base),
		Background::Image { image, tint } => {
			paint_image(pixmap, image);
			let mut tint = *tint;
			tint.set_alpha(tint.alpha() * IMAGE_TINT_OPACITY);
			let mut paint = Paint::default();
			paint.set_color(tint);
			fill_canvas(pixmap, &paint)
		}
	}
}

/// Flat base color, then a diagonal gradient from a darker to a lighter shade of it.
fn paint_gradient(pixmap: &mut Pixmap, base: Color) -> ComposeResult<()> {
	pixmap.fill(base);

	let stops = vec![GradientStop::new(0.0, adjust_brightness(base, GRADIENT_DARKEN)), GradientStop::new(1.0, adjust_brightness(base, GRADIENT_LIGHTEN))];
	let end = Point::from_xy(pixmap.width() as f32, pixmap.height() as f32);
	let Some(shader) = LinearGradient::new(Point::from_xy(0.0, 0.0), end, stops, SpreadMode::Pad, Transform::identity()) else {
		tracing::debug!("degenerate gradient, keeping flat base color");
		return Ok(());
	};
	let paint = Paint { shader, ..Paint::default() };
	fill_canvas(pixmap, &paint)
}

fn fill_canvas(pixmap: &mut Pixmap, paint: &Paint<'_>) -> ComposeResult<()> {
	let rect = tiny_skia::Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32)
		.ok_or_else(|| ComposeError::RenderingUnavailable(format!("cannot cover a {}x{} canvas", pixmap.width(), pixmap.height())))?;
	pixmap.fill_rect(rect, paint, Transform::identity(), None);
	Ok(())
}

/// Cover the pixmap with `image`, scaled to fill and center-cropped.
fn paint_image(pixmap: &mut Pixmap, image: &RgbaImage) {
	if image.width() == 0 || image.height() == 0 {
		tracing::warn!("empty background image, drawing tint only");
		return;
	}
	let covered = resize_fill(image, pixmap.width(), pixmap.height());
	for (dst, src) in pixmap.pixels_mut().iter_mut().zip(covered.pixels()) {
		let [r, g, b, a] = src.0;
		*dst = ColorU8::from_rgba(r, g, b, a).premultiply();
	}
}

/// Scale `img` to cover `target_width` x `target_height` keeping its aspect ratio, then crop the overflow evenly.
pub fn resize_fill(img: &RgbaImage, target_width: u32, target_height: u32) -> RgbaImage {
	let (img_width, img_height) = img.dimensions();
	if (img_width, img_height) == (target_width, target_height) {
		return img.clone();
	}
	let img_ratio = img_width as f32 / img_height as f32;
	let target_ratio = target_width as f32 / target_height as f32;

	let (scaled_width, scaled_height) = if img_ratio > target_ratio {
		// wider than the target: crop horizontally
		(((target_height as f32 * img_ratio).ceil() as u32).max(target_width), target_height)
	} else {
		(target_width, ((target_width as f32 / img_ratio).ceil() as u32).max(target_height))
	};

	let resized = imageops::resize(img, scaled_width, scaled_height, imageops::FilterType::Lanczos3);
	let x_offset = (scaled_width - target_width) / 2;
	let y_offset = (scaled_height - target_height) / 2;
	imageops::crop_imm(&resized, x_offset, y_offset, target_width, target_height).to_image()
}
