use std::sync::OnceLock;

use image::{Rgba, RgbaImage};
use quote_wallpaper::{
	Background, CanvasSize, ComposeError, Compositor, FontWeight, Preset, Quote, StyleConfig, TextAlign,
	background::paint_background,
	color::parse_color,
	fonts::FontBook,
	text::{MIN_FONT_SIZE, Rect, fit_font_size},
};
use tiny_skia::{Color, Pixmap};

fn compositor() -> &'static Compositor {
	static COMPOSITOR: OnceLock<Compositor> = OnceLock::new();
	COMPOSITOR.get_or_init(|| Compositor::new(FontBook::system()))
}

fn churchill(author: Option<&str>) -> Quote {
	Quote::new("churchill", "Success is not final, failure is not fatal.", author, &["success"])
}

fn churchill_style() -> StyleConfig {
	StyleConfig {
		background: Background::Color(parse_color("blue").unwrap()),
		font_size: 24.0,
		font_weight: FontWeight::Medium,
		align: TextAlign::Center,
		canvas: Preset::Square.into(),
		..Default::default()
	}
}

#[test]
fn presets_produce_exact_dimensions() {
	for preset in Preset::ALL {
		let style = StyleConfig { canvas: preset.into(), ..churchill_style() };
		let wallpaper = compositor().compose(&churchill(Some("Winston Churchill")), &style).unwrap();
		assert_eq!((wallpaper.width(), wallpaper.height()), preset.dimensions(), "{preset:?}");
	}
}

#[test]
fn custom_size_and_zero_area() {
	let style = StyleConfig { canvas: CanvasSize::Custom { width: 800, height: 600 }, ..churchill_style() };
	let wallpaper = compositor().compose(&churchill(None), &style).unwrap();
	assert_eq!((wallpaper.width(), wallpaper.height()), (800, 600));

	for (width, height) in [(0, 600), (800, 0), (0, 0)] {
		let style = StyleConfig { canvas: CanvasSize::Custom { width, height }, ..churchill_style() };
		let err = compositor().compose(&churchill(None), &style).unwrap_err();
		assert!(matches!(err, ComposeError::InvalidDimensions { width: w, height: h } if (w, h) == (width, height)));
	}
}

#[test]
fn same_inputs_same_pixels() {
	let style = StyleConfig { canvas: CanvasSize::Custom { width: 640, height: 960 }, ..churchill_style() };
	let quote = churchill(Some("Winston Churchill"));
	let first = compositor().compose(&quote, &style).unwrap();
	let second = compositor().compose(&quote, &style).unwrap();
	assert!(first == second);
}

#[test]
fn concurrent_calls_agree() {
	let style = StyleConfig { canvas: CanvasSize::Custom { width: 400, height: 700 }, ..churchill_style() };
	let quote = churchill(Some("Winston Churchill"));
	let expected = compositor().compose(&quote, &style).unwrap();
	std::thread::scope(|s| {
		let handles: Vec<_> = (0..4).map(|_| s.spawn(|| compositor().compose(&quote, &style).unwrap())).collect();
		for handle in handles {
			assert!(handle.join().unwrap() == expected);
		}
	});
}

#[test]
fn churchill_square_with_and_without_attribution() {
	let style = churchill_style();
	let with_author = compositor().compose(&churchill(Some("Winston Churchill")), &style).unwrap();
	let without_author = compositor().compose(&churchill(None), &style).unwrap();
	assert_eq!((with_author.width(), with_author.height()), (1080, 1080));
	assert_eq!((without_author.width(), without_author.height()), (1080, 1080));

	// dark end of the gradient at the top left, light end at the bottom right
	let luma = |[r, g, b, _]: [u8; 4]| u32::from(r) + u32::from(g) + u32::from(b);
	assert!(luma(without_author.pixel(0, 0).unwrap()) < luma(without_author.pixel(1079, 1079).unwrap()));

	let mut background = Pixmap::new(1080, 1080).unwrap();
	paint_background(&mut background, &style.background).unwrap();

	// the band where the attribution would go, widened for the shadow
	let layout = compositor().layout(&churchill(Some("Winston Churchill")), &style).unwrap();
	let attribution = layout.attribution.unwrap();
	assert!(attribution.top > layout.body.bottom(), "short quotes keep the blocks apart");
	let top = (attribution.top - 8.0).max(0.0) as u32;
	let bottom = (attribution.bottom() + 8.0).min(1079.0) as u32;

	let mut differs_with_author = false;
	for y in top..=bottom {
		for x in 0..1080 {
			let c = background.pixel(x, y).unwrap().demultiply();
			let bg = [c.red(), c.green(), c.blue(), c.alpha()];
			assert_eq!(without_author.pixel(x, y), Some(bg), "unexpected ink at ({x}, {y}) without an author");
			differs_with_author |= with_author.pixel(x, y) != Some(bg);
		}
	}
	assert!(differs_with_author, "attribution line was not drawn");
}

/// Pixels inside the body block that differ from the bare background.
fn inked_body_pixels(style: &StyleConfig) -> usize {
	let quote = churchill(None);
	let wallpaper = compositor().compose(&quote, style).unwrap();
	let layout = compositor().layout(&quote, style).unwrap();
	let (width, height) = (wallpaper.width(), wallpaper.height());
	let mut background = Pixmap::new(width, height).unwrap();
	paint_background(&mut background, &style.background).unwrap();

	let top = layout.body.top.max(0.0) as u32;
	let bottom = (layout.body.bottom() as u32).min(height - 1);
	let mut inked = 0;
	for y in top..=bottom {
		for x in 0..width {
			let c = background.pixel(x, y).unwrap().demultiply();
			inked += usize::from(wallpaper.pixel(x, y) != Some([c.red(), c.green(), c.blue(), c.alpha()]));
		}
	}
	inked
}

#[test]
fn quote_body_is_drawn() {
	assert!(inked_body_pixels(&churchill_style()) > 0);
}

#[test]
fn unknown_family_still_draws_text() {
	let style = StyleConfig { font_family: "No Such Family 9000".into(), ..churchill_style() };
	assert!(inked_body_pixels(&style) > 0, "body was not drawn for an uninstalled family");
	let layout = compositor().layout(&churchill(None), &style).unwrap();
	assert!(compositor().fonts().resolve_family(&layout.family, style.font_weight).is_some());
}

#[test]
fn no_fonts_at_all_is_an_error() {
	let empty = Compositor::new(FontBook::from_database(fontdb::Database::new()));
	let err = empty.compose(&churchill(Some("Winston Churchill")), &churchill_style()).unwrap_err();
	assert!(matches!(err, ComposeError::RenderingUnavailable(_)), "{err}");
}

#[test]
fn control_characters_in_quotes_still_render() {
	let quote = Quote::new("bell", "Bell\u{7} rings\u{0} and\u{1b} stops", Some("Ada\u{8}"), &[]);
	let style = StyleConfig { canvas: CanvasSize::Custom { width: 500, height: 500 }, ..churchill_style() };
	let wallpaper = compositor().compose(&quote, &style).unwrap();
	assert_eq!((wallpaper.width(), wallpaper.height()), (500, 500));
}

#[test]
fn pixel_lookup_outside_the_canvas_is_none() {
	let style = StyleConfig { canvas: CanvasSize::Custom { width: 200, height: 100 }, ..churchill_style() };
	let wallpaper = compositor().compose(&churchill(None), &style).unwrap();
	assert!(wallpaper.pixel(199, 99).is_some());
	assert_eq!(wallpaper.pixel(200, 50), None);
	assert_eq!(wallpaper.pixel(u32::MAX, u32::MAX), None);
}

#[test]
fn image_background_is_tinted_at_thirty_percent() {
	let source = RgbaImage::from_pixel(300, 200, Rgba([240, 200, 40, 255]));
	let tint = Color::from_rgba8(0x00, 0x7A, 0xFF, 255);
	let style = StyleConfig {
		background: Background::Image { image: source, tint },
		canvas: CanvasSize::Custom { width: 600, height: 900 },
		..churchill_style()
	};
	let wallpaper = compositor().compose(&churchill(Some("Winston Churchill")), &style).unwrap();

	let expected = [240.0 * 0.7, 200.0 * 0.7 + 122.0 * 0.3, 40.0 * 0.7 + 255.0 * 0.3];
	// corners are inside the padding, away from any text or shadow
	for (x, y) in [(3, 3), (596, 3), (3, 896), (596, 896)] {
		let got = wallpaper.pixel(x, y).unwrap();
		for (channel, want) in got.iter().zip(expected) {
			assert!((f32::from(*channel) - want).abs() <= 2.0, "({x}, {y}): got {got:?}, want {expected:?}");
		}
		assert_eq!(got[3], 255);
	}
}

#[test]
fn fitted_size_bounds_with_installed_fonts() {
	let fonts = compositor().fonts();
	let region = Rect::new(0.0, 0.0, 900.0, 700.0);
	let ceiling = (900.0_f32 * 0.08).min(60.0);
	let mut previous = f32::INFINITY;
	for repeats in [1, 3, 9, 27] {
		let text = "The best time to plant a tree was twenty years ago. ".repeat(repeats);
		let size = fit_font_size(fonts, &text, region, 48.0, FontWeight::Regular, "sans-serif");
		assert!((MIN_FONT_SIZE..=ceiling).contains(&size), "{size}");
		assert!(size <= previous);
		previous = size;
	}
}
