use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tiny_skia::Color;

use crate::canvas::CanvasSize;

/// Ordered lightest to heaviest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
	UltraLight,
	Thin,
	Light,
	#[default]
	Regular,
	Medium,
	Semibold,
	Bold,
	Heavy,
	Black,
}

impl FontWeight {
	/// CSS numeric weight, 100..=900.
	pub const fn css(self) -> u16 {
		match self {
			FontWeight::UltraLight => 100,
			FontWeight::Thin => 200,
			FontWeight::Light => 300,
			FontWeight::Regular => 400,
			FontWeight::Medium => 500,
			FontWeight::Semibold => 600,
			FontWeight::Bold => 700,
			FontWeight::Heavy => 800,
			FontWeight::Black => 900,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
	Start,
	#[default]
	Center,
	End,
}

impl TextAlign {
	pub(crate) const fn svg_anchor(self) -> &'static str {
		match self {
			TextAlign::Start => "start",
			TextAlign::Center => "middle",
			TextAlign::End => "end",
		}
	}
}

/// What sits under the text. With an image, `tint` is laid over it at partial opacity.
#[derive(Clone, Debug)]
pub enum Background {
	Color(Color),
	Image { image: RgbaImage, tint: Color },
}

impl Background {
	pub fn base_color(&self) -> Color {
		match self {
			Background::Color(color) => *color,
			Background::Image { tint, .. } => *tint,
		}
	}
}

/// Everything a single compose call needs besides the quote itself.
#[derive(Clone, Debug)]
pub struct StyleConfig {
	pub background: Background,
	/// Requested body size before fitting.
	pub font_size: f32,
	pub font_weight: FontWeight,
	pub font_family: String,
	pub align: TextAlign,
	pub canvas: CanvasSize,
}

impl Default for StyleConfig {
	fn default() -> Self {
		Self {
			background: Background::Color(Color::from_rgba8(0x00, 0x7A, 0xFF, 255)),
			font_size: 24.0,
			font_weight: FontWeight::default(),
			font_family: "sans-serif".to_owned(),
			align: TextAlign::default(),
			canvas: CanvasSize::default(),
		}
	}
}

impl StyleConfig {
	/// Swap in a fetched or loaded image, keeping the current base color as its tint.
	pub fn with_background_image(mut self, image: RgbaImage) -> Self {
		let tint = self.background.base_color();
		self.background = Background::Image { image, tint };
		self
	}
}
