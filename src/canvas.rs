use serde::{Deserialize, Serialize};

use crate::error::{ComposeError, ComposeResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
	#[default]
	PhonePortrait,
	PhoneLandscape,
	TabletPortrait,
	Square,
}

impl Preset {
	pub const ALL: [Preset; 4] = [Preset::PhonePortrait, Preset::PhoneLandscape, Preset::TabletPortrait, Preset::Square];

	pub const fn dimensions(self) -> (u32, u32) {
		match self {
			Preset::PhonePortrait => (1170, 2532),
			Preset::PhoneLandscape => (2532, 1170),
			Preset::TabletPortrait => (1668, 2388),
			Preset::Square => (1080, 1080),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanvasSize {
	Preset(Preset),
	Custom { width: u32, height: u32 },
}

impl Default for CanvasSize {
	fn default() -> Self {
		CanvasSize::Preset(Preset::default())
	}
}

impl From<Preset> for CanvasSize {
	fn from(preset: Preset) -> Self {
		CanvasSize::Preset(preset)
	}
}

impl CanvasSize {
	pub const fn dimensions(self) -> (u32, u32) {
		match self {
			CanvasSize::Preset(preset) => preset.dimensions(),
			CanvasSize::Custom { width, height } => (width, height),
		}
	}

	/// Pixel dimensions, rejecting a zero-area custom size.
	pub fn validated(self) -> ComposeResult<(u32, u32)> {
		match self.dimensions() {
			(0, _) | (_, 0) => {
				let (width, height) = self.dimensions();
				Err(ComposeError::InvalidDimensions { width, height })
			}
			dims => Ok(dims),
		}
	}
}
