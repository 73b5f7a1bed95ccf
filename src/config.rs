use std::path::PathBuf;

use color_eyre::eyre::{Result, WrapErr as _, eyre};
use serde::{Deserialize, Serialize};

use crate::{
	canvas::CanvasSize,
	color::parse_color,
	style::{Background, FontWeight, StyleConfig, TextAlign},
};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
	/// JSON quote list replacing the bundled one.
	pub quotes_path: Option<PathBuf>,
	/// Extra directories scanned for fonts on top of the system ones.
	pub font_dirs: Vec<PathBuf>,
	pub style: StyleDefaults,
	pub image_api: ImageApiConfig,
}

/// Starting style for `compose`, before command-line overrides.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct StyleDefaults {
	pub canvas: CanvasSize,
	/// Palette name or `#RRGGBB[AA]`.
	pub color: String,
	pub font_size: f32,
	pub weight: FontWeight,
	pub align: TextAlign,
	pub font_family: String,
}

impl Default for StyleDefaults {
	fn default() -> Self {
		let style = StyleConfig::default();
		Self {
			canvas: style.canvas,
			color: "blue".to_owned(),
			font_size: style.font_size,
			weight: style.font_weight,
			align: style.align,
			font_family: style.font_family,
		}
	}
}

impl StyleDefaults {
	pub fn to_style(&self) -> Result<StyleConfig> {
		let color = parse_color(&self.color).ok_or_else(|| eyre!("Unknown color `{}`: use a palette name or #RRGGBB", self.color))?;
		if !(self.font_size.is_finite() && self.font_size > 0.0) {
			return Err(eyre!("font_size must be positive, got {}", self.font_size));
		}
		Ok(StyleConfig {
			background: Background::Color(color),
			font_size: self.font_size,
			font_weight: self.weight,
			font_family: self.font_family.clone(),
			align: self.align,
			canvas: self.canvas,
		})
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageApiConfig {
	pub endpoint: String,
	pub model: String,
	pub size: String,
	/// Name the API key is stored under in the secret store.
	pub secret_name: String,
	pub timeout_secs: u64,
}

impl Default for ImageApiConfig {
	fn default() -> Self {
		Self {
			endpoint: "https://api.openai.com/v1/images/generations".to_owned(),
			model: "dall-e-3".to_owned(),
			size: "1024x1792".to_owned(),
			secret_name: "image_api_key".to_owned(),
			timeout_secs: 120,
		}
	}
}

impl AppConfig {
	/// Layer `QUOTE_WALLPAPER_*` environment variables over either `path` (must exist) or the optional XDG config files.
	pub fn read(path: Option<PathBuf>) -> Result<Self> {
		let app_name = env!("CARGO_PKG_NAME");
		let mut builder = config::Config::builder();

		match path {
			Some(path) => {
				builder = builder.add_source(config::File::from(path.as_path()).required(true));
			}
			None => {
				let xdg_dirs = xdg::BaseDirectories::with_prefix(app_name);
				match xdg_dirs.get_config_home().and_then(|home| home.parent().map(|conf| conf.join(app_name))) {
					Some(app_conf_dir) => {
						let locations = [app_conf_dir.clone(), app_conf_dir.join("config")];
						for location in locations.iter() {
							builder = builder.add_source(config::File::from(location.as_path()).required(false));
						}
					}
					None => tracing::debug!("no XDG config home, using defaults"),
				}
			}
		}

		let builder = builder.add_source(config::Environment::with_prefix("QUOTE_WALLPAPER").prefix_separator("_").separator("__"));
		let raw: config::Config = builder.build().wrap_err("Failed to load configuration")?;
		raw.try_deserialize().wrap_err("Config file is invalid")
	}
}
