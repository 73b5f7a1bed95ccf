use std::{io::Cursor, path::Path};

use image::{DynamicImage, ImageFormat, ImageResult};

use crate::compose::Wallpaper;

impl Wallpaper {
	/// Write to `path`, format chosen by extension. Formats without alpha (JPEG) get the RGB channels only.
	pub fn save(&self, path: &Path) -> ImageResult<()> {
		let format = ImageFormat::from_path(path)?;
		let image = DynamicImage::ImageRgba8(self.as_image().clone());
		let image = match format {
			ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
			_ => image,
		};
		image.save_with_format(path, format)?;
		tracing::info!(path = %path.display(), width = self.width(), height = self.height(), "saved wallpaper");
		Ok(())
	}

	pub fn encode_png(&self) -> ImageResult<Vec<u8>> {
		let mut buf = Cursor::new(Vec::new());
		self.as_image().write_to(&mut buf, ImageFormat::Png)?;
		Ok(buf.into_inner())
	}
}
