use std::{path::PathBuf, sync::Arc};

use crate::{
	style::FontWeight,
	text::{FixedAdvance, FontSpec, TextMetrics, escape_xml},
};

/// Families tried, in order, for the generic `sans-serif` when the fontdb default (Arial) is not installed.
const SANS_SERIF_CANDIDATES: [&str; 7] = ["Helvetica Neue", "Helvetica", "Arial", "Inter", "Noto Sans", "DejaVu Sans", "Liberation Sans"];

/// DejaVu Sans, shipped with the crate so text always has a face to land on.
const BUNDLED_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

/// Shared, read-only font database. Measures text with the same usvg layout that later draws it.
#[derive(Clone, Debug)]
pub struct FontBook {
	db: Arc<fontdb::Database>,
}

impl FontBook {
	pub fn system() -> Self {
		Self::with_dirs(&[])
	}

	/// System fonts plus every font found under `dirs`, plus the bundled face.
	pub fn with_dirs(dirs: &[PathBuf]) -> Self {
		let mut db = fontdb::Database::new();
		db.load_system_fonts();
		for dir in dirs {
			db.load_fonts_dir(dir);
		}
		db.load_font_data(BUNDLED_FONT.to_vec());
		Self::from_database(db)
	}

	/// Only the bundled face. Renders identically on every machine.
	pub fn bundled() -> Self {
		let mut db = fontdb::Database::new();
		db.load_font_data(BUNDLED_FONT.to_vec());
		Self::from_database(db)
	}

	pub fn from_database(mut db: fontdb::Database) -> Self {
		let has_family = |db: &fontdb::Database, name: &str| db.faces().any(|face| face.families.iter().any(|(family, _)| family == name));
		match SANS_SERIF_CANDIDATES.iter().find(|name| has_family(&db, name)) {
			Some(name) => db.set_sans_serif_family(*name),
			None => {
				let first = db.faces().next().and_then(|face| face.families.first()).map(|(family, _)| family.clone());
				match first {
					Some(family) => {
						tracing::warn!(%family, "no preferred sans-serif family installed, falling back");
						db.set_sans_serif_family(family);
					}
					None => tracing::warn!("font database is empty"),
				}
			}
		}
		tracing::debug!(faces = db.len(), "font database ready");
		Self { db: Arc::new(db) }
	}

	pub fn is_empty(&self) -> bool {
		self.db.is_empty()
	}

	/// Concrete family name that `family` (a name or a CSS generic) selects at `weight`, if any face matches.
	pub fn resolve_family(&self, family: &str, weight: FontWeight) -> Option<String> {
		let family = family.trim();
		let query_family = match family.to_ascii_lowercase().as_str() {
			"sans-serif" => fontdb::Family::SansSerif,
			"serif" => fontdb::Family::Serif,
			"monospace" => fontdb::Family::Monospace,
			"cursive" => fontdb::Family::Cursive,
			"fantasy" => fontdb::Family::Fantasy,
			_ => fontdb::Family::Name(family),
		};
		let query = fontdb::Query {
			families: &[query_family],
			weight: fontdb::Weight(weight.css()),
			..Default::default()
		};
		let face = self.db.query(&query).and_then(|id| self.db.face(id))?;
		match query_family {
			fontdb::Family::Name(name) => Some(name.to_owned()),
			_ => face.families.first().map(|(name, _)| name.clone()),
		}
	}

	pub(crate) fn usvg_options(&self) -> usvg::Options<'static> {
		let mut options = usvg::Options::default();
		options.font_family = "sans-serif".to_owned();
		options.fontdb = Arc::clone(&self.db);
		options
	}
}

impl TextMetrics for FontBook {
	fn line_width(&self, line: &str, font: &FontSpec<'_>) -> f32 {
		let fallback = || FixedAdvance::default().line_width(line, font);
		if self.is_empty() || line.trim().is_empty() {
			return fallback();
		}

		let svg = format!(
			r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"><text x="0" y="0" font-family="{}" font-size="{}" font-weight="{}">{}</text></svg>"#,
			escape_xml(font.family),
			font.size,
			font.weight.css(),
			escape_xml(line),
		);
		match usvg::Tree::from_str(&svg, &self.usvg_options()) {
			Ok(tree) => {
				let width = tree.root().bounding_box().width();
				// An unresolvable family yields an empty tree
				if width > 0.0 { width } else { fallback() }
			}
			Err(e) => {
				tracing::warn!(error = %e, "text measurement failed, using fixed advance");
				fallback()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bundled_face_backs_sans_serif() {
		let fonts = FontBook::bundled();
		assert!(!fonts.is_empty());
		assert_eq!(fonts.resolve_family("sans-serif", FontWeight::Light).as_deref(), Some("DejaVu Sans"));
		assert_eq!(fonts.resolve_family("DejaVu Sans", FontWeight::Bold).as_deref(), Some("DejaVu Sans"));
	}

	#[test]
	fn unknown_family_does_not_resolve() {
		assert_eq!(FontBook::bundled().resolve_family("No Such Family 9000", FontWeight::Regular), None);
	}

	#[test]
	fn empty_database_resolves_nothing() {
		let fonts = FontBook::from_database(fontdb::Database::new());
		assert!(fonts.is_empty());
		assert_eq!(fonts.resolve_family("sans-serif", FontWeight::Regular), None);
	}

	#[test]
	fn measures_with_the_bundled_face() {
		let fonts = FontBook::bundled();
		let font = FontSpec::new("DejaVu Sans", 20.0, FontWeight::Regular);
		let short = fonts.line_width("ii", &font);
		let long = fonts.line_width("WWWWWWWW", &font);
		assert!(short > 0.0 && long > short);
	}
}
