use std::path::Path;

use color_eyre::eyre::{Result, WrapErr as _, bail};
use serde::{Deserialize, Deserializer, Serialize};

const BUNDLED_QUOTES: &str = include_str!("../assets/quotes.json");

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Quote {
	pub id: String,
	pub text: String,
	pub author: Option<String>,
	pub categories: Vec<String>,
}

impl Quote {
	pub fn new(id: impl Into<String>, text: impl Into<String>, author: Option<&str>, categories: &[&str]) -> Self {
		Self {
			id: id.into(),
			text: text.into(),
			author: author.map(str::to_owned),
			categories: categories.iter().map(|c| (*c).to_owned()).collect(),
		}
	}

	/// Author if present and not blank.
	pub fn attribution(&self) -> Option<&str> {
		self.author.as_deref().map(str::trim).filter(|a| !a.is_empty())
	}
}

/// A quote entry as written in the quotes file: either a bare string or a full record.
#[derive(Clone, Debug)]
enum QuoteEntry {
	Text(String),
	Record { id: Option<String>, text: String, author: Option<String>, categories: Vec<String> },
}

impl<'de> Deserialize<'de> for QuoteEntry {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: Deserializer<'de>, {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum QuoteHelper {
			String(String),
			Structured {
				id: Option<String>,
				text: String,
				author: Option<String>,
				#[serde(default)]
				categories: Vec<String>,
			},
		}

		let helper = QuoteHelper::deserialize(deserializer)?;
		Ok(match helper {
			QuoteHelper::String(text) => QuoteEntry::Text(text),
			QuoteHelper::Structured { id, text, author, categories } => QuoteEntry::Record { id, text, author, categories },
		})
	}
}

/// The read-only quote list, loaded once per session.
#[derive(Clone, Debug)]
pub struct QuoteBook {
	quotes: Vec<Quote>,
}

impl QuoteBook {
	/// Load from `path`, or from the bundled list when `path` is `None`. Any failure falls back to [`fallback_quotes`].
	pub fn load(path: Option<&Path>) -> Self {
		let loaded = match path {
			Some(path) => std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read quotes from {}", path.display())).and_then(|s| Self::parse(&s)),
			None => Self::parse(BUNDLED_QUOTES),
		};
		match loaded {
			Ok(book) => {
				tracing::debug!(count = book.quotes.len(), "loaded quotes");
				book
			}
			Err(e) => {
				tracing::warn!(error = %format!("{e:#}"), "quote source unavailable, using fallback quotes");
				Self { quotes: fallback_quotes() }
			}
		}
	}

	/// Parse a JSON array of quote entries. Rejects empty lists, blank texts and duplicate ids.
	pub fn parse(json: &str) -> Result<Self> {
		let entries: Vec<QuoteEntry> = serde_json::from_str(json).wrap_err("Quotes file is not a valid JSON quote list")?;
		if entries.is_empty() {
			bail!("Quotes file contains no quotes");
		}

		let mut quotes = Vec::with_capacity(entries.len());
		for (i, entry) in entries.into_iter().enumerate() {
			let quote = match entry {
				QuoteEntry::Text(text) => Quote { id: format!("q-{i}"), text, author: None, categories: Vec::new() },
				QuoteEntry::Record { id, text, author, categories } => Quote { id: id.unwrap_or_else(|| format!("q-{i}")), text, author, categories },
			};
			if quote.text.trim().is_empty() {
				bail!("Quote {} has empty text", quote.id);
			}
			if quotes.iter().any(|q: &Quote| q.id == quote.id) {
				bail!("Duplicate quote id {}", quote.id);
			}
			quotes.push(quote);
		}
		Ok(Self { quotes })
	}

	pub fn list(&self) -> &[Quote] {
		&self.quotes
	}

	pub fn by_id(&self, id: &str) -> Option<&Quote> {
		self.quotes.iter().find(|q| q.id == id)
	}

	/// Quotes in `category` (exact, case-insensitive) whose text or author contains `search` (case-insensitive). `None` matches all.
	pub fn filter<'a>(&'a self, category: Option<&'a str>, search: Option<&'a str>) -> impl Iterator<Item = &'a Quote> + 'a {
		let needle = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);
		self.quotes.iter().filter(move |q| {
			let in_category = category.is_none_or(|c| q.categories.iter().any(|qc| qc.eq_ignore_ascii_case(c)));
			let matches = needle.as_deref().is_none_or(|n| q.text.to_lowercase().contains(n) || q.author.as_deref().is_some_and(|a| a.to_lowercase().contains(n)));
			in_category && matches
		})
	}

	/// Every category label in use, sorted and de-duplicated.
	pub fn categories(&self) -> Vec<&str> {
		let mut categories: Vec<&str> = self.quotes.iter().flat_map(|q| q.categories.iter().map(String::as_str)).collect();
		categories.sort_unstable();
		categories.dedup();
		categories
	}
}

impl Default for QuoteBook {
	fn default() -> Self {
		Self::load(None)
	}
}

/// Shown when the quote source cannot be loaded.
pub fn fallback_quotes() -> Vec<Quote> {
	vec![
		Quote::new("fallback-1", "The only way to do great work is to love what you do.", Some("Steve Jobs"), &["motivation", "work"]),
		Quote::new("fallback-2", "Success is not final, failure is not fatal: it is the courage to continue that counts.", Some("Winston Churchill"), &["success", "perseverance"]),
		Quote::new("fallback-3", "In the middle of every difficulty lies opportunity.", Some("Albert Einstein"), &["wisdom"]),
		Quote::new("fallback-4", "Be yourself; everyone else is already taken.", Some("Oscar Wilde"), &["life"]),
		Quote::new("fallback-5", "The journey of a thousand miles begins with one step.", Some("Lao Tzu"), &["wisdom", "motivation"]),
	]
}
