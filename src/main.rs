use std::{io::Read as _, path::PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::{
	Result,
	eyre::{WrapErr as _, bail, eyre},
};
use quote_wallpaper::{
	Background, CanvasSize, Compositor, FontWeight, Preset, Quote, QuoteBook, StyleConfig, TextAlign,
	color::parse_color,
	config::AppConfig,
	fonts::FontBook,
	secrets::{FileSecretStore, SecretStore},
};
use rand::seq::IndexedRandom as _;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Debug, Parser)]
#[command(name = "quote_wallpaper")]
#[command(about = "Render a quote onto a wallpaper-sized image")]
struct Args {
	/// Config file to use instead of the XDG config location.
	#[arg(long, global = true)]
	config: Option<PathBuf>,
	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Print quotes, optionally filtered.
	List {
		#[arg(long)]
		category: Option<String>,
		/// Case-insensitive match against text and author.
		#[arg(long)]
		search: Option<String>,
	},
	/// Print every category label.
	Categories,
	/// Render a quote and write the image.
	Compose(ComposeArgs),
	/// Manage the image API key.
	Secret {
		#[command(subcommand)]
		action: SecretAction,
	},
}

#[derive(Debug, ClapArgs)]
struct ComposeArgs {
	/// Quote id; a random quote when omitted.
	#[arg(long)]
	id: Option<String>,
	#[arg(long, value_enum, conflicts_with_all = ["width", "height"])]
	preset: Option<Preset>,
	#[arg(long, requires = "height")]
	width: Option<u32>,
	#[arg(long, requires = "width")]
	height: Option<u32>,
	/// Palette name (blue, purple, ...) or #RRGGBB.
	#[arg(long)]
	color: Option<String>,
	#[arg(long)]
	font_size: Option<f32>,
	#[arg(long, value_enum)]
	weight: Option<FontWeight>,
	#[arg(long, value_enum)]
	align: Option<TextAlign>,
	#[arg(long)]
	font_family: Option<String>,
	/// Background image (jpg, png, ...), tinted with the base color.
	#[arg(long, conflicts_with = "generate")]
	background: Option<PathBuf>,
	/// Ask the configured image API for a background.
	#[arg(long)]
	generate: bool,
	/// Output path; format follows the extension.
	#[arg(short, long)]
	output: PathBuf,
}

#[derive(Debug, Subcommand)]
enum SecretAction {
	/// Store a secret; reads it from stdin when VALUE is omitted.
	Set {
		value: Option<String>,
		#[arg(long)]
		name: Option<String>,
	},
	/// Report whether a secret is stored.
	Get {
		#[arg(long)]
		name: Option<String>,
		/// Print the secret itself.
		#[arg(long)]
		reveal: bool,
	},
	Delete {
		#[arg(long)]
		name: Option<String>,
	},
}

fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	let args = Args::parse();
	let config = AppConfig::read(args.config)?;

	match args.command {
		Command::List { category, search } => {
			let book = QuoteBook::load(config.quotes_path.as_deref());
			for quote in book.filter(category.as_deref(), search.as_deref()) {
				print_quote(quote);
			}
		}
		Command::Categories => {
			let book = QuoteBook::load(config.quotes_path.as_deref());
			for category in book.categories() {
				println!("{category}");
			}
		}
		Command::Compose(compose_args) => compose(&config, compose_args)?,
		Command::Secret { action } => secret(&config, action)?,
	}
	Ok(())
}

fn print_quote(quote: &Quote) {
	match quote.attribution() {
		Some(author) => println!("{}\t{} \u{2014} {author}", quote.id, quote.text),
		None => println!("{}\t{}", quote.id, quote.text),
	}
}

fn compose(config: &AppConfig, args: ComposeArgs) -> Result<()> {
	let book = QuoteBook::load(config.quotes_path.as_deref());
	let quote = match &args.id {
		Some(id) => book.by_id(id).ok_or_else(|| eyre!("No quote with id `{id}`"))?,
		None => book.list().choose(&mut rand::rng()).ok_or_else(|| eyre!("No quotes configured"))?,
	};
	tracing::info!(id = %quote.id, text = %quote.text, author = ?quote.author, "selected quote");

	let style = style_from(config, &args)?;
	let style = match (&args.background, args.generate) {
		(Some(path), _) => {
			let image = image::open(path).wrap_err_with(|| format!("Failed to open background {}", path.display()))?;
			style.with_background_image(image.to_rgba8())
		}
		(None, true) => match generated_background(config, quote) {
			Ok(image) => style.with_background_image(image),
			Err(e) => {
				tracing::warn!(error = %format!("{e:#}"), "could not generate a background, using the color gradient");
				style
			}
		},
		(None, false) => style,
	};

	let compositor = Compositor::new(FontBook::with_dirs(&config.font_dirs));
	let wallpaper = compositor.compose(quote, &style)?;
	wallpaper.save(&args.output).wrap_err_with(|| format!("Failed to write {}", args.output.display()))?;
	println!("{}", args.output.display());
	Ok(())
}

fn style_from(config: &AppConfig, args: &ComposeArgs) -> Result<StyleConfig> {
	let mut style = config.style.to_style()?;
	if let Some(preset) = args.preset {
		style.canvas = preset.into();
	}
	if let (Some(width), Some(height)) = (args.width, args.height) {
		style.canvas = CanvasSize::Custom { width, height };
	}
	if let Some(color) = &args.color {
		let color = parse_color(color).ok_or_else(|| eyre!("Unknown color `{color}`: use a palette name or #RRGGBB"))?;
		style.background = Background::Color(color);
	}
	if let Some(size) = args.font_size {
		if !(size.is_finite() && size > 0.0) {
			bail!("--font-size must be positive");
		}
		style.font_size = size;
	}
	if let Some(weight) = args.weight {
		style.font_weight = weight;
	}
	if let Some(align) = args.align {
		style.align = align;
	}
	if let Some(family) = &args.font_family {
		style.font_family = family.clone();
	}
	Ok(style)
}

#[cfg(feature = "image-api")]
fn generated_background(config: &AppConfig, quote: &Quote) -> Result<image::RgbaImage> {
	use quote_wallpaper::provider::{BackgroundProvider as _, ImageApiProvider};

	let store = FileSecretStore::default_location()?;
	let provider = ImageApiProvider::from_store(config.image_api.clone(), &store)?;
	Ok(provider.fetch(quote)?)
}

#[cfg(not(feature = "image-api"))]
fn generated_background(_config: &AppConfig, _quote: &Quote) -> Result<image::RgbaImage> {
	bail!("built without the `image-api` feature")
}

fn secret(config: &AppConfig, action: SecretAction) -> Result<()> {
	let store = FileSecretStore::default_location()?;
	let default_name = || config.image_api.secret_name.clone();
	match action {
		SecretAction::Set { value, name } => {
			let name = name.unwrap_or_else(default_name);
			let value = match value {
				Some(value) => value,
				None => {
					let mut buf = String::new();
					std::io::stdin().read_to_string(&mut buf).wrap_err("Failed to read secret from stdin")?;
					buf
				}
			};
			let value = value.trim();
			if value.is_empty() {
				bail!("Refusing to store an empty secret");
			}
			store.store(&name, value)?;
			tracing::info!(%name, path = %store.path().display(), "stored secret");
		}
		SecretAction::Get { name, reveal } => {
			let name = name.unwrap_or_else(default_name);
			match store.retrieve(&name)? {
				Some(value) if reveal => println!("{value}"),
				Some(_) => println!("{name}: set"),
				None => println!("{name}: not set"),
			}
		}
		SecretAction::Delete { name } => {
			let name = name.unwrap_or_else(default_name);
			store.delete(&name)?;
			tracing::info!(%name, "deleted secret");
		}
	}
	Ok(())
}
