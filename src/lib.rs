//! Quote wallpapers: pick a quote, style it, render it.
//!
//! [`compose`](compose::compose) is the whole pipeline: canvas sizing, a gradient or tinted image background, a fitted
//! and wrapped quote body, and an optional attribution line, all with drop shadows. Everything around it (the quote list,
//! generated backgrounds, credential storage, export) is plain glue in the other modules.

pub mod background;
pub mod canvas;
pub mod color;
pub mod compose;
pub mod config;
pub mod error;
pub mod export;
pub mod fonts;
pub mod provider;
pub mod quotes;
pub mod secrets;
pub mod style;
pub mod text;

pub use canvas::{CanvasSize, Preset};
pub use compose::{Compositor, Wallpaper, compose};
pub use error::{ComposeError, ComposeResult};
pub use quotes::{Quote, QuoteBook};
pub use style::{Background, FontWeight, StyleConfig, TextAlign};
