use thiserror::Error;

pub type ComposeResult<T> = Result<T, ComposeError>;

/// Failures of a single compose call. There is no partial output: either a full wallpaper or one of these.
#[derive(Debug, Error)]
pub enum ComposeError {
	#[error("invalid canvas dimensions {width}x{height}: both sides must be positive")]
	InvalidDimensions { width: u32, height: u32 },

	/// The drawing backend could not allocate a surface or build the text layer.
	#[error("rendering unavailable: {0}")]
	RenderingUnavailable(String),
}
