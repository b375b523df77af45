use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a scene or writing an image
#[derive(Error, Debug)]
pub enum SceneError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("malformed JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("line {line}: unknown command `{command}`")]
	UnknownCommand { line: usize, command: String },

	#[error("line {line}: {message}")]
	Parse { line: usize, message: String },

	#[error("line {line}: `{command}` must follow a shape command")]
	NoPrimitive { line: usize, command: String },

	#[error("{kind} index {index} is out of bounds")]
	IndexOutOfBounds { kind: &'static str, index: usize },

	#[error("invalid glTF document: {0}")]
	InvalidDocument(String),

	#[error("unsupported accessor: {0}")]
	UnsupportedAccessor(String),

	#[error("buffer {index} is too short: need {needed} bytes, have {len}")]
	TruncatedBuffer { index: usize, needed: usize, len: usize },

	#[error("cannot encode image {0}")]
	Image(#[from] image::ImageError),

	#[error("unsupported output format: {}", .0.display())]
	OutputFormat(PathBuf),
}

pub type Result<T> = std::result::Result<T, SceneError>;
