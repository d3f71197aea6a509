//! Error types for matrix loading and rendering.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = PlotError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Confusion matrix must be square: row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("Got {labels} class labels for a {classes}x{classes} matrix")]
    LabelMismatch { labels: usize, classes: usize },

    #[error("Matrix entry ({row}, {col}) is not a finite number")]
    NonFinite { row: usize, col: usize },

    #[error("Unknown colormap '{0}' (expected one of: {known})", known = crate::colormap::Colormap::NAMES.join(", "))]
    UnknownColormap(String),

    #[error("Unsupported output format for {}: expected .svg, .png, .jpg or .bmp", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Output directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Drawing backend error: {0}")]
    Backend(String),

    #[error("Failed to parse matrix file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
