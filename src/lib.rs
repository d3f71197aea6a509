//! cmplot - render confusion matrices as annotated heatmaps.
//!
//! Cells are shaded with a sequential colormap, annotated with their value
//! and labelled with class names on both axes. Figures can be saved as SVG or
//! bitmap images and shown in the terminal.

pub mod colormap;
pub mod display;
pub mod error;
pub mod figure;
pub mod logging;
pub mod matrix;
pub mod plot;

pub use colormap::{Colormap, TextColor};
pub use display::{Headless, TerminalViewer, Viewer};
pub use error::{PlotError, Result};
pub use figure::{Figure, Heatmap, RenderOptions};
pub use matrix::ConfusionMatrix;
pub use plot::{plot_confusion_matrix, render_matrix, save_figure, OutputFormat};
