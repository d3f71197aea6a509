//! The drawing surface a heatmap is laid out on.
//!
//! A [`Figure`] holds the display list of the last draw: shaded cells with
//! their annotations, tick labels and axis ranges. Backends (SVG file,
//! terminal) only read it. Every draw starts by clearing the figure, so
//! nothing from a previous matrix survives.

use crate::colormap::{Colormap, TextColor};
use crate::matrix::ConfusionMatrix;
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// Figure geometry and text settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Figure width (inches)
    pub width_in: f64,
    /// Figure height (inches)
    pub height_in: f64,
    /// Raster resolution used when saving
    pub dpi: u32,
    /// Decimal places in cell annotations
    pub precision: usize,
    /// Font size (points)
    pub font_pt: f64,
    /// Rotation of the x tick labels (degrees, counter-clockwise)
    pub x_tick_rotation: f64,
    pub x_title: String,
    pub y_title: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width_in: 6.4,
            height_in: 4.8,
            dpi: 300,
            precision: 2,
            font_pt: 10.0,
            x_tick_rotation: 45.0,
            x_title: "Predicted".to_string(),
            y_title: "True label".to_string(),
        }
    }
}

impl RenderOptions {
    /// Output size in pixels at the configured DPI
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (self.width_in * dpi).round().max(1.0) as u32,
            (self.height_in * dpi).round().max(1.0) as u32,
        )
    }

    /// Convert a length in points to pixels at the configured DPI
    pub fn points_to_px(&self, pt: f64) -> u32 {
        (pt * self.dpi as f64 / 72.0).round().max(1.0) as u32
    }
}

/// Data-space interval shown along one axis. `start` maps to the left/bottom
/// edge, `end` to the right/top edge; `start > end` inverts the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub start: f64,
    pub end: f64,
}

impl AxisRange {
    /// Fraction of the way from `start` to `end` (0.0 for an empty range)
    pub fn fraction(&self, v: f64) -> f64 {
        let span = self.end - self.start;
        if span == 0.0 {
            0.0
        } else {
            (v - self.start) / span
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// One shaded, annotated matrix cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub value: f64,
    pub fill: RGBColor,
    pub text: String,
    pub text_color: TextColor,
}

/// A laid-out confusion matrix heatmap
#[derive(Debug, Clone)]
pub struct Heatmap {
    pub n_classes: usize,
    pub cells: Vec<Cell>,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
    pub x_tick_rotation: f64,
    pub x_title: String,
    pub y_title: String,
    pub colormap: Colormap,
    pub threshold: f64,
}

impl Heatmap {
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    pub fn total(&self) -> f64 {
        self.cells.iter().map(|c| c.value).sum()
    }
}

/// The current figure. Drawing replaces whatever it held before.
#[derive(Debug, Default)]
pub struct Figure {
    heatmap: Option<Heatmap>,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.heatmap = None;
    }

    pub fn is_empty(&self) -> bool {
        self.heatmap.is_none()
    }

    pub fn heatmap(&self) -> Option<&Heatmap> {
        self.heatmap.as_ref()
    }

    /// Clear the figure and lay out `matrix` as a heatmap
    pub fn draw_confusion_matrix(
        &mut self,
        matrix: &ConfusionMatrix,
        colormap: Colormap,
        options: &RenderOptions,
    ) -> &Heatmap {
        self.clear();

        let n = matrix.n_classes();
        let (min, max) = (matrix.min(), matrix.max());
        let threshold = matrix.text_threshold();

        let mut cells = Vec::with_capacity(n * n);
        for (row, values) in matrix.values().iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                cells.push(Cell {
                    row,
                    col,
                    value,
                    fill: colormap.color_for(value, min, max),
                    text: format!("{:.*}", options.precision, value),
                    text_color: TextColor::for_value(value, threshold),
                });
            }
        }

        let ticks: Vec<Tick> = matrix
            .display_labels()
            .into_iter()
            .enumerate()
            .map(|(i, label)| Tick {
                position: i as f64,
                label,
            })
            .collect();

        let edge = n as f64 - 0.5;
        self.heatmap.insert(Heatmap {
            n_classes: n,
            cells,
            x_ticks: ticks.clone(),
            y_ticks: ticks,
            x_range: AxisRange { start: -0.5, end: edge },
            // Row 0 at the top
            y_range: AxisRange { start: edge, end: -0.5 },
            x_tick_rotation: options.x_tick_rotation,
            x_title: options.x_title.clone(),
            y_title: options.y_title.clone(),
            colormap,
            threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> ConfusionMatrix {
        ConfusionMatrix::new(
            vec![vec![10.0, 2.0], vec![3.0, 8.0]],
            vec!["true_positive".to_string(), "other".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_cell_text_colors() {
        let mut fig = Figure::new();
        let options = RenderOptions::default();
        let heatmap = fig.draw_confusion_matrix(&sample_matrix(), Colormap::Blues, &options);

        assert_eq!(heatmap.threshold, 5.0);
        assert_eq!(heatmap.cell(0, 0).unwrap().text_color, TextColor::White);
        assert_eq!(heatmap.cell(0, 1).unwrap().text_color, TextColor::Black);
        assert_eq!(heatmap.cell(1, 0).unwrap().text_color, TextColor::Black);
        assert_eq!(heatmap.cell(1, 1).unwrap().text_color, TextColor::White);
    }

    #[test]
    fn test_cell_annotations_two_decimals() {
        let mut fig = Figure::new();
        let options = RenderOptions::default();
        let heatmap = fig.draw_confusion_matrix(&sample_matrix(), Colormap::Blues, &options);

        let texts: Vec<&str> = heatmap.cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["10.00", "2.00", "3.00", "8.00"]);
    }

    #[test]
    fn test_cell_fill_scaled_between_min_and_max() {
        let mut fig = Figure::new();
        let options = RenderOptions::default();
        let heatmap = fig.draw_confusion_matrix(&sample_matrix(), Colormap::Blues, &options);

        assert_eq!(heatmap.cell(0, 1).unwrap().fill, Colormap::Blues.sample(0.0));
        assert_eq!(heatmap.cell(0, 0).unwrap().fill, Colormap::Blues.sample(1.0));
    }

    #[test]
    fn test_ticks_use_display_labels() {
        let mut fig = Figure::new();
        let options = RenderOptions::default();
        let heatmap = fig.draw_confusion_matrix(&sample_matrix(), Colormap::Blues, &options);

        assert_eq!(heatmap.x_ticks[0].label, "true positive");
        assert_eq!(heatmap.y_ticks[0].label, "true positive");
        assert_eq!(heatmap.x_ticks[1].position, 1.0);
        assert_eq!(heatmap.x_tick_rotation, 45.0);
    }

    #[test]
    fn test_axis_ranges_edge_to_edge_with_inverted_y() {
        let mut fig = Figure::new();
        let options = RenderOptions::default();
        let heatmap = fig.draw_confusion_matrix(&sample_matrix(), Colormap::Blues, &options);

        assert_eq!(heatmap.x_range, AxisRange { start: -0.5, end: 1.5 });
        assert_eq!(heatmap.y_range, AxisRange { start: 1.5, end: -0.5 });
        assert!(heatmap.y_range.is_inverted());
        // Row 0 lies in the upper half
        assert!(heatmap.y_range.fraction(0.0) > 0.5);
        assert_eq!(heatmap.x_range.fraction(-0.5), 0.0);
        assert_eq!(heatmap.x_range.fraction(1.5), 1.0);
    }

    #[test]
    fn test_empty_labels_produce_no_ticks() {
        let cm = ConfusionMatrix::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]], vec![]).unwrap();
        let mut fig = Figure::new();
        let heatmap = fig.draw_confusion_matrix(&cm, Colormap::Blues, &RenderOptions::default());

        assert!(heatmap.x_ticks.is_empty());
        assert!(heatmap.y_ticks.is_empty());
        assert_eq!(heatmap.cells.len(), 4);
    }

    #[test]
    fn test_redraw_replaces_previous_content() {
        let mut fig = Figure::new();
        fig.draw_confusion_matrix(&sample_matrix(), Colormap::Blues, &RenderOptions::default());

        let small = ConfusionMatrix::new(vec![vec![7.0]], vec!["solo".to_string()]).unwrap();
        let heatmap = fig.draw_confusion_matrix(&small, Colormap::Reds, &RenderOptions::default());

        assert_eq!(heatmap.cells.len(), 1);
        assert_eq!(heatmap.cells[0].text, "7.00");
        assert_eq!(heatmap.x_ticks.len(), 1);
        assert_eq!(heatmap.colormap, Colormap::Reds);
    }

    #[test]
    fn test_clear() {
        let mut fig = Figure::new();
        fig.draw_confusion_matrix(&sample_matrix(), Colormap::Blues, &RenderOptions::default());
        assert!(!fig.is_empty());
        fig.clear();
        assert!(fig.is_empty());
    }

    #[test]
    fn test_pixel_size_at_300_dpi() {
        let options = RenderOptions::default();
        assert_eq!(options.pixel_size(), (1920, 1440));
        assert_eq!(options.points_to_px(72.0), 300);
    }
}
