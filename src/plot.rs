//! Heatmap rendering to SVG or bitmap files and the top-level plotting entry
//! point.

use crate::colormap::Colormap;
use crate::display::Viewer;
use crate::error::{PlotError, Result};
use crate::figure::{Figure, Heatmap, RenderOptions, Tick};
use crate::matrix::ConfusionMatrix;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::combinators::WithKeyPoints;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use std::sync::Once;

static INIT_FONTS: Once = Once::new();

/// Text is measured and rasterized with the bundled DejaVu Sans, so output
/// does not depend on the fonts installed on the machine.
fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            FontStyle::Normal,
            include_bytes!("../assets/DejaVuSans.ttf"),
        );
    });
}

type HeatmapChart<'a, DB> =
    ChartContext<'a, DB, Cartesian2d<WithKeyPoints<RangedCoordf64>, WithKeyPoints<RangedCoordf64>>>;

/// Output encodings picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Bitmap,
}

impl OutputFormat {
    /// `.svg` is vector output; `.png`, `.jpg`/`.jpeg` and `.bmp` are encoded bitmaps
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Some(Self::Svg),
            "png" | "jpg" | "jpeg" | "bmp" => Some(Self::Bitmap),
            _ => None,
        }
    }
}

/// Render a confusion matrix onto `figure`, save it when `save` is given, then
/// hand it to `viewer`.
///
/// `cats` may be empty (no tick labels); otherwise it must name every class.
pub fn plot_confusion_matrix<S, V>(
    figure: &mut Figure,
    conf_matrix: &[Vec<f64>],
    cats: &[S],
    save: Option<&Path>,
    cmap: Colormap,
    viewer: &mut V,
) -> Result<()>
where
    S: AsRef<str>,
    V: Viewer + ?Sized,
{
    let matrix = ConfusionMatrix::from_rows(conf_matrix, cats)?;
    render_matrix(figure, &matrix, save, cmap, &RenderOptions::default(), viewer)
}

/// Same as [`plot_confusion_matrix`] for an already validated matrix and
/// explicit render options.
pub fn render_matrix<V: Viewer + ?Sized>(
    figure: &mut Figure,
    matrix: &ConfusionMatrix,
    save: Option<&Path>,
    cmap: Colormap,
    options: &RenderOptions,
    viewer: &mut V,
) -> Result<()> {
    figure.draw_confusion_matrix(matrix, cmap, options);

    if let Some(path) = save {
        save_figure(figure, path, options)?;
    }

    viewer.show(figure)
}

/// Write the figure's heatmap to `path`. The format follows the extension.
pub fn save_figure<P: AsRef<Path>>(
    figure: &Figure,
    path: P,
    options: &RenderOptions,
) -> Result<()> {
    let path = path.as_ref();

    let format = OutputFormat::from_path(path)
        .ok_or_else(|| PlotError::UnsupportedFormat(path.to_path_buf()))?;

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.is_dir() {
            return Err(PlotError::MissingDirectory(dir.to_path_buf()));
        }
    }

    ensure_fonts_registered();
    let size = options.pixel_size();

    match format {
        OutputFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_figure(&root, figure, options)
        }
        OutputFormat::Bitmap => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_figure(&root, figure, options)
        }
    }
}

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    options: &RenderOptions,
) -> Result<()> {
    root.fill(&WHITE).map_err(backend_err)?;

    if let Some(heatmap) = figure.heatmap() {
        draw_heatmap(root, heatmap, options)?;
    }

    root.present().map_err(backend_err)?;
    Ok(())
}

fn backend_err<E: std::fmt::Debug>(e: E) -> PlotError {
    PlotError::Backend(format!("{:?}", e))
}

/// Rough glyph advance for a sans-serif face
fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

fn widest_label(ticks: &[Tick], font_px: u32) -> u32 {
    ticks
        .iter()
        .map(|t| estimate_text_width_px(&t.label, font_px))
        .max()
        .unwrap_or(0)
}

/// Margins and label areas handed to the chart builder. The label areas
/// hold tick labels and the axis title; the margins centre a square plot
/// area in what is left, so cells stay square.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ChartLayout {
    margin_left: u32,
    margin_right: u32,
    margin_top: u32,
    margin_bottom: u32,
    x_label_area: u32,
    y_label_area: u32,
    font_px: u32,
    tick_len: u32,
}

impl ChartLayout {
    fn compute(heatmap: &Heatmap, options: &RenderOptions) -> Self {
        let (width, height) = options.pixel_size();
        let font_px = options.points_to_px(options.font_pt);
        let tick_len = options.points_to_px(3.5);
        let pad = options.points_to_px(3.5);
        let outer = options.points_to_px(8.0);
        // Tick labels sit twice the tick length away from the axis
        let label_dist = tick_len * 2;

        let (sin, cos) = heatmap.x_tick_rotation.to_radians().sin_cos();
        let x_label_len = widest_label(&heatmap.x_ticks, font_px) as f64;
        let x_label_w = (x_label_len * cos.abs() + font_px as f64 * sin.abs()).ceil() as u32;
        let x_label_h = (x_label_len * sin.abs() + font_px as f64 * cos.abs()).ceil() as u32;
        let y_label_w = widest_label(&heatmap.y_ticks, font_px);

        let x_label_area = label_dist + x_label_h + pad + font_px + pad;
        let y_label_area = label_dist + y_label_w + pad + font_px + pad;

        // Slanted x labels reach left of the first column
        let left = (outer + y_label_area).max(outer + x_label_w);
        let avail_w = width.saturating_sub(left + outer).max(1);
        let avail_h = height.saturating_sub(outer + x_label_area + outer).max(1);
        let side = avail_w.min(avail_h);

        let margin_left = left - y_label_area + (avail_w - side) / 2;
        let margin_top = outer + (avail_h - side) / 2;

        Self {
            margin_left,
            margin_right: width.saturating_sub(margin_left + y_label_area + side),
            margin_top,
            margin_bottom: height.saturating_sub(margin_top + side + x_label_area),
            x_label_area,
            y_label_area,
            font_px,
            tick_len,
        }
    }
}

fn build_chart<'a, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, Shift>,
    heatmap: &Heatmap,
    layout: &ChartLayout,
) -> Result<HeatmapChart<'a, DB>> {
    let x_keys: Vec<f64> = heatmap.x_ticks.iter().map(|t| t.position).collect();
    let y_keys: Vec<f64> = heatmap.y_ticks.iter().map(|t| t.position).collect();

    ChartBuilder::on(root)
        .margin_left(layout.margin_left)
        .margin_right(layout.margin_right)
        .margin_top(layout.margin_top)
        .margin_bottom(layout.margin_bottom)
        .x_label_area_size(layout.x_label_area)
        .y_label_area_size(layout.y_label_area)
        .build_cartesian_2d(
            (heatmap.x_range.start..heatmap.x_range.end).with_key_points(x_keys),
            (heatmap.y_range.start..heatmap.y_range.end).with_key_points(y_keys),
        )
        .map_err(backend_err)
}

fn draw_heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    heatmap: &Heatmap,
    options: &RenderOptions,
) -> Result<()> {
    if heatmap.n_classes == 0 {
        return Ok(());
    }

    let layout = ChartLayout::compute(heatmap, options);
    let font_px = layout.font_px;
    let mut chart = build_chart(root, heatmap, &layout)?;

    // Tick positions are whole class indices
    let y_label = |v: &f64| {
        heatmap
            .y_ticks
            .iter()
            .find(|t| (t.position - v).abs() < 0.5)
            .map(|t| t.label.clone())
            .unwrap_or_default()
    };
    // Drawn separately along a slanted baseline
    let no_label = |_: &f64| String::new();

    chart
        .configure_mesh()
        .disable_mesh()
        .set_all_tick_mark_size(layout.tick_len)
        .x_label_formatter(&no_label)
        .y_label_formatter(&y_label)
        .label_style((FontFamily::SansSerif, font_px))
        .axis_desc_style((FontFamily::SansSerif, font_px))
        .x_desc(heatmap.x_title.as_str())
        .y_desc(heatmap.y_title.as_str())
        .draw()
        .map_err(backend_err)?;

    chart
        .draw_series(heatmap.cells.iter().map(|cell| {
            let (c, r) = (cell.col as f64, cell.row as f64);
            Rectangle::new([(c - 0.5, r - 0.5), (c + 0.5, r + 0.5)], cell.fill.filled())
        }))
        .map_err(backend_err)?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    for cell in &heatmap.cells {
        let color = cell.text_color.rgb();
        let style = TextStyle::from((FontFamily::SansSerif, font_px))
            .color(&color)
            .pos(centered);
        let at = (cell.col as f64, cell.row as f64);
        chart
            .plotting_area()
            .draw(&Text::new(cell.text.as_str(), at, style))
            .map_err(backend_err)?;
    }

    // Frame around the whole grid
    let (x, y) = (heatmap.x_range, heatmap.y_range);
    chart
        .plotting_area()
        .draw(&Rectangle::new([(x.start, y.start), (x.end, y.end)], BLACK.stroke_width(1)))
        .map_err(backend_err)?;

    draw_slanted_x_labels(root, &chart, heatmap, &layout)
}

/// Font transforms only cover quarter turns, so x tick labels are laid out
/// glyph by glyph along a baseline at the configured angle, ending just
/// below their tick.
fn draw_slanted_x_labels<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &HeatmapChart<'_, DB>,
    heatmap: &Heatmap,
    layout: &ChartLayout,
) -> Result<()> {
    let font_px = layout.font_px as f64;
    let glyph_style = TextStyle::from((FontFamily::SansSerif, layout.font_px))
        .pos(Pos::new(HPos::Center, VPos::Center));
    let advance = font_px * 0.60;
    let (sin, cos) = heatmap.x_tick_rotation.to_radians().sin_cos();

    for tick in &heatmap.x_ticks {
        // The root area starts at the backend origin, so backend pixels are root pixels
        let (x, bottom) = chart.backend_coord(&(tick.position, heatmap.y_range.start));

        // Anchor is the top of the label's last glyph
        let anchor_x = x as f64 - font_px * 0.5 * sin;
        let anchor_y = (bottom + 2 * layout.tick_len as i32) as f64 + font_px * 0.5 * cos;
        let glyphs: Vec<char> = tick.label.chars().collect();
        for (k, ch) in glyphs.iter().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let back = (glyphs.len() - k) as f64 - 0.5;
            let gx = (anchor_x - back * advance * cos).round() as i32;
            let gy = (anchor_y + back * advance * sin).round() as i32;
            root.draw(&Text::new(ch.to_string(), (gx, gy), glyph_style.clone()))
                .map_err(backend_err)?;
        }
    }

    Ok(())
}
