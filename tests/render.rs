use cmplot::{
    plot_confusion_matrix, render_matrix, Colormap, ConfusionMatrix, Figure, PlotError,
    RenderOptions, Result, TextColor, Viewer,
};
use std::path::{Path, PathBuf};

/// Records what the figure looked like when it was shown
#[derive(Default)]
struct RecordingViewer {
    shown: Vec<Vec<String>>,
    file_existed: Vec<bool>,
    watch: Option<PathBuf>,
}

impl Viewer for RecordingViewer {
    fn show(&mut self, figure: &Figure) -> Result<()> {
        let texts = figure
            .heatmap()
            .map(|h| h.cells.iter().map(|c| c.text.clone()).collect())
            .unwrap_or_default();
        self.shown.push(texts);
        if let Some(ref path) = self.watch {
            self.file_existed.push(path.exists());
        }
        Ok(())
    }
}

fn grid() -> Vec<Vec<f64>> {
    vec![vec![10.0, 2.0], vec![3.0, 8.0]]
}

#[test]
fn renders_square_grid_with_matching_labels() {
    let mut figure = Figure::new();
    let mut viewer = RecordingViewer::default();

    plot_confusion_matrix(
        &mut figure,
        &grid(),
        &["cat", "dog"],
        None,
        Colormap::Blues,
        &mut viewer,
    )
    .unwrap();

    assert_eq!(viewer.shown, vec![vec!["10.00", "2.00", "3.00", "8.00"]]);
}

#[test]
fn text_color_follows_half_maximum() {
    let mut figure = Figure::new();
    let mut viewer = RecordingViewer::default();
    plot_confusion_matrix(&mut figure, &grid(), &["a", "b"], None, Colormap::Blues, &mut viewer)
        .unwrap();

    let heatmap = figure.heatmap().unwrap();
    let colors: Vec<TextColor> = heatmap.cells.iter().map(|c| c.text_color).collect();
    assert_eq!(
        colors,
        vec![TextColor::White, TextColor::Black, TextColor::Black, TextColor::White]
    );
}

#[test]
fn underscores_become_spaces_on_axes() {
    let mut figure = Figure::new();
    let mut viewer = RecordingViewer::default();
    plot_confusion_matrix(
        &mut figure,
        &grid(),
        &["true_positive", "false_negative"],
        None,
        Colormap::Blues,
        &mut viewer,
    )
    .unwrap();

    let heatmap = figure.heatmap().unwrap();
    let x: Vec<&str> = heatmap.x_ticks.iter().map(|t| t.label.as_str()).collect();
    let y: Vec<&str> = heatmap.y_ticks.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(x, vec!["true positive", "false negative"]);
    assert_eq!(x, y);
}

#[test]
fn saves_before_showing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("confusion.svg");
    let mut figure = Figure::new();
    let mut viewer = RecordingViewer {
        watch: Some(path.clone()),
        ..Default::default()
    };

    plot_confusion_matrix(
        &mut figure,
        &grid(),
        &["a", "b"],
        Some(&path),
        Colormap::Greens,
        &mut viewer,
    )
    .unwrap();

    assert!(path.exists());
    assert_eq!(viewer.file_existed, vec![true]);
    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.contains("10.00"));
}

#[test]
fn saves_png_before_showing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("confusion.png");
    let mut figure = Figure::new();
    let mut viewer = RecordingViewer {
        watch: Some(path.clone()),
        ..Default::default()
    };

    plot_confusion_matrix(
        &mut figure,
        &grid(),
        &["a", "b"],
        Some(&path),
        Colormap::Blues,
        &mut viewer,
    )
    .unwrap();

    assert_eq!(viewer.file_existed, vec![true]);
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    assert_eq!((width, height), (1920, 1440));
}

#[test]
fn rejects_non_square_grid() {
    let mut figure = Figure::new();
    let mut viewer = RecordingViewer::default();

    let err = plot_confusion_matrix(
        &mut figure,
        &[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
        &["a", "b"],
        None,
        Colormap::Blues,
        &mut viewer,
    )
    .unwrap_err();

    assert!(matches!(err, PlotError::NotSquare { .. }));
    assert!(viewer.shown.is_empty());
}

#[test]
fn rejects_label_count_mismatch() {
    let mut figure = Figure::new();
    let mut viewer = RecordingViewer::default();

    let err = plot_confusion_matrix(
        &mut figure,
        &grid(),
        &["a", "b", "c"],
        None,
        Colormap::Blues,
        &mut viewer,
    )
    .unwrap_err();

    assert!(matches!(err, PlotError::LabelMismatch { labels: 3, classes: 2 }));
}

#[test]
fn second_call_keeps_nothing_from_the_first() {
    let mut figure = Figure::new();
    let mut viewer = RecordingViewer::default();

    plot_confusion_matrix(&mut figure, &grid(), &["a", "b"], None, Colormap::Blues, &mut viewer)
        .unwrap();
    plot_confusion_matrix(&mut figure, &[vec![0.5]], &["only"], None, Colormap::Blues, &mut viewer)
        .unwrap();

    assert_eq!(viewer.shown[1], vec!["0.50"]);
    let heatmap = figure.heatmap().unwrap();
    assert_eq!(heatmap.cells.len(), 1);
    assert_eq!(heatmap.x_ticks.len(), 1);
}

#[test]
fn second_save_overwrites_previous_annotations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cm.svg");
    let mut figure = Figure::new();
    let mut viewer = RecordingViewer::default();

    let save = Some(path.as_path());
    plot_confusion_matrix(&mut figure, &grid(), &["a", "b"], save, Colormap::Blues, &mut viewer)
        .unwrap();
    plot_confusion_matrix(&mut figure, &[vec![0.5]], &["only"], save, Colormap::Blues, &mut viewer)
        .unwrap();

    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.contains("0.50"));
    assert!(!svg.contains("10.00"));
}

#[test]
fn render_options_and_normalization() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("norm.svg");
    let matrix = ConfusionMatrix::new(vec![vec![3.0, 1.0], vec![1.0, 1.0]], vec![])
        .unwrap()
        .normalized();
    let options = RenderOptions {
        dpi: 100,
        precision: 3,
        ..Default::default()
    };
    let mut figure = Figure::new();
    let mut viewer = RecordingViewer::default();

    render_matrix(
        &mut figure,
        &matrix,
        Some(Path::new(&path)),
        Colormap::Viridis,
        &options,
        &mut viewer,
    )
    .unwrap();

    assert_eq!(viewer.shown[0], vec!["0.750", "0.250", "0.500", "0.500"]);
    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.contains("640"));
}
