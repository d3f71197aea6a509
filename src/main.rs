//! cmplot - render a confusion matrix file as a heatmap.
//!
//! Saves the figure as SVG or a bitmap and/or shows it in the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use cmplot::logging::{RenderLog, RenderRecord};
use cmplot::{
    render_matrix, Colormap, ConfusionMatrix, Figure, Headless, RenderOptions, TerminalViewer,
    Viewer,
};
use std::path::PathBuf;

/// Render a confusion matrix as an annotated heatmap
#[derive(Parser, Debug)]
#[command(name = "cmplot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file with {"matrix": [[...]], "labels": [...]}
    input: PathBuf,

    /// Save the figure to this path (.svg, .png, .jpg or .bmp)
    #[arg(short, long)]
    save: Option<PathBuf>,

    /// Colormap: blues, greens, oranges, reds, greys, purples, viridis
    #[arg(short, long, default_value = "blues")]
    cmap: Colormap,

    /// Normalize each row to sum to 1 before plotting
    #[arg(long)]
    normalize: bool,

    /// Resolution of the saved image
    #[arg(long, default_value = "300")]
    dpi: u32,

    /// Decimal places in cell annotations
    #[arg(long, default_value = "2")]
    precision: usize,

    /// Do not show the figure in the terminal
    #[arg(long)]
    no_show: bool,

    /// Print the matrix as a text table
    #[arg(long)]
    print: bool,

    /// Append a JSON Lines record of this render to a log file
    #[arg(short, long)]
    log: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut matrix = ConfusionMatrix::from_json_file(&args.input)
        .with_context(|| format!("Failed to load matrix from {}", args.input.display()))?;
    if args.normalize {
        matrix = matrix.normalized();
    }

    let options = RenderOptions {
        dpi: args.dpi,
        precision: args.precision,
        ..Default::default()
    };

    if args.print {
        print!("{}", matrix.to_table());
    }

    let mut viewer: Box<dyn Viewer> = if args.no_show {
        Box::new(Headless)
    } else {
        Box::new(TerminalViewer)
    };

    let mut figure = Figure::new();
    render_matrix(
        &mut figure,
        &matrix,
        args.save.as_deref(),
        args.cmap,
        &options,
        viewer.as_mut(),
    )
    .context("Failed to render confusion matrix")?;

    if let Some(ref path) = args.save {
        let n = matrix.n_classes();
        eprintln!("Saved {}x{} matrix to: {}", n, n, path.display());
    }

    if let Some(ref log_path) = args.log {
        let mut log = RenderLog::open(log_path)?;
        log.log(&RenderRecord {
            source: Some(args.input.clone()),
            output: args.save.clone(),
            normalized: args.normalize,
            ..RenderRecord::new(&matrix, args.cmap)
        })?;
        log.flush()?;
        eprintln!("Render logged to: {}", log_path.display());
    }

    Ok(())
}
