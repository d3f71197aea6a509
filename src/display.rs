//! On-screen display of a figure using ratatui.

use crate::colormap::TextColor;
use crate::error::Result;
use crate::figure::{Figure, Heatmap};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use num_format::{Locale, ToFormattedString};
use plotters::style::RGBColor;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::CrosstermBackend,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io::{self, IsTerminal, Stdout, Write};

/// Something that can present a finished figure
pub trait Viewer {
    fn show(&mut self, figure: &Figure) -> Result<()>;
}

/// Discards the figure; used when only a saved file is wanted
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl Viewer for Headless {
    fn show(&mut self, _figure: &Figure) -> Result<()> {
        Ok(())
    }
}

/// Draws the figure in the terminal and blocks until `q` or `Esc`.
///
/// When stdout is not a terminal (piped, redirected, CI) nothing is drawn.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalViewer;

impl Viewer for TerminalViewer {
    fn show(&mut self, figure: &Figure) -> Result<()> {
        show_if_terminal(figure, &io::stdout())?;
        Ok(())
    }
}

/// Returns whether the figure was shown
fn show_if_terminal<T: IsTerminal>(figure: &Figure, out: &T) -> Result<bool> {
    let Some(heatmap) = figure.heatmap() else {
        return Ok(false);
    };

    if !out.is_terminal() {
        eprintln!("Not a terminal, skipping interactive display");
        return Ok(false);
    }

    let mut session = TerminalSession::enter()?;
    run_viewer(&mut session.terminal, heatmap)?;
    Ok(true)
}

/// Raw mode plus the alternate screen. Both are undone on drop, and on every
/// failed step of `enter`.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            restore_terminal(&mut stdout);
            return Err(e.into());
        }

        match Terminal::new(CrosstermBackend::new(io::stdout())) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                restore_terminal(&mut stdout);
                Err(e.into())
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore_terminal(self.terminal.backend_mut());
        let _ = self.terminal.show_cursor();
    }
}

/// Each step runs even if the previous one failed
fn restore_terminal<W: Write>(out: &mut W) {
    let _ = disable_raw_mode();
    let _ = execute!(out, LeaveAlternateScreen);
}

fn run_viewer<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    heatmap: &Heatmap,
) -> Result<()> {
    loop {
        terminal.draw(|f| {
            let area = f.area();
            render_figure(f, area, heatmap);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press
                && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
            {
                return Ok(());
            }
        }
    }
}

fn to_color(RGBColor(r, g, b): RGBColor) -> Color {
    Color::Rgb(r, g, b)
}

fn text_color(color: TextColor) -> Color {
    match color {
        TextColor::White => Color::White,
        TextColor::Black => Color::Black,
    }
}

/// Truncate a string to max chars, adding ".." if truncated
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 2 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 2).collect();
        format!("{}..", head)
    }
}

/// Sum of all cells, with thousands separators when it is a whole count
pub fn format_total(total: f64) -> String {
    if total.fract() == 0.0 && total >= 0.0 && total < u64::MAX as f64 {
        (total as u64).to_formatted_string(&Locale::en)
    } else {
        format!("{:.2}", total)
    }
}

/// Render the heatmap grid with its labels plus a help bar
pub fn render_figure(f: &mut Frame, area: Rect, heatmap: &Heatmap) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    render_heatmap(f, chunks[0], heatmap);
    render_help_bar(f, chunks[1], heatmap);
}

/// Render the confusion matrix as colored cells, true classes down the side
/// and predicted classes across the top.
pub fn render_heatmap(f: &mut Frame, area: Rect, heatmap: &Heatmap) {
    let block = Block::default()
        .title(format!(" {} / {} ", heatmap.y_title, heatmap.x_title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let n = heatmap.n_classes;
    if n == 0 {
        let text = Paragraph::new(Span::styled(
            "Empty matrix",
            Style::default().fg(Color::DarkGray),
        ));
        f.render_widget(text, inner);
        return;
    }

    let y_label_w = heatmap
        .y_ticks
        .iter()
        .map(|t| t.label.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);
    let cell_text_w = heatmap.cells.iter().map(|c| c.text.len()).max().unwrap_or(0);
    let available = (inner.width as usize).saturating_sub(y_label_w + 1);
    let cell_w = (cell_text_w + 2).max(available / n).min(16).max(1);

    let mut lines = Vec::with_capacity(n * 3 + 1);

    // Predicted class header
    let mut header = vec![Span::raw(" ".repeat(y_label_w + 1))];
    for col in 0..n {
        let label = heatmap.x_ticks.get(col).map(|t| t.label.as_str()).unwrap_or("");
        header.push(Span::styled(
            format!("{:^width$}", truncate_str(label, cell_w - 1), width = cell_w),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    lines.push(Line::from(header));

    // Each matrix row is three terminal lines tall with the value in the middle
    for row in 0..n {
        let label = heatmap.y_ticks.get(row).map(|t| t.label.as_str()).unwrap_or("");
        for sub in 0..3 {
            let prefix = if sub == 1 {
                format!("{:>width$} ", truncate_str(label, y_label_w), width = y_label_w)
            } else {
                " ".repeat(y_label_w + 1)
            };
            let mut spans = vec![Span::styled(
                prefix,
                Style::default().add_modifier(Modifier::BOLD),
            )];

            for col in 0..n {
                let Some(cell) = heatmap.cell(row, col) else {
                    continue;
                };
                let content = if sub == 1 { cell.text.as_str() } else { "" };
                spans.push(Span::styled(
                    format!("{:^width$}", content, width = cell_w),
                    Style::default().bg(to_color(cell.fill)).fg(text_color(cell.text_color)),
                ));
            }
            lines.push(Line::from(spans));
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_help_bar(f: &mut Frame, area: Rect, heatmap: &Heatmap) {
    let text = format!(
        " q: quit | colormap: {} | total: {} ",
        heatmap.colormap,
        format_total(heatmap.total())
    );
    let bar = Paragraph::new(Span::styled(text, Style::default().fg(Color::Gray)))
        .alignment(Alignment::Left);
    f.render_widget(bar, area);
}
