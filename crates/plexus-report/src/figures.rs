//! Figure generation using plotters (SVG output)
//!
//! Uses SVG backend to avoid system font dependencies. Figure content is a
//! plain [`FigureSpec`] value built by pure functions; drawing is generic
//! over the plotters backend so tests can render to an in-memory string
//! without a display or disk writes, and saving is a separate side effect.

use plexus_core::{PlexusError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_svg::SVGBackend;
use std::path::{Path, PathBuf};

/// Figure dimensions in pixels.
const FIGURE_SIZE: (u32, u32) = (800, 500);

/// Line colors by series position (train, validation).
const PALETTE: [RGBColor; 2] = [BLUE, RED];

/// Where the series legend is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendCorner {
    UpperLeft,
    UpperRight,
}

/// One named curve.
#[derive(Debug, Clone)]
pub struct SeriesSpec {
    pub label: String,
    pub values: Vec<f32>,
}

/// A complete figure description, independent of any backend.
#[derive(Debug, Clone)]
pub struct FigureSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend: LegendCorner,
    pub series: Vec<SeriesSpec>,
}

/// Single-series loss curve from the pretraining phase.
pub fn loss_figure(train_loss: &[f32]) -> FigureSpec {
    FigureSpec {
        title: "model loss".to_string(),
        x_label: "epoch".to_string(),
        y_label: "loss".to_string(),
        legend: LegendCorner::UpperRight,
        series: vec![SeriesSpec {
            label: "train".to_string(),
            values: train_loss.to_vec(),
        }],
    }
}

/// Train/validation accuracy curves from the retraining phase.
pub fn accuracy_figure(train_acc: &[f32], val_acc: &[f32]) -> FigureSpec {
    FigureSpec {
        title: "model accuracy".to_string(),
        x_label: "epoch".to_string(),
        y_label: "accuracy".to_string(),
        legend: LegendCorner::UpperLeft,
        series: vec![
            SeriesSpec {
                label: "train".to_string(),
                values: train_acc.to_vec(),
            },
            SeriesSpec {
                label: "validation".to_string(),
                values: val_acc.to_vec(),
            },
        ],
    }
}

/// Train/validation loss curves from the retraining phase.
pub fn loss_comparison_figure(train_loss: &[f32], val_loss: &[f32]) -> FigureSpec {
    FigureSpec {
        title: "model loss".to_string(),
        x_label: "epoch".to_string(),
        y_label: "loss".to_string(),
        legend: LegendCorner::UpperRight,
        series: vec![
            SeriesSpec {
                label: "train".to_string(),
                values: train_loss.to_vec(),
            },
            SeriesSpec {
                label: "validation".to_string(),
                values: val_loss.to_vec(),
            },
        ],
    }
}

/// Draws a figure onto any plotters drawing area.
pub fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &FigureSpec,
) -> Result<()> {
    root.fill(&WHITE).map_err(to_report_error)?;

    if spec.series.iter().all(|s| s.values.is_empty()) {
        root.draw(&Text::new(
            "No history to plot",
            (400, 250),
            ("sans-serif", 20).into_font().color(&BLACK),
        ))
        .map_err(to_report_error)?;
        root.present().map_err(to_report_error)?;
        return Ok(());
    }

    let max_len = spec.series.iter().map(|s| s.values.len()).max().unwrap_or(1);
    let x_max = (max_len.saturating_sub(1)).max(1) as f32;

    let (min_v, max_v) = spec
        .series
        .iter()
        .flat_map(|s| s.values.iter())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), v| {
            (min.min(*v), max.max(*v))
        });
    let pad = ((max_v - min_v) * 0.05).max(1e-3);

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f32..x_max, (min_v - pad)..(max_v + pad))
        .map_err(to_report_error)?;

    chart
        .configure_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .draw()
        .map_err(to_report_error)?;

    for (idx, series) in spec.series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(
                series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i as f32, *v)),
                &color,
            ))
            .map_err(to_report_error)?
            .label(series.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    let position = match spec.legend {
        LegendCorner::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendCorner::UpperRight => SeriesLabelPosition::UpperRight,
    };
    chart
        .configure_series_labels()
        .position(position)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(to_report_error)?;

    root.present().map_err(to_report_error)?;
    Ok(())
}

/// Renders a figure to an SVG string, touching neither display nor disk.
pub fn render_svg(spec: &FigureSpec) -> Result<String> {
    let mut out = String::new();
    {
        let root = SVGBackend::with_string(&mut out, FIGURE_SIZE).into_drawing_area();
        draw_figure(&root, spec)?;
    }
    Ok(out)
}

/// Saves a figure to disk and returns the path actually written.
///
/// A `.png` path is converted to `.svg`, keeping the artifact names stable
/// for callers while staying font-independent.
pub fn save_figure(spec: &FigureSpec, path: &Path) -> Result<PathBuf> {
    let svg_path = if path.extension().map(|e| e == "png").unwrap_or(false) {
        path.with_extension("svg")
    } else {
        path.to_path_buf()
    };

    let root = SVGBackend::new(&svg_path, FIGURE_SIZE).into_drawing_area();
    draw_figure(&root, spec)?;
    drop(root);
    log::info!("wrote figure '{}' to {}", spec.title, svg_path.display());
    Ok(svg_path)
}

fn to_report_error(e: impl std::fmt::Display) -> PlexusError {
    PlexusError::report(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_headless() {
        let fig = loss_figure(&[1.2, 0.9, 0.7, 0.6]);
        let svg = render_svg(&fig).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.len() > 200);
    }

    #[test]
    fn test_empty_history_renders_placeholder() {
        let fig = accuracy_figure(&[], &[]);
        let svg = render_svg(&fig).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_figure_builders() {
        let fig = accuracy_figure(&[0.5, 0.6], &[0.4, 0.55]);
        assert_eq!(fig.series.len(), 2);
        assert_eq!(fig.series[0].label, "train");
        assert_eq!(fig.series[1].label, "validation");
        assert_eq!(fig.legend, LegendCorner::UpperLeft);

        let fig = loss_comparison_figure(&[1.0], &[1.1]);
        assert_eq!(fig.legend, LegendCorner::UpperRight);
        assert_eq!(fig.y_label, "loss");
    }

    #[test]
    fn test_png_path_converted_to_svg() {
        let dir = tempfile::tempdir().unwrap();
        let fig = loss_figure(&[1.0, 0.5]);
        let written = save_figure(&fig, &dir.path().join("pretraining_plot.png")).unwrap();
        assert_eq!(written.extension().unwrap(), "svg");
        assert!(written.metadata().unwrap().len() > 0);
    }
}
