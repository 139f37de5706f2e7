//! # plexus-report
//!
//! Training-curve figures for the plexus pipeline. Figure content is a
//! backend-independent [`figures::FigureSpec`]; rendering and persistence
//! are separate steps so headless environments can exercise the full
//! drawing path in memory.

pub mod figures;

pub use figures::{
    accuracy_figure, draw_figure, loss_comparison_figure, loss_figure, render_svg, save_figure,
    FigureSpec, LegendCorner, SeriesSpec,
};
