//! Grids of scatter plots of clustered scan data, one subplot per slice
//! through the parameters that are not plotted, and single-point histograms.
pub mod config;
mod data_types;
mod dialog;
mod error;
pub mod figure;
pub mod histogram;
mod layout;
pub mod palette;
pub mod render;
pub mod viewer;

use cluster_data::DataSet;

pub use error::PlotError;
pub use figure::Figure;
pub use histogram::{plot_histogram, Histogram};
pub use layout::{PlotOptions, RenderMode, DEFAULT_COEFFICIENTS};

/// Plots the points of every cluster against `axis_columns` (two or three of
/// them), one subplot per combination of the remaining parameters.
///
/// Returns the figure for [`RenderMode::ReturnFigure`]. For
/// [`RenderMode::RenderInPlace`] the figure is shown in a window instead and
/// `None` is returned once the window is closed.
pub fn plot_clusters(
    data: &DataSet,
    axis_columns: &[&str],
    options: &PlotOptions,
) -> Result<Option<Figure>, PlotError> {
    let figure = layout::layout_figure(data, axis_columns, options)?;
    match options.render_mode {
        RenderMode::ReturnFigure => Ok(Some(figure)),
        RenderMode::RenderInPlace => {
            viewer::show(figure, options.pixels_per_unit)?;
            Ok(None)
        }
    }
}
