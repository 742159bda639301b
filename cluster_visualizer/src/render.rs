use std::{error::Error, ops::Range, path::Path};

use cluster_data::{DataError, OverwritePolicy};
use plotters::{coord::Shift, prelude::*};

use crate::{
    figure::{AxisLimits, Figure, Panel},
    histogram::Histogram,
    palette::Color as PaletteColor,
    PlotError,
};

/// Pixels per inch of subplot size.
pub const DEFAULT_PIXELS_PER_UNIT: u32 = 100;
const MARKER_SIZE: i32 = 4;
const FONT: &str = "sans-serif";

/// Something that can be drawn on any plotters backend.
pub trait Plot {
    /// Pixel size of the drawing.
    fn size(&self, pixels_per_unit: u32) -> (u32, u32);
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), Box<dyn Error>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static;
}
impl Plot for Figure {
    fn size(&self, pixels_per_unit: u32) -> (u32, u32) {
        Figure::size(self, pixels_per_unit)
    }
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), Box<dyn Error>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        draw_figure(root, self)
    }
}
impl Plot for Histogram {
    fn size(&self, pixels_per_unit: u32) -> (u32, u32) {
        self.pixel_size(pixels_per_unit)
    }
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), Box<dyn Error>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        draw_histogram(root, self)
    }
}

/// Draws `plot` into an in-memory RGB image.
pub fn render_rgb(plot: &impl Plot, pixels_per_unit: u32) -> Result<image::RgbImage, PlotError> {
    let (width, height) = plot.size(pixels_per_unit);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        plot.draw(&root).map_err(render_error)?;
        root.present().map_err(render_error)?;
    }
    image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| PlotError::Render("image buffer has the wrong size".into()))
}

/// Writes `plot` as png or svg, chosen by the extension of `path`.
pub fn save(
    plot: &impl Plot,
    path: impl AsRef<Path>,
    pixels_per_unit: u32,
    overwrite: OverwritePolicy,
) -> Result<(), PlotError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if extension != "png" && extension != "svg" {
        return Err(PlotError::InvalidArgument(format!(
            "cannot save plot as '{}', use a .png or .svg file",
            path.display()
        )));
    }
    tracing::info!("Will write plot to '{}'.", path.display());
    cluster_data::handle_overwrite(&[path], overwrite)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            std::fs::create_dir_all(parent).map_err(|source| DataError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    if extension == "png" {
        render_rgb(plot, pixels_per_unit)?
            .save(path)
            .map_err(render_error)?;
    } else {
        let root = SVGBackend::new(path, plot.size(pixels_per_unit)).into_drawing_area();
        plot.draw(&root).map_err(render_error)?;
        root.present().map_err(render_error)?;
    }
    tracing::debug!("Done");
    Ok(())
}

fn render_error(e: impl std::fmt::Display) -> PlotError {
    PlotError::Render(e.to_string())
}

fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let areas = root.split_evenly((figure.grid.rows, figure.grid.columns));
    for (panel, area) in figure.panels.iter().zip(areas.iter()) {
        if !panel.visible {
            continue;
        }
        if figure.is_3d() {
            draw_panel_3d(area, panel)?;
        } else {
            draw_panel_2d(area, panel)?;
        }
    }
    Ok(())
}

fn draw_panel_2d<DB>(area: &DrawingArea<DB, Shift>, panel: &Panel) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, (FONT, 16))
        .margin(8)
        .x_label_area_size(if panel.x_tick_labels { 40 } else { 12 })
        .y_label_area_size(if panel.y_tick_labels { 50 } else { 12 })
        .build_cartesian_2d(drawing_range(panel.limits[0]), drawing_range(panel.limits[1]))?;

    let x_formatter: fn(&f64) -> String = if panel.x_tick_labels { tick_label } else { no_label };
    let y_formatter: fn(&f64) -> String = if panel.y_tick_labels { tick_label } else { no_label };
    let mut mesh = chart.configure_mesh();
    mesh.x_labels(5)
        .y_labels(5)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter);
    if let Some(title) = axis_title(panel, 0) {
        mesh.x_desc(title);
    }
    if let Some(title) = axis_title(panel, 1) {
        mesh.y_desc(title);
    }
    mesh.draw()?;

    for series in &panel.series {
        let color = rgb(series.color);
        let outline = series.marker.outline(MARKER_SIZE);
        let legend_outline = outline.clone();
        chart
            .draw_series(series.points_2d().map(|point| {
                EmptyElement::at(point) + Polygon::new(outline.clone(), color.filled())
            }))?
            .label(series.cluster.to_string())
            .legend(move |point| {
                EmptyElement::at(point) + Polygon::new(legend_outline.clone(), color.filled())
            });
    }
    if !panel.series.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }
    Ok(())
}

// Filled bars without outline, no gaps between bins.
fn draw_histogram<DB>(root: &DrawingArea<DB, Shift>, histogram: &Histogram) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (first, last) = match (histogram.edges.first(), histogram.edges.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Ok(()),
    };
    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            drawing_range(AxisLimits { min: first, max: last }),
            drawing_range(histogram.value_limits()),
        )?;
    chart
        .configure_mesh()
        .x_desc("bin")
        .y_desc(if histogram.normalized {
            "normalized contents"
        } else {
            "contents"
        })
        .x_label_formatter(&tick_label)
        .y_label_formatter(&tick_label)
        .draw()?;
    let style = BLUE.mix(0.6).filled();
    chart.draw_series(
        histogram
            .edges
            .windows(2)
            .zip(&histogram.values)
            .map(|(edge, &value)| Rectangle::new([(edge[0], 0.), (edge[1], value)], style)),
    )?;
    Ok(())
}

// Our z axis points up, which is the second axis for plotters.
fn draw_panel_3d<DB>(area: &DrawingArea<DB, Shift>, panel: &Panel) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x, y, z) = (
        drawing_range(panel.limits[0]),
        drawing_range(panel.limits[1]),
        drawing_range(panel.limits[2]),
    );
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, (FONT, 16))
        .margin(8)
        .build_cartesian_3d(x.clone(), z.clone(), y.clone())?;
    chart.with_projection(|mut projection| {
        projection.yaw = 0.6;
        projection.pitch = 0.3;
        projection.scale = 0.8;
        projection.into_matrix()
    });
    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .draw()?;

    let titles = [
        (axis_title(panel, 0), (x.end, z.start, y.start)),
        (axis_title(panel, 1), (x.start, z.start, y.end)),
        (axis_title(panel, 2), (x.start, z.end, y.start)),
    ];
    for (title, position) in titles {
        if let Some(title) = title {
            chart.draw_series(std::iter::once(Text::new(title, position, (FONT, 14))))?;
        }
    }

    for series in &panel.series {
        let color = rgb(series.color);
        let outline = series.marker.outline(MARKER_SIZE);
        let legend_outline = outline.clone();
        chart
            .draw_series(series.points_3d().map(|(x, y, z)| {
                EmptyElement::at((x, z, y)) + Polygon::new(outline.clone(), color.filled())
            }))?
            .label(series.cluster.to_string())
            .legend(move |point| {
                EmptyElement::at(point) + Polygon::new(legend_outline.clone(), color.filled())
            });
    }
    if !panel.series.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }
    Ok(())
}

fn axis_title(panel: &Panel, axis: usize) -> Option<String> {
    panel.axis_titles.get(axis).cloned().flatten()
}

/// Flat ranges are widened so every point lands inside the plot.
fn drawing_range(limits: AxisLimits) -> Range<f64> {
    if limits.max > limits.min {
        limits.min..limits.max
    } else {
        limits.min - 0.5..limits.max + 0.5
    }
}

fn tick_label(value: &f64) -> String {
    format!("{value:.2}")
}
fn no_label(_: &f64) -> String {
    String::new()
}

fn rgb(color: PaletteColor) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

#[cfg(test)]
use crate::figure::GridGeometry;

#[cfg(test)]
fn single_panel_figure() -> Figure {
    use crate::palette::{Marker, DEFAULT_COLORS};
    Figure {
        axes: vec!["x".into(), "y".into()],
        grid: GridGeometry { rows: 1, columns: 1 },
        subplot_size: (2., 1.5),
        panels: vec![Panel {
            row: 0,
            column: 0,
            visible: true,
            title: String::new(),
            limits: vec![AxisLimits { min: 0., max: 1. }; 2],
            axis_titles: vec![Some("x".into()), Some("y".into())],
            x_tick_labels: true,
            y_tick_labels: true,
            series: vec![crate::figure::Series {
                cluster: cluster_data::ClusterId::new(1),
                color: DEFAULT_COLORS[0],
                marker: Marker::Circle,
                coordinates: vec![vec![0.2, 0.8], vec![0.5, 0.5]],
            }],
        }],
    }
}

#[test]
fn flat_ranges_are_widened() {
    assert_eq!(drawing_range(AxisLimits { min: 1., max: 1. }), 0.5..1.5);
    assert_eq!(drawing_range(AxisLimits { min: 0., max: 2. }), 0.0..2.0);
}
#[test]
fn unknown_extensions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = save(
        &single_panel_figure(),
        dir.path().join("figure.pdf"),
        DEFAULT_PIXELS_PER_UNIT,
        OverwritePolicy::Overwrite,
    )
    .unwrap_err();
    assert!(matches!(err, PlotError::InvalidArgument(_)));
    assert!(!dir.path().join("figure.pdf").exists());
}
#[test]
fn existing_output_is_kept_with_raise() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("figure.png");
    std::fs::write(&path, b"old").unwrap();
    let err = save(
        &single_panel_figure(),
        &path,
        DEFAULT_PIXELS_PER_UNIT,
        OverwritePolicy::Raise,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PlotError::Data(cluster_data::DataError::FileExists(_))
    ));
    assert_eq!(std::fs::read(&path).unwrap(), b"old");
}
#[test]
#[ignore = "text rendering needs system fonts"]
fn raster_has_figure_size() {
    let image = render_rgb(&single_panel_figure(), 100).unwrap();
    assert_eq!(image.dimensions(), (200, 150));
    // background
    assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255]);
}
#[test]
fn histograms_share_the_save_checks() {
    let dir = tempfile::tempdir().unwrap();
    let histogram = crate::plot_histogram(&[0., 1., 2.], &[1., 2.], true).unwrap();
    assert_eq!(Plot::size(&histogram, 50), (300, 200));
    let err = save(
        &histogram,
        dir.path().join("histogram.jpg"),
        DEFAULT_PIXELS_PER_UNIT,
        OverwritePolicy::Overwrite,
    )
    .unwrap_err();
    assert!(matches!(err, PlotError::InvalidArgument(_)));
}
