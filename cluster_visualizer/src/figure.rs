//! Renderer independent description of a sliced scatter plot.
//!
//! A [`Figure`] is produced by [`crate::plot_clusters`] and consumed by the
//! [`crate::render`] module and the viewer. It can be inspected or serialized
//! without drawing anything.

use cluster_data::ClusterId;

use crate::palette::{Color, Marker};

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Figure {
    /// Axis columns, two or three of them.
    pub axes: Vec<String>,
    pub grid: GridGeometry,
    /// Size of a single cell in inches.
    pub subplot_size: (f32, f32),
    /// One panel per grid cell in row-major order; cells beyond the number of
    /// slices are hidden.
    pub panels: Vec<Panel>,
}
impl Figure {
    pub fn is_3d(&self) -> bool {
        self.axes.len() == 3
    }
    pub fn visible_panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter().filter(|p| p.visible)
    }
    pub fn slice_count(&self) -> usize {
        self.visible_panels().count()
    }
    /// Pixel size of the whole figure.
    pub fn size(&self, pixels_per_unit: u32) -> (u32, u32) {
        let (width, height) = self.subplot_size;
        let scale = |cells: usize, inches: f32| {
            ((cells as f32 * inches * pixels_per_unit as f32).round() as u32).max(1)
        };
        (
            scale(self.grid.columns, width),
            scale(self.grid.rows, height),
        )
    }
    pub fn panel(&self, row: usize, column: usize) -> Option<&Panel> {
        self.panels
            .iter()
            .find(|p| p.row == row && p.column == column)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct GridGeometry {
    pub rows: usize,
    pub columns: usize,
}
impl GridGeometry {
    /// Smallest grid with at most `max_columns` columns holding `cells` cells.
    pub fn new(cells: usize, max_columns: usize) -> Self {
        debug_assert!(max_columns > 0);
        let columns = cells.clamp(1, max_columns.max(1));
        let rows = ((cells + columns - 1) / columns).max(1);
        Self { rows, columns }
    }
    pub fn cells(&self) -> usize {
        self.rows * self.columns
    }
    /// Row and column of the `index`-th cell.
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.columns, index % self.columns)
    }
}

/// Closed range of an axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AxisLimits {
    pub min: f64,
    pub max: f64,
}
impl AxisLimits {
    /// Range of the finite `values`, widened by `stretch` times its width on
    /// both ends. `None` if there is no finite value.
    pub fn padded(values: impl IntoIterator<Item = f64>, stretch: f64) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            })?;
        let d = max - min;
        Some(Self {
            min: min - stretch * d,
            max: max + stretch * d,
        })
    }
    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Panel {
    pub row: usize,
    pub column: usize,
    pub visible: bool,
    /// `name=value` of every parameter that varies between panels.
    pub title: String,
    /// One entry per axis.
    pub limits: Vec<AxisLimits>,
    /// One entry per axis, `None` if the axis title is not shown.
    pub axis_titles: Vec<Option<String>>,
    pub x_tick_labels: bool,
    pub y_tick_labels: bool,
    /// One series per plotted cluster, possibly without points.
    pub series: Vec<Series>,
}
impl Panel {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(Series::len).sum()
    }
    pub fn series_of(&self, cluster: ClusterId) -> Option<&Series> {
        self.series.iter().find(|s| s.cluster == cluster)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Series {
    pub cluster: ClusterId,
    pub color: Color,
    pub marker: Marker,
    /// Column-major coordinates, one vector per axis.
    pub coordinates: Vec<Vec<f64>>,
}
impl Series {
    pub fn len(&self) -> usize {
        self.coordinates.first().map(Vec::len).unwrap_or(0)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub(crate) fn push(&mut self, point: impl IntoIterator<Item = f64>) {
        for (axis, value) in self.coordinates.iter_mut().zip(point) {
            axis.push(value);
        }
    }
    pub fn points_2d(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let x = self.axis(0);
        let y = self.axis(1);
        x.iter().copied().zip(y.iter().copied())
    }
    pub fn points_3d(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        let (x, y, z) = (self.axis(0), self.axis(1), self.axis(2));
        x.iter()
            .zip(y)
            .zip(z)
            .map(|((&x, &y), &z)| (x, y, z))
    }
    fn axis(&self, axis: usize) -> &[f64] {
        self.coordinates.get(axis).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[test]
fn grid_geometry() {
    assert_eq!(GridGeometry::new(1, 4), GridGeometry { rows: 1, columns: 1 });
    assert_eq!(GridGeometry::new(3, 4), GridGeometry { rows: 1, columns: 3 });
    assert_eq!(GridGeometry::new(6, 4), GridGeometry { rows: 2, columns: 4 });
    assert_eq!(GridGeometry::new(16, 4), GridGeometry { rows: 4, columns: 4 });
    assert_eq!(GridGeometry::new(5, 1), GridGeometry { rows: 5, columns: 1 });
    assert_eq!(GridGeometry::new(6, 4).position(5), (1, 1));
}
#[test]
fn limits_are_padded_by_a_tenth() {
    let limits = AxisLimits::padded([0., 10., f64::NAN, 5.], 0.1).unwrap();
    assert_eq!(limits, AxisLimits { min: -1., max: 11. });
    let flat = AxisLimits::padded([2., 2.], 0.1).unwrap();
    assert_eq!(flat.width(), 0.);
    assert!(AxisLimits::padded([f64::NAN], 0.1).is_none());
}
