use std::collections::{BTreeMap, BTreeSet};

use cluster_data::{ClusterId, DataSet, SampleTable, DEFAULT_CLUSTER_COLUMN};
use indexmap::IndexMap;

use crate::{
    data_types::dof_value::DofValue,
    figure::{AxisLimits, Figure, GridGeometry, Panel, Series},
    palette::{self, Color, Marker, DEFAULT_COLORS, DEFAULT_MARKERS},
    render::DEFAULT_PIXELS_PER_UNIT,
    PlotError,
};

/// Parameter names of scans that predate the metadata entry listing them.
pub const DEFAULT_COEFFICIENTS: [&str; 5] = ["l", "r", "sl", "sr", "t"];
const AXIS_PADDING: f64 = 0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Hand the figure back to the caller.
    #[default]
    ReturnFigure,
    /// Show the figure in a window and block until it is closed.
    RenderInPlace,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlotOptions {
    /// Clusters to plot, all labels in order of appearance if `None` or empty.
    pub clusters: Option<Vec<ClusterId>>,
    /// Default palettes if `None` or empty.
    pub colors: Option<Vec<Color>>,
    pub markers: Option<Vec<Marker>>,
    pub max_subplots: usize,
    pub max_columns: usize,
    /// Size of a single subplot in inches.
    pub subplot_size: (f32, f32),
    pub cluster_column: String,
    /// Parameter columns to slice along, taken from the metadata if `None`.
    pub parameters: Option<Vec<String>>,
    pub render_mode: RenderMode,
    /// Only used for [`RenderMode::RenderInPlace`].
    pub pixels_per_unit: u32,
}
impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            clusters: None,
            colors: None,
            markers: None,
            max_subplots: 16,
            max_columns: 4,
            subplot_size: (4., 4.),
            cluster_column: DEFAULT_CLUSTER_COLUMN.to_string(),
            parameters: None,
            render_mode: RenderMode::default(),
            pixels_per_unit: DEFAULT_PIXELS_PER_UNIT,
        }
    }
}

/// Parameter columns which are not plotted.
#[derive(Debug, PartialEq)]
pub(crate) struct Dofs {
    pub(crate) all: Vec<String>,
    /// Dofs with at least two distinct values, in the order of `all`.
    pub(crate) relevant: Vec<String>,
}

/// Arranges `data` as a grid of scatter plots, one per combination of the
/// parameters which are not plotted.
pub(crate) fn layout_figure(
    data: &DataSet,
    axis_columns: &[&str],
    options: &PlotOptions,
) -> Result<Figure, PlotError> {
    if !(2..=3).contains(&axis_columns.len()) {
        return Err(PlotError::InvalidArgument(format!(
            "expected 2 or 3 axis columns, got {}",
            axis_columns.len()
        )));
    }
    let PlotOptions {
        clusters,
        colors,
        markers,
        max_subplots,
        max_columns,
        subplot_size,
        cluster_column,
        parameters,
        render_mode: _,
        pixels_per_unit: _,
    } = options;
    if *max_subplots == 0 {
        return Err(PlotError::InvalidArgument("max_subplots must be positive".into()));
    }
    if *max_columns == 0 {
        return Err(PlotError::InvalidArgument("max_columns must be positive".into()));
    }
    let colors = non_empty(colors).unwrap_or(&DEFAULT_COLORS);
    let markers = non_empty(markers).unwrap_or(&DEFAULT_MARKERS);
    let table = data.table();
    if table.is_empty() {
        return Err(PlotError::InvalidArgument("cannot plot an empty table".into()));
    }
    let axis_values = axis_columns
        .iter()
        .map(|axis| table.values_f64(axis))
        .collect::<Result<Vec<_>, _>>()?;
    let labels = table.cluster_ids(cluster_column)?;

    let candidates = match parameters {
        Some(parameters) => parameters.clone(),
        None => parameter_candidates(data),
    };
    let dofs = find_dofs(table, &candidates, axis_columns)?;
    tracing::debug!("Dofs: {:?}, relevant: {:?}", dofs.all, dofs.relevant);

    let relevant_values = dofs
        .relevant
        .iter()
        .map(|dof| finite_column(table, dof))
        .collect::<Result<Vec<_>, _>>()?;
    let all_values = dofs
        .all
        .iter()
        .map(|dof| finite_column(table, dof))
        .collect::<Result<Vec<_>, _>>()?;
    let combinations = combinations(&all_values, table.n_rows());
    let combination_count = combinations.len();
    let combinations = subsample(combinations, &dofs, *max_subplots);
    tracing::debug!(
        "Plotting {} of {} parameter combinations.",
        combinations.len(),
        combination_count
    );

    // Combinations differ in relevant dofs only, so their projections are
    // unique slice keys.
    let relevant_positions = dofs
        .relevant
        .iter()
        .filter_map(|dof| dofs.all.iter().position(|d| d == dof))
        .collect::<Vec<_>>();
    let slices = combinations
        .iter()
        .map(|combination| {
            relevant_positions
                .iter()
                .map(|&i| combination[i])
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let slice_of = slices
        .iter()
        .enumerate()
        .map(|(i, key)| (key.clone(), i))
        .collect::<BTreeMap<_, _>>();

    let grid = GridGeometry::new(slices.len(), *max_columns);
    tracing::debug!("Grid of {} x {} subplots.", grid.rows, grid.columns);

    let limits = axis_columns
        .iter()
        .zip(&axis_values)
        .map(|(axis, values)| {
            AxisLimits::padded(values.iter().copied(), AXIS_PADDING).ok_or_else(|| {
                PlotError::InvalidArgument(format!("axis column '{axis}' has no finite value"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let clusters = match non_empty(clusters) {
        Some(clusters) => clusters.to_vec(),
        None => cluster_data::unique_in_order(&labels),
    };
    let series_of = clusters
        .iter()
        .copied()
        .collect::<indexmap::IndexSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(i, cluster)| (cluster, i))
        .collect::<IndexMap<_, _>>();
    let empty_series = series_of
        .keys()
        .map(|&cluster| Series {
            cluster,
            color: palette::pick(colors, cluster),
            marker: palette::pick(markers, cluster),
            coordinates: vec![Vec::new(); axis_columns.len()],
        })
        .collect::<Vec<_>>();

    let axes = axis_columns.iter().map(|a| a.to_string()).collect::<Vec<_>>();
    let mut panels = (0..grid.cells())
        .map(|i| {
            let (row, column) = grid.position(i);
            let visible = i < slices.len();
            let (title, series) = if visible {
                (slice_title(&dofs.relevant, &slices[i]), empty_series.clone())
            } else {
                (String::new(), Vec::new())
            };
            let mut panel = Panel {
                row,
                column,
                visible,
                title,
                limits: limits.clone(),
                axis_titles: vec![None; axes.len()],
                x_tick_labels: false,
                y_tick_labels: false,
                series,
            };
            place_labels(&mut panel, &axes, grid, slices.len());
            panel
        })
        .collect::<Vec<_>>();

    let mut key = Vec::with_capacity(relevant_values.len());
    for (row, label) in labels.iter().enumerate() {
        key.clear();
        key.extend(relevant_values.iter().map(|values| values[row]));
        let (Some(&slice), Some(&series)) = (slice_of.get(&key), series_of.get(label)) else {
            continue;
        };
        panels[slice].series[series].push(axis_values.iter().map(|values| values[row]));
    }

    Ok(Figure {
        axes,
        grid,
        subplot_size: *subplot_size,
        panels,
    })
}

/// An empty list means the same as no list.
fn non_empty<T>(list: &Option<Vec<T>>) -> Option<&[T]> {
    list.as_deref().filter(|l| !l.is_empty())
}

fn parameter_candidates(data: &DataSet) -> Vec<String> {
    let parameters = data.par_cols();
    if !parameters.is_empty() {
        return parameters;
    }
    tracing::debug!("No parameter columns in metadata, trying {DEFAULT_COEFFICIENTS:?}.");
    DEFAULT_COEFFICIENTS
        .iter()
        .filter(|c| data.table().contains(c))
        .map(|c| c.to_string())
        .collect()
}

pub(crate) fn find_dofs(
    table: &SampleTable,
    candidates: &[String],
    axis_columns: &[&str],
) -> Result<Dofs, PlotError> {
    let mut all = Vec::new();
    let mut relevant = Vec::new();
    for candidate in candidates {
        if axis_columns.contains(&candidate.as_str()) || all.contains(candidate) {
            continue;
        }
        let distinct = finite_column(table, candidate)?
            .into_iter()
            .collect::<BTreeSet<_>>();
        all.push(candidate.clone());
        if distinct.len() > 1 {
            relevant.push(candidate.clone());
        }
    }
    Ok(Dofs { all, relevant })
}

fn finite_column(table: &SampleTable, label: &str) -> Result<Vec<DofValue>, PlotError> {
    table
        .values_f64(label)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            DofValue::new_checked(value).ok_or_else(|| {
                PlotError::InvalidArgument(format!(
                    "parameter column '{label}' has non-finite value {value} in row {row}"
                ))
            })
        })
        .collect()
}

/// Distinct rows of `columns`, sorted lexicographically.
pub(crate) fn combinations(columns: &[Vec<DofValue>], row_count: usize) -> Vec<Vec<DofValue>> {
    (0..row_count)
        .map(|row| columns.iter().map(|c| c[row]).collect::<Vec<_>>())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Thins out the values of every relevant dof until the number of
/// combinations roughly fits `max_subplots`. The result may fall short of
/// the budget but never exceeds `steps^d`.
pub(crate) fn subsample(
    mut combinations: Vec<Vec<DofValue>>,
    dofs: &Dofs,
    max_subplots: usize,
) -> Vec<Vec<DofValue>> {
    if combinations.len() <= max_subplots || dofs.relevant.is_empty() {
        return combinations;
    }
    let steps = steps_per_dof(max_subplots, dofs.relevant.len());
    tracing::debug!(
        "{} combinations exceed {max_subplots} subplots, keeping {steps} values per dof.",
        combinations.len()
    );
    for dof in &dofs.relevant {
        let Some(position) = dofs.all.iter().position(|d| d == dof) else {
            continue;
        };
        let values = combinations
            .iter()
            .map(|c| c[position])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let keep = evenly_spaced(values.len(), steps)
            .into_iter()
            .map(|i| values[i])
            .collect::<BTreeSet<_>>();
        combinations.retain(|c| keep.contains(&c[position]));
    }
    combinations
}

pub(crate) fn steps_per_dof(max_subplots: usize, relevant: usize) -> usize {
    let mut steps = (max_subplots as f64).powf(1. / relevant as f64).floor() as usize;
    // powf may land just below an exact root
    while (steps + 1).checked_pow(relevant as u32).map_or(false, |p| p <= max_subplots) {
        steps += 1;
    }
    steps
}

/// `steps` indices spread evenly over `0..len`, rounded to the nearest index.
pub(crate) fn evenly_spaced(len: usize, steps: usize) -> BTreeSet<usize> {
    match (len, steps) {
        (0, _) | (_, 0) => BTreeSet::new(),
        (_, 1) => BTreeSet::from([0]),
        _ => (0..steps)
            .map(|i| (i as f64 * (len - 1) as f64 / (steps - 1) as f64).round() as usize)
            .collect(),
    }
}

fn slice_title(relevant: &[String], values: &[DofValue]) -> String {
    relevant
        .iter()
        .zip(values)
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Titles and tick labels only on the outer edge of a 2D grid. The last row
/// may be incomplete, then the cell above is the lowest one of its column.
fn place_labels(panel: &mut Panel, axes: &[String], grid: GridGeometry, slice_count: usize) {
    if !panel.visible {
        return;
    }
    if axes.len() == 3 {
        panel.axis_titles = axes.iter().cloned().map(Some).collect();
        panel.x_tick_labels = true;
        panel.y_tick_labels = true;
        return;
    }
    let filled_in_last_row = slice_count - (grid.rows - 1) * grid.columns;
    let lowest = panel.row + 1 == grid.rows
        || (panel.row + 2 == grid.rows && panel.column >= filled_in_last_row);
    if lowest {
        panel.axis_titles[0] = Some(axes[0].clone());
        panel.x_tick_labels = true;
    }
    if panel.column == 0 {
        panel.axis_titles[1] = Some(axes[1].clone());
        panel.y_tick_labels = true;
    }
}

#[cfg(test)]
fn values(values: &[f64]) -> Vec<DofValue> {
    values.iter().copied().map(DofValue::new).collect()
}

#[test]
fn evenly_spaced_rounds_to_nearest() {
    assert_eq!(evenly_spaced(5, 2), BTreeSet::from([0, 4]));
    assert_eq!(evenly_spaced(5, 3), BTreeSet::from([0, 2, 4]));
    assert_eq!(evenly_spaced(4, 3), BTreeSet::from([0, 2, 3]));
    assert_eq!(evenly_spaced(2, 4), BTreeSet::from([0, 1]));
    assert_eq!(evenly_spaced(7, 1), BTreeSet::from([0]));
    assert!(evenly_spaced(0, 3).is_empty());
}
#[test]
fn steps_are_integer_roots() {
    assert_eq!(steps_per_dof(16, 1), 16);
    assert_eq!(steps_per_dof(16, 2), 4);
    assert_eq!(steps_per_dof(27, 3), 3);
    assert_eq!(steps_per_dof(10, 2), 3);
    assert_eq!(steps_per_dof(3, 2), 1);
}
#[test]
fn combinations_are_sorted_and_distinct() {
    let a = values(&[1., 0., 1., 0.]);
    let b = values(&[2., 2., 2., 3.]);
    let combos = combinations(&[a, b], 4);
    assert_eq!(combos, vec![values(&[0., 2.]), values(&[0., 3.]), values(&[1., 2.])]);
}
#[test]
fn subsampling_keeps_constant_dofs() {
    let dofs = Dofs {
        all: vec!["c".into(), "a".into()],
        relevant: vec!["a".into()],
    };
    let combos = (0..10)
        .map(|i| values(&[7., i as f64]))
        .collect::<Vec<_>>();
    let kept = subsample(combos, &dofs, 4);
    assert_eq!(
        kept,
        vec![values(&[7., 0.]), values(&[7., 3.]), values(&[7., 6.]), values(&[7., 9.])]
    );
}
#[test]
fn dofs_skip_axes_and_flag_constant_columns() {
    let mut table = SampleTable::example_grid(&[("l", &[0., 1.]), ("r", &[2., 3.])]);
    table.insert_column("t", vec![5.; 4].into()).unwrap();
    let candidates = ["l", "r", "t"].map(String::from);
    let dofs = find_dofs(&table, &candidates, &["l", "bin0"]).unwrap();
    assert_eq!(
        dofs,
        Dofs {
            all: vec!["r".into(), "t".into()],
            relevant: vec!["r".into()],
        }
    );
    assert!(matches!(
        find_dofs(&table, &["missing".to_string()], &["l", "r"]),
        Err(PlotError::Data(_))
    ));
}
#[test]
fn non_finite_dofs_are_rejected() {
    let mut table = SampleTable::with_rows(2);
    table.insert_column("l", vec![0., f64::NAN].into()).unwrap();
    let err = find_dofs(&table, &["l".to_string()], &["x", "y"]).unwrap_err();
    assert!(matches!(err, PlotError::InvalidArgument(_)));
}
#[test]
fn titles_use_two_decimals() {
    let title = slice_title(&["l".into(), "sr".into()], &values(&[0.5, 1.0 / 3.0]));
    assert_eq!(title, "l=0.50 sr=0.33");
}
