use cluster_data::{ClusterId, DataError, DataSet, Metadata, SampleTable};
use cluster_visualizer::{palette::Color, plot_clusters, Figure, PlotError, PlotOptions};

/// Grid over `parameters` with a `y` column counting the rows and cluster
/// labels from `cluster`. Every parameter except `x` is recorded as scanned.
fn scan(parameters: &[(&str, &[f64])], cluster: impl Fn(usize) -> i64) -> DataSet {
    let mut table = SampleTable::example_grid(parameters);
    let n = table.n_rows();
    table
        .insert_column("y", (0..n).map(|i| i as f64).collect::<Vec<_>>().into())
        .unwrap();
    table
        .insert_column("cluster", (0..n).map(&cluster).collect::<Vec<_>>().into())
        .unwrap();
    let mut md = Metadata::new();
    let coeffs = parameters
        .iter()
        .map(|(p, _)| *p)
        .filter(|p| *p != "x")
        .collect::<Vec<_>>();
    md.set(&["scan", "spoints", "coeffs"], coeffs).unwrap();
    DataSet::from_parts(table, md)
}

fn figure(data: &DataSet, axes: &[&str], options: &PlotOptions) -> Figure {
    plot_clusters(data, axes, options).unwrap().unwrap()
}

const FIVE: &[f64] = &[0., 1., 2., 3., 4.];
const SIX: &[f64] = &[0., 1., 2., 3., 4., 5.];
const X: &[f64] = &[0., 1.];

#[test]
fn subplot_count_is_bounded() {
    let data = scan(&[("l", FIVE), ("r", FIVE), ("x", X)], |_| 1);
    let figure = figure(&data, &["x", "y"], &PlotOptions::default());
    // two relevant dofs, 16 subplots: 4 values each
    assert!(figure.slice_count() <= 16);
    assert!(figure.slice_count() < 25);
    assert_eq!(figure.slice_count(), 16);
    assert_eq!((figure.grid.rows, figure.grid.columns), (4, 4));
    let titles = figure.visible_panels().map(|p| p.title.as_str()).collect::<Vec<_>>();
    assert_eq!(titles[0], "l=0.00 r=0.00");
    assert_eq!(titles[1], "l=0.00 r=1.00");
    assert_eq!(titles[15], "l=4.00 r=4.00");
    assert!(!titles.iter().any(|t| t.contains("r=2.00")));
}

#[test]
fn subsampling_with_small_budget() {
    let data = scan(&[("l", FIVE), ("r", FIVE), ("x", X)], |_| 1);
    let options = PlotOptions {
        max_subplots: 3,
        ..Default::default()
    };
    // floor(sqrt(3)) = 1 value per dof
    let figure = figure(&data, &["x", "y"], &options);
    assert_eq!(figure.slice_count(), 1);
    assert_eq!(figure.panels[0].title, "l=0.00 r=0.00");
}

#[test]
fn axis_limits_are_shared() {
    let data = scan(&[("l", SIX), ("x", X)], |i| (i % 3) as i64);
    let figure = figure(&data, &["x", "y"], &PlotOptions::default());
    let first = &figure.panels[0].limits;
    assert!(figure.panels.iter().all(|p| &p.limits == first));
    let close = |a: f64, b: f64| (a - b).abs() < 1e-12;
    assert!(close(first[0].min, -0.1) && close(first[0].max, 1.1));
    assert!(close(first[1].min, -1.1) && close(first[1].max, 12.1));
}

#[test]
fn constant_dofs_give_single_slice() {
    let data = scan(&[("l", &[0.5]), ("r", &[2.]), ("x", SIX)], |i| i as i64 % 2);
    for max_subplots in [1, 4, 100] {
        let options = PlotOptions {
            max_subplots,
            ..Default::default()
        };
        let figure = figure(&data, &["x", "y"], &options);
        assert_eq!(figure.slice_count(), 1);
        assert_eq!(figure.panels.len(), 1);
        assert_eq!(figure.panels[0].title, "");
        assert_eq!(figure.panels[0].point_count(), 6);
    }
}

#[test]
fn every_row_lands_in_its_slice() {
    let data = scan(&[("l", &[0., 1., 2.]), ("x", SIX)], |i| 1 + (i % 2) as i64);
    let figure = figure(&data, &["x", "y"], &PlotOptions::default());
    assert_eq!(figure.slice_count(), 3);
    for (i, panel) in figure.visible_panels().enumerate() {
        assert_eq!(panel.title, format!("l={i}.00"));
        assert_eq!(panel.point_count(), 6);
        let ones = panel.series_of(ClusterId::new(1)).unwrap();
        assert_eq!(ones.len(), 3);
        // y counts rows, the slice of l=i holds rows 6i..6i+6
        assert!(ones.coordinates[1]
            .iter()
            .all(|&y| (6 * i) as f64 <= y && y < (6 * i + 6) as f64));
    }
}

#[test]
fn labels_sit_on_the_outer_edge() {
    let data = scan(&[("l", SIX), ("x", X)], |_| 1);
    let figure = figure(&data, &["x", "y"], &PlotOptions::default());
    assert_eq!((figure.grid.rows, figure.grid.columns), (2, 4));
    let x_titles = figure
        .panels
        .iter()
        .filter(|p| p.axis_titles[0].is_some())
        .map(|p| (p.row, p.column))
        .collect::<Vec<_>>();
    assert_eq!(x_titles, vec![(0, 2), (0, 3), (1, 0), (1, 1)]);
    let y_titles = figure
        .panels
        .iter()
        .filter(|p| p.axis_titles[1].is_some())
        .map(|p| (p.row, p.column))
        .collect::<Vec<_>>();
    assert_eq!(y_titles, vec![(0, 0), (1, 0)]);
    for panel in &figure.panels {
        assert_eq!(panel.x_tick_labels, panel.axis_titles[0].is_some());
        assert_eq!(panel.y_tick_labels, panel.axis_titles[1].is_some());
    }
    let hidden = figure
        .panels
        .iter()
        .filter(|p| !p.visible)
        .map(|p| (p.row, p.column))
        .collect::<Vec<_>>();
    assert_eq!(hidden, vec![(1, 2), (1, 3)]);
}

#[test]
fn three_dimensional_panels_are_all_labeled() {
    let data = scan(&[("l", &[0., 1., 2.]), ("x", X)], |_| 1);
    let figure = figure(&data, &["x", "y", "l"], &PlotOptions::default());
    assert!(figure.is_3d());
    // l is plotted, so nothing is left to slice along
    assert_eq!(figure.slice_count(), 1);
    let panel = &figure.panels[0];
    assert_eq!(
        panel.axis_titles,
        vec![Some("x".into()), Some("y".into()), Some("l".into())]
    );
    assert_eq!(panel.limits.len(), 3);
    assert_eq!(panel.series[0].coordinates.len(), 3);
}

#[test]
fn styles_follow_cluster_ids() {
    let data = scan(&[("x", SIX)], |i| [1, 2, 7, 0, 1, 2][i]);
    let figure = figure(&data, &["x", "y"], &PlotOptions::default());
    let colors = figure.panels[0]
        .series
        .iter()
        .map(|s| (s.cluster.value(), s.color))
        .collect::<Vec<_>>();
    assert_eq!(
        colors,
        vec![
            (1, Color::RED),
            (2, Color::GREEN),
            (7, Color::RED),
            (0, Color::PINK)
        ]
    );
    let custom = PlotOptions {
        colors: Some(vec![Color::BLUE]),
        ..Default::default()
    };
    let figure = plot_clusters(&data, &["x", "y"], &custom).unwrap().unwrap();
    assert!(figure.panels[0].series.iter().all(|s| s.color == Color::BLUE));
}

#[test]
fn absent_clusters_plot_nothing() {
    let data = scan(&[("l", &[0., 1.]), ("x", X)], |i| if i < 2 { 1 } else { 2 });
    let options = PlotOptions {
        clusters: Some(vec![ClusterId::new(2), ClusterId::new(99)]),
        ..Default::default()
    };
    let figure = figure(&data, &["x", "y"], &options);
    let first = &figure.panels[0];
    assert_eq!(first.series.len(), 2);
    assert!(first.series.iter().all(|s| s.is_empty()));
    let second = &figure.panels[1];
    assert_eq!(second.series_of(ClusterId::new(2)).unwrap().len(), 2);
    assert!(second.series_of(ClusterId::new(99)).unwrap().is_empty());
    assert!(first.series_of(ClusterId::new(1)).is_none());
}

#[test]
fn legacy_coefficients_without_metadata() {
    let mut table = SampleTable::example_grid(&[("l", &[0., 1.]), ("t", &[3., 4.]), ("x", X)]);
    table.insert_column("y", vec![0.; 8].into()).unwrap();
    table.insert_column("cluster", vec![1i64; 8].into()).unwrap();
    let data = DataSet::from_parts(table, Metadata::new());
    let figure = figure(&data, &["x", "y"], &PlotOptions::default());
    assert_eq!(figure.slice_count(), 4);
    assert_eq!(figure.panels[3].title, "l=1.00 t=4.00");

    let only_t = PlotOptions {
        parameters: Some(vec!["t".into()]),
        ..Default::default()
    };
    assert_eq!(
        plot_clusters(&data, &["x", "y"], &only_t)
            .unwrap()
            .unwrap()
            .slice_count(),
        2
    );
}

#[test]
fn invalid_arguments_are_rejected() {
    let data = scan(&[("l", &[0., 1.]), ("x", X)], |_| 1);
    let invalid = |result: Result<Option<Figure>, PlotError>| {
        matches!(result, Err(PlotError::InvalidArgument(_)))
    };
    let defaults = PlotOptions::default();
    assert!(invalid(plot_clusters(&data, &["x"], &defaults)));
    assert!(invalid(plot_clusters(&data, &["x", "y", "l", "cluster"], &defaults)));
    // the axis count is checked before anything else
    assert!(invalid(plot_clusters(&DataSet::empty(), &[], &defaults)));
    assert!(invalid(plot_clusters(&DataSet::empty(), &["x", "y"], &defaults)));
    for options in [
        PlotOptions {
            max_subplots: 0,
            ..Default::default()
        },
        PlotOptions {
            max_columns: 0,
            ..Default::default()
        },
    ] {
        assert!(invalid(plot_clusters(&data, &["x", "y"], &options)));
    }
    assert!(matches!(
        plot_clusters(&data, &["x", "nope"], &defaults),
        Err(PlotError::Data(DataError::MissingColumn(c))) if c == "nope"
    ));
}

#[test]
fn non_finite_parameters_are_rejected() {
    let mut table = SampleTable::example_grid(&[("x", X)]);
    table.insert_column("y", vec![0., 1.].into()).unwrap();
    table.insert_column("l", vec![0., f64::NAN].into()).unwrap();
    table.insert_column("cluster", vec![1i64, 1].into()).unwrap();
    let mut md = Metadata::new();
    md.set(&["scan", "spoints", "coeffs"], vec!["l"]).unwrap();
    let data = DataSet::from_parts(table, md);
    assert!(matches!(
        plot_clusters(&data, &["x", "y"], &PlotOptions::default()),
        Err(PlotError::InvalidArgument(_))
    ));
}

#[test]
fn figures_serialize() {
    let data = scan(&[("l", &[0., 1.]), ("x", X)], |i| i as i64);
    let figure = figure(&data, &["x", "y"], &PlotOptions::default());
    let json = serde_json::to_string(&figure).unwrap();
    let back: Figure = serde_json::from_str(&json).unwrap();
    assert_eq!(back, figure);
}

#[test]
fn reloaded_datasets_plot_alike() {
    let dir = tempfile::tempdir().unwrap();
    let data = scan(&[("l", &[0., 0.25, 0.5]), ("x", X)], |i| 3 - (i % 3) as i64);
    data.write(dir.path(), "scan", cluster_data::OverwritePolicy::Raise)
        .unwrap();
    let reloaded = DataSet::from_files(dir.path(), "scan").unwrap();
    let options = PlotOptions::default();
    assert_eq!(
        figure(&reloaded, &["x", "y"], &options),
        figure(&data, &["x", "y"], &options)
    );
}

#[test]
fn empty_lists_fall_back_to_defaults() {
    let data = scan(&[("l", &[0., 1.]), ("x", X)], |i| 1 + (i % 2) as i64);
    let defaults = figure(&data, &["x", "y"], &PlotOptions::default());
    let empty = PlotOptions {
        clusters: Some(vec![]),
        colors: Some(vec![]),
        markers: Some(vec![]),
        ..Default::default()
    };
    let figure = figure(&data, &["x", "y"], &empty);
    assert_eq!(figure, defaults);
    assert_eq!(
        figure.visible_panels().map(|p| p.point_count()).sum::<usize>(),
        4
    );
    assert!(figure.visible_panels().all(|p| p.series.len() == 2));
    assert_eq!(figure.panels[0].series[1].color, Color::GREEN);
}
