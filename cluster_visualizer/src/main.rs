mod cli;

use anyhow::{bail, Context};
use clap::Parser;
use cluster_data::{ClusterId, DataSet, RenamePolicy};
use cluster_visualizer::{
    config::AppConfig, histogram, plot_clusters, plot_histogram, render, RenderMode,
};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, DataArgs};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config);

    match cli.command {
        Command::Info(data) => info(&data, &config),
        Command::Rename {
            data,
            map,
            shift,
            column,
            target,
            overwrite,
        } => {
            let DataArgs { dir, name } = &data;
            let mut dataset = load(&data)?;
            let policy = match (map.is_empty(), shift) {
                (true, None) => RenamePolicy::Auto,
                (false, None) => RenamePolicy::mapping(map),
                (true, Some(shift)) => RenamePolicy::try_function(move |c| {
                    c.value()
                        .checked_add(shift)
                        .map(ClusterId::new)
                        .ok_or_else(|| format!("shifting by {shift} overflows"))
                }),
                (false, Some(_)) => bail!("--map and --shift cannot be combined"),
            };
            let column = column.unwrap_or_else(|| config.data.cluster_column.clone());
            dataset.rename_clusters(policy, &column, target.as_deref())?;
            dataset.write(dir, name, overwrite.unwrap_or(config.data.overwrite))?;
            Ok(())
        }
        Command::Plot {
            data,
            axes,
            clusters,
            parameters,
            max_subplots,
            max_columns,
            output,
            overwrite,
        } => {
            let dataset = load(&data)?;
            let mut options = config.plot.options();
            options.cluster_column = config.data.cluster_column.clone();
            if !clusters.is_empty() {
                options.clusters = Some(clusters.into_iter().map(ClusterId::new).collect());
            }
            if !parameters.is_empty() {
                options.parameters = Some(parameters);
            }
            if let Some(max_subplots) = max_subplots {
                options.max_subplots = max_subplots;
            }
            if let Some(max_columns) = max_columns {
                options.max_columns = max_columns;
            }
            options.render_mode = if output.is_some() {
                RenderMode::ReturnFigure
            } else {
                RenderMode::RenderInPlace
            };
            let axes = axes.iter().map(String::as_str).collect::<Vec<_>>();
            let figure = plot_clusters(&dataset, &axes, &options)?;
            if let (Some(figure), Some(output)) = (figure, output) {
                tracing::info!(
                    "{} slices in a {} x {} grid.",
                    figure.slice_count(),
                    figure.grid.rows,
                    figure.grid.columns
                );
                render::save(
                    &figure,
                    &output,
                    options.pixels_per_unit,
                    overwrite.unwrap_or(config.data.overwrite),
                )?;
            }
            Ok(())
        }
        Command::PlotHistogram {
            data,
            row,
            edges,
            normalized,
            output,
            overwrite,
        } => {
            let dataset = load(&data)?;
            let contents = dataset.histogram(row)?;
            let edges = if edges.is_empty() {
                histogram::uniform_binning(contents.len())
            } else {
                edges
            };
            let histogram = plot_histogram(&edges, &contents, normalized)?;
            render::save(
                &histogram,
                &output,
                config.plot.pixels_per_unit,
                overwrite.unwrap_or(config.data.overwrite),
            )?;
            Ok(())
        }
    }
}

fn load(data: &DataArgs) -> anyhow::Result<DataSet> {
    DataSet::from_files(&data.dir, &data.name).with_context(|| {
        format!(
            "failed to load dataset '{}' from '{}'",
            data.name,
            data.dir.display()
        )
    })
}

fn info(data: &DataArgs, config: &AppConfig) -> anyhow::Result<()> {
    let dataset = load(data)?;
    tracing::info!(
        "{}: {} points, {} bins, {} parameters {:?}",
        data.name,
        dataset.n(),
        dataset.nbins(),
        dataset.npars(),
        dataset.par_cols()
    );
    tracing::info!(
        "scanned: {}, clustered: {}",
        dataset.was_scanned(),
        dataset.was_clustered()
    );
    let column = &config.data.cluster_column;
    if dataset.table().contains(column) {
        let clusters = dataset.clusters(column)?;
        let labels = clusters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        tracing::info!("{} clusters in '{column}': {labels}", clusters.len());
    } else {
        tracing::info!("No cluster column '{column}'.");
    }
    Ok(())
}
