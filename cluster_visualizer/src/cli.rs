use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cluster_data::OverwritePolicy;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, default_value = cluster_visualizer::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a summary of a dataset
    Info(DataArgs),
    /// Rename cluster labels and write the dataset back
    ///
    /// Without --map or --shift the labels are renumbered 0, 1, 2, ... in the
    /// order in which they first appear.
    Rename {
        #[command(flatten)]
        data: DataArgs,

        /// Explicit renaming, e.g. `3=0,5=1`; other labels stay as they are
        #[arg(long, value_delimiter = ',', value_parser = parse_pair, conflicts_with = "shift")]
        map: Vec<(i64, i64)>,

        /// Add this value to every label
        #[arg(long, allow_hyphen_values = true)]
        shift: Option<i64>,

        /// Column holding the labels (overrides config)
        #[arg(long)]
        column: Option<String>,

        /// Write the new labels to this column instead
        #[arg(long)]
        target: Option<String>,

        /// ask, overwrite or raise (overrides config)
        #[arg(long)]
        overwrite: Option<OverwritePolicy>,
    },
    /// Scatter the clusters, one subplot per parameter slice
    Plot {
        #[command(flatten)]
        data: DataArgs,

        /// Two or three columns to plot against each other
        #[arg(long, value_delimiter = ',', required = true)]
        axes: Vec<String>,

        /// Clusters to plot, all of them by default
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        clusters: Vec<i64>,

        /// Parameter columns to slice along, taken from the metadata by default
        #[arg(long, value_delimiter = ',')]
        parameters: Vec<String>,

        /// Upper bound for the number of subplots (overrides config)
        #[arg(long)]
        max_subplots: Option<usize>,

        /// Subplots per row (overrides config)
        #[arg(long)]
        max_columns: Option<usize>,

        /// Save to this .png or .svg file instead of opening a window
        #[arg(long)]
        output: Option<PathBuf>,

        /// ask, overwrite or raise (overrides config)
        #[arg(long)]
        overwrite: Option<OverwritePolicy>,
    },
    /// Draw the bin contents of a single point
    PlotHistogram {
        #[command(flatten)]
        data: DataArgs,

        /// Row of the point
        #[arg(long)]
        row: usize,

        /// Bin edges, one more than there are bins; 0, 1, ..., nbins by default
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        edges: Vec<f64>,

        /// Divide the contents by their sum
        #[arg(long)]
        normalized: bool,

        /// .png or .svg file
        #[arg(long)]
        output: PathBuf,

        /// ask, overwrite or raise (overrides config)
        #[arg(long)]
        overwrite: Option<OverwritePolicy>,
    },
}

#[derive(Args, Debug)]
pub struct DataArgs {
    /// Directory holding the dataset files
    #[arg(long)]
    pub dir: PathBuf,

    /// Dataset name, files are `<name>_data.csv` and `<name>_metadata.json`
    #[arg(long)]
    pub name: String,
}

fn parse_pair(s: &str) -> Result<(i64, i64), String> {
    let (old, new) = s
        .split_once('=')
        .ok_or_else(|| format!("expected OLD=NEW, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid label '{v}': {e}"))
    };
    Ok((parse(old)?, parse(new)?))
}

#[test]
fn pairs_parse() {
    assert_eq!(parse_pair("3=0").unwrap(), (3, 0));
    assert_eq!(parse_pair(" -1 = 4").unwrap(), (-1, 4));
    assert!(parse_pair("3").is_err());
    assert!(parse_pair("a=1").is_err());
}
#[test]
fn rename_arguments() {
    let cli = Cli::parse_from([
        "cluster_visualizer",
        "rename",
        "--dir",
        "out",
        "--name",
        "scan",
        "--map",
        "3=0,5=1",
        "--overwrite",
        "overwrite",
    ]);
    match cli.command {
        Command::Rename {
            map, overwrite, shift, ..
        } => {
            assert_eq!(map, vec![(3, 0), (5, 1)]);
            assert_eq!(overwrite, Some(OverwritePolicy::Overwrite));
            assert_eq!(shift, None);
        }
        other => panic!("unexpected command {other:?}"),
    }
}
#[test]
fn plot_requires_axes() {
    assert!(Cli::try_parse_from(["cluster_visualizer", "plot", "--dir", ".", "--name", "x"]).is_err());
    let cli = Cli::try_parse_from([
        "cluster_visualizer",
        "plot",
        "--dir",
        ".",
        "--name",
        "x",
        "--axes",
        "bin0,bin1",
        "--clusters",
        "-1,2",
    ])
    .unwrap();
    match cli.command {
        Command::Plot { axes, clusters, .. } => {
            assert_eq!(axes, vec!["bin0", "bin1"]);
            assert_eq!(clusters, vec![-1, 2]);
        }
        other => panic!("unexpected command {other:?}"),
    }
}
#[test]
fn histogram_arguments() {
    let base = ["cluster_visualizer", "plot-histogram", "--dir", ".", "--name", "x", "--row", "3"];
    assert!(Cli::try_parse_from(base).is_err());
    let cli = Cli::try_parse_from(
        base.into_iter()
            .chain(["--edges", "-1,0,2.5", "--normalized", "--output", "h.svg"]),
    )
    .unwrap();
    match cli.command {
        Command::PlotHistogram {
            row,
            edges,
            normalized,
            output,
            ..
        } => {
            assert_eq!(row, 3);
            assert_eq!(edges, vec![-1., 0., 2.5]);
            assert!(normalized);
            assert_eq!(output, PathBuf::from("h.svg"));
        }
        other => panic!("unexpected command {other:?}"),
    }
}
