use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, Axis};

use crate::{
    cluster::unique_in_order, handle_overwrite, ClusterId, DataColumn, DataError, Metadata,
    OverwritePolicy, RenamePolicy, SampleTable,
};

/// Columns starting with this prefix hold histogram bins.
pub const BIN_PREFIX: &str = "bin";
pub const DEFAULT_CLUSTER_COLUMN: &str = "cluster";

/// A sample table together with the metadata describing it.
///
/// Contains the distributions to cluster, the cluster labels after
/// clustering and everything needed to write both to disk and read them back.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataSet {
    table: SampleTable,
    metadata: Metadata,
    bin_columns: Vec<String>,
}

// Constructors
impl DataSet {
    pub fn empty() -> Self {
        Self::default()
    }
    pub fn from_parts(table: SampleTable, metadata: Metadata) -> Self {
        let bin_columns = find_bin_columns(&table);
        Self {
            table,
            metadata,
            bin_columns,
        }
    }
    /// Loads the files written by [`DataSet::write`].
    pub fn from_files(directory: impl AsRef<Path>, name: &str) -> Result<Self, DataError> {
        let mut data = Self::empty();
        data.load(directory, name)?;
        Ok(data)
    }
    pub fn copy_of(other: &Self) -> Self {
        other.clone()
    }
}

// Getter
impl DataSet {
    pub fn table(&self) -> &SampleTable {
        &self.table
    }
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
    pub fn was_scanned(&self) -> bool {
        self.metadata.contains("scan")
    }
    pub fn was_clustered(&self) -> bool {
        self.metadata.contains("cluster")
    }
    /// Columns holding the bins of the distribution, fixed when the table was
    /// set.
    pub fn bin_cols(&self) -> &[String] {
        &self.bin_columns
    }
    /// Coordinates of the sampled parameter space, as recorded by the scan.
    pub fn par_cols(&self) -> Vec<String> {
        let coeffs = self.metadata.strings(&["scan", "spoints", "coeffs"]);
        if coeffs.is_empty() {
            self.metadata.strings(&["scan", "wpoints", "coeffs"])
        } else {
            coeffs
        }
    }
    /// Number of sampled points.
    pub fn n(&self) -> usize {
        self.table.n_rows()
    }
    pub fn nbins(&self) -> usize {
        self.bin_columns.len()
    }
    pub fn npars(&self) -> usize {
        self.par_cols().len()
    }

    /// All histograms as a `n x nbins` matrix, optionally normalized to unit
    /// sum per row.
    pub fn data(&self, normalize: bool) -> Result<Array2<f64>, DataError> {
        let columns = self
            .bin_columns
            .iter()
            .map(|c| self.table.values_f64(c))
            .collect::<Result<Vec<_>, _>>()?;
        let mut data = Array2::from_shape_fn((self.n(), columns.len()), |(i, j)| columns[j][i]);
        if normalize {
            let norms = data.sum_axis(Axis(1)).insert_axis(Axis(1));
            data /= &norms;
        }
        Ok(data)
    }
    /// Bin contents of the `row`-th point.
    pub fn histogram(&self, row: usize) -> Result<Vec<f64>, DataError> {
        if row >= self.n() {
            return Err(DataError::InvalidArgument(format!(
                "row {row} out of range, dataset has {} points",
                self.n()
            )));
        }
        self.bin_columns
            .iter()
            .map(|c| Ok(self.table.column(c)?.get_f64(row).unwrap_or(f64::NAN)))
            .collect()
    }
    /// Sum of every histogram.
    pub fn norms(&self) -> Result<Array1<f64>, DataError> {
        Ok(self.data(false)?.sum_axis(Axis(1)))
    }
    /// Distinct cluster labels in order of first occurrence.
    pub fn clusters(&self, column: &str) -> Result<Vec<ClusterId>, DataError> {
        Ok(unique_in_order(&self.table.cluster_ids(column)?))
    }
}

// Renaming clusters
impl DataSet {
    /// Renames the labels in `column` according to `policy`.
    ///
    /// The result replaces `column` unless `new_column` is given, in which
    /// case it is written there and `column` stays as it is. Bin and parameter
    /// columns cannot be targets. Nothing is modified if the policy fails.
    pub fn rename_clusters(
        &mut self,
        policy: RenamePolicy<'_>,
        column: &str,
        new_column: Option<&str>,
    ) -> Result<(), DataError> {
        let target = new_column.unwrap_or(column);
        // would be read back as a bin after a write and load
        if target.starts_with(BIN_PREFIX) {
            return Err(DataError::InvalidArgument(format!(
                "cannot write cluster labels to '{target}', columns starting with '{BIN_PREFIX}' hold bins"
            )));
        }
        if self.par_cols().iter().any(|c| c == target) {
            return Err(DataError::InvalidArgument(format!(
                "cannot write cluster labels to parameter column '{target}'"
            )));
        }
        let labels = self.table.cluster_ids(column)?;
        let renamed = policy.apply(&labels)?;
        tracing::debug!(
            "Renamed clusters {:?} -> {:?} ({column} -> {target}).",
            unique_in_order(&labels),
            unique_in_order(&renamed)
        );
        let renamed = DataColumn::Int(renamed.into_iter().map(ClusterId::value).collect());
        self.table.insert_column(target, renamed)?;
        Ok(())
    }
}

// Input/Output
impl DataSet {
    pub fn df_path(directory: impl AsRef<Path>, name: &str) -> PathBuf {
        directory.as_ref().join(format!("{name}_data.csv"))
    }
    pub fn md_path(directory: impl AsRef<Path>, name: &str) -> PathBuf {
        directory.as_ref().join(format!("{name}_metadata.json"))
    }

    pub fn load_df(&mut self, path: impl AsRef<Path>) -> Result<(), DataError> {
        let path = path.as_ref();
        tracing::debug!("Loading scanner data from '{}'.", path.display());
        let file = std::fs::File::open(path).map_err(|e| DataError::io(path, e))?;
        self.table = SampleTable::read_csv(std::io::BufReader::new(file))?;
        self.bin_columns = find_bin_columns(&self.table);
        tracing::debug!("Loading done.");
        Ok(())
    }
    pub fn load_md(&mut self, path: impl AsRef<Path>) -> Result<(), DataError> {
        let path = path.as_ref();
        tracing::debug!("Loading metadata from '{}'.", path.display());
        let file = std::fs::File::open(path).map_err(|e| DataError::io(path, e))?;
        self.metadata = Metadata::read_json(std::io::BufReader::new(file))?;
        tracing::debug!("Done.");
        Ok(())
    }
    pub fn load(&mut self, directory: impl AsRef<Path>, name: &str) -> Result<(), DataError> {
        let directory = directory.as_ref();
        self.load_df(Self::df_path(directory, name))?;
        self.load_md(Self::md_path(directory, name))
    }

    pub fn write_df(
        &self,
        path: impl AsRef<Path>,
        overwrite: OverwritePolicy,
    ) -> Result<(), DataError> {
        let path = path.as_ref();
        tracing::info!("Will write dataframe to '{}'.", path.display());
        create_parent(path)?;
        handle_overwrite(&[path], overwrite)?;
        if self.table.is_empty() {
            tracing::error!("Dataframe seems to be empty. Still writing out anyway.");
        }
        let file = std::fs::File::create(path).map_err(|e| DataError::io(path, e))?;
        self.table.write_csv(std::io::BufWriter::new(file))?;
        tracing::debug!("Done");
        Ok(())
    }
    pub fn write_md(
        &self,
        path: impl AsRef<Path>,
        overwrite: OverwritePolicy,
    ) -> Result<(), DataError> {
        use std::io::Write;
        let path = path.as_ref();
        tracing::info!("Will write metadata to '{}'.", path.display());
        create_parent(path)?;
        handle_overwrite(&[path], overwrite)?;
        let file = std::fs::File::create(path).map_err(|e| DataError::io(path, e))?;
        let mut writer = std::io::BufWriter::new(file);
        self.metadata.write_json(&mut writer)?;
        writer.flush().map_err(|e| DataError::io(path, e))?;
        tracing::debug!("Done");
        Ok(())
    }
    /// Writes `<name>_data.csv` and `<name>_metadata.json` to `directory`.
    /// Both paths are checked against `overwrite` before anything is written.
    pub fn write(
        &self,
        directory: impl AsRef<Path>,
        name: &str,
        overwrite: OverwritePolicy,
    ) -> Result<(), DataError> {
        let directory = directory.as_ref();
        let df_path = Self::df_path(directory, name);
        let md_path = Self::md_path(directory, name);
        handle_overwrite(&[df_path.as_path(), md_path.as_path()], overwrite)?;
        self.write_df(&df_path, OverwritePolicy::Overwrite)?;
        self.write_md(&md_path, OverwritePolicy::Overwrite)
    }
}

fn find_bin_columns(table: &SampleTable) -> Vec<String> {
    table
        .column_names()
        .filter(|c| c.starts_with(BIN_PREFIX))
        .map(str::to_string)
        .collect()
}

fn create_parent(path: &Path) -> Result<(), DataError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            tracing::debug!("Creating directory '{}'.", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
fn example() -> DataSet {
    let mut table = SampleTable::with_rows(4);
    table.insert_column("l", vec![0., 0., 1., 1.].into()).unwrap();
    table.insert_column("bin0", vec![1., 2., 3., 0.].into()).unwrap();
    table.insert_column("bin1", vec![3., 2., 1., 0.].into()).unwrap();
    table.insert_column("cluster", vec![2i64, 2, 5, 1].into()).unwrap();
    let mut md = Metadata::new();
    md.set(&["scan", "spoints", "coeffs"], vec!["l"]).unwrap();
    DataSet::from_parts(table, md)
}

#[test]
fn accessors() {
    let data = example();
    assert!(data.was_scanned());
    assert!(!data.was_clustered());
    assert_eq!(data.bin_cols(), &["bin0", "bin1"]);
    assert_eq!(data.par_cols(), vec!["l"]);
    assert_eq!((data.n(), data.nbins(), data.npars()), (4, 2, 1));
    assert_eq!(
        data.clusters(DEFAULT_CLUSTER_COLUMN).unwrap(),
        vec![ClusterId::new(2), ClusterId::new(5), ClusterId::new(1)]
    );
}
#[test]
fn data_matrix_and_norms() {
    let data = example();
    let matrix = data.data(false).unwrap();
    assert_eq!(matrix.shape(), &[4, 2]);
    assert_eq!(matrix[[2, 0]], 3.);
    assert_eq!(data.norms().unwrap().to_vec(), vec![4., 4., 4., 0.]);
    let normalized = data.data(true).unwrap();
    assert_eq!(normalized[[0, 0]], 0.25);
    assert_eq!(normalized[[0, 1]], 0.75);
}
#[test]
fn rename_into_new_column_keeps_source() {
    let mut data = example();
    let before = data.table().column("cluster").unwrap().clone();
    data.rename_clusters(RenamePolicy::Auto, "cluster", Some("canonical"))
        .unwrap();
    assert_eq!(data.table().column("cluster").unwrap(), &before);
    assert_eq!(
        data.table().column("canonical").unwrap(),
        &DataColumn::Int(vec![0, 0, 1, 2])
    );
    assert_eq!(data.bin_cols(), &["bin0", "bin1"]);
}
#[test]
fn rename_refuses_bin_and_parameter_targets() {
    let mut data = example();
    for target in ["bin0", "l"] {
        let err = data
            .rename_clusters(RenamePolicy::Auto, "cluster", Some(target))
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidArgument(_)));
    }
    assert_eq!(data, example());
}
#[test]
fn rename_refuses_new_columns_looking_like_bins() {
    let mut data = example();
    let err = data
        .rename_clusters(RenamePolicy::Auto, "cluster", Some("bin_cluster"))
        .unwrap_err();
    assert!(matches!(err, DataError::InvalidArgument(_)));
    assert!(!data.table().contains("bin_cluster"));
    assert_eq!(data.nbins(), 2);
}
#[test]
fn histogram_of_single_row() {
    let data = example();
    assert_eq!(data.histogram(2).unwrap(), vec![3., 1.]);
    assert!(matches!(data.histogram(4), Err(DataError::InvalidArgument(_))));
}
#[test]
fn failed_rename_leaves_table_untouched() {
    let mut data = example();
    let policy = RenamePolicy::try_function(|c| {
        if c.value() == 1 {
            Err("unexpected".into())
        } else {
            Ok(ClusterId::new(c.value() * 10))
        }
    });
    assert!(data.rename_clusters(policy, "cluster", None).is_err());
    assert_eq!(data, example());
}
