use cluster_data::*;

fn scanned() -> DataSet {
    let mut table = SampleTable::example_grid(&[("l", &[0., 0.5, 1.]), ("r", &[-1., 1.])]);
    let n = table.n_rows();
    table
        .insert_column("bin0", (0..n).map(|i| i as f64).collect::<Vec<_>>().into())
        .unwrap();
    table
        .insert_column("bin1", (0..n).map(|i| (n - i) as f64 / 2.).collect::<Vec<_>>().into())
        .unwrap();
    table
        .insert_column("cluster", vec![4i64, 4, 2, 2, 9, 4].into())
        .unwrap();
    let mut md = Metadata::new();
    md.set(&["scan", "spoints", "coeffs"], vec!["l", "r"]).unwrap();
    md.set(&["cluster", "algorithm"], "hierarchy").unwrap();
    DataSet::from_parts(table, md)
}

#[test]
fn write_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let data = scanned();
    data.write(dir.path(), "test", OverwritePolicy::Raise).unwrap();
    assert!(DataSet::df_path(dir.path(), "test").is_file());
    assert!(DataSet::md_path(dir.path(), "test").is_file());

    let loaded = DataSet::from_files(dir.path(), "test").unwrap();
    assert_eq!(loaded, data);
    assert!(loaded.was_clustered());
    assert_eq!(loaded.par_cols(), vec!["l", "r"]);
    assert_eq!(loaded.bin_cols(), &["bin0", "bin1"]);
}

#[test]
fn write_respects_overwrite_policy() {
    let dir = tempfile::tempdir().unwrap();
    let data = scanned();
    data.write(dir.path(), "test", OverwritePolicy::Raise).unwrap();
    let err = data
        .write(dir.path(), "test", OverwritePolicy::Raise)
        .unwrap_err();
    assert!(matches!(err, DataError::FileExists(_)));
    data.write(dir.path(), "test", OverwritePolicy::Overwrite)
        .unwrap();
}

#[test]
fn write_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    scanned()
        .write(&nested, "deep", OverwritePolicy::Raise)
        .unwrap();
    assert!(DataSet::df_path(&nested, "deep").is_file());
}

#[test]
fn metadata_file_is_sorted() {
    let dir = tempfile::tempdir().unwrap();
    scanned()
        .write(dir.path(), "test", OverwritePolicy::Raise)
        .unwrap();
    let text = std::fs::read_to_string(DataSet::md_path(dir.path(), "test")).unwrap();
    let cluster = text.find("\"cluster\"").unwrap();
    let scan = text.find("\"scan\"").unwrap();
    assert!(cluster < scan);
    assert!(text.contains("\n    \"cluster\": {\n        \"algorithm\": \"hierarchy\""));
}

#[test]
fn renamed_labels_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut data = scanned();
    data.rename_clusters(RenamePolicy::Auto, DEFAULT_CLUSTER_COLUMN, None)
        .unwrap();
    data.write(dir.path(), "renamed", OverwritePolicy::Raise)
        .unwrap();
    let loaded = DataSet::from_files(dir.path(), "renamed").unwrap();
    assert_eq!(
        loaded.table().column(DEFAULT_CLUSTER_COLUMN).unwrap(),
        &DataColumn::Int(vec![0, 0, 1, 1, 2, 0])
    );
}

#[test]
fn copy_is_independent() {
    let original = scanned();
    let mut copy = DataSet::copy_of(&original);
    copy.rename_clusters(RenamePolicy::mapping([(4, 0)]), "cluster", None)
        .unwrap();
    assert_ne!(copy, original);
    assert_eq!(
        original.table().column("cluster").unwrap(),
        &DataColumn::Int(vec![4, 4, 2, 2, 9, 4])
    );
}

#[test]
fn missing_files_are_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = DataSet::from_files(dir.path(), "absent").unwrap_err();
    assert!(matches!(err, DataError::Io { .. }));
}

#[test]
fn bins_survive_rename_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut data = scanned();
    assert!(data
        .rename_clusters(RenamePolicy::Auto, "cluster", Some("bin_cluster"))
        .is_err());
    data.rename_clusters(RenamePolicy::Auto, "cluster", Some("canonical"))
        .unwrap();
    data.write(dir.path(), "test", OverwritePolicy::Raise).unwrap();
    let loaded = DataSet::from_files(dir.path(), "test").unwrap();
    assert_eq!(loaded.bin_cols(), &["bin0", "bin1"]);
    assert_eq!(loaded.nbins(), data.nbins());
    assert_eq!(loaded.data(false).unwrap(), data.data(false).unwrap());
}
