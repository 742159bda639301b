use indexmap::IndexMap;

use crate::{ClusterId, DataColumn, DataError};

/// Name of the row-key column in csv files.
pub const INDEX_COLUMN: &str = "index";

/// Rows of sampled points; every column holds one value per row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleTable {
    index: Vec<i64>,
    columns: IndexMap<String, DataColumn>,
}
// Constructors
impl SampleTable {
    pub fn new(index: Vec<i64>) -> Self {
        Self {
            index,
            columns: Default::default(),
        }
    }
    pub fn with_rows(row_count: usize) -> Self {
        Self::new((0..row_count as i64).collect())
    }
    pub fn from_columns<I, S>(columns: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = (S, DataColumn)>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for (label, column) in columns {
            let label = label.into();
            if table.columns.contains_key(&label) {
                return Err(DataError::InvalidArgument(format!(
                    "Label '{label}' occurs multiple times"
                )));
            }
            table.insert_column(label, column)?;
        }
        Ok(table)
    }
    /// Full grid over the given parameter values; the last parameter varies
    /// fastest.
    pub fn example_grid(parameters: &[(&str, &[f64])]) -> Self {
        let row_count = parameters.iter().map(|(_, v)| v.len()).product::<usize>();
        let mut table = Self::with_rows(if parameters.is_empty() { 0 } else { row_count });
        let mut stride = row_count;
        for (label, values) in parameters {
            stride /= values.len().max(1);
            let data = (0..table.n_rows())
                .map(|row| values[(row / stride.max(1)) % values.len()])
                .collect::<Vec<_>>();
            table
                .columns
                .insert(label.to_string(), DataColumn::Float(data));
        }
        table
    }
}
// Getter
impl SampleTable {
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
    pub fn index(&self) -> &[i64] {
        &self.index
    }
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }
    pub fn contains(&self, label: &str) -> bool {
        self.columns.contains_key(label)
    }
    pub fn column(&self, label: &str) -> Result<&DataColumn, DataError> {
        self.columns
            .get(label)
            .ok_or_else(|| DataError::MissingColumn(label.to_string()))
    }
    pub fn values_f64(&self, label: &str) -> Result<Vec<f64>, DataError> {
        self.column(label).map(DataColumn::to_f64)
    }
    pub fn cluster_ids(&self, label: &str) -> Result<Vec<ClusterId>, DataError> {
        match self.column(label)?.as_int() {
            Some(data) => Ok(data.iter().map(|&x| ClusterId::new(x)).collect()),
            None => Err(DataError::InvalidArgument(format!(
                "column '{label}' does not contain integer cluster labels"
            ))),
        }
    }
}
// Manipulation
impl SampleTable {
    /// Appends the column, or replaces an existing column of the same name in
    /// place. A table without rows and columns adopts the length of its first
    /// column.
    pub fn insert_column(
        &mut self,
        label: impl Into<String>,
        column: DataColumn,
    ) -> Result<Option<DataColumn>, DataError> {
        let label = label.into();
        if self.columns.is_empty() && self.index.is_empty() {
            self.index = (0..column.len() as i64).collect();
        }
        if column.len() != self.n_rows() {
            return Err(DataError::InvalidArgument(format!(
                "column '{label}' has {} rows, table has {}",
                column.len(),
                self.n_rows()
            )));
        }
        Ok(self.columns.insert(label, column))
    }
}
// csv
impl SampleTable {
    pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let header = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();
        let mut cells = vec![Vec::new(); header.len()];
        for record in reader.records() {
            let record = record?;
            for (column, cell) in cells.iter_mut().zip(record.iter()) {
                column.push(cell.to_string());
            }
        }
        let mut index = None;
        let mut columns = IndexMap::with_capacity(header.len());
        for (label, cells) in header.into_iter().zip(cells) {
            let column = DataColumn::parse(&label, cells)?;
            if label == INDEX_COLUMN && index.is_none() {
                match column {
                    DataColumn::Int(data) => index = Some(data),
                    DataColumn::Float(_) => {
                        return Err(DataError::InvalidArgument(
                            "index column must contain integers".into(),
                        ))
                    }
                }
            } else if columns.insert(label.clone(), column).is_some() {
                return Err(DataError::InvalidArgument(format!(
                    "Label '{label}' occurs multiple times"
                )));
            }
        }
        let row_count = columns.values().map(DataColumn::len).next().unwrap_or(0);
        let index = index.unwrap_or_else(|| {
            tracing::warn!("No '{INDEX_COLUMN}' column found, using row numbers.");
            (0..row_count as i64).collect()
        });
        Ok(Self { index, columns })
    }

    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), DataError> {
        let mut writer = csv::Writer::from_writer(writer);
        let header = std::iter::once(INDEX_COLUMN).chain(self.column_names());
        writer.write_record(header)?;
        for (row, key) in self.index.iter().enumerate() {
            let record = std::iter::once(key.to_string())
                .chain(self.columns.values().map(|c| c.get_as_string(row)));
            writer.write_record(record)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

#[test]
fn example_grid_varies_last_parameter_fastest() {
    let table = SampleTable::example_grid(&[("a", &[0., 1.]), ("b", &[5., 6., 7.])]);
    assert_eq!(table.n_rows(), 6);
    assert_eq!(table.values_f64("a").unwrap(), vec![0., 0., 0., 1., 1., 1.]);
    assert_eq!(table.values_f64("b").unwrap(), vec![5., 6., 7., 5., 6., 7.]);
}
#[test]
fn insert_rejects_wrong_length() {
    let mut table = SampleTable::with_rows(3);
    table.insert_column("x", vec![1., 2., 3.].into()).unwrap();
    let err = table.insert_column("y", vec![1i64].into()).unwrap_err();
    assert!(matches!(err, DataError::InvalidArgument(_)));
}
#[test]
fn insert_overwrites_in_place() {
    let mut table =
        SampleTable::from_columns([("a", DataColumn::from(vec![1i64])), ("b", vec![2i64].into())])
            .unwrap();
    let old = table.insert_column("a", vec![3i64].into()).unwrap();
    assert_eq!(old, Some(DataColumn::Int(vec![1])));
    assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(table.column("a").unwrap(), &DataColumn::Int(vec![3]));
}
#[test]
fn csv_keeps_index_order_and_kinds() {
    let mut table = SampleTable::new(vec![10, 11, 12]);
    table.insert_column("l", vec![0.5, 1.0, 1.5].into()).unwrap();
    table.insert_column("bin0", vec![1., 2., 3.].into()).unwrap();
    table.insert_column("cluster", vec![3i64, 1, 3].into()).unwrap();
    let mut buffer = Vec::new();
    table.write_csv(&mut buffer).unwrap();
    let text = String::from_utf8(buffer.clone()).unwrap();
    assert!(text.starts_with("index,l,bin0,cluster\n10,0.5,1.0,3\n"));
    let parsed = SampleTable::read_csv(buffer.as_slice()).unwrap();
    assert_eq!(parsed, table);
}
#[test]
fn csv_without_index_uses_row_numbers() {
    let parsed = SampleTable::read_csv("a,b\n1,2.5\n3,4.5\n".as_bytes()).unwrap();
    assert_eq!(parsed.index(), &[0, 1]);
    assert_eq!(parsed.column("a").unwrap(), &DataColumn::Int(vec![1, 3]));
}
