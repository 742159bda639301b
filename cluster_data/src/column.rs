#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum DataKind {
    Float,
    Int,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DataColumn {
    Float(Vec<f64>),
    Int(Vec<i64>),
}
impl DataColumn {
    pub fn kind(&self) -> DataKind {
        match self {
            DataColumn::Float(_) => DataKind::Float,
            DataColumn::Int(_) => DataKind::Int,
        }
    }
    pub fn len(&self) -> usize {
        match self {
            DataColumn::Float(d) => d.len(),
            DataColumn::Int(d) => d.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_f64(&self, i: usize) -> Option<f64> {
        match self {
            DataColumn::Float(d) => d.get(i).copied(),
            DataColumn::Int(d) => d.get(i).map(|&x| x as f64),
        }
    }

    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            DataColumn::Float(d) => d.clone(),
            DataColumn::Int(d) => d.iter().map(|&x| x as f64).collect(),
        }
    }

    pub fn as_int(&self) -> Option<&[i64]> {
        match self {
            DataColumn::Float(_) => None,
            DataColumn::Int(d) => Some(d),
        }
    }

    /// Floats always keep a decimal point or exponent, so that re-parsing
    /// yields the same kind.
    pub(crate) fn get_as_string(&self, i: usize) -> String {
        match self {
            DataColumn::Float(d) => format!("{:?}", d[i]),
            DataColumn::Int(d) => d[i].to_string(),
        }
    }

    /// A column of cells is `Int` if every cell is an integer literal, `Float`
    /// otherwise. Empty cells are read as NaN.
    pub(crate) fn parse(column: &str, cells: Vec<String>) -> Result<Self, crate::DataError> {
        let ints = cells
            .iter()
            .map(|c| c.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>();
        if let Ok(ints) = ints {
            return Ok(Self::Int(ints));
        }
        let mut floats = Vec::with_capacity(cells.len());
        for (row, cell) in cells.into_iter().enumerate() {
            let trimmed = cell.trim();
            if trimmed.is_empty() {
                floats.push(f64::NAN);
                continue;
            }
            match trimmed.parse::<f64>() {
                Ok(f) => floats.push(f),
                Err(_) => {
                    return Err(crate::DataError::Parse {
                        row,
                        column: column.to_string(),
                        value: cell,
                    })
                }
            }
        }
        Ok(Self::Float(floats))
    }
}
impl From<Vec<f64>> for DataColumn {
    fn from(data: Vec<f64>) -> Self {
        Self::Float(data)
    }
}
impl From<Vec<i64>> for DataColumn {
    fn from(data: Vec<i64>) -> Self {
        Self::Int(data)
    }
}

#[test]
fn parse_detects_kind() {
    let ints = DataColumn::parse("a", vec!["1".into(), "-2".into(), "3".into()]).unwrap();
    assert_eq!(ints, DataColumn::Int(vec![1, -2, 3]));

    let floats = DataColumn::parse("b", vec!["1".into(), "2.5".into()]).unwrap();
    assert_eq!(floats, DataColumn::Float(vec![1., 2.5]));

    let err = DataColumn::parse("c", vec!["1".into(), "x".into()]).unwrap_err();
    assert!(matches!(err, crate::DataError::Parse { row: 1, .. }));
}
#[test]
fn float_strings_stay_float() {
    let column = DataColumn::Float(vec![1., 2., 1e20]);
    let cells = (0..column.len()).map(|i| column.get_as_string(i)).collect();
    assert_eq!(DataColumn::parse("x", cells).unwrap(), column);
}
#[test]
fn empty_cells_are_nan() {
    let column = DataColumn::parse("x", vec!["0.5".into(), "".into()]).unwrap();
    let values = column.to_f64();
    assert_eq!(values[0], 0.5);
    assert!(values[1].is_nan());
}
