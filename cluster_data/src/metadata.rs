use serde::Serialize;
use serde_json::{Map, Value};

use crate::DataError;

/// Nested json object describing how a dataset was produced.
///
/// Behaves like an auto-vivifying nested dictionary: [`Metadata::entry`]
/// creates missing intermediate objects. Keys are kept sorted, so written
/// files diff cleanly.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut value = self.0.get(*first)?;
        for key in rest {
            value = value.as_object()?.get(*key)?;
        }
        Some(value)
    }

    /// Mutable access to the value at `path`, creating objects on the way and
    /// `null` at the end if necessary.
    pub fn entry(&mut self, path: &[&str]) -> Result<&mut Value, DataError> {
        let (last, parents) = path
            .split_last()
            .ok_or_else(|| DataError::InvalidArgument("empty metadata path".into()))?;
        let mut map = &mut self.0;
        for key in parents {
            let value = map
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            map = match value {
                Value::Object(inner) => inner,
                other => {
                    return Err(DataError::InvalidArgument(format!(
                        "metadata entry '{key}' is not an object: {other}"
                    )))
                }
            };
        }
        Ok(map.entry(last.to_string()).or_insert(Value::Null))
    }

    pub fn set(&mut self, path: &[&str], value: impl Into<Value>) -> Result<(), DataError> {
        *self.entry(path)? = value.into();
        Ok(())
    }

    /// String entries of the array at `path`; empty if there is none.
    pub fn strings(&self, path: &[&str]) -> Vec<String> {
        self.get(path)
            .and_then(Value::as_array)
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn read_json<R: std::io::Read>(reader: R) -> Result<Self, DataError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Sorted keys, four spaces of indentation.
    pub fn write_json<W: std::io::Write>(&self, writer: W) -> Result<(), DataError> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        Sorted::Object(&self.0).serialize(&mut serializer)?;
        Ok(())
    }
}

// Key order of `serde_json::Map` depends on the `preserve_order` feature, which
// any crate in the build may switch on.
enum Sorted<'a> {
    Object(&'a Map<String, Value>),
    Value(&'a Value),
}
impl Serialize for Sorted<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};
        match self {
            Sorted::Object(map) => {
                let sorted = map.iter().collect::<std::collections::BTreeMap<_, _>>();
                let mut s = serializer.serialize_map(Some(sorted.len()))?;
                for (key, value) in sorted {
                    s.serialize_entry(key, &Sorted::Value(value))?;
                }
                s.end()
            }
            Sorted::Value(Value::Object(map)) => Sorted::Object(map).serialize(serializer),
            Sorted::Value(Value::Array(values)) => {
                let mut s = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    s.serialize_element(&Sorted::Value(value))?;
                }
                s.end()
            }
            Sorted::Value(value) => value.serialize(serializer),
        }
    }
}
impl From<Map<String, Value>> for Metadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[test]
fn entry_creates_nested_objects() {
    let mut md = Metadata::new();
    md.set(&["scan", "spoints", "coeffs"], vec!["l", "r"]).unwrap();
    assert!(md.contains("scan"));
    assert_eq!(md.strings(&["scan", "spoints", "coeffs"]), vec!["l", "r"]);
    assert!(md.get(&["scan", "missing"]).is_none());
}
#[test]
fn entry_refuses_to_descend_into_values() {
    let mut md = Metadata::new();
    md.set(&["cluster"], 3).unwrap();
    assert!(md.entry(&["cluster", "algorithm"]).is_err());
}
#[test]
fn written_json_is_sorted_and_indented() {
    let mut md = Metadata::new();
    md.set(&["zeta"], 1).unwrap();
    md.set(&["alpha", "b"], "x").unwrap();
    md.set(&["alpha", "a"], true).unwrap();
    let mut buffer = Vec::new();
    md.write_json(&mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(
        text,
        "{\n    \"alpha\": {\n        \"a\": true,\n        \"b\": \"x\"\n    },\n    \"zeta\": 1\n}"
    );
    assert_eq!(Metadata::read_json(text.as_bytes()).unwrap(), md);
}
