use std::collections::HashMap;

use indexmap::IndexSet;

use crate::DataError;

/// Label of a cluster. Labels need neither start at zero nor be contiguous.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(transparent)]
pub struct ClusterId(i64);
impl ClusterId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }
    pub const fn value(self) -> i64 {
        self.0
    }
}
impl From<i64> for ClusterId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// How [`crate::DataSet::rename_clusters`] computes the new labels.
pub enum RenamePolicy<'a> {
    /// Old label to new label. Labels without an entry keep their value;
    /// several old labels may share a new one, which merges those clusters.
    Mapping(HashMap<ClusterId, ClusterId>),
    /// Applied to every row independently.
    Function(Box<dyn Fn(ClusterId) -> Result<ClusterId, String> + 'a>),
    /// Labels are renumbered `0, 1, 2, ...` in the order in which they first
    /// appear in the rows. Makes the numbering independent of the clustering
    /// algorithm.
    Auto,
}
impl<'a> RenamePolicy<'a> {
    pub fn mapping<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<ClusterId>,
        V: Into<ClusterId>,
    {
        Self::Mapping(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
    pub fn function(f: impl Fn(ClusterId) -> ClusterId + 'a) -> Self {
        Self::Function(Box::new(move |label| Ok(f(label))))
    }
    pub fn try_function(f: impl Fn(ClusterId) -> Result<ClusterId, String> + 'a) -> Self {
        Self::Function(Box::new(f))
    }

    /// New label for every entry of `labels`. Either all labels are mapped or
    /// an error is returned.
    pub(crate) fn apply(&self, labels: &[ClusterId]) -> Result<Vec<ClusterId>, DataError> {
        match self {
            RenamePolicy::Mapping(mapping) => {
                let complete = complete_mapping(mapping, labels);
                labels
                    .iter()
                    .map(|label| {
                        complete
                            .get(label)
                            .copied()
                            .ok_or_else(|| DataError::Evaluation {
                                label: *label,
                                message: "no new label defined".into(),
                            })
                    })
                    .collect()
            }
            RenamePolicy::Function(f) => labels
                .iter()
                .map(|&label| f(label).map_err(|message| DataError::Evaluation { label, message }))
                .collect(),
            RenamePolicy::Auto => RenamePolicy::Mapping(auto_mapping(labels)).apply(labels),
        }
    }
}
impl std::fmt::Debug for RenamePolicy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenamePolicy::Mapping(mapping) => f.debug_tuple("Mapping").field(mapping).finish(),
            RenamePolicy::Function(_) => f.write_str("Function(..)"),
            RenamePolicy::Auto => f.write_str("Auto"),
        }
    }
}

/// Distinct labels in order of first occurrence.
pub fn unique_in_order(labels: &[ClusterId]) -> Vec<ClusterId> {
    labels
        .iter()
        .copied()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

// The caller's mapping is left untouched; unmapped labels are added to a copy.
fn complete_mapping(
    mapping: &HashMap<ClusterId, ClusterId>,
    labels: &[ClusterId],
) -> HashMap<ClusterId, ClusterId> {
    let unique = unique_in_order(labels);
    let mut complete = HashMap::with_capacity(unique.len());
    for label in unique {
        complete.insert(label, mapping.get(&label).copied().unwrap_or(label));
    }
    complete
}

fn auto_mapping(labels: &[ClusterId]) -> HashMap<ClusterId, ClusterId> {
    unique_in_order(labels)
        .into_iter()
        .enumerate()
        .map(|(i, label)| (label, ClusterId::new(i as i64)))
        .collect()
}

#[cfg(test)]
fn ids(values: &[i64]) -> Vec<ClusterId> {
    values.iter().copied().map(ClusterId::new).collect()
}

#[test]
fn auto_follows_first_occurrence() {
    let renamed = RenamePolicy::Auto.apply(&ids(&[5, 5, 3, 3, 5, 7])).unwrap();
    assert_eq!(renamed, ids(&[0, 0, 1, 1, 0, 2]));
}
#[test]
fn auto_is_idempotent() {
    let once = RenamePolicy::Auto.apply(&ids(&[9, 2, 2, 4, 9, 1])).unwrap();
    let twice = RenamePolicy::Auto.apply(&once).unwrap();
    assert_eq!(once, twice);
}
#[test]
fn mapping_keeps_unmapped_labels() {
    let policy = RenamePolicy::mapping([(1, 10)]);
    let renamed = policy.apply(&ids(&[1, 2, 3, 1])).unwrap();
    assert_eq!(renamed, ids(&[10, 2, 3, 10]));
}
#[test]
fn mapping_merges_clusters() {
    let policy = RenamePolicy::mapping([(1, 0), (2, 0), (3, 1)]);
    let renamed = policy.apply(&ids(&[1, 2, 3, 2])).unwrap();
    assert_eq!(renamed, ids(&[0, 0, 1, 0]));
    assert_eq!(unique_in_order(&renamed), ids(&[0, 1]));
}
#[test]
fn mapping_is_not_extended_in_place() {
    let policy = RenamePolicy::mapping([(1, 0)]);
    policy.apply(&ids(&[1, 2, 3])).unwrap();
    match policy {
        RenamePolicy::Mapping(mapping) => assert_eq!(mapping.len(), 1),
        _ => unreachable!(),
    }
}
#[test]
fn function_is_applied_per_row() {
    let policy = RenamePolicy::function(|c| ClusterId::new(c.value() - 1));
    let renamed = policy.apply(&ids(&[1, 10, 3])).unwrap();
    assert_eq!(renamed, ids(&[0, 9, 2]));
}
#[test]
fn function_error_names_label() {
    let policy = RenamePolicy::try_function(|c| {
        if c.value() == 3 {
            Err("three is not allowed".into())
        } else {
            Ok(c)
        }
    });
    match policy.apply(&ids(&[1, 3])).unwrap_err() {
        DataError::Evaluation { label, message } => {
            assert_eq!(label, ClusterId::new(3));
            assert_eq!(message, "three is not allowed");
        }
        other => panic!("unexpected error {other:?}"),
    }
}
