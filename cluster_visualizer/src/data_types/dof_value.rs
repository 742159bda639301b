use std::fmt;

/// Finite value of a parameter column. Totally ordered, so distinct values
/// and slice keys can live in sorted sets and maps.
#[derive(serde::Deserialize, serde::Serialize, Clone, Copy, PartialEq, Debug)]
pub(crate) struct DofValue(f64);
impl DofValue {
    /// `None` for NaN and infinities.
    pub(crate) fn new_checked(f: f64) -> Option<Self> {
        f.is_finite().then_some(Self(f))
    }
    pub(crate) fn new(f: f64) -> Self {
        debug_assert!(f.is_finite());
        Self(f)
    }

    pub(crate) fn inner(&self) -> f64 {
        self.0
    }
}
impl Eq for DofValue {}
impl PartialOrd for DofValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DofValue {
    // -0.0 and 0.0 are one slice
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .partial_cmp(&other.0)
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}
/// Two decimals, as shown in subplot titles.
impl fmt::Display for DofValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[test]
fn ordering_treats_signed_zeros_alike() {
    let mut values = [2.5, -0.0, 0.0, -1.0]
        .into_iter()
        .map(DofValue::new)
        .collect::<Vec<_>>();
    values.sort();
    values.dedup();
    assert_eq!(
        values.iter().map(DofValue::inner).collect::<Vec<_>>(),
        vec![-1.0, -0.0, 2.5]
    );
    assert!(DofValue::new_checked(f64::NAN).is_none());
    assert!(DofValue::new_checked(f64::INFINITY).is_none());
}
#[test]
fn displays_two_decimals() {
    assert_eq!(DofValue::new(1.0 / 3.0).to_string(), "0.33");
    assert_eq!(DofValue::new(-2.0).to_string(), "-2.00");
    assert_eq!(format!("sr={}", DofValue::new(0.126)), "sr=0.13");
}
