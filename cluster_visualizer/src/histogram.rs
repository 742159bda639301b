use crate::{figure::AxisLimits, PlotError};

/// Size of a histogram plot in inches.
pub const DEFAULT_HISTOGRAM_SIZE: (f32, f32) = (6., 4.);

/// Bin contents of a single point, ready to be drawn as bars.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Histogram {
    /// One more edge than there are bins.
    pub edges: Vec<f64>,
    pub values: Vec<f64>,
    pub normalized: bool,
    /// In inches.
    pub size: (f32, f32),
}
impl Histogram {
    pub fn bin_count(&self) -> usize {
        self.values.len()
    }
    pub fn midpoints(&self) -> Vec<f64> {
        self.edges.windows(2).map(|e| (e[0] + e[1]) / 2.).collect()
    }
    /// Range of the value axis, always including zero.
    pub fn value_limits(&self) -> AxisLimits {
        let (min, max) = self
            .values
            .iter()
            .fold((0f64, 0f64), |(min, max), &v| (min.min(v), max.max(v)));
        AxisLimits {
            min: min * 1.05,
            max: max * 1.05,
        }
    }
    pub fn pixel_size(&self, pixels_per_unit: u32) -> (u32, u32) {
        let (width, height) = self.size;
        let scale = |inches: f32| ((inches * pixels_per_unit as f32).round() as u32).max(1);
        (scale(width), scale(height))
    }
}

/// Histogram of `contents` over the bins bounded by `binning`, optionally
/// normalized to unit sum.
pub fn plot_histogram(
    binning: &[f64],
    contents: &[f64],
    normalized: bool,
) -> Result<Histogram, PlotError> {
    if contents.is_empty() {
        return Err(PlotError::InvalidArgument("histogram without bins".into()));
    }
    if binning.len() != contents.len() + 1 {
        return Err(PlotError::InvalidArgument(format!(
            "{} bins need {} edges, got {}",
            contents.len(),
            contents.len() + 1,
            binning.len()
        )));
    }
    if binning.iter().any(|e| !e.is_finite()) || binning.windows(2).any(|e| e[0] >= e[1]) {
        return Err(PlotError::InvalidArgument(
            "bin edges must be finite and strictly increasing".into(),
        ));
    }
    if let Some(bin) = contents.iter().position(|c| !c.is_finite()) {
        return Err(PlotError::InvalidArgument(format!(
            "bin {bin} has non-finite content {}",
            contents[bin]
        )));
    }
    let values = if normalized {
        let sum = contents.iter().sum::<f64>();
        if sum == 0. || !sum.is_finite() {
            return Err(PlotError::InvalidArgument(format!(
                "cannot normalize contents summing to {sum}"
            )));
        }
        contents.iter().map(|c| c / sum).collect()
    } else {
        contents.to_vec()
    };
    tracing::debug!("Histogram with {} bins.", values.len());
    Ok(Histogram {
        edges: binning.to_vec(),
        values,
        normalized,
        size: DEFAULT_HISTOGRAM_SIZE,
    })
}

/// Edges `0, 1, ..., bins`.
pub fn uniform_binning(bins: usize) -> Vec<f64> {
    (0..=bins).map(|e| e as f64).collect()
}

#[test]
fn edges_are_one_more_than_contents() {
    let contents = [1., 2., 3.];
    assert!(plot_histogram(&[0., 1., 2., 3.], &contents, false).is_ok());
    for edges in [&[0., 1., 2.][..], &[0., 1., 2., 3., 4.][..]] {
        assert!(matches!(
            plot_histogram(edges, &contents, false),
            Err(PlotError::InvalidArgument(_))
        ));
    }
    assert!(plot_histogram(&[0.], &[], false).is_err());
    assert!(plot_histogram(&[0., 2., 1., 3.], &contents, false).is_err());
    assert!(plot_histogram(&[0., 1., 1., 3.], &contents, false).is_err());
}
#[test]
fn normalization_divides_by_sum() {
    let histogram = plot_histogram(&[0., 1., 2., 4.], &[1., 3., 4.], true).unwrap();
    assert_eq!(histogram.values, vec![0.125, 0.375, 0.5]);
    assert!(histogram.normalized);
    assert_eq!(histogram.midpoints(), vec![0.5, 1.5, 3.]);
    let raw = plot_histogram(&[0., 1., 2., 4.], &[1., 3., 4.], false).unwrap();
    assert_eq!(raw.values, vec![1., 3., 4.]);
    assert!(matches!(
        plot_histogram(&[0., 1., 2.], &[0., 0.], true),
        Err(PlotError::InvalidArgument(_))
    ));
    // zero contents are fine as long as nothing is divided
    assert!(plot_histogram(&[0., 1., 2.], &[0., 0.], false).is_ok());
}
#[test]
fn value_axis_includes_zero() {
    let histogram = plot_histogram(&uniform_binning(2), &[2., 4.], false).unwrap();
    assert_eq!(histogram.edges, vec![0., 1., 2.]);
    let limits = histogram.value_limits();
    assert_eq!(limits.min, 0.);
    assert!((limits.max - 4.2).abs() < 1e-12);
    assert_eq!(histogram.pixel_size(100), (600, 400));
}
