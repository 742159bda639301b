use std::path::Path;

use cluster_data::{OverwritePolicy, DEFAULT_CLUSTER_COLUMN};
use serde::{Deserialize, Serialize};

use crate::{
    palette::{Color, Marker, DEFAULT_COLORS, DEFAULT_MARKERS},
    render::DEFAULT_PIXELS_PER_UNIT,
    PlotOptions,
};

pub const DEFAULT_CONFIG_FILE: &str = "cluster_visualizer.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(default = "PlotConfig::default_max_subplots")]
    pub max_subplots: usize,
    #[serde(default = "PlotConfig::default_max_columns")]
    pub max_columns: usize,
    /// Width and height of one subplot in inches.
    #[serde(default = "PlotConfig::default_subplot_size")]
    pub subplot_size: [f32; 2],
    #[serde(default = "PlotConfig::default_pixels_per_unit")]
    pub pixels_per_unit: u32,
    #[serde(default = "PlotConfig::default_colors")]
    pub colors: Vec<Color>,
    #[serde(default = "PlotConfig::default_markers")]
    pub markers: Vec<Marker>,
}

impl PlotConfig {
    fn default_max_subplots() -> usize {
        16
    }
    fn default_max_columns() -> usize {
        4
    }
    fn default_subplot_size() -> [f32; 2] {
        [4.0, 4.0]
    }
    fn default_pixels_per_unit() -> u32 {
        DEFAULT_PIXELS_PER_UNIT
    }
    fn default_colors() -> Vec<Color> {
        DEFAULT_COLORS.to_vec()
    }
    fn default_markers() -> Vec<Marker> {
        DEFAULT_MARKERS.to_vec()
    }

    pub fn options(&self) -> PlotOptions {
        let [width, height] = self.subplot_size;
        PlotOptions {
            colors: Some(self.colors.clone()),
            markers: Some(self.markers.clone()),
            max_subplots: self.max_subplots,
            max_columns: self.max_columns,
            subplot_size: (width, height),
            pixels_per_unit: self.pixels_per_unit,
            ..Default::default()
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            max_subplots: Self::default_max_subplots(),
            max_columns: Self::default_max_columns(),
            subplot_size: Self::default_subplot_size(),
            pixels_per_unit: Self::default_pixels_per_unit(),
            colors: Self::default_colors(),
            markers: Self::default_markers(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "DataConfig::default_cluster_column")]
    pub cluster_column: String,
    #[serde(default)]
    pub overwrite: OverwritePolicy,
}

impl DataConfig {
    fn default_cluster_column() -> String {
        DEFAULT_CLUSTER_COLUMN.to_string()
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            cluster_column: Self::default_cluster_column(),
            overwrite: OverwritePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub plot: PlotConfig,
    #[serde(default)]
    pub data: DataConfig,
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads `path`; a missing or broken file gives the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at '{}', using defaults.", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml(&contents) {
                Ok(config) => {
                    tracing::debug!("Loaded config from '{}'.", path.display());
                    config
                }
                Err(err) => {
                    tracing::warn!(
                        "Failed to parse config '{}': {err}. Using defaults.",
                        path.display()
                    );
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!(
                    "Failed to read config '{}': {err}. Using defaults.",
                    path.display()
                );
                Self::default()
            }
        }
    }
}

#[test]
fn missing_sections_take_defaults() {
    let config = AppConfig::from_toml(
        r##"
[plot]
max_subplots = 9
colors = ["blue", "#ff8800"]
markers = ["square", "diamond"]

[data]
overwrite = "raise"
"##,
    )
    .unwrap();
    assert_eq!(config.plot.max_subplots, 9);
    assert_eq!(config.plot.max_columns, 4);
    assert_eq!(config.plot.colors, vec![Color::BLUE, Color::rgb(255, 136, 0)]);
    assert_eq!(config.plot.markers, vec![Marker::Square, Marker::Diamond]);
    assert_eq!(config.data.cluster_column, "cluster");
    assert_eq!(config.data.overwrite, OverwritePolicy::Raise);
}
#[test]
fn config_roundtrips_through_toml() {
    let config = AppConfig::default();
    let text = toml::to_string_pretty(&config).unwrap();
    assert_eq!(AppConfig::from_toml(&text).unwrap(), config);
}
#[test]
fn broken_files_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        AppConfig::load_or_default(dir.path().join("missing.toml")),
        AppConfig::default()
    );
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[plot]\nmax_subplots = \"many\"\n").unwrap();
    assert_eq!(AppConfig::load_or_default(&path), AppConfig::default());
    std::fs::write(&path, "[plot]\nmax_columns = 2\n").unwrap();
    assert_eq!(AppConfig::load_or_default(&path).plot.max_columns, 2);
}
#[test]
fn options_follow_config() {
    let mut config = PlotConfig::default();
    config.subplot_size = [3.0, 2.5];
    config.max_columns = 2;
    let options = config.options();
    assert_eq!(options.subplot_size, (3.0, 2.5));
    assert_eq!(options.max_columns, 2);
    assert_eq!(options.colors.as_deref(), Some(&DEFAULT_COLORS[..]));
}
