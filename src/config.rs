use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ChartError, ChartResult};
use crate::plot::types::check_figure_size;

/// File name looked up in the working directory before the user config dir.
pub const LOCAL_CONFIG_FILE: &str = "concept-charts.toml";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub style: StyleConfig,
    pub output: OutputConfig,
}

/// Figure styling shared by every chart.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    /// Pixel size of the phases figure.
    pub phase_width: u32,
    pub phase_height: u32,
    /// Side of the square polar area of the conference figure.
    pub conference_size: u32,
    pub font_family: String,
    /// Regular and bold font files, relative to `output.assets_dir`.
    pub font_file: PathBuf,
    pub bold_font_file: Option<PathBuf>,
    /// Base label font size in pixels; other sizes scale from it.
    pub label_size: u32,
    /// Text needs a system font. Disable to render shapes and images only.
    pub draw_text: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            phase_width: 1000,
            phase_height: 600,
            conference_size: 500,
            font_family: "sans-serif".to_string(),
            font_file: PathBuf::from("fonts/DejaVuSans.ttf"),
            bold_font_file: Some(PathBuf::from("fonts/DejaVuSans-Bold.ttf")),
            label_size: 18,
            draw_text: true,
        }
    }
}

impl StyleConfig {
    /// Font size `scale` times the base label size, at least one pixel.
    pub fn font_size(&self, scale: f64) -> u32 {
        ((self.label_size as f64 * scale).round() as u32).max(1)
    }

    /// Reject figure sizes no chart can be rendered at. The titled
    /// conference variant adds a header of a fifth of its side.
    pub fn validate(&self) -> ChartResult<()> {
        let conference_height = self.conference_size.saturating_add(self.conference_size / 5);
        check_figure_size(self.phase_width, self.phase_height)
            .and_then(|_| check_figure_size(self.conference_size, conference_height))
            .map_err(|e| ChartError::config(format!("style: {}", e.message)))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the PNG files are written to.
    pub output_dir: PathBuf,
    /// Root for emoji and logo image paths.
    pub assets_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("Output"),
            assets_dir: PathBuf::from("Resources"),
        }
    }
}

impl OutputConfig {
    pub fn asset(&self, relative: &Path) -> PathBuf {
        self.assets_dir.join(relative)
    }
}

/// Get the user config directory for this tool (~/.config/concept-charts/).
pub fn config_dir() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("concept-charts"))
}

/// Candidate config files, in lookup order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = config_dir() {
        paths.push(dir.join("config.toml"));
    }
    paths
}

/// Load the first config file that exists, or defaults when there is none.
pub fn load_config() -> ChartResult<Config> {
    for path in config_paths() {
        if path.exists() {
            return load_config_from(&path);
        }
    }
    Ok(Config::default())
}

/// Load config from an explicit path. A present but malformed file is an error.
pub fn load_config_from(path: &Path) -> ChartResult<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ChartError::config(format!("read {}: {}", path.display(), e)))?;
    parse_config(&content)
        .map_err(|e| ChartError::config(format!("{}: {}", path.display(), e.message)))
}

pub fn parse_config(content: &str) -> ChartResult<Config> {
    let config: Config = toml::from_str(content).map_err(|e| ChartError::config(e.to_string()))?;
    config.style.validate()?;
    Ok(config)
}
