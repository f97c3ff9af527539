use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::AverageColor;
use crate::output::ColorFormat;
use crate::processing::region::{FrameFraction, Sampling, SamplingMode};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SamplingOptions {
    /// `full` averages every pixel, `frame` only the border strips.
    pub mode: SamplingMode,
    /// Frame thickness in percent of the image size; used in `frame` mode.
    pub frame_percent: f64,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            mode: SamplingMode::default(),
            frame_percent: FrameFraction::DEFAULT_PERCENT,
        }
    }
}

impl SamplingOptions {
    pub fn sampling(&self) -> Result<Sampling> {
        let fraction =
            FrameFraction::from_percent(self.frame_percent).context("invalid sampling.frame-percent")?;
        Ok(match self.mode {
            SamplingMode::Full => Sampling::Full,
            SamplingMode::Frame => Sampling::Frame(fraction),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Directory joined in front of every image name.
    pub path_prefix: Option<PathBuf>,
    /// Which pixels contribute to the average.
    pub sampling: SamplingOptions,
    /// Output notation for the resulting color.
    pub format: ColorFormat,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate invariants serde defaults cannot express.
    pub fn validated(self) -> Result<Self> {
        self.sampling.sampling()?;
        Ok(self)
    }

    /// Path of the image called `name`, with the configured prefix applied.
    pub fn resolve(&self, name: &str) -> PathBuf {
        match &self.path_prefix {
            Some(prefix) => prefix.join(name),
            None => PathBuf::from(name),
        }
    }

    pub fn average_color(&self) -> Result<AverageColor> {
        Ok(AverageColor {
            sampling: self.sampling.sampling()?,
            format: self.format,
        })
    }
}
