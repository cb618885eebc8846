use crate::types::Config;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Missing file falls back to built-in defaults; a malformed one is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("{} not found, using default configuration", path.display());
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        Self::load(path)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let far = self.projection.far_ratio;
        if !(far > 0.0 && far <= 1.0) {
            bail!("projection.far_ratio must be in (0, 1], got {}", far);
        }
        if self.video.batch_size == 0 {
            bail!("video.batch_size must be at least 1");
        }
        if self.video.fourcc.chars().count() != 4 {
            bail!("video.fourcc must be 4 characters, got {:?}", self.video.fourcc);
        }

        let k = self.preprocessing.blur_kernel;
        if k <= 0 || k % 2 == 0 {
            bail!("preprocessing.blur_kernel must be odd and positive, got {}", k);
        }
        if self.preprocessing.canny_low > self.preprocessing.canny_high {
            bail!(
                "preprocessing.canny_low ({}) exceeds canny_high ({})",
                self.preprocessing.canny_low,
                self.preprocessing.canny_high
            );
        }

        if self.region.vertices.len() < 3 {
            bail!(
                "region.vertices needs at least 3 points, got {}",
                self.region.vertices.len()
            );
        }
        if self
            .region
            .vertices
            .iter()
            .flatten()
            .any(|v| !(0.0..=1.0).contains(v))
        {
            bail!("region.vertices must be fractions in [0, 1]");
        }

        if self.hough.rho <= 0.0 || self.hough.theta_deg <= 0.0 {
            bail!("hough.rho and hough.theta_deg must be positive");
        }
        if self.render.thickness <= 0 {
            bail!("render.thickness must be positive");
        }
        Ok(())
    }
}
