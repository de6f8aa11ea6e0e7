use pursuit_core::{VertexError, VertexTable};
use pursuit_kinematics::SamplingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "vertex-pursuit.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid vertex table: {0}")]
    Vertices(#[from] VertexError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Pipeline configuration, read from TOML.
///
/// Only `[segmentation]` is required; a run without a vertex table cannot
/// start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub workers: WorkersConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `SHSA_<participant>_<trial>.csv` files.
    pub trajectories_dir: PathBuf,
    /// Consensus evaluation CSV.
    pub evaluations: PathBuf,
    /// Master dataset CSV to write.
    pub output: PathBuf,
    /// Optional JSON run summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            trajectories_dir: PathBuf::from("data/raw/trajectories"),
            evaluations: PathBuf::from("data/raw/softData-v02.csv"),
            output: PathBuf::from("data/processed/master_dataset.csv"),
            summary: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Five `[x, y]` pairs: start circle, then the four boundary vertices.
    pub vertices: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    /// Worker threads; 0 leaves the choice to rayon (`RAYON_NUM_THREADS`
    /// or one per core).
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    pub enabled: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl PipelineConfig {
    /// Config with default paths and the given vertex table.
    pub fn with_vertices(vertices: Vec<[f64; 2]>) -> Self {
        Self {
            paths: PathsConfig::default(),
            segmentation: SegmentationConfig { vertices },
            workers: WorkersConfig::default(),
            sampling: SamplingConfig::default(),
            features: FeaturesConfig::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads `vertex-pursuit.toml` from the working directory.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn vertex_table(&self) -> Result<VertexTable, ConfigError> {
        Ok(VertexTable::from_pairs(&self.segmentation.vertices)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.vertex_table()?;
        let sampling = &self.sampling;
        if !(sampling.nominal_interval_s.is_finite() && sampling.nominal_interval_s > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sampling.nominal_interval_s must be > 0, got {}",
                sampling.nominal_interval_s
            )));
        }
        if !(sampling.gap_factor.is_finite() && sampling.gap_factor >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "sampling.gap_factor must be >= 1, got {}",
                sampling.gap_factor
            )));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
