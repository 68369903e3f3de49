use crate::analysis::ContrastParams;
use crate::io::geojson::{AnchorFields, TextFields};
use crate::partition::SearchStrategy;
use crate::projection::Crs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct ContrastToolConfig {
    pub anchors: AnchorInputConfig,
    pub texts: TextInputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

impl ContrastToolConfig {
    /// Resolve optional overrides onto [`ContrastParams::default`].
    pub fn resolve_params(&self) -> Result<ContrastParams, String> {
        self.analysis.resolve()
    }
}

#[derive(Debug, Deserialize)]
pub struct AnchorInputConfig {
    pub path: PathBuf,
    pub label_field: Option<String>,
    pub map_id_field: Option<String>,
    /// Used when the file does not declare a CRS.
    pub crs: Option<String>,
}

impl AnchorInputConfig {
    pub fn fields(&self) -> AnchorFields {
        let mut fields = AnchorFields::default();
        if let Some(v) = &self.label_field {
            fields.label = v.clone();
        }
        if let Some(v) = &self.map_id_field {
            fields.map_id = v.clone();
        }
        fields
    }

    pub fn default_crs(&self) -> Result<Crs, String> {
        parse_crs(self.crs.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct TextInputConfig {
    pub path: PathBuf,
    pub text_field: Option<String>,
    pub map_id_field: Option<String>,
    pub crs: Option<String>,
}

impl TextInputConfig {
    pub fn fields(&self) -> TextFields {
        let mut fields = TextFields::default();
        if let Some(v) = &self.text_field {
            fields.text = v.clone();
        }
        if let Some(v) = &self.map_id_field {
            fields.map_id = v.clone();
        }
        fields
    }

    pub fn default_crs(&self) -> Result<Crs, String> {
        parse_crs(self.crs.as_deref())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub target_label: Option<String>,
    pub max_distance: Option<f64>,
    pub top_n: Option<usize>,
    /// `false` selects the brute-force scan.
    pub spatial_index: Option<bool>,
    pub parallel: Option<bool>,
    pub map_ids: Option<Vec<String>>,
    pub planar_crs: Option<String>,
    /// `false` requires both layers to arrive in the same CRS.
    pub reproject: Option<bool>,
}

impl AnalysisConfig {
    pub fn resolve(&self) -> Result<ContrastParams, String> {
        let mut params = ContrastParams::default();
        if let Some(v) = &self.target_label {
            params.partition.target_label = v.clone();
        }
        if let Some(v) = self.max_distance {
            params.partition.max_distance = v;
        }
        if let Some(v) = self.top_n {
            params.top_n = v;
        }
        params.partition.strategy = if self.spatial_index.unwrap_or(true) {
            SearchStrategy::RTree
        } else {
            SearchStrategy::BruteForce
        };
        if let Some(v) = self.parallel {
            params.partition.parallel = v;
        }
        params.map_ids = self.map_ids.clone();
        if let Some(v) = &self.planar_crs {
            let crs = parse_crs(Some(v))?;
            if !crs.is_planar() {
                return Err(format!("planar_crs must be a projected CRS, got {crs}"));
            }
            params.planar_crs = crs;
        }
        if let Some(v) = self.reproject {
            params.reproject = v;
        }
        Ok(params)
    }
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
    #[serde(default = "default_report_json")]
    pub report_json: PathBuf,
}

fn default_report_json() -> PathBuf {
    PathBuf::from("contrast.json")
}

impl OutputConfig {
    pub fn report_path(&self) -> PathBuf {
        resolve_path(&self.dir, &self.report_json)
    }
}

pub fn load_config(path: &Path) -> Result<ContrastToolConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

/// Missing CRS means geographic WGS84, the usual GeoJSON default.
fn parse_crs(name: Option<&str>) -> Result<Crs, String> {
    match name {
        None => Ok(Crs::Wgs84),
        Some(s) => s.parse::<Crs>().map_err(|e| e.to_string()),
    }
}

fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
