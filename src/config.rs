//! On-disk layout and tool configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::error::{DatasetError, Result};

// ---------------------------------------------------------------------------
// Split directory layout
// ---------------------------------------------------------------------------

/// Where a split's files live under the dataset root:
///
/// ```text
/// root/<split>/<modality>/<split>.csv
/// root/<split>/<modality>/<images_dir>/<filename>
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RocoLayout {
    pub modality: String,
    pub images_dir: String,
}

impl Default for RocoLayout {
    fn default() -> Self {
        RocoLayout {
            modality: "radiology".to_string(),
            images_dir: "images".to_string(),
        }
    }
}

impl RocoLayout {
    pub fn split_dir(&self, root: &Path, split: &str) -> PathBuf {
        root.join(split).join(&self.modality)
    }

    pub fn image_path(&self, split_dir: &Path, filename: &str) -> PathBuf {
        split_dir.join(&self.images_dir).join(filename.trim())
    }
}

// ---------------------------------------------------------------------------
// Malformed CSV rows
// ---------------------------------------------------------------------------

/// What a tabular load does with a row that is not `(index, filename, caption)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Log it, record it, and leave it out of the dataset.
    #[default]
    Skip,
    /// Abort the load.
    Fail,
}

// ---------------------------------------------------------------------------
// Manifest filter
// ---------------------------------------------------------------------------

/// Raw manifest in, cleaned manifest out, for one split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitFiles {
    pub name: String,
    pub input: String,
    pub output: String,
}

impl SplitFiles {
    pub fn new(name: &str, input: &str, output: &str) -> Self {
        SplitFiles {
            name: name.to_string(),
            input: input.to_string(),
            output: output.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub layout: RocoLayout,
    pub splits: Vec<SplitFiles>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            layout: RocoLayout::default(),
            splits: vec![
                SplitFiles::new("train", "traindata.csv", "train.csv"),
                SplitFiles::new("validate", "valdata.csv", "validate.csv"),
                SplitFiles::new("test", "testdata.csv", "test.csv"),
            ],
        }
    }
}

impl FilterConfig {
    /// Load from a JSON file. Absent fields keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| {
            DatasetError::Configuration(format!("{}: {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_splits_match_roco_release() {
        let cfg = FilterConfig::default();
        let names: Vec<&str> = cfg.splits.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["train", "validate", "test"]);
        assert_eq!(cfg.splits[1].input, "valdata.csv");
        assert_eq!(cfg.splits[2].output, "test.csv");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filter.json");
        std::fs::write(
            &path,
            r#"{"splits": [{"name": "train", "input": "raw.csv", "output": "clean.csv"}]}"#,
        )
        .unwrap();

        let cfg = FilterConfig::from_path(&path).unwrap();
        assert_eq!(cfg.layout, RocoLayout::default());
        assert_eq!(cfg.splits, vec![SplitFiles::new("train", "raw.csv", "clean.csv")]);
    }

    #[test]
    fn bad_json_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filter.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            FilterConfig::from_path(&path),
            Err(DatasetError::Configuration(_))
        ));
    }

    #[test]
    fn layout_paths() {
        let layout = RocoLayout::default();
        let split = layout.split_dir(Path::new("/data/roco"), "test");
        assert_eq!(split, Path::new("/data/roco/test/radiology"));
        assert_eq!(
            layout.image_path(&split, " img.jpg "),
            Path::new("/data/roco/test/radiology/images/img.jpg")
        );
    }
}
