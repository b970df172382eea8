use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::dataset::{check_index, ImageTextDataset};
use super::error::{DatasetError, Result};
use super::model::{Caption, SelectionMode, Target};
use super::selection::select_target;
use super::transform::Transforms;

// ---------------------------------------------------------------------------
// JSON-lines records
// ---------------------------------------------------------------------------

/// Wire shape of one manifest line:
///
/// ```json
/// {"image_path": "files/p10/s5/view1.jpg", "caption": {"impression": "...", "findings": "..."}}
/// ```
///
/// Other top-level keys are ignored.
#[derive(Debug, Deserialize, Serialize)]
struct ManifestRecord {
    image_path: String,
    caption: JsonMap<String, JsonValue>,
}

/// One manifest entry with its image path still relative to the dataset root.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub image_path: String,
    pub caption: Caption,
}

/// Write entries as a JSON-lines manifest readable by [`ManifestDataset`].
pub fn write_jsonl(path: &Path, entries: &[ManifestEntry]) -> Result<()> {
    let file = File::create(path).map_err(|e| DatasetError::io(path, e))?;
    let mut out = BufWriter::new(file);
    for entry in entries {
        let record = ManifestRecord {
            image_path: entry.image_path.clone(),
            caption: entry.caption.to_json_map(),
        };
        let line = serde_json::to_string(&record).map_err(|e| DatasetError::io(path, e.into()))?;
        writeln!(out, "{line}").map_err(|e| DatasetError::io(path, e))?;
    }
    out.flush().map_err(|e| DatasetError::io(path, e))
}

// ---------------------------------------------------------------------------
// ManifestDataset
// ---------------------------------------------------------------------------

/// Image-text pairs listed in a JSON-lines manifest (MIMIC-CXR style), with
/// the text chosen from structured report sections.
#[derive(Debug)]
pub struct ManifestDataset {
    root: PathBuf,
    manifest: PathBuf,
    mode: SelectionMode,
    image_paths: Vec<PathBuf>,
    captions: Vec<Caption>,
    transforms: Transforms,
}

impl ManifestDataset {
    /// Build from `root/file_path`. `mode` must be `"longest"` or `"docs"`;
    /// it is checked before the manifest is opened.
    pub fn new(
        root: impl AsRef<Path>,
        file_path: impl AsRef<Path>,
        mode: &str,
        transforms: Transforms,
    ) -> Result<Self> {
        let mode: SelectionMode = mode.parse()?;
        Self::with_mode(root, file_path, mode, transforms)
    }

    pub fn with_mode(
        root: impl AsRef<Path>,
        file_path: impl AsRef<Path>,
        mode: SelectionMode,
        transforms: Transforms,
    ) -> Result<Self> {
        transforms.validate()?;

        let root = root.as_ref().to_path_buf();
        let manifest = root.join(file_path);
        let entries = read_jsonl(&manifest)?;

        let mut image_paths = Vec::with_capacity(entries.len());
        let mut captions = Vec::with_capacity(entries.len());
        for entry in entries {
            image_paths.push(root.join(&entry.image_path));
            captions.push(entry.caption);
        }

        log::info!(
            "Loaded {} entries from {} (mode: {mode})",
            captions.len(),
            manifest.display()
        );

        Ok(ManifestDataset {
            root,
            manifest,
            mode,
            image_paths,
            captions,
            transforms,
        })
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest
    }

    pub fn image_paths(&self) -> &[PathBuf] {
        &self.image_paths
    }

    pub fn captions(&self) -> &[Caption] {
        &self.captions
    }
}

impl ImageTextDataset for ManifestDataset {
    fn len(&self) -> usize {
        self.captions.len()
    }

    fn image_path(&self, index: usize) -> Result<&Path> {
        check_index(index, self.len())?;
        Ok(self.image_paths[index].as_path())
    }

    fn load_target(&self, index: usize) -> Result<Target> {
        check_index(index, self.len())?;
        select_target(&self.captions[index], self.mode)
            .ok_or(DatasetError::EmptyCaption { index })
    }

    fn transforms(&self) -> &Transforms {
        &self.transforms
    }
}

impl fmt::Display for ManifestDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset ManifestDataset")?;
        writeln!(f, "    Number of datapoints: {}", self.len())?;
        writeln!(f, "    Root location: {}", self.root.display())?;
        write!(f, "    Mode: {}", self.mode)
    }
}

/// Parse every line of a JSON-lines manifest. Blank lines are skipped; any
/// other unparsable line aborts the load.
pub fn read_jsonl(path: &Path) -> Result<Vec<ManifestEntry>> {
    let file = File::open(path).map_err(|e| DatasetError::io(path, e))?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i as u64 + 1;
        let line = line.map_err(|e| DatasetError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: ManifestRecord =
            serde_json::from_str(&line).map_err(|e| DatasetError::ManifestParse {
                path: path.to_path_buf(),
                line: line_no,
                msg: e.to_string(),
            })?;

        log::debug!("line {line_no}: {}", record.image_path);
        entries.push(ManifestEntry {
            image_path: record.image_path,
            caption: Caption::from_json_map(&record.caption),
        });
    }
    Ok(entries)
}
