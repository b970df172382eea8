use std::fmt;
use std::path::{Path, PathBuf};

use super::dataset::{check_index, ImageTextDataset};
use super::error::{DatasetError, Result};
use super::model::Target;
use super::transform::Transforms;
use crate::config::{RocoLayout, RowPolicy};

/// Columns of a split CSV: index, image filename, caption.
const ROW_WIDTH: usize = 3;

/// A CSV row left out of the dataset because it did not have three columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    /// 1-based line in the CSV file.
    pub line: u64,
    pub fields: Vec<String>,
}

/// One row of a split CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRow {
    pub id: String,
    pub filename: String,
    pub caption: String,
}

/// Write rows in the split CSV format, header included.
pub fn write_csv(path: &Path, rows: &[TabularRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| DatasetError::csv(path, e))?;
    writer
        .write_record(["id", "name", "caption"])
        .map_err(|e| DatasetError::csv(path, e))?;
    for row in rows {
        writer
            .write_record([&row.id, &row.filename, &row.caption])
            .map_err(|e| DatasetError::csv(path, e))?;
    }
    writer.flush().map_err(|e| DatasetError::io(path, e))
}

/// Image-caption pairs from a per-split CSV (ROCO style). The caption column
/// is used as-is, so there is no selection policy.
#[derive(Debug)]
pub struct TabularDataset {
    split: String,
    split_dir: PathBuf,
    image_paths: Vec<PathBuf>,
    captions: Vec<String>,
    malformed: Vec<MalformedRow>,
    transforms: Transforms,
}

impl TabularDataset {
    /// Build from `root/<split>/radiology/<split>.csv`, skipping malformed rows.
    pub fn new(root: impl AsRef<Path>, split: &str, transforms: Transforms) -> Result<Self> {
        Self::with_layout(root, split, &RocoLayout::default(), RowPolicy::Skip, transforms)
    }

    pub fn with_layout(
        root: impl AsRef<Path>,
        split: &str,
        layout: &RocoLayout,
        policy: RowPolicy,
        transforms: Transforms,
    ) -> Result<Self> {
        transforms.validate()?;

        let split_dir = layout.split_dir(root.as_ref(), split);
        let csv_path = split_dir.join(format!("{split}.csv"));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&csv_path)
            .map_err(|e| DatasetError::csv(&csv_path, e))?;

        let mut image_paths = Vec::new();
        let mut captions = Vec::new();
        let mut malformed = Vec::new();

        for result in reader.records() {
            let record = result.map_err(|e| DatasetError::csv(&csv_path, e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if record.len() != ROW_WIDTH {
                let row = MalformedRow {
                    line,
                    fields: record.iter().map(str::to_string).collect(),
                };
                match policy {
                    RowPolicy::Fail => {
                        return Err(DatasetError::ManifestParse {
                            path: csv_path,
                            line,
                            msg: format!("expected {ROW_WIDTH} columns, found {}", record.len()),
                        });
                    }
                    RowPolicy::Skip => {
                        log::warn!(
                            "{}:{line}: skipping row with {} columns: {:?}",
                            csv_path.display(),
                            record.len(),
                            row.fields
                        );
                        malformed.push(row);
                        continue;
                    }
                }
            }

            image_paths.push(layout.image_path(&split_dir, &record[1]));
            captions.push(record[2].trim().to_string());
        }

        log::info!(
            "Loaded {} rows from {} ({} malformed)",
            captions.len(),
            csv_path.display(),
            malformed.len()
        );

        Ok(TabularDataset {
            split: split.to_string(),
            split_dir,
            image_paths,
            captions,
            malformed,
            transforms,
        })
    }

    pub fn split(&self) -> &str {
        &self.split
    }

    /// `root/<split>/<modality>`, the directory holding the CSV and images.
    pub fn root(&self) -> &Path {
        &self.split_dir
    }

    pub fn image_paths(&self) -> &[PathBuf] {
        &self.image_paths
    }

    pub fn captions(&self) -> &[String] {
        &self.captions
    }

    /// Rows skipped under [`RowPolicy::Skip`].
    pub fn malformed_rows(&self) -> &[MalformedRow] {
        &self.malformed
    }
}

impl ImageTextDataset for TabularDataset {
    fn len(&self) -> usize {
        self.captions.len()
    }

    fn image_path(&self, index: usize) -> Result<&Path> {
        check_index(index, self.len())?;
        Ok(self.image_paths[index].as_path())
    }

    fn load_target(&self, index: usize) -> Result<Target> {
        check_index(index, self.len())?;
        Ok(Target::Text(self.captions[index].clone()))
    }

    fn transforms(&self) -> &Transforms {
        &self.transforms
    }
}

impl fmt::Display for TabularDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset TabularDataset")?;
        writeln!(f, "    Number of datapoints: {}", self.len())?;
        writeln!(f, "    Root location: {}", self.split_dir.display())?;
        write!(f, "    Split: {}", self.split)
    }
}
