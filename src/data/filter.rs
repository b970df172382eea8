use std::path::Path;

use csv::StringRecord;

use super::decoder;
use super::error::{DatasetError, Result};
use crate::config::{FilterConfig, RocoLayout, SplitFiles};

// ---------------------------------------------------------------------------
// Manifest filter: keep only rows whose image decodes
// ---------------------------------------------------------------------------

/// Outcome of cleaning one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterReport {
    pub split: String,
    pub kept: usize,
    pub dropped: usize,
}

/// Rewrites raw split CSVs into cleaned manifests that only reference
/// decodable images. Rows are copied verbatim; no header is written.
#[derive(Debug, Clone, Default)]
pub struct ManifestFilter {
    config: FilterConfig,
}

impl ManifestFilter {
    pub fn new(config: FilterConfig) -> Self {
        ManifestFilter { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Clean every configured split under `root`, in order.
    pub fn run(&self, root: &Path) -> Result<Vec<FilterReport>> {
        self.config
            .splits
            .iter()
            .map(|split| {
                let split_dir = self.config.layout.split_dir(root, &split.name);
                filter_split(&split_dir, split, &self.config.layout)
            })
            .collect()
    }
}

/// Clean one split directory: read `split.input`, write `split.output`.
///
/// A row is dropped only when its image fails to decode (corrupt, truncated,
/// unsupported or missing). The format is read from the file's content, so a
/// mislabeled extension does not drop a valid image. Any other failure aborts
/// the split.
pub fn filter_split(
    split_dir: &Path,
    split: &SplitFiles,
    layout: &RocoLayout,
) -> Result<FilterReport> {
    let input = split_dir.join(&split.input);
    let output = split_dir.join(&split.output);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(&input)
        .map_err(|e| DatasetError::csv(&input, e))?;

    let mut kept: Vec<StringRecord> = Vec::new();
    let mut dropped = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| DatasetError::csv(&input, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let filename = record.get(1).ok_or_else(|| DatasetError::ManifestParse {
            path: input.clone(),
            line,
            msg: "row has no filename column".to_string(),
        })?;
        let image_path = layout.image_path(split_dir, filename);

        match decoder::decode(&image_path) {
            Ok(_) => kept.push(record),
            Err(e) if decoder::is_decode_failure(&e) => {
                log::debug!("{}: dropping {}: {e}", split.name, image_path.display());
                dropped += 1;
            }
            Err(source) => {
                return Err(DatasetError::ImageDecode {
                    path: image_path,
                    source,
                });
            }
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(&output)
        .map_err(|e| DatasetError::csv(&output, e))?;
    for record in &kept {
        writer
            .write_record(record)
            .map_err(|e| DatasetError::csv(&output, e))?;
    }
    writer.flush().map_err(|e| DatasetError::io(&output, e))?;

    log::info!(
        "{}: kept {} rows, dropped {} -> {}",
        split.name,
        kept.len(),
        dropped,
        output.display()
    );

    Ok(FilterReport {
        split: split.name.clone(),
        kept: kept.len(),
        dropped,
    })
}
