use std::path::Path;

use super::decoder;
use super::error::{DatasetError, Result};
use super::model::{ImageTensor, Sample, Target};
use super::transform::Transforms;

/// Indexed `(image, text)` access shared by the manifest-backed datasets.
///
/// Entries are loaded once at construction; every `get` re-reads and
/// re-decodes the image from disk.
pub trait ImageTextDataset {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Absolute path of the image at `index`.
    fn image_path(&self, index: usize) -> Result<&Path>;

    fn load_target(&self, index: usize) -> Result<Target>;

    fn transforms(&self) -> &Transforms;

    /// Decode the image at `index` as RGB. Decode failures propagate.
    fn load_image(&self, index: usize) -> Result<ImageTensor> {
        decoder::load_rgb(self.image_path(index)?)
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let image = self.load_image(index)?;
        let target = self.load_target(index)?;
        let (image, target) = self.transforms().apply(image, target);
        Ok(Sample { image, target })
    }
}

/// Bounds check shared by the implementations.
pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(DatasetError::IndexOutOfRange { index, len });
    }
    Ok(())
}
