use std::io::ErrorKind;
use std::path::Path;

use image::{ImageError, ImageReader};

use super::error::{DatasetError, Result};
use super::model::ImageTensor;

/// Read and decode an image file as 3-channel RGB, whatever its stored mode.
pub fn load_rgb(path: &Path) -> Result<ImageTensor> {
    let img = decode(path).map_err(|source| DatasetError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ImageTensor::from_rgb(&img.to_rgb8()))
}

/// Decode without conversion. The format comes from the file's leading
/// bytes; the extension is only used when those match no known signature.
pub fn decode(path: &Path) -> std::result::Result<image::DynamicImage, ImageError> {
    let reader = ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(ImageError::IoError)?;
    reader.decode()
}

/// Whether `err` means "this file is not a usable image" as opposed to an
/// environment problem (permissions, memory limits) that must surface.
pub fn is_decode_failure(err: &ImageError) -> bool {
    match err {
        ImageError::Decoding(_) | ImageError::Unsupported(_) => true,
        ImageError::IoError(e) => matches!(
            e.kind(),
            ErrorKind::NotFound | ErrorKind::UnexpectedEof | ErrorKind::InvalidData
        ),
        _ => false,
    }
}
