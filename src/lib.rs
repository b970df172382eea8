//! Dataset adapters pairing medical images with caption text for
//! image-text (CLIP-style) training, plus a tool that strips undecodable
//! images from CSV manifests.

pub mod config;
pub mod data;

pub use config::{FilterConfig, RocoLayout, RowPolicy, SplitFiles};
pub use data::dataset::ImageTextDataset;
pub use data::error::{DatasetError, Result};
pub use data::filter::{FilterReport, ManifestFilter};
pub use data::manifest::{ManifestDataset, ManifestEntry};
pub use data::model::{Caption, ImageTensor, Sample, SectionValue, SelectionMode, Target};
pub use data::tabular::{MalformedRow, TabularDataset, TabularRow};
pub use data::transform::Transforms;
