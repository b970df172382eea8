/// Data layer: manifests in, `(image, text)` samples out.
///
/// Architecture:
/// ```text
///  captions.jsonl            <split>.csv             *data.csv (raw)
///        │                        │                        │
///        ▼                        ▼                        ▼
///   ┌─────────────────┐   ┌────────────────┐        ┌──────────┐
///   │ ManifestDataset │   │ TabularDataset │        │  filter  │  drop rows whose
///   └─────────────────┘   └────────────────┘        └──────────┘  image won't decode
///        │  selection            │                        │
///        ▼                       ▼                        ▼
///   ┌─────────────────────────────────┐             <split>.csv (clean)
///   │ ImageTextDataset::get(index)    │  decoder → ImageTensor,
///   │   → Sample { image, target }    │  then user transforms
///   └─────────────────────────────────┘
/// ```

pub mod dataset;
pub mod decoder;
pub mod error;
pub mod filter;
pub mod manifest;
pub mod model;
pub mod selection;
pub mod tabular;
pub mod transform;
