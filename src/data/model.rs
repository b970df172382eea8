use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use image::RgbImage;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::error::DatasetError;

// ---------------------------------------------------------------------------
// SectionValue – one value inside a caption mapping
// ---------------------------------------------------------------------------

/// A dynamically-typed caption section. Report sections are text, but
/// manifests also carry numeric ids, flags and nested metadata next to them.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Arrays and objects, kept as-is so they can be written back.
    Nested(JsonValue),
    Null,
}

impl SectionValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SectionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            SectionValue::Text(s) => JsonValue::String(s.clone()),
            SectionValue::Integer(i) => JsonValue::from(*i),
            SectionValue::Float(f) => JsonValue::from(*f),
            SectionValue::Bool(b) => JsonValue::Bool(*b),
            SectionValue::Nested(v) => v.clone(),
            SectionValue::Null => JsonValue::Null,
        }
    }
}

impl From<&JsonValue> for SectionValue {
    fn from(val: &JsonValue) -> Self {
        match val {
            JsonValue::String(s) => SectionValue::Text(s.clone()),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SectionValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    SectionValue::Float(f)
                } else {
                    SectionValue::Nested(val.clone())
                }
            }
            JsonValue::Bool(b) => SectionValue::Bool(*b),
            JsonValue::Null => SectionValue::Null,
            other => SectionValue::Nested(other.clone()),
        }
    }
}

impl fmt::Display for SectionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionValue::Text(s) => write!(f, "{s}"),
            SectionValue::Integer(i) => write!(f, "{i}"),
            SectionValue::Float(v) => write!(f, "{v}"),
            SectionValue::Bool(b) => write!(f, "{b}"),
            SectionValue::Nested(v) => write!(f, "{v}"),
            SectionValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Caption – ordered section name → value mapping
// ---------------------------------------------------------------------------

/// The caption mapping of one manifest record, in source-file key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Caption {
    sections: Vec<(String, SectionValue)>,
}

impl Caption {
    pub fn from_json_map(map: &JsonMap<String, JsonValue>) -> Self {
        map.iter()
            .map(|(k, v)| (k.clone(), SectionValue::from(v)))
            .collect()
    }

    pub fn to_json_map(&self) -> JsonMap<String, JsonValue> {
        self.sections
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&SectionValue> {
        self.sections
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// The section's text, or `None` if it is absent or not a string.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(SectionValue::as_text)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &SectionValue)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Text-valued sections only, in key order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().filter_map(|(_, v)| v.as_text())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl FromIterator<(String, SectionValue)> for Caption {
    /// Later duplicates overwrite the value but keep the first position,
    /// the same way a JSON object is read.
    fn from_iter<I: IntoIterator<Item = (String, SectionValue)>>(iter: I) -> Self {
        let mut sections: Vec<(String, SectionValue)> = Vec::new();
        for (key, value) in iter {
            match sections.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => sections.push((key, value)),
            }
        }
        Caption { sections }
    }
}

// ---------------------------------------------------------------------------
// Target – the text half of a sample
// ---------------------------------------------------------------------------

/// Text produced for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Text(String),
    /// Section name → text, used when several report sections are kept.
    Sections(BTreeMap<String, String>),
}

impl Target {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Target::Text(s) => Some(s),
            Target::Sections(_) => None,
        }
    }

    pub fn section(&self, name: &str) -> Option<&str> {
        match self {
            Target::Text(_) => None,
            Target::Sections(map) => map.get(name).map(String::as_str),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Text(s) => write!(f, "{s}"),
            Target::Sections(map) => {
                let mut first = true;
                for (name, text) in map {
                    if !first {
                        write!(f, " | ")?;
                    }
                    write!(f, "{name}: {text}")?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SelectionMode
// ---------------------------------------------------------------------------

/// How a caption mapping is reduced to a [`Target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// The longest text section.
    #[default]
    Longest,
    /// The impression and/or findings sections, falling back to `Longest`.
    Docs,
}

impl FromStr for SelectionMode {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "longest" => Ok(SelectionMode::Longest),
            "docs" => Ok(SelectionMode::Docs),
            other => Err(DatasetError::Configuration(format!(
                "invalid mode '{other}', expected 'longest' or 'docs'"
            ))),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Longest => write!(f, "longest"),
            SelectionMode::Docs => write!(f, "docs"),
        }
    }
}

// ---------------------------------------------------------------------------
// ImageTensor – decoded RGB pixels, channel-first
// ---------------------------------------------------------------------------

pub const RGB_CHANNELS: usize = 3;

/// 8-bit RGB pixels in `[C, H, W]` planar layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTensor {
    data: Vec<u8>,
    height: usize,
    width: usize,
}

impl ImageTensor {
    /// Convert interleaved `[H, W, C]` pixels to planar `[C, H, W]`.
    pub fn from_rgb(img: &RgbImage) -> Self {
        let (w, h) = img.dimensions();
        let npix = w as usize * h as usize;
        let raw = img.as_raw();
        let mut data = vec![0u8; RGB_CHANNELS * npix];
        for i in 0..npix {
            data[i] = raw[i * 3];
            data[npix + i] = raw[i * 3 + 1];
            data[2 * npix + i] = raw[i * 3 + 2];
        }
        ImageTensor {
            data,
            height: h as usize,
            width: w as usize,
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        [RGB_CHANNELS, self.height, self.width]
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, channel: usize, y: usize, x: usize) -> Option<u8> {
        if channel >= RGB_CHANNELS || y >= self.height || x >= self.width {
            return None;
        }
        self.data
            .get(channel * self.height * self.width + y * self.width + x)
            .copied()
    }

    /// Values scaled to `[0, 1]`, same layout.
    pub fn to_f32(&self) -> Vec<f32> {
        self.data.iter().map(|&v| v as f32 / 255.0).collect()
    }
}

/// One `(image, text)` pair as handed to a training loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub image: ImageTensor,
    pub target: Target,
}
