//! Writes a small synthetic dataset tree for trying out the loaders:
//!
//! ```text
//! sample_data/
//!   roco/<split>/radiology/{images/*.png, <raw>.csv}
//!   mimic/{images/*.png, captions.jsonl}
//! ```
//!
//! Each ROCO split gets one corrupt image so `medclip-data filter` has
//! something to drop.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};

use medclip_data::data::manifest::write_jsonl;
use medclip_data::{Caption, FilterConfig, ManifestEntry, SectionValue};

const IMAGE_SIZE: u32 = 32;

const FINDINGS: [&str; 4] = [
    "The lungs are clear without focal consolidation.",
    "Mild cardiomegaly with small bilateral pleural effusions.",
    "No pneumothorax. Stable postoperative changes of the sternum.",
    "Patchy opacity in the right lower lobe.",
];

const IMPRESSIONS: [&str; 4] = [
    "No acute cardiopulmonary process.",
    "Congestive heart failure.",
    "No acute findings.",
    "Right lower lobe pneumonia.",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// Grey-ish noise with a bright blob, loosely resembling a radiograph.
fn synthetic_scan(rng: &mut SimpleRng) -> RgbImage {
    let cx = rng.below(IMAGE_SIZE as usize) as i64;
    let cy = rng.below(IMAGE_SIZE as usize) as i64;
    RgbImage::from_fn(IMAGE_SIZE, IMAGE_SIZE, |x, y| {
        let d2 = (x as i64 - cx).pow(2) + (y as i64 - cy).pow(2);
        let base = if d2 < 40 { 200 } else { 60 };
        let v = (base + rng.below(40)) as u8;
        Rgb([v, v, v])
    })
}

fn write_roco(root: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let config = FilterConfig::default();
    let mut total = 0;

    for split in &config.splits {
        let split_dir = config.layout.split_dir(root, &split.name);
        let images = split_dir.join(&config.layout.images_dir);
        fs::create_dir_all(&images).with_context(|| format!("creating {}", images.display()))?;

        let mut writer = csv::Writer::from_path(split_dir.join(&split.input))?;
        writer.write_record(["id", "name", "caption"])?;

        for i in 0..6 {
            let name = format!("ROCO_{}_{i:04}.png", split.name);
            let path = images.join(&name);
            if i == 3 {
                fs::write(&path, b"truncated download")?;
            } else {
                synthetic_scan(rng).save(&path)?;
            }
            let caption = format!(
                " {}, {} ",
                FINDINGS[rng.below(4)],
                IMPRESSIONS[rng.below(4)]
            );
            writer.write_record([format!("{}_{i}", split.name), name, caption])?;
            total += 1;
        }
        writer.flush()?;
    }
    Ok(total)
}

fn text(s: &str) -> SectionValue {
    SectionValue::Text(s.to_string())
}

fn write_mimic(root: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let images = root.join("images");
    fs::create_dir_all(&images).with_context(|| format!("creating {}", images.display()))?;

    let mut entries = Vec::new();
    for i in 0..8 {
        let rel = format!("images/p{i:02}_frontal.png");
        synthetic_scan(rng).save(root.join(&rel))?;

        let mut sections = vec![("study_id".to_string(), SectionValue::Integer(50_000 + i as i64))];
        // Vary which report sections are present so both selection modes
        // have something to do.
        match i % 4 {
            0 => {
                sections.push(("findings".into(), text(FINDINGS[rng.below(4)])));
                sections.push(("impression".into(), text(IMPRESSIONS[rng.below(4)])));
            }
            1 => sections.push(("impression".into(), text(IMPRESSIONS[rng.below(4)]))),
            2 => sections.push(("findings".into(), text(FINDINGS[rng.below(4)]))),
            _ => {
                sections.push(("indication".into(), text("Shortness of breath.")));
                sections.push(("comparison".into(), text("None available.")));
            }
        }
        entries.push(ManifestEntry {
            image_path: rel,
            caption: sections.into_iter().collect::<Caption>(),
        });
    }

    write_jsonl(&root.join("captions.jsonl"), &entries)?;
    Ok(entries.len())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let output = Path::new("sample_data");
    let roco = write_roco(&output.join("roco"), &mut rng)?;
    let mimic = write_mimic(&output.join("mimic"), &mut rng)?;

    println!(
        "Wrote {roco} ROCO rows and {mimic} MIMIC entries to {}",
        output.display()
    );
    Ok(())
}
