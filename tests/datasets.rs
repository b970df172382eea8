use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};

use medclip_data::data::manifest::{read_jsonl, write_jsonl};
use medclip_data::data::tabular::write_csv;
use medclip_data::{
    Caption, DatasetError, ImageTensor, ImageTextDataset, ManifestDataset, ManifestEntry,
    SectionValue, Target, TabularDataset, TabularRow, Transforms,
};

fn save_png(path: &Path, w: u32, h: u32, value: u8) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbImage::from_pixel(w, h, Rgb([value, value / 2, 0])).save(path).unwrap();
}

fn caption(pairs: &[(&str, SectionValue)]) -> Caption {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn text(s: &str) -> SectionValue {
    SectionValue::Text(s.to_string())
}

fn mimic_fixture(root: &Path) -> Vec<ManifestEntry> {
    let entries = vec![
        ManifestEntry {
            image_path: "images/a.png".into(),
            caption: caption(&[("impression", text("a")), ("findings", text("bbbb"))]),
        },
        ManifestEntry {
            image_path: "images/b.png".into(),
            caption: caption(&[("study", SectionValue::Integer(9)), ("impression", text("x"))]),
        },
        ManifestEntry {
            image_path: "images/c.png".into(),
            caption: caption(&[("indication", text("cough")), ("history", text("smoker, 40y"))]),
        },
    ];
    save_png(&root.join("images/a.png"), 4, 2, 200);
    save_png(&root.join("images/b.png"), 3, 3, 100);
    save_png(&root.join("images/c.png"), 1, 5, 50);
    write_jsonl(&root.join("captions.jsonl"), &entries).unwrap();
    entries
}

#[test]
fn jsonl_round_trip_reproduces_sequences() {
    let dir = tempfile::tempdir().unwrap();
    let entries = mimic_fixture(dir.path());

    assert_eq!(read_jsonl(&dir.path().join("captions.jsonl")).unwrap(), entries);

    let ds = ManifestDataset::new(dir.path(), "captions.jsonl", "longest", Transforms::new())
        .unwrap();
    assert_eq!(ds.len(), entries.len());
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(ds.image_paths()[i], dir.path().join(&entry.image_path));
        assert_eq!(ds.captions()[i], entry.caption);
    }
}

#[test]
fn longest_mode_samples() {
    let dir = tempfile::tempdir().unwrap();
    mimic_fixture(dir.path());
    let ds = ManifestDataset::new(dir.path(), "captions.jsonl", "longest", Transforms::new())
        .unwrap();

    let sample = ds.get(0).unwrap();
    assert_eq!(sample.image.shape(), [3, 2, 4]);
    assert_eq!(sample.image.pixel(0, 0, 0), Some(200));
    assert_eq!(sample.image.pixel(1, 1, 3), Some(100));
    assert_eq!(sample.target, Target::Text("bbbb".into()));

    assert_eq!(ds.load_target(2).unwrap(), Target::Text("smoker, 40y".into()));
}

#[test]
fn docs_mode_samples() {
    let dir = tempfile::tempdir().unwrap();
    mimic_fixture(dir.path());
    let ds = ManifestDataset::new(dir.path(), "captions.jsonl", "docs", Transforms::new())
        .unwrap();

    let both = ds.load_target(0).unwrap();
    assert_eq!(both.section("impression"), Some("a"));
    assert_eq!(both.section("findings"), Some("bbbb"));
    assert_eq!(ds.load_target(0).unwrap(), both);

    assert_eq!(ds.load_target(1).unwrap(), Target::Text("x".into()));
    assert_eq!(ds.load_target(2).unwrap(), Target::Text("smoker, 40y".into()));
}

#[test]
fn missing_image_propagates_from_get() {
    let dir = tempfile::tempdir().unwrap();
    mimic_fixture(dir.path());
    fs::remove_file(dir.path().join("images/b.png")).unwrap();

    let ds = ManifestDataset::new(dir.path(), "captions.jsonl", "docs", Transforms::new())
        .unwrap();
    assert!(matches!(ds.get(1), Err(DatasetError::ImageDecode { .. })));
    // Target access does not touch the image.
    assert!(ds.load_target(1).is_ok());
}

#[test]
fn transforms_run_after_loading() {
    let dir = tempfile::tempdir().unwrap();
    mimic_fixture(dir.path());

    let transforms = Transforms::new()
        .image(|img| ImageTensor::from_rgb(&RgbImage::new(img.width() as u32 * 2, 1)))
        .target(|t| Target::Text(t.to_string().to_uppercase()));
    let ds = ManifestDataset::new(dir.path(), "captions.jsonl", "longest", transforms).unwrap();

    let sample = ds.get(0).unwrap();
    assert_eq!(sample.image.shape(), [3, 1, 8]);
    assert_eq!(sample.target, Target::Text("BBBB".into()));
}

#[test]
fn conflicting_transforms_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    mimic_fixture(dir.path());
    let transforms = Transforms::new().image(|i| i).joint(|i, t| (i, t));
    let err = ManifestDataset::new(dir.path(), "captions.jsonl", "longest", transforms);
    assert!(matches!(err, Err(DatasetError::Configuration(_))));
}

#[test]
fn csv_round_trip_and_samples() {
    let dir = tempfile::tempdir().unwrap();
    let split_dir = dir.path().join("validate/radiology");
    fs::create_dir_all(&split_dir).unwrap();

    let rows = vec![
        TabularRow {
            id: "0".into(),
            filename: "PMC1.png".into(),
            caption: "CT of the abdomen, axial view".into(),
        },
        TabularRow {
            id: "1".into(),
            filename: "PMC2.png".into(),
            caption: "Chest radiograph \"PA\"".into(),
        },
    ];
    write_csv(&split_dir.join("validate.csv"), &rows).unwrap();
    save_png(&split_dir.join("images/PMC1.png"), 2, 2, 10);
    save_png(&split_dir.join("images/PMC2.png"), 6, 4, 20);

    let ds = TabularDataset::new(dir.path(), "validate", Transforms::new()).unwrap();
    assert_eq!(ds.len(), 2);
    assert!(ds.malformed_rows().is_empty());
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(ds.captions()[i], row.caption);
        assert_eq!(ds.image_paths()[i], split_dir.join("images").join(&row.filename));
    }

    let sample = ds.get(1).unwrap();
    assert_eq!(sample.image.shape(), [3, 4, 6]);
    assert_eq!(sample.target, Target::Text("Chest radiograph \"PA\"".into()));
    assert!(ds.to_string().contains("Number of datapoints: 2"));
}
