use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use medclip_data::{
    FilterConfig, ImageTextDataset, ManifestDataset, ManifestFilter, RocoLayout, RowPolicy,
    TabularDataset, Transforms,
};

#[derive(Parser, Debug)]
#[command(
    name = "medclip-data",
    version,
    about = "Inspect image-text manifests and clean ROCO-style CSVs."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite each split's raw CSV keeping only rows whose image decodes
    Filter {
        /// Dataset root containing <split>/radiology/
        root: PathBuf,
        /// JSON file overriding split names and file names
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Load a JSON-lines manifest and print the first samples
    InspectJsonl {
        root: PathBuf,
        /// Manifest path relative to the root
        file: PathBuf,
        /// Target selection: longest | docs
        #[arg(long, default_value = "longest")]
        mode: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Load a split CSV and print the first samples
    InspectCsv {
        root: PathBuf,
        /// train | validate | test
        split: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
        /// Fail on malformed rows instead of skipping them
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Filter { root, config } => run_filter(root, config),
        Command::InspectJsonl {
            root,
            file,
            mode,
            limit,
        } => {
            let ds = ManifestDataset::new(&root, &file, &mode, Transforms::new())
                .with_context(|| format!("loading {}", root.join(&file).display()))?;
            inspect(&ds, limit)
        }
        Command::InspectCsv {
            root,
            split,
            limit,
            strict,
        } => {
            let policy = if strict { RowPolicy::Fail } else { RowPolicy::Skip };
            let ds = TabularDataset::with_layout(
                &root,
                &split,
                &RocoLayout::default(),
                policy,
                Transforms::new(),
            )
            .with_context(|| format!("loading split '{split}' under {}", root.display()))?;
            inspect(&ds, limit)
        }
    }
}

fn run_filter(root: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let config = match config {
        Some(path) => FilterConfig::from_path(&path)
            .with_context(|| format!("reading filter config {}", path.display()))?,
        None => FilterConfig::default(),
    };

    let reports = ManifestFilter::new(config)
        .run(&root)
        .with_context(|| format!("filtering manifests under {}", root.display()))?;

    for r in &reports {
        println!("{:<10} kept {:>7}  dropped {:>7}", r.split, r.kept, r.dropped);
    }
    Ok(())
}

fn inspect<D: ImageTextDataset + fmt::Display>(ds: &D, limit: usize) -> Result<()> {
    println!("{ds}");
    for index in 0..ds.len().min(limit) {
        let path = ds.image_path(index)?.display().to_string();
        let sample = ds
            .get(index)
            .with_context(|| format!("sample {index} ({path})"))?;
        let [c, h, w] = sample.image.shape();
        println!("[{index}] {path} ({c}x{h}x{w})");
        println!("    {}", sample.target);
    }
    Ok(())
}
