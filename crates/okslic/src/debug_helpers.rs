use clap::{Parser, ValueEnum};
use image::RgbImage;
use std::path::{Path, PathBuf};

use crate::{ColorSpace, Config, EmptyClusterPolicy};

#[derive(Parser)]
pub struct FolderArgs {
    /// Path to a folder of images
    pub folder: PathBuf,
}

#[derive(Copy, Clone, ValueEnum)]
pub enum ColorSpaceArg {
    Rgb,
    Oklab,
}

#[derive(Parser)]
pub struct ConfigArgs {
    /// Approximate number of superpixels
    #[arg(short = 'k', long, default_value_t = crate::config::DEFAULT_SUPERPIXELS)]
    pub superpixels: u32,

    /// Compactness weight, higher values give more regular superpixels
    #[arg(short = 'm', long, default_value_t = crate::config::DEFAULT_COMPACTNESS)]
    pub compactness: f32,

    /// Stop once the total centroid displacement drops below this
    #[arg(long, default_value_t = crate::config::DEFAULT_CONVERGENCE_THRESHOLD)]
    pub threshold: f32,

    #[arg(long, default_value_t = crate::config::DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    #[arg(long, value_enum, default_value_t = ColorSpaceArg::Rgb)]
    pub color_space: ColorSpaceArg,

    /// Drop centroids that lose all their pixels instead of keeping them
    #[arg(long)]
    pub drop_empty: bool,
}

impl ConfigArgs {
    pub fn to_config(&self) -> Config {
        Config::default()
            .with_superpixels(self.superpixels)
            .with_compactness(self.compactness)
            .with_convergence_threshold(self.threshold)
            .with_max_iterations(self.max_iterations)
            .with_color_space(match self.color_space {
                ColorSpaceArg::Rgb => ColorSpace::Rgb,
                ColorSpaceArg::Oklab => ColorSpace::Oklab,
            })
            .with_empty_clusters(if self.drop_empty {
                EmptyClusterPolicy::Drop
            } else {
                EmptyClusterPolicy::Retain
            })
    }
}

pub fn find_jpg_files(folder: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(folder)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg"))
        })
        .collect();
    files.sort();
    files
}

pub fn ensure_out_dir(folder: &Path, name: &str) -> PathBuf {
    let dir = folder.join("debug_results").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn load_rgb8(path: &Path) -> RgbImage {
    image::open(path).unwrap().to_rgb8()
}
