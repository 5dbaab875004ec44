use clap::Parser;
use image::{GenericImage, RgbImage};
use okslic::debug_helpers::{ConfigArgs, FolderArgs, ensure_out_dir, find_jpg_files, load_rgb8};
use okslic::{InputImage, Overlay};
use std::time::Instant;

#[derive(Parser)]
struct Args {
    #[command(flatten)]
    folder: FolderArgs,

    #[command(flatten)]
    config: ConfigArgs,
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let config = args.config.to_config();
    let files = find_jpg_files(&args.folder.folder);
    let out_dir = ensure_out_dir(&args.folder.folder, "superpixels");

    for path in &files {
        let filename = path.file_name().unwrap();
        let img = load_rgb8(path);
        let (w, h) = (img.width(), img.height());

        let t = Instant::now();
        let input = InputImage::try_from(&img).unwrap();
        let (segmentation, info) = match okslic::segment_debug(input, &config) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("{}: {e}", filename.to_string_lossy());
                continue;
            }
        };
        let elapsed = t.elapsed();

        // left: original, centre: superpixels, right: superpixels with markers
        let mut out = RgbImage::new(w * 3, h);
        out.copy_from(&img, 0, 0).unwrap();
        out.copy_from(&segmentation.to_image(Overlay::None), w, 0)
            .unwrap();
        out.copy_from(&segmentation.to_image(Overlay::Markers), w * 2, 0)
            .unwrap();

        out.save(out_dir.join(filename)).unwrap();
        println!(
            "{}: S={}, {} superpixels, {} iterations (converged: {}), {} fallback pixels, {:?}",
            filename.to_string_lossy(),
            info.spacing,
            segmentation.centroids.len(),
            segmentation.iterations,
            segmentation.converged,
            info.fallback_pixels.iter().sum::<usize>(),
            elapsed,
        );
    }
}
