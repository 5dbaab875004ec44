#[cfg(feature = "_debug")]
pub mod color_soa;
#[cfg(not(feature = "_debug"))]
mod color_soa;
#[cfg(feature = "_debug")]
pub mod debug_helpers;
#[cfg(any(test, feature = "_debug"))]
pub mod rng;
#[cfg(feature = "_debug")]
pub mod slic;
#[cfg(not(feature = "_debug"))]
mod slic;

mod colorize;
pub mod config;
mod types;

pub use colorize::Overlay;
pub use config::{ColorSpace, Config, EmptyClusterPolicy};
pub use rgb::RGB8;
use snafu::prelude::*;
#[cfg(feature = "image")]
use std::ops::Deref;
pub use types::Centroid;

const U16_MAX: u16 = u16::MAX;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum InputImageError {
    #[snafu(display("image size must be positive"))]
    ZeroImageSize,

    #[snafu(display("buffer length {len} is not a multiple of 3"))]
    InvalidBufferLength { len: usize },

    #[snafu(display("buffer is empty"))]
    EmptyBuffer,

    #[snafu(display("image size ({width}x{height}) doesn't match the buffer size ({buf_size})"))]
    ImageSizeMismatch {
        width: u16,
        height: u16,
        buf_size: usize,
    },

    #[snafu(display(
        "image dimensions are too large, max image size is {U16_MAX}x{U16_MAX}, \
        got {width}x{height}"
    ))]
    ImageDimensionsTooLarge { width: u32, height: u32 },
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SegmentError {
    #[snafu(display("invalid input image"), context(false))]
    Input { source: InputImageError },

    #[snafu(display("invalid configuration: {reason}"))]
    InvalidConfig { reason: &'static str },

    #[snafu(display(
        "can't fit {superpixels} superpixels in a {width}x{height} image, grid spacing is zero"
    ))]
    ZeroSpacing {
        width: u16,
        height: u16,
        superpixels: u32,
    },

    #[snafu(display("image ({width}x{height}) is smaller than the grid spacing ({spacing})"))]
    ImageSmallerThanSpacing {
        width: u16,
        height: u16,
        spacing: u16,
    },
}

/// A structure used as a façade for the image bytes.
#[derive(Debug, Copy, Clone)]
pub struct InputImage<'a> {
    width: u16,
    height: u16,
    buf: &'a [u8],
}

impl InputImage<'_> {
    pub fn from_bytes(
        width: u16,
        height: u16,
        buf: &[u8],
    ) -> Result<InputImage<'_>, InputImageError> {
        ensure!(!buf.is_empty(), EmptyBufferSnafu);
        ensure!(width > 0 && height > 0, ZeroImageSizeSnafu);
        ensure!(
            buf.len().is_multiple_of(3),
            InvalidBufferLengthSnafu { len: buf.len() }
        );
        ensure!(
            buf.len() == (width as usize) * (height as usize) * 3,
            ImageSizeMismatchSnafu {
                width,
                height,
                buf_size: buf.len()
            }
        );

        Ok(InputImage { width, height, buf })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// # Panics
    /// Panics if `(x, y)` is outside the image.
    #[inline]
    pub fn pixel(&self, x: u16, y: u16) -> RGB8 {
        assert!(x < self.width && y < self.height);
        let i = (y as usize * self.width as usize + x as usize) * 3;
        RGB8 {
            r: self.buf[i],
            g: self.buf[i + 1],
            b: self.buf[i + 2],
        }
    }
}

#[cfg(feature = "image")]
impl<'a, Container> TryFrom<&'a image::ImageBuffer<image::Rgb<u8>, Container>> for InputImage<'a>
where
    Container: Deref<Target = [<image::Rgb<u8> as image::Pixel>::Subpixel]> + 'a,
{
    type Error = InputImageError;

    fn try_from(
        img: &'a image::ImageBuffer<image::Rgb<u8>, Container>,
    ) -> Result<Self, Self::Error> {
        let width = u16::try_from(img.width()).map_err(|_| {
            ImageDimensionsTooLargeSnafu {
                width: img.width(),
                height: img.height(),
            }
            .build()
        })?;
        let height = u16::try_from(img.height()).map_err(|_| {
            ImageDimensionsTooLargeSnafu {
                width: img.width(),
                height: img.height(),
            }
            .build()
        })?;
        Self::from_bytes(width, height, img.as_raw().deref())
    }
}

/// The result of a segmentation run.
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub width: u16,
    pub height: u16,
    /// Each centroid is the mean position and mean color of its pixels,
    /// except for empty clusters kept by [`EmptyClusterPolicy::Retain`].
    pub centroids: Vec<Centroid>,
    /// Row-major, one index into `centroids` per pixel.
    pub labels: Vec<u32>,
    pub iterations: usize,
    /// `false` if the loop stopped at `max_iterations`.
    pub converged: bool,
}

impl Segmentation {
    #[inline]
    pub fn label(&self, x: u16, y: u16) -> u32 {
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Member pixel positions of every centroid, indexed like `centroids`.
    pub fn clusters(&self) -> Vec<Vec<(u16, u16)>> {
        slic::assign::clusters(&self.labels, self.width, self.centroids.len())
    }

    /// Packed RGBRGB… bytes with every pixel painted in its centroid's color.
    pub fn colorize(&self, overlay: Overlay) -> Vec<u8> {
        colorize::colorize(self, overlay)
    }

    #[cfg(feature = "image")]
    pub fn to_image(&self, overlay: Overlay) -> image::RgbImage {
        let bytes = self.colorize(overlay);
        let width = self.width as usize;
        image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let i = (y as usize * width + x as usize) * 3;
            image::Rgb([bytes[i], bytes[i + 1], bytes[i + 2]])
        })
    }
}

#[derive(Debug)]
pub struct DebugInfo {
    /// Lattice step S.
    pub spacing: u16,
    /// Centroids after seeding, before the first assignment.
    pub seeds: Vec<Centroid>,
    /// Total displacement per iteration, `None` when centroids were dropped.
    pub displacements: Vec<Option<f32>>,
    /// Full-scan fallbacks per assignment pass.
    pub fallback_pixels: Vec<usize>,
    /// Empty clusters per iteration.
    pub empty_clusters: Vec<usize>,
}

/// Segment an image into superpixels with the default [`Config`] and return
/// it painted in superpixel colors.
///
/// ```
/// let buf = [200u8, 30, 30].repeat(16 * 16);
/// let input = okslic::InputImage::from_bytes(16, 16, &buf).unwrap();
///
/// let output = okslic::superpixels(input).unwrap();
///
/// // A flat image stays flat
/// assert_eq!(output, buf);
/// ```
///
/// The buffer layout is assumed to be RGBRGBRGB…, and the output has the same
/// layout and size.
///
/// Or, if the `image` feature is enabled, from [`image::ImageBuffer`]:
///
#[cfg_attr(
    not(feature = "image"),
    doc = r##"
```compile_fail
let img = image::RgbImage::from_pixel(16, 16, image::Rgb([0, 0, 255]));
let output = okslic::superpixels_from_image(&img).unwrap();
assert_eq!(output, img);
```
"##
)]
#[cfg_attr(
    feature = "image",
    doc = r##"
```
let img = image::RgbImage::from_pixel(16, 16, image::Rgb([0, 0, 255]));
let output = okslic::superpixels_from_image(&img).unwrap();
assert_eq!(output, img);
```
"##
)]
///
/// See also [`segment`] for the labels and centroids, and [`segment_debug`]
/// for per-iteration statistics.
pub fn superpixels(input: InputImage) -> Result<Vec<u8>, SegmentError> {
    Ok(segment(input, &Config::default())?.colorize(Overlay::None))
}

#[cfg(feature = "image")]
pub fn superpixels_from_image(img: &image::RgbImage) -> Result<image::RgbImage, SegmentError> {
    let input = InputImage::try_from(img)?;
    Ok(segment(input, &Config::default())?.to_image(Overlay::None))
}

pub fn segment(input: InputImage, config: &Config) -> Result<Segmentation, SegmentError> {
    segment_debug(input, config).map(|(segmentation, _)| segmentation)
}

pub fn segment_debug(
    input: InputImage,
    config: &Config,
) -> Result<(Segmentation, DebugInfo), SegmentError> {
    slic::segmenter::segment(input, config)
}
