use crate::{ImageSmallerThanSpacingSnafu, SegmentError, ZeroSpacingSnafu};
use snafu::prelude::*;

pub mod assign;
pub mod convergence;
pub mod gradient;
pub mod seed;
pub mod segmenter;
pub mod update;

// References:
// - SLIC Superpixels Compared to State-of-the-art Superpixel Methods
//   (R. Achanta et al), https://doi.org/10.1109/TPAMI.2012.120
//
// Differences from the paper:
// - No connectivity enforcement pass, stray fragments are left as they are.
// - The stopping rule is total L1 centroid displacement, not residual error.

/// Lattice step `S = floor(sqrt(width * height / K))`.
///
/// Fails when `S` is zero (more superpixels than pixels) or when the image is
/// narrower or shorter than one lattice cell.
pub fn grid_spacing(width: u16, height: u16, superpixels: u32) -> Result<u16, SegmentError> {
    assert!(superpixels > 0);

    let total = width as u64 * height as u64;
    let spacing = (total / superpixels as u64).isqrt();

    ensure!(
        spacing > 0,
        ZeroSpacingSnafu {
            width,
            height,
            superpixels
        }
    );
    // spacing <= sqrt(width * height) <= max(width, height), so this fits
    let spacing = spacing as u16;
    ensure!(
        width >= spacing && height >= spacing,
        ImageSmallerThanSpacingSnafu {
            width,
            height,
            spacing
        }
    );

    Ok(spacing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn spacing_known_values() {
        // 45 * 45 / 9 = 225
        assert_eq!(grid_spacing(45, 45, 9).unwrap(), 15);
        // 100 * 50 / 15 = 333, sqrt = 18.2
        assert_eq!(grid_spacing(100, 50, 15).unwrap(), 18);
        assert_eq!(grid_spacing(10, 10, 1).unwrap(), 10);
    }

    #[test]
    fn too_many_superpixels() {
        let err = grid_spacing(3, 3, 10).unwrap_err();
        assert!(matches!(err, SegmentError::ZeroSpacing { .. }));
    }

    #[test]
    fn thin_image() {
        // 1 * 100 / 1 = 100, spacing 10 doesn't fit in one column
        let err = grid_spacing(1, 100, 1).unwrap_err();
        assert!(matches!(
            err,
            SegmentError::ImageSmallerThanSpacing { spacing: 10, .. }
        ));
    }

    #[test]
    fn largest_image() {
        assert_eq!(grid_spacing(u16::MAX, u16::MAX, 1).unwrap(), u16::MAX);
    }
}
