use crate::Segmentation;
use rgb::RGB8;

// Half-length of the marker cross arms, in pixels
const MARKER_RADIUS: i32 = 2;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Overlay {
    /// Superpixel colors only.
    #[default]
    None,
    /// Superpixel colors, plus a cross at every centroid drawn in the
    /// inverted centroid color.
    Markers,
}

#[inline]
fn put(buf: &mut [u8], width: usize, x: usize, y: usize, color: RGB8) {
    let i = (y * width + x) * 3;
    buf[i] = color.r;
    buf[i + 1] = color.g;
    buf[i + 2] = color.b;
}

/// Paints every pixel with the color of its centroid, returning packed
/// RGBRGB… bytes of the same size as the input.
pub fn colorize(segmentation: &Segmentation, overlay: Overlay) -> Vec<u8> {
    let width = segmentation.width as usize;
    let height = segmentation.height as usize;
    assert_eq!(segmentation.labels.len(), width * height);

    let mut buf = Vec::with_capacity(width * height * 3);
    for &label in &segmentation.labels {
        let color = segmentation.centroids[label as usize].color;
        buf.extend_from_slice(&[color.r, color.g, color.b]);
    }

    if overlay == Overlay::Markers {
        for centroid in &segmentation.centroids {
            let cx = centroid.x.round() as i32;
            let cy = centroid.y.round() as i32;
            let inverted = RGB8 {
                r: 255 - centroid.color.r,
                g: 255 - centroid.color.g,
                b: 255 - centroid.color.b,
            };
            for d in -MARKER_RADIUS..=MARKER_RADIUS {
                for (x, y) in [(cx + d, cy), (cx, cy + d)] {
                    if (0..width as i32).contains(&x) && (0..height as i32).contains(&y) {
                        put(&mut buf, width, x as usize, y as usize, inverted);
                    }
                }
            }
        }
    }

    buf
}
