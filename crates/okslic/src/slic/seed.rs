use super::gradient::gradient;
use crate::InputImage;
use crate::color_soa::ColorSoA;
use crate::types::Centroid;

/// Places one seed per cell of a regular lattice with step `spacing`,
/// starting half a cell in, then nudges each seed to the smoothest pixel of
/// its 3x3 neighborhood.
pub fn initial_centroids(input: InputImage, colors: &ColorSoA, spacing: u16) -> Vec<Centroid> {
    assert!(spacing > 0);
    assert_eq!(input.width, colors.width);
    assert_eq!(input.height, colors.height);

    let start = spacing / 2;
    let step = spacing as usize;

    let mut seeds = Vec::new();
    for y in (start..input.height).step_by(step) {
        for x in (start..input.width).step_by(step) {
            let (sx, sy) = smoothest_nearby(colors, x, y);
            seeds.push(Centroid::new(sx as f32, sy as f32, input.pixel(sx, sy)));
        }
    }

    seeds
}

/// The lattice point stays put unless a neighbor is strictly smoother; among
/// neighbors, ties go to the first one in row-major order. Candidates on the
/// outer ring of the image have no gradient and are skipped, and if nothing
/// in the neighborhood has one the lattice point is used as is.
fn smoothest_nearby(colors: &ColorSoA, x: u16, y: u16) -> (u16, u16) {
    let mut best = gradient(colors, x, y).map(|g| (g, x, y));

    for ny in y.saturating_sub(1)..=y.saturating_add(1) {
        for nx in x.saturating_sub(1)..=x.saturating_add(1) {
            if (nx, ny) == (x, y) {
                continue;
            }
            let Some(g) = gradient(colors, nx, ny) else {
                continue;
            };
            if best.is_none_or(|(min, _, _)| g < min) {
                best = Some((g, nx, ny));
            }
        }
    }

    best.map_or((x, y), |(_, bx, by)| (bx, by))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_soa::convert;
    use crate::config::ColorSpace;
    use pretty_assertions::assert_eq;

    fn positions(seeds: &[Centroid]) -> Vec<(f32, f32)> {
        seeds.iter().map(|c| (c.x, c.y)).collect()
    }

    #[test]
    fn uniform_image_keeps_lattice() {
        let buf = [90, 90, 90].repeat(45 * 45);
        let input = InputImage::from_bytes(45, 45, &buf).unwrap();
        let colors = convert(ColorSpace::Rgb, 45, 45, &buf);

        let seeds = initial_centroids(input, &colors, 15);

        let mut expected = Vec::new();
        for y in [7.0, 22.0, 37.0] {
            for x in [7.0, 22.0, 37.0] {
                expected.push((x, y));
            }
        }
        assert_eq!(positions(&seeds), expected);
    }

    #[test]
    fn seed_moves_off_an_edge() {
        // Black columns 0..4, white columns 4..9
        let (w, h) = (9u16, 9u16);
        let mut buf: Vec<u8> = Vec::new();
        for _ in 0..h {
            for x in 0..w {
                let v = if x < 4 { 0 } else { 255 };
                buf.extend_from_slice(&[v, v, v]);
            }
        }
        let input = InputImage::from_bytes(w, h, &buf).unwrap();
        let colors = convert(ColorSpace::Rgb, w, h, &buf);

        let seeds = initial_centroids(input, &colors, 9);

        // (4, 4) and (3, *) straddle the edge, column 5 is flat
        assert_eq!(positions(&seeds), vec![(5.0, 3.0)]);
        assert_eq!(seeds[0].color, rgb::RGB8 { r: 255, g: 255, b: 255 });
    }

    #[test]
    fn single_cell_image() {
        let buf = [1, 2, 3].repeat(10 * 10);
        let input = InputImage::from_bytes(10, 10, &buf).unwrap();
        let colors = convert(ColorSpace::Rgb, 10, 10, &buf);

        let seeds = initial_centroids(input, &colors, 10);
        assert_eq!(positions(&seeds), vec![(5.0, 5.0)]);
    }

    #[test]
    fn lattice_on_the_border_stays_in_bounds() {
        // spacing 1 puts lattice points on every pixel, including the border
        let buf = (0..48u8).collect::<Vec<_>>();
        let input = InputImage::from_bytes(4, 4, &buf).unwrap();
        let colors = convert(ColorSpace::Rgb, 4, 4, &buf);

        let seeds = initial_centroids(input, &colors, 1);
        assert_eq!(seeds.len(), 16);
        for seed in &seeds {
            assert!(seed.x >= 0.0 && seed.x < 4.0);
            assert!(seed.y >= 0.0 && seed.y < 4.0);
        }
    }

    #[test]
    fn no_interior_pixels() {
        let buf = [10, 20, 30].repeat(4);
        let input = InputImage::from_bytes(2, 2, &buf).unwrap();
        let colors = convert(ColorSpace::Rgb, 2, 2, &buf);

        let seeds = initial_centroids(input, &colors, 2);
        assert_eq!(positions(&seeds), vec![(1.0, 1.0)]);
    }
}
