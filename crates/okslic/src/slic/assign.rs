use crate::color_soa::{ColorSoA, squared_distance, to_color_space};
use crate::config::ColorSpace;
use crate::types::Centroid;
use rayon::prelude::*;

/// A fresh partition of the image: `labels[y * width + x]` is the index of
/// the centroid owning that pixel.
#[derive(Debug)]
pub struct Assignment {
    pub labels: Vec<u32>,
    /// Pixels that had no centroid within their search window and had to
    /// fall back to a scan over every centroid.
    pub fallback_pixels: usize,
}

/// Coarse spatial index with cells as wide as the search window, so every
/// centroid inside a pixel's window lives in the 3x3 block of cells around it.
struct Buckets {
    cell: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<u32>>,
}

impl Buckets {
    fn new(width: u16, height: u16, window: f32, centroids: &[Centroid]) -> Self {
        let cell = window.max(1.0);
        let cols = (width as f32 / cell).ceil().max(1.0) as usize;
        let rows = (height as f32 / cell).ceil().max(1.0) as usize;

        let mut cells = vec![Vec::new(); cols * rows];
        for (i, c) in centroids.iter().enumerate() {
            let (col, row) = Self::cell_of(cell, cols, rows, c.x, c.y);
            cells[row * cols + col].push(i as u32);
        }

        Self {
            cell,
            cols,
            rows,
            cells,
        }
    }

    #[inline(always)]
    fn cell_of(cell: f32, cols: usize, rows: usize, x: f32, y: f32) -> (usize, usize) {
        let col = ((x / cell).floor().max(0.0) as usize).min(cols - 1);
        let row = ((y / cell).floor().max(0.0) as usize).min(rows - 1);
        (col, row)
    }

    /// Centroid indices from the cells neighboring the pixel's cell.
    #[inline]
    fn around(&self, x: f32, y: f32) -> impl Iterator<Item = u32> + '_ {
        let (col, row) = Self::cell_of(self.cell, self.cols, self.rows, x, y);
        let rows = row.saturating_sub(1)..=(row + 1).min(self.rows - 1);
        rows.flat_map(move |r| {
            let cols = col.saturating_sub(1)..=(col + 1).min(self.cols - 1);
            cols.flat_map(move |c| self.cells[r * self.cols + c].iter().copied())
        })
    }
}

#[derive(Debug, Copy, Clone)]
struct Nearest {
    index: u32,
    distance: f32,
}

impl Nearest {
    /// Smaller distance wins, equal distances go to the lower centroid index
    /// so that the result doesn't depend on scan order.
    #[inline(always)]
    fn offer(best: &mut Option<Nearest>, index: u32, distance: f32) {
        let better = match best {
            None => true,
            Some(b) => distance < b.distance || (distance == b.distance && index < b.index),
        };
        if better {
            *best = Some(Nearest { index, distance });
        }
    }
}

/// Assigns every pixel to the centroid minimizing
/// `color_distance + (m / S) * spatial_distance`, looking only at centroids
/// within `2S` on both axes and falling back to all of them when there are
/// none.
pub fn assign_pixels(
    colors: &ColorSoA,
    centroids: &[Centroid],
    color_space: ColorSpace,
    spacing: u16,
    compactness: f32,
) -> Assignment {
    assert!(!centroids.is_empty());
    assert!(spacing > 0);

    let width = colors.width as usize;
    let window = 2.0 * spacing as f32;
    let spatial_weight = compactness / spacing as f32;

    let centroid_colors: Vec<[f32; 3]> = centroids
        .iter()
        .map(|c| to_color_space(color_space, c.color))
        .collect();
    let buckets = Buckets::new(colors.width, colors.height, window, centroids);

    let distance = |j: u32, color: [f32; 3], x: f32, y: f32| -> f32 {
        let j = j as usize;
        let color_distance = squared_distance(color, centroid_colors[j]).sqrt();
        let spatial_distance = centroids[j].spatial_squared_distance(x, y).sqrt();
        spatial_weight.mul_add(spatial_distance, color_distance)
    };

    let mut labels = vec![0u32; colors.len()];

    let fallback_pixels = labels
        .par_chunks_mut(width)
        .enumerate()
        .map(|(y, row)| {
            let mut fallbacks = 0usize;
            let fy = y as f32;

            for (x, label) in row.iter_mut().enumerate() {
                let fx = x as f32;
                let color = colors.get(y * width + x);

                let mut best = None;
                for j in buckets.around(fx, fy) {
                    let c = &centroids[j as usize];
                    if (c.x - fx).abs() > window || (c.y - fy).abs() > window {
                        continue;
                    }
                    Nearest::offer(&mut best, j, distance(j, color, fx, fy));
                }

                if best.is_none() {
                    fallbacks += 1;
                    for j in 0..centroids.len() as u32 {
                        Nearest::offer(&mut best, j, distance(j, color, fx, fy));
                    }
                }

                // At least one centroid exists, so the full scan always finds one
                *label = best.map_or(0, |b| b.index);
            }

            fallbacks
        })
        .sum::<usize>();

    Assignment {
        labels,
        fallback_pixels,
    }
}

/// Member pixel positions of each centroid, in row-major order.
pub fn clusters(labels: &[u32], width: u16, num_centroids: usize) -> Vec<Vec<(u16, u16)>> {
    let mut clusters = vec![Vec::new(); num_centroids];
    for (i, &label) in labels.iter().enumerate() {
        let x = (i % width as usize) as u16;
        let y = (i / width as usize) as u16;
        clusters[label as usize].push((x, y));
    }
    clusters
}
