use crate::InputImage;
use crate::config::EmptyClusterPolicy;
use crate::types::Centroid;
use rayon::prelude::*;
use rgb::RGB8;

// Integer sums keep the reduction exact whatever way rayon splits the rows
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct Sums {
    count: u64,
    x: u64,
    y: u64,
    r: u64,
    g: u64,
    b: u64,
}

impl Sums {
    #[inline(always)]
    fn add(&mut self, x: usize, y: usize, pixel: &[u8]) {
        self.count += 1;
        self.x += x as u64;
        self.y += y as u64;
        self.r += pixel[0] as u64;
        self.g += pixel[1] as u64;
        self.b += pixel[2] as u64;
    }

    #[inline(always)]
    fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.x += other.x;
        self.y += other.y;
        self.r += other.r;
        self.g += other.g;
        self.b += other.b;
    }

    /// `None` for an empty cluster.
    fn mean(&self) -> Option<Centroid> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        // Round half up, results stay within 0..=255
        let channel = |sum: u64| ((sum + self.count / 2) / self.count) as u8;
        Some(Centroid::new(
            (self.x as f64 / n) as f32,
            (self.y as f64 / n) as f32,
            RGB8 {
                r: channel(self.r),
                g: channel(self.g),
                b: channel(self.b),
            },
        ))
    }
}

#[derive(Debug)]
pub struct UpdateResult {
    /// One centroid per previous centroid, in the same order, minus the
    /// dropped ones under [`EmptyClusterPolicy::Drop`].
    pub centroids: Vec<Centroid>,
    pub empty_clusters: usize,
    /// Old label to new label, present only when centroids were dropped.
    pub remap: Option<Vec<Option<u32>>>,
}

fn accumulate(input: InputImage, labels: &[u32], k: usize) -> Vec<Sums> {
    let width = input.width as usize;
    assert_eq!(labels.len(), width * input.height as usize);

    input
        .buf
        .par_chunks_exact(width * 3)
        .zip(labels.par_chunks_exact(width))
        .enumerate()
        .fold(
            || vec![Sums::default(); k],
            |mut acc, (y, (row, row_labels))| {
                for (x, (pixel, &label)) in row.chunks_exact(3).zip(row_labels).enumerate() {
                    acc[label as usize].add(x, y, pixel);
                }
                acc
            },
        )
        .reduce(
            || vec![Sums::default(); k],
            |mut acc, partial| {
                for (sums, other) in acc.iter_mut().zip(&partial) {
                    sums.merge(other);
                }
                acc
            },
        )
}

/// Moves each centroid to the mean position and mean color of the pixels
/// labelled with its index.
pub fn update_centroids(
    input: InputImage,
    labels: &[u32],
    previous: &[Centroid],
    policy: EmptyClusterPolicy,
) -> UpdateResult {
    let sums = accumulate(input, labels, previous.len());

    let mut centroids = Vec::with_capacity(previous.len());
    let mut remap = Vec::with_capacity(previous.len());
    let mut empty_clusters = 0;

    for (old, s) in previous.iter().zip(&sums) {
        match (s.mean(), policy) {
            (Some(mean), _) => {
                remap.push(Some(centroids.len() as u32));
                centroids.push(mean);
            }
            (None, EmptyClusterPolicy::Retain) => {
                empty_clusters += 1;
                remap.push(Some(centroids.len() as u32));
                centroids.push(*old);
            }
            (None, EmptyClusterPolicy::Drop) => {
                empty_clusters += 1;
                remap.push(None);
            }
        }
    }

    let dropped = centroids.len() < previous.len();

    UpdateResult {
        centroids,
        empty_clusters,
        remap: dropped.then_some(remap),
    }
}

/// Rewrites labels after centroids were dropped. Dropped centroids had no
/// pixels, so every label has a new index.
pub fn relabel(labels: &mut [u32], remap: &[Option<u32>]) {
    for label in labels.iter_mut() {
        if let Some(new) = remap[*label as usize] {
            *label = new;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

    // 4x2 image, left half (10, 20, 30) and right half (200, 100, 51)
    fn two_halves() -> Vec<u8> {
        let mut buf = Vec::new();
        for _ in 0..2 {
            for x in 0..4 {
                if x < 2 {
                    buf.extend_from_slice(&[10, 20, 30]);
                } else {
                    buf.extend_from_slice(&[200, 100, 51]);
                }
            }
        }
        buf
    }

    #[test]
    fn means_of_members() {
        let buf = two_halves();
        let input = InputImage::from_bytes(4, 2, &buf).unwrap();
        let labels = vec![0, 0, 1, 1, 0, 0, 1, 1];
        let previous = vec![
            Centroid::new(0.0, 0.0, BLACK),
            Centroid::new(3.0, 1.0, BLACK),
        ];

        let result = update_centroids(input, &labels, &previous, EmptyClusterPolicy::Retain);

        assert_eq!(result.empty_clusters, 0);
        assert!(result.remap.is_none());
        let [left, right] = result.centroids[..] else {
            panic!("expected two centroids");
        };
        assert!((left.x - 0.5).abs() < 1e-6);
        assert!((left.y - 0.5).abs() < 1e-6);
        assert_eq!(left.color, RGB8 { r: 10, g: 20, b: 30 });
        assert!((right.x - 2.5).abs() < 1e-6);
        assert!((right.y - 0.5).abs() < 1e-6);
        assert_eq!(right.color, RGB8 { r: 200, g: 100, b: 51 });
    }

    #[test]
    fn color_mean_rounds_half_up() {
        let buf = [0, 0, 0, 1, 255, 3];
        let input = InputImage::from_bytes(2, 1, &buf).unwrap();
        let result = update_centroids(
            input,
            &[0, 0],
            &[Centroid::new(0.0, 0.0, BLACK)],
            EmptyClusterPolicy::Retain,
        );
        // 0.5 -> 1, 127.5 -> 128, 1.5 -> 2
        assert_eq!(result.centroids[0].color, RGB8 { r: 1, g: 128, b: 2 });
    }

    #[test]
    fn retains_empty_clusters() {
        let buf = two_halves();
        let input = InputImage::from_bytes(4, 2, &buf).unwrap();
        let labels = vec![0; 8];
        let lonely = Centroid::new(3.0, 1.0, RGB8 { r: 9, g: 9, b: 9 });
        let previous = vec![Centroid::new(0.0, 0.0, BLACK), lonely];

        let result = update_centroids(input, &labels, &previous, EmptyClusterPolicy::Retain);

        assert_eq!(result.empty_clusters, 1);
        assert_eq!(result.centroids.len(), 2);
        assert_eq!(result.centroids[1].x, lonely.x);
        assert_eq!(result.centroids[1].y, lonely.y);
        assert_eq!(result.centroids[1].color, lonely.color);
        assert!(result.remap.is_none());
    }

    #[test]
    fn drops_empty_clusters_and_remaps() {
        let buf = two_halves();
        let input = InputImage::from_bytes(4, 2, &buf).unwrap();
        let mut labels = vec![0, 0, 2, 2, 0, 0, 2, 2];
        let previous = vec![
            Centroid::new(0.0, 0.0, BLACK),
            Centroid::new(1.0, 1.0, BLACK),
            Centroid::new(3.0, 1.0, BLACK),
        ];

        let result = update_centroids(input, &labels, &previous, EmptyClusterPolicy::Drop);

        assert_eq!(result.empty_clusters, 1);
        assert_eq!(result.centroids.len(), 2);
        let remap = result.remap.expect("a centroid was dropped");
        assert_eq!(remap, vec![Some(0), None, Some(1)]);

        relabel(&mut labels, &remap);
        assert_eq!(labels, vec![0, 0, 1, 1, 0, 0, 1, 1]);
    }

    #[test]
    fn parallel_sums_match_serial() {
        let (w, h) = (37usize, 23usize);
        let buf: Vec<u8> = (0..w * h * 3).map(|i| (i * 7 % 256) as u8).collect();
        let labels: Vec<u32> = (0..w * h).map(|i| (i % 5) as u32).collect();
        let input = InputImage::from_bytes(w as u16, h as u16, &buf).unwrap();

        let mut expected = vec![Sums::default(); 5];
        for (i, pixel) in buf.chunks_exact(3).enumerate() {
            expected[labels[i] as usize].add(i % w, i / w, pixel);
        }

        assert_eq!(accumulate(input, &labels, 5), expected);
    }
}
