use super::{assign, convergence, grid_spacing, seed, update};
use crate::config::Config;
use crate::types::Centroid;
use crate::{DebugInfo, InputImage, SegmentError, Segmentation, color_soa};
use log::{debug, warn};

/// Seed, then alternate assignment and mean recomputation until the
/// centroids stop moving or `max_iterations` rounds have run.
///
/// The returned centroids are the means of the returned partition. When the
/// iteration cap is hit, the last round's result is returned with
/// `converged == false`.
pub fn segment(
    input: InputImage,
    config: &Config,
) -> Result<(Segmentation, DebugInfo), SegmentError> {
    config.validate()?;
    let spacing = grid_spacing(input.width, input.height, config.superpixels)?;

    let colors = color_soa::convert(config.color_space, input.width, input.height, input.buf);
    let seeds = seed::initial_centroids(input, &colors, spacing);
    debug!(
        "{}x{}: {} seeds for K={}, S={spacing}",
        input.width,
        input.height,
        seeds.len(),
        config.superpixels
    );

    let assign_all = |centroids: &[Centroid]| {
        let assignment = assign::assign_pixels(
            &colors,
            centroids,
            config.color_space,
            spacing,
            config.compactness,
        );
        if assignment.fallback_pixels > 0 {
            debug!(
                "{} pixels had no centroid within {}px",
                assignment.fallback_pixels,
                2 * spacing as u32
            );
        }
        assignment
    };

    let mut info = DebugInfo {
        spacing,
        seeds: seeds.clone(),
        displacements: Vec::new(),
        fallback_pixels: Vec::new(),
        empty_clusters: Vec::new(),
    };

    let mut centroids = seeds;
    let mut assignment = assign_all(&centroids);
    info.fallback_pixels.push(assignment.fallback_pixels);

    let mut iterations = 0;
    loop {
        iterations += 1;

        let updated = update::update_centroids(
            input,
            &assignment.labels,
            &centroids,
            config.empty_clusters,
        );
        let mut labels = assignment.labels;
        if let Some(remap) = &updated.remap {
            update::relabel(&mut labels, remap);
        }
        if updated.empty_clusters > 0 {
            debug!(
                "iteration {iterations}: {} empty clusters ({:?})",
                updated.empty_clusters, config.empty_clusters
            );
        }

        let displacement = convergence::total_displacement(&centroids, &updated.centroids);
        debug!(
            "iteration {iterations}: displacement {displacement:?} [{}]",
            config.convergence_threshold
        );
        info.displacements.push(displacement);
        info.empty_clusters.push(updated.empty_clusters);

        let converged = convergence::has_converged(
            &centroids,
            &updated.centroids,
            config.convergence_threshold,
        );
        if converged || iterations >= config.max_iterations {
            if !converged {
                warn!(
                    "no convergence after {iterations} iterations, last displacement {displacement:?}"
                );
            }
            let segmentation = Segmentation {
                width: input.width,
                height: input.height,
                centroids: updated.centroids,
                labels,
                iterations,
                converged,
            };
            return Ok((segmentation, info));
        }

        centroids = updated.centroids;
        assignment = assign_all(&centroids);
        info.fallback_pixels.push(assignment.fallback_pixels);
    }
}
