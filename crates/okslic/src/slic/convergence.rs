use crate::types::Centroid;

/// Sum of `|dx| + |dy|` between the two sets after sorting both by `(y, x)`.
///
/// `None` when the sets differ in size, which makes them incomparable.
pub fn total_displacement(previous: &[Centroid], next: &[Centroid]) -> Option<f32> {
    if previous.len() != next.len() {
        return None;
    }

    let mut previous = previous.to_vec();
    let mut next = next.to_vec();
    previous.sort_unstable();
    next.sort_unstable();

    Some(
        previous
            .iter()
            .zip(&next)
            .map(|(p, n)| p.displacement(n))
            .sum(),
    )
}

/// Position-only check: color drift alone never keeps the loop going.
pub fn has_converged(previous: &[Centroid], next: &[Centroid], threshold: f32) -> bool {
    total_displacement(previous, next).is_some_and(|d| d < threshold)
}
