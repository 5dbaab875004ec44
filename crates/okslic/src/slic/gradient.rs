use crate::color_soa::ColorSoA;

/// Local color variation at `(x, y)`: the norm of the horizontal central
/// difference plus the norm of the vertical one.
///
/// Returns `None` on the outermost ring of pixels (and outside the image),
/// where one of the four neighbors doesn't exist.
#[inline]
pub fn gradient(colors: &ColorSoA, x: u16, y: u16) -> Option<f32> {
    if x == 0
        || y == 0
        || x >= colors.width.saturating_sub(1)
        || y >= colors.height.saturating_sub(1)
    {
        return None;
    }

    let left = colors.get(colors.index(x - 1, y));
    let right = colors.get(colors.index(x + 1, y));
    let up = colors.get(colors.index(x, y + 1));
    let down = colors.get(colors.index(x, y - 1));

    Some(norm(right, left) + norm(up, down))
}

#[inline(always)]
fn norm(p: [f32; 3], q: [f32; 3]) -> f32 {
    crate::color_soa::squared_distance(p, q).sqrt()
}
