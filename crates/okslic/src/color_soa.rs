use crate::config::ColorSpace;
use rgb::RGB8;

// Oklab L is in 0..1, so this brings it to the same range as 8-bit channels
const OKLAB_SCALE: f32 = 255.0;

/// Per-pixel color coordinates in the working color space, stored as a
/// structure of arrays in row-major order.
#[derive(Debug)]
pub struct ColorSoA {
    pub width: u16,
    pub height: u16,
    pub c0: Vec<f32>,
    pub c1: Vec<f32>,
    pub c2: Vec<f32>,
}

impl ColorSoA {
    pub fn new(width: u16, height: u16) -> Self {
        let n = width as usize * height as usize;
        Self {
            width,
            height,
            c0: Vec::with_capacity(n),
            c1: Vec::with_capacity(n),
            c2: Vec::with_capacity(n),
        }
    }

    #[inline(always)]
    pub fn push(&mut self, [c0, c1, c2]: [f32; 3]) {
        self.c0.push(c0);
        self.c1.push(c1);
        self.c2.push(c2);
    }

    #[inline(always)]
    pub fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline(always)]
    pub fn get(&self, i: usize) -> [f32; 3] {
        [self.c0[i], self.c1[i], self.c2[i]]
    }

    pub fn len(&self) -> usize {
        self.c0.len()
    }
}

#[inline(always)]
pub fn to_color_space(space: ColorSpace, color: RGB8) -> [f32; 3] {
    match space {
        ColorSpace::Rgb => [color.r as f32, color.g as f32, color.b as f32],
        ColorSpace::Oklab => {
            let lab = oklab::linear_srgb_to_oklab(oklab::LinearRgb {
                r: fast_srgb8::srgb8_to_f32(color.r),
                g: fast_srgb8::srgb8_to_f32(color.g),
                b: fast_srgb8::srgb8_to_f32(color.b),
            });
            [lab.l * OKLAB_SCALE, lab.a * OKLAB_SCALE, lab.b * OKLAB_SCALE]
        }
    }
}

#[inline(always)]
pub fn squared_distance(x: [f32; 3], y: [f32; 3]) -> f32 {
    let d0 = x[0] - y[0];
    let d1 = x[1] - y[1];
    let d2 = x[2] - y[2];
    d0.mul_add(d0, d1.mul_add(d1, d2 * d2))
}

pub fn convert(space: ColorSpace, width: u16, height: u16, buf: &[u8]) -> ColorSoA {
    assert!(!buf.is_empty());
    assert!(width > 0);
    assert!(height > 0);
    assert_eq!(buf.len(), width as usize * height as usize * 3);

    let mut result = ColorSoA::new(width, height);
    for pixel in buf.chunks_exact(3) {
        let color = RGB8 {
            r: pixel[0],
            g: pixel[1],
            b: pixel[2],
        };
        result.push(to_color_space(space, color));
    }

    assert_eq!(result.len(), width as usize * height as usize);

    result
}
