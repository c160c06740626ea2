//! Gaussian blur approximated by repeated box filters.
//!
//! Three box passes per axis give a close Gaussian at a cost independent of
//! sigma, which keeps large glow radii affordable on the CPU.

/// Number of box passes per axis.
pub const PASSES: usize = 3;

/// Odd box widths whose repeated application approximates a Gaussian of `sigma`.
pub fn box_sizes_for_gaussian(sigma: f32, passes: usize) -> Vec<usize> {
    if !(sigma.is_finite() && sigma > 0.0) || passes == 0 {
        return vec![1; passes];
    }
    let n = passes as f32;
    let ideal = (12.0 * sigma * sigma / n + 1.0).sqrt();
    let mut lower = ideal.floor().max(1.0) as usize;
    if lower % 2 == 0 {
        lower -= 1;
    }
    let upper = lower + 2;
    let wl = lower as f32;
    let m = ((12.0 * sigma * sigma - n * wl * wl - 4.0 * n * wl - 3.0 * n) / (-4.0 * wl - 4.0))
        .round()
        .max(0.0) as usize;
    (0..passes)
        .map(|i| if i < m { lower } else { upper })
        .collect()
}

/// Blurs a single-channel `width` x `height` buffer. Samples outside the
/// buffer count as zero.
pub fn gaussian_blur(src: &[f32], width: usize, height: usize, sigma: f32) -> Vec<f32> {
    let mut out = src.to_vec();
    if width == 0 || height == 0 || src.len() != width * height {
        return out;
    }
    if !(sigma.is_finite() && sigma > 0.0) {
        return out;
    }
    let mut tmp = vec![0.0_f32; out.len()];
    for size in box_sizes_for_gaussian(sigma, PASSES) {
        let radius = (size - 1) / 2;
        box_pass(&out, &mut tmp, width, height, radius, Axis::Horizontal);
        box_pass(&tmp, &mut out, width, height, radius, Axis::Vertical);
    }
    out
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// One running-sum box filter of half-width `radius` along `axis`.
fn box_pass(src: &[f32], dst: &mut [f32], width: usize, height: usize, radius: usize, axis: Axis) {
    let (lines, len, line_stride, step) = match axis {
        Axis::Horizontal => (height, width, width, 1),
        Axis::Vertical => (width, height, 1, width),
    };
    let norm = 1.0 / (2 * radius + 1) as f32;
    for line in 0..lines {
        let base = line * line_stride;
        let at = |i: usize| src[base + i * step];
        let mut acc: f32 = (0..=radius.min(len - 1)).map(at).sum();
        for i in 0..len {
            dst[base + i * step] = (acc * norm).max(0.0);
            let enter = i + radius + 1;
            if enter < len {
                acc += at(enter);
            }
            if i >= radius {
                acc -= at(i - radius);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_sizes_are_odd_and_grow_with_sigma() {
        let small = box_sizes_for_gaussian(2.0, PASSES);
        let large = box_sizes_for_gaussian(40.0, PASSES);
        assert_eq!(small.len(), 3);
        assert!(small.iter().chain(&large).all(|s| s % 2 == 1));
        assert!(large.iter().sum::<usize>() > small.iter().sum::<usize>());
    }

    #[test]
    fn box_sizes_variance_matches_sigma() {
        // Variance of a box of width w is (w^2 - 1) / 12; passes add up.
        let sigma = 40.0_f32;
        let variance: f32 = box_sizes_for_gaussian(sigma, PASSES)
            .iter()
            .map(|&w| ((w * w - 1) as f32) / 12.0)
            .sum();
        assert!((variance.sqrt() - sigma).abs() < 1.5, "sigma ~ {}", variance.sqrt());
    }

    #[test]
    fn zero_sigma_is_identity() {
        let src = vec![0.0, 1.0, 0.5, 0.25];
        assert_eq!(gaussian_blur(&src, 2, 2, 0.0), src);
    }

    #[test]
    fn blur_spreads_impulse_symmetrically() {
        let (w, h) = (21, 21);
        let mut src = vec![0.0_f32; w * h];
        src[10 * w + 10] = 1.0;
        let out = gaussian_blur(&src, w, h, 2.0);
        let center = out[10 * w + 10];
        assert!(center < 1.0 && center > 0.0);
        assert!((out[10 * w + 8] - out[10 * w + 12]).abs() < 1e-6);
        assert!((out[8 * w + 10] - out[12 * w + 10]).abs() < 1e-6);
        let total: f32 = out.iter().sum();
        assert!((total - 1.0).abs() < 1e-3, "mass {total}");
    }

    #[test]
    fn blur_keeps_flat_interior_flat() {
        let (w, h) = (40, 40);
        let src = vec![0.5_f32; w * h];
        let out = gaussian_blur(&src, w, h, 1.5);
        assert!((out[20 * w + 20] - 0.5).abs() < 1e-5);
        assert!(out[0] < 0.5, "edges darken with zero padding");
    }

    #[test]
    fn mismatched_buffer_is_returned_unchanged() {
        let src = vec![1.0_f32; 3];
        assert_eq!(gaussian_blur(&src, 2, 2, 3.0), src);
    }
}
