/// Piecewise-linear interpolation of `x` over the breakpoints `xp`.
///
/// `xp` must be increasing and as long as `fp`. Outside the breakpoints the
/// first/last value is held.
pub fn interp(x: f32, xp: &[f32], fp: &[f32]) -> f32 {
    debug_assert_eq!(xp.len(), fp.len());

    let (Some(&first), Some(&last)) = (xp.first(), xp.last()) else {
        return f32::NAN;
    };
    if x.is_nan() {
        return f32::NAN;
    }
    if x <= first {
        return fp[0];
    }
    if x >= last {
        return fp[fp.len() - 1];
    }

    // xp[i] <= x < xp[i + 1]
    let i = xp.partition_point(|&p| p <= x) - 1;
    let t = (x - xp[i]) / (xp[i + 1] - xp[i]);
    fp[i] + t * (fp[i + 1] - fp[i])
}

/// Resamples `fp` (sampled at `xp`) onto every point of `xs`.
pub fn interp_many(xs: &[f32], xp: &[f32], fp: &[f32]) -> Vec<f32> {
    xs.iter().map(|&x| interp(x, xp, fp)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const XP: [f32; 3] = [0.0, 1.0, 3.0];
    const FP: [f32; 3] = [10.0, 20.0, 0.0];

    #[test]
    fn holds_end_values_outside_range() {
        assert_eq!(interp(-5.0, &XP, &FP), 10.0);
        assert_eq!(interp(4.0, &XP, &FP), 0.0);
    }

    #[test]
    fn hits_breakpoints_exactly() {
        assert_eq!(interp(0.0, &XP, &FP), 10.0);
        assert_eq!(interp(1.0, &XP, &FP), 20.0);
        assert_eq!(interp(3.0, &XP, &FP), 0.0);
    }

    #[test]
    fn interpolates_between_breakpoints() {
        assert!((interp(0.5, &XP, &FP) - 15.0).abs() < 1e-6);
        assert!((interp(2.0, &XP, &FP) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn nan_input_gives_nan() {
        assert!(interp(f32::NAN, &XP, &FP).is_nan());
    }

    #[test]
    fn nan_samples_propagate() {
        let fp = [0.0, f32::NAN, 1.0];
        assert!(interp(0.5, &XP, &fp).is_nan());
        assert_eq!(interp(0.0, &XP, &fp), 0.0);
    }

    #[test]
    fn resamples_onto_grid() {
        let out = interp_many(&[0.0, 0.5, 2.0, 10.0], &XP, &FP);
        assert_eq!(out.len(), 4);
        assert!((out[1] - 15.0).abs() < 1e-6);
        assert_eq!(out[3], 0.0);
    }
}
