/// Full discrete linear convolution of two 1D signals.
///
/// The output has `signal.len() + kernel.len() - 1` samples, or none when either input is
/// empty.
///
/// # Example
///
/// ```
/// use lanetrack_imgproc::filter::convolve_1d_full;
///
/// let out = convolve_1d_full(&[1.0, 2.0, 3.0], &[1.0, 1.0]);
/// assert_eq!(out, vec![1.0, 3.0, 5.0, 3.0]);
/// ```
pub fn convolve_1d_full(signal: &[f32], kernel: &[f32]) -> Vec<f32> {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }

    let mut out = vec![0.0; signal.len() + kernel.len() - 1];
    for (i, &s) in signal.iter().enumerate() {
        if s == 0.0 {
            continue;
        }
        for (j, &k) in kernel.iter().enumerate() {
            out[i + j] += s * k;
        }
    }
    out
}
