//! Gaussian kernel smoothing and discrete derivatives.
//!
//! Matches the reference smoother: kernel radius = 4 sigma (rounded),
//! reflect boundary handling, normalized weights. Derivatives are central
//! differences with one-sided stencils at the ends.

/// Smooth a series with a Gaussian kernel of the given sigma.
pub fn gaussian_smooth(values: &[f64], sigma: f64) -> Vec<f64> {
    let n = values.len();
    if n == 0 || sigma <= 0.0 {
        return values.to_vec();
    }

    let radius = (4.0 * sigma + 0.5) as isize;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|x| (-((x * x) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f64 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= total;
    }

    let mut out = vec![0.0; n];
    for i in 0..n {
        let mut acc = 0.0;
        for (k, w) in kernel.iter().enumerate() {
            let j = i as isize + (k as isize - radius);
            acc += w * values[reflect_index(j, n)];
        }
        out[i] = acc;
    }
    out
}

/// Reflect an out-of-range index back into [0, n): (d c b a | a b c d | d c b a).
fn reflect_index(mut idx: isize, n: usize) -> usize {
    let n = n as isize;
    loop {
        if idx < 0 {
            idx = -idx - 1;
        } else if idx >= n {
            idx = 2 * n - idx - 1;
        } else {
            return idx as usize;
        }
    }
}

/// Discrete first derivative: central differences, one-sided at the ends.
pub fn gradient(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut out = vec![0.0; n];
    out[0] = values[1] - values[0];
    out[n - 1] = values[n - 1] - values[n - 2];
    for i in 1..n - 1 {
        out[i] = (values[i + 1] - values[i - 1]) / 2.0;
    }
    out
}

/// Gaussian-smoothed price with its first and second derivatives.
#[derive(Debug, Clone)]
pub struct SmoothedDerivatives {
    pub smoothed: Vec<f64>,
    pub velocity: Vec<f64>,
    pub acceleration: Vec<f64>,
}

/// Smooth the closes and derive velocity/acceleration overlays.
pub fn smoothed_derivatives(closes: &[f64], sigma: f64) -> SmoothedDerivatives {
    let smoothed = gaussian_smooth(closes, sigma);
    let velocity = gradient(&smoothed);
    let acceleration = gradient(&velocity);
    SmoothedDerivatives {
        smoothed,
        velocity,
        acceleration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_preserves_constant() {
        let values = vec![42.0; 50];
        let out = gaussian_smooth(&values, 5.0);
        for v in out {
            assert!((v - 42.0).abs() < 1e-9);
        }
    }

    #[test]
    fn smooth_preserves_linear_interior() {
        // A Gaussian kernel is symmetric, so a linear ramp passes through
        // unchanged away from the boundary.
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let out = gaussian_smooth(&values, 3.0);
        for i in 20..80 {
            assert!(
                (out[i] - values[i]).abs() < 1e-6,
                "linear ramp distorted at {i}: {} vs {}",
                out[i],
                values[i]
            );
        }
    }

    #[test]
    fn smooth_damps_oscillation() {
        let values: Vec<f64> = (0..60)
            .map(|i| 100.0 + if i % 2 == 0 { 3.0 } else { -3.0 })
            .collect();
        let out = gaussian_smooth(&values, 5.0);
        for i in 10..50 {
            assert!((out[i] - 100.0).abs() < 0.5, "oscillation survived at {i}");
        }
    }

    #[test]
    fn reflect_index_small_series() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
    }

    #[test]
    fn gradient_of_linear_is_constant() {
        let values: Vec<f64> = (0..20).map(|i| 3.0 * i as f64).collect();
        let g = gradient(&values);
        for v in g {
            assert!((v - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn gradient_short_series() {
        assert_eq!(gradient(&[1.0]), vec![0.0]);
        let g = gradient(&[1.0, 4.0]);
        assert_eq!(g, vec![3.0, 3.0]);
    }

    #[test]
    fn derivatives_shapes_match() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.2).sin()).collect();
        let d = smoothed_derivatives(&closes, 3.0);
        assert_eq!(d.smoothed.len(), 80);
        assert_eq!(d.velocity.len(), 80);
        assert_eq!(d.acceleration.len(), 80);
    }
}
