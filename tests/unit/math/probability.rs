//! Tests for entropy over unnormalized pattern weights

#[cfg(test)]
mod tests {
    use wavesynth::math::probability::{entropy_from_sums, plogp, shannon_entropy};

    // Tests that uniform weights give ln(n) regardless of scale
    // Verified by dividing by the count instead of the weight sum
    #[test]
    fn test_uniform_entropy() {
        assert!((shannon_entropy(&[1.0, 1.0, 1.0, 1.0]) - 4.0_f64.ln()).abs() < 1e-12);
        assert!((shannon_entropy(&[7.0, 7.0]) - 2.0_f64.ln()).abs() < 1e-12);
    }

    // Tests entropy against the normalized definition for skewed weights
    // Verified by dropping the log of the weight sum
    #[test]
    fn test_skewed_entropy() {
        let weights = [1.0, 2.0, 5.0];
        let total: f64 = weights.iter().sum();
        let expected: f64 = weights
            .iter()
            .map(|w| {
                let p = w / total;
                -p * p.ln()
            })
            .sum();

        assert!((shannon_entropy(&weights) - expected).abs() < 1e-12);
    }

    // Tests degenerate inputs: a single weight, zero weights and empty tables
    // Verified by letting plogp return NaN at zero
    #[test]
    fn test_degenerate_entropy() {
        assert!(shannon_entropy(&[3.0]).abs() < 1e-12);
        assert!(shannon_entropy(&[]).abs() < f64::EPSILON);
        assert!((shannon_entropy(&[2.0, 0.0, 2.0]) - 2.0_f64.ln()).abs() < 1e-12);
        assert!(plogp(0.0).abs() < f64::EPSILON);
        assert!(entropy_from_sums(0.0, 0.0).abs() < f64::EPSILON);
        assert!(entropy_from_sums(1.0, 0.5) >= 0.0);
    }
}
