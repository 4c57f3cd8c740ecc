/// Weight times its natural logarithm, with `0 · ln 0` taken as 0
///
/// Precomputed per pattern so a cell's entropy can be updated in O(1)
/// whenever a candidate is removed.
pub fn plogp(weight: f64) -> f64 {
    if weight > 0.0 {
        weight * weight.ln()
    } else {
        0.0
    }
}

/// Shannon entropy of an unnormalized weight distribution
///
/// Uses the identity `H = ln S − (Σ w ln w) / S` with `S = Σ w`, the same
/// form the wave memoizes incrementally. Non-positive weights are ignored.
pub fn shannon_entropy(weights: &[f64]) -> f64 {
    let (sum, plogp_sum) = weights
        .iter()
        .filter(|&&w| w > 0.0)
        .fold((0.0, 0.0), |(sum, plogp_sum), &w| (sum + w, plogp_sum + plogp(w)));
    entropy_from_sums(sum, plogp_sum)
}

/// Entropy from a running weight sum and `Σ w ln w`
pub fn entropy_from_sums(sum: f64, plogp_sum: f64) -> f64 {
    if sum > 0.0 {
        (sum.ln() - plogp_sum / sum).max(0.0)
    } else {
        0.0
    }
}
