use burn::prelude::*;

/// Mean binary cross-entropy between raw logits and soft targets in [0,1].
///
/// Computed in the overflow-safe form
/// `max(x, 0) - x·y + ln(1 + e^{-|x|})`.
/// Burn's `BinaryCrossEntropyLoss` only takes integer class targets,
/// which cannot express the 1/3 and 2/3 intensity levels.
pub fn bce_with_logits<B: Backend, const D: usize>(
    logits:  Tensor<B, D>,
    targets: Tensor<B, D>,
) -> Tensor<B, 1> {
    let positive = logits.clone().clamp_min(0.0);
    let soft_log = logits.clone().abs().neg().exp().log1p();
    (positive - logits * targets + soft_log).mean()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn bce(logits: Vec<f32>, targets: Vec<f32>) -> f32 {
        let device = Default::default();
        let n = logits.len();
        let l = Tensor::<TestBackend, 1>::from_data(TensorData::new(logits, [n]), &device);
        let t = Tensor::<TestBackend, 1>::from_data(TensorData::new(targets, [n]), &device);
        bce_with_logits(l, t).into_scalar()
    }

    #[test]
    fn test_zero_logit_costs_ln2() {
        let got = bce(vec![0.0, 0.0], vec![0.0, 1.0]);
        assert!((got - std::f32::consts::LN_2).abs() < 1e-6);
    }

    #[test]
    fn test_matches_naive_formula() {
        let (x, y) = (1.5f32, 2.0f32 / 3.0);
        let p = 1.0 / (1.0 + (-x).exp());
        let naive = -(y * p.ln() + (1.0 - y) * (1.0 - p).ln());
        assert!((bce(vec![x], vec![y]) - naive).abs() < 1e-5);
    }

    #[test]
    fn test_large_logits_stay_finite() {
        let got = bce(vec![80.0, -80.0], vec![0.0, 1.0]);
        assert!(got.is_finite());
        assert!((got - 80.0).abs() < 1e-3);
    }
}
