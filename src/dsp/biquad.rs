use super::design::BiquadCoefficients;

/// One second-order filter stage: a coefficient set plus the two-sample
/// delay line of the direct-form-II-transposed realization.
pub struct FilterStage {
    coeffs: BiquadCoefficients,
    z1: f32,
    z2: f32,
}

impl FilterStage {
    pub fn new(coeffs: BiquadCoefficients) -> Self {
        Self {
            coeffs,
            z1: 0.0,
            z2: 0.0,
        }
    }

    #[inline]
    pub fn process_sample(&mut self, sample: f32) -> f32 {
        let y = self.coeffs.b0 * sample + self.z1;
        self.z1 = self.coeffs.b1 * sample - self.coeffs.a1 * y + self.z2;
        self.z2 = self.coeffs.b2 * sample - self.coeffs.a2 * y;
        y
    }

    /// Replaces the coefficients while keeping the delay state, so a gain
    /// change mid-stream does not introduce a discontinuity. Callers that
    /// share the stage across threads serialize this against
    /// `process_sample` (the engine holds its bank lock for both).
    pub fn update_coefficients(&mut self, coeffs: BiquadCoefficients) {
        self.coeffs = coeffs;
    }

    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }
}

impl Default for FilterStage {
    fn default() -> Self {
        Self::new(BiquadCoefficients::identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_stage_is_bit_exact_passthrough() {
        let mut stage = FilterStage::default();
        for sample in [0.0, 1.0, -0.5, 0.25, 0.999_f32] {
            assert_eq!(stage.process_sample(sample), sample);
        }
    }

    #[test]
    fn recurrence_matches_direct_form() {
        let coeffs = BiquadCoefficients {
            b0: 0.2,
            b1: 0.3,
            b2: 0.1,
            a1: -0.4,
            a2: 0.05,
        };
        let mut stage = FilterStage::new(coeffs);
        let input = [1.0, 0.5, -0.25, 0.0, 0.75];

        let mut x1 = 0.0_f32;
        let mut x2 = 0.0_f32;
        let mut y1 = 0.0_f32;
        let mut y2 = 0.0_f32;
        for &x in &input {
            let expected =
                coeffs.b0 * x + coeffs.b1 * x1 + coeffs.b2 * x2 - coeffs.a1 * y1 - coeffs.a2 * y2;
            let actual = stage.process_sample(x);
            assert!(
                (actual - expected).abs() < 1e-6,
                "expected {expected}, got {actual}"
            );
            x2 = x1;
            x1 = x;
            y2 = y1;
            y1 = expected;
        }
    }

    #[test]
    fn coefficient_update_keeps_delay_state() {
        let coeffs = BiquadCoefficients {
            b0: 0.5,
            b1: 0.5,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        };
        let mut stage = FilterStage::new(coeffs);
        stage.process_sample(1.0);
        stage.update_coefficients(BiquadCoefficients::identity());
        // z1 still carries 0.5 from the previous input.
        assert_eq!(stage.process_sample(0.0), 0.5);
    }
}
