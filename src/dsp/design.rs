use std::f32::consts::PI;

use crate::error::DspError;

/// Response shape of one equalizer stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterShape {
    LowShelf,
    Peaking,
    HighShelf,
}

/// Normalized biquad coefficients (a0 already folded into the others).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Exact passthrough transfer function.
    pub fn identity() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }
}

/// Designs one shelving or peaking biquad via the RBJ cookbook
/// (analog-prototype bilinear transform).
///
/// For shelves the `q_factor` argument acts as the shelf slope S. A gain of
/// exactly 0 dB yields `BiquadCoefficients::identity()` for every shape;
/// the engine relies on a flat band being a bit-exact passthrough.
///
/// Gain is the caller's to clamp; frequency, Q and sample rate must be
/// positive and finite.
pub fn compute_coefficients(
    shape: FilterShape,
    frequency: f32,
    gain_db: f32,
    q_factor: f32,
    sample_rate: f32,
) -> Result<BiquadCoefficients, DspError> {
    validate_positive("frequency", frequency)?;
    validate_positive("q_factor", q_factor)?;
    validate_positive("sample_rate", sample_rate)?;
    if !gain_db.is_finite() {
        return Err(DspError::InvalidParameter(format!(
            "gain_db must be finite, got {gain_db}"
        )));
    }

    if gain_db == 0.0 {
        return Ok(BiquadCoefficients::identity());
    }

    Ok(match shape {
        FilterShape::Peaking => peaking_coefficients(sample_rate, frequency, gain_db, q_factor),
        FilterShape::LowShelf => low_shelf_coefficients(sample_rate, frequency, gain_db, q_factor),
        FilterShape::HighShelf => {
            high_shelf_coefficients(sample_rate, frequency, gain_db, q_factor)
        }
    })
}

fn validate_positive(name: &str, value: f32) -> Result<(), DspError> {
    // `!(value > 0.0)` also rejects NaN.
    if !(value > 0.0) || !value.is_finite() {
        return Err(DspError::InvalidParameter(format!(
            "{name} must be positive and finite, got {value}"
        )));
    }
    Ok(())
}

fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

fn normalize(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> BiquadCoefficients {
    let inv_a0 = 1.0 / a0;
    BiquadCoefficients {
        b0: b0 * inv_a0,
        b1: b1 * inv_a0,
        b2: b2 * inv_a0,
        a1: a1 * inv_a0,
        a2: a2 * inv_a0,
    }
}

fn peaking_coefficients(
    sample_rate: f32,
    frequency: f32,
    gain_db: f32,
    q_factor: f32,
) -> BiquadCoefficients {
    let w0 = 2.0 * PI * frequency / sample_rate;
    let alpha = w0.sin() / (2.0 * q_factor);
    let a = db_to_gain(gain_db / 2.0);
    let cos_w0 = w0.cos();

    normalize(
        1.0 + alpha * a,
        -2.0 * cos_w0,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cos_w0,
        1.0 - alpha / a,
    )
}

fn low_shelf_coefficients(
    sample_rate: f32,
    frequency: f32,
    gain_db: f32,
    slope: f32,
) -> BiquadCoefficients {
    let w0 = 2.0 * PI * frequency / sample_rate;
    let a = db_to_gain(gain_db / 2.0);
    let cos_w0 = w0.cos();
    let sin_w0 = w0.sin();
    let alpha = sin_w0 * 0.5 * ((a + 1.0 / a) * (1.0 / slope - 1.0) + 2.0).sqrt();
    let beta = 2.0 * a.sqrt() * alpha;

    normalize(
        a * ((a + 1.0) - (a - 1.0) * cos_w0 + beta),
        2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0),
        a * ((a + 1.0) - (a - 1.0) * cos_w0 - beta),
        (a + 1.0) + (a - 1.0) * cos_w0 + beta,
        -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0),
        (a + 1.0) + (a - 1.0) * cos_w0 - beta,
    )
}

fn high_shelf_coefficients(
    sample_rate: f32,
    frequency: f32,
    gain_db: f32,
    slope: f32,
) -> BiquadCoefficients {
    let w0 = 2.0 * PI * frequency / sample_rate;
    let a = db_to_gain(gain_db / 2.0);
    let cos_w0 = w0.cos();
    let sin_w0 = w0.sin();
    let alpha = sin_w0 * 0.5 * ((a + 1.0 / a) * (1.0 / slope - 1.0) + 2.0).sqrt();
    let beta = 2.0 * a.sqrt() * alpha;

    normalize(
        a * ((a + 1.0) + (a - 1.0) * cos_w0 + beta),
        -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0),
        a * ((a + 1.0) + (a - 1.0) * cos_w0 - beta),
        (a + 1.0) - (a - 1.0) * cos_w0 + beta,
        2.0 * ((a - 1.0) - (a + 1.0) * cos_w0),
        (a + 1.0) - (a - 1.0) * cos_w0 - beta,
    )
}
