// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Root Solver
//!
//! Simultaneous (Durand-Kerner) iteration over all complex roots of a real polynomial.  The degrees
//! we deal with are tiny, so the quadratic cost per iteration does not matter and the method's
//! lack of tuning knobs does.
//!
//! Two callers:
//!
//! - Bessel calibration.  The -3dB frequency of an N-pole Bessel filter is the unique positive real
//!   root of a fixed even polynomial.  [`positive_real_root`] refuses to pick one when there is
//!   not exactly one candidate.
//! - Pole checks on derived sections, see [`crate::dsp::cascade::Section::poles`].

use num_complex::Complex64;

use crate::prelude::*;

/// Imaginary parts smaller than this are treated as rounding noise on a real root.
pub const REAL_TOLERANCE: f64 = 1e-8;

const MAX_ITERATIONS: usize = 1000;
const CONVERGED: f64 = 1e-14;

/// All complex roots of the polynomial with ascending coefficients `coeffs`.  Trailing zero
/// coefficients are dropped.  Constant polynomials have no roots.
pub fn roots(coeffs: &[f64]) -> Result<Vec<Complex64>> {
    if let Some((i, c)) = coeffs.iter().enumerate().find(|(_, c)| !c.is_finite()) {
        return Err(SynthgenError::NonFinite(format!(
            "polynomial coefficient {i}: {c}"
        )));
    }

    let Some(lead) = coeffs.iter().rposition(|c| *c != 0.0) else {
        return Ok(Vec::new());
    };
    let degree = lead;
    if degree == 0 {
        return Ok(Vec::new());
    }
    let monic: Vec<f64> = coeffs[..=lead].iter().map(|c| c / coeffs[lead]).collect();

    // Seeds on a spiral that is neither real nor a root of unity.
    let seed = Complex64::new(0.4, 0.9);
    let mut z: Vec<Complex64> = (0..degree).map(|k| seed.powu(k as u32)).collect();

    for _ in 0..MAX_ITERATIONS {
        let mut largest_step: f64 = 0.0;
        for i in 0..degree {
            let p = monic
                .iter()
                .rev()
                .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z[i] + c);
            let mut denom = Complex64::new(1.0, 0.0);
            for j in 0..degree {
                if i != j {
                    denom *= z[i] - z[j];
                }
            }
            let step = p / denom;
            z[i] -= step;
            largest_step = largest_step.max(step.norm() / z[i].norm().max(1.0));
        }
        if !largest_step.is_finite() {
            break;
        }
        if largest_step < CONVERGED {
            return Ok(z);
        }
    }

    Err(SynthgenError::RootConvergence { degree })
}

/// The unique root with positive real part and negligible imaginary part.
pub fn positive_real_root(coeffs: &[f64]) -> Result<f64> {
    let all = roots(coeffs)?;
    let degree = all.len();
    let candidates: Vec<f64> = all
        .iter()
        .filter(|r| r.re > 0.0 && r.im.abs() < REAL_TOLERANCE)
        .map(|r| r.re)
        .collect();

    match candidates.as_slice() {
        [root] => Ok(*root),
        [] => Err(SynthgenError::RootNotFound { degree }),
        many => Err(SynthgenError::RootAmbiguous {
            degree,
            count: many.len(),
        }),
    }
}
