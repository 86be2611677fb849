// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Cascade
//!
//! Series composition of filter sections.  Running two sections one after the other is the same
//! filter as one section whose numerator and denominator are the products of theirs, so cascading
//! is two polynomial multiplications.  Orders add.

use std::f64::consts::TAU;

use num_complex::Complex64;

use super::{poly::ZPoly, roots};
use crate::prelude::*;

/// A normalized IIR section of any order: `H(z) = B(z⁻¹) / A(z⁻¹)` with `a[0] == 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    b: ZPoly<f64>,
    a: ZPoly<f64>,
}

impl Section {
    /// `b` and `a` are in filter order.  The denominator must already be normalized.
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        if a.is_empty() {
            return Err(SynthgenError::EmptyCoefficients("denominator"));
        }
        if b.len() != a.len() {
            return Err(SynthgenError::SizeMismatch {
                table: "section".to_owned(),
                what: "numerator coefficients".to_owned(),
                expected: a.len(),
                found: b.len(),
            });
        }
        if let Some(c) = b.iter().chain(a.iter()).find(|c| !c.is_finite()) {
            return Err(SynthgenError::NonFinite(format!("section coefficient {c}")));
        }
        if a[0] != 1.0 {
            return Err(SynthgenError::InvalidFilterParameter {
                name: "a0",
                value: a[0],
            });
        }
        Ok(Self {
            b: ZPoly::new(b),
            a: ZPoly::new(a),
        })
    }

    /// Trusted constructor for closed-form derivations that normalize by construction.
    pub(crate) fn from_normalized(b: Vec<f64>, a: Vec<f64>) -> Self {
        debug_assert_eq!(b.len(), a.len());
        debug_assert_eq!(a[0], 1.0);
        Self {
            b: ZPoly::new(b),
            a: ZPoly::new(a),
        }
    }

    pub fn order(&self) -> usize {
        self.a.degree()
    }

    /// Numerator coefficients `b[0..=order]`.
    pub fn b(&self) -> &[f64] {
        self.b.coeffs()
    }

    /// Denominator coefficients `a[0..=order]`, `a[0] == 1`.
    pub fn a(&self) -> &[f64] {
        self.a.coeffs()
    }

    /// The section equivalent to running `self` and then `other`.
    pub fn cascade(&self, other: &Section) -> Section {
        Section {
            b: &self.b * &other.b,
            a: &self.a * &other.a,
        }
    }

    /// Complex response at `freq` Hz for sample rate `sr`.
    pub fn response(&self, freq: f64, sr: f64) -> Complex64 {
        let z_inv = Complex64::from_polar(1.0, -TAU * freq / sr);
        self.b.eval(z_inv) / self.a.eval(z_inv)
    }

    /// Magnitude response in dB.
    pub fn gain_db(&self, freq: f64, sr: f64) -> f64 {
        20.0 * self.response(freq, sr).norm().log10()
    }

    /// Roots of the denominator in the z-plane.
    pub fn poles(&self) -> Result<Vec<Complex64>> {
        roots::roots(&self.a.to_z_ascending())
    }

    /// All poles strictly inside the unit circle.
    pub fn is_stable(&self) -> Result<bool> {
        Ok(self.poles()?.iter().all(|p| p.norm() < 1.0))
    }
}
