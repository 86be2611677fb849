// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Polynomials in z⁻¹
//!
//! Filter coefficients are already polynomials.  `b[0] + b[1]z⁻¹ + b[2]z⁻²` is ascending in `z⁻¹`,
//! so storing them in filter order *is* storing them in ascending degree.  Series composition is
//! then a plain convolution with no reversing on either side.
//!
//! The only place the other convention appears is when looking for poles.  Multiplying the
//! denominator through by `zᴺ` turns it into a polynomial in `z` whose coefficients run the other
//! way, which [`ZPoly::to_z_ascending`] makes explicit.

use std::ops::Mul;

use num_complex::Complex;
use num_traits::{Float, Zero};

/// Polynomial in `z⁻¹`.  Index `i` holds the coefficient of `z⁻ⁱ`.
#[derive(Clone, Debug, PartialEq)]
pub struct ZPoly<T> {
    coeffs: Vec<T>,
}

impl<T: Float> ZPoly<T> {
    /// An empty coefficient list is the zero polynomial.
    pub fn new(coeffs: Vec<T>) -> Self {
        if coeffs.is_empty() {
            Self {
                coeffs: vec![T::zero()],
            }
        } else {
            Self { coeffs }
        }
    }

    pub fn coeffs(&self) -> &[T] {
        &self.coeffs
    }

    /// Highest power of `z⁻¹`, including trailing zero coefficients.
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Coefficient of `z⁰`.  Normalized denominators keep this at one.
    pub fn constant(&self) -> T {
        self.coeffs[0]
    }

    /// Convolve coefficient lists.  Degrees add.
    pub fn convolve(&self, other: &Self) -> Self {
        let mut out = vec![T::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, &x) in self.coeffs.iter().enumerate() {
            for (j, &y) in other.coeffs.iter().enumerate() {
                out[i + j] = out[i + j] + x * y;
            }
        }
        Self { coeffs: out }
    }

    /// Evaluate at a point given as `z⁻¹`.  On the unit circle pass `e^(-jw)`.
    pub fn eval(&self, z_inv: Complex<T>) -> Complex<T> {
        self.coeffs
            .iter()
            .rev()
            .fold(Complex::zero(), |acc, &c| acc * z_inv + c)
    }

    /// Coefficients of the same polynomial multiplied through by `zᴺ`, ascending in `z`.  The roots
    /// of this list are the poles or zeros of the section.
    pub fn to_z_ascending(&self) -> Vec<T> {
        self.coeffs.iter().rev().copied().collect()
    }
}

impl<T: Float> Mul for &ZPoly<T> {
    type Output = ZPoly<T>;

    fn mul(self, rhs: Self) -> ZPoly<T> {
        self.convolve(rhs)
    }
}
