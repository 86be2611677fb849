// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Infinite Impulse Response
//!
//! Closed-form coefficient derivations.  Nothing here iterates or fits; every function is a fixed
//! sequence of float operations so that the generated runtime can repeat it bit for bit.
//!
//! ## Included Designs
//!
//! - `bessel_bilinear`: Bessel lowpass of order 2, 3 or 4 through the prewarped bilinear transform.
//!   The zeros all sit at `z = -1`.
//! - `bessel2_zinf`: second order Bessel lowpass derived directly in the z-domain with both zeros
//!   moved to `z_inf`.  This is the production lowpass.  At `z_inf = -1` it is the bilinear design.
//! - `hishelf`: the common audio-EQ high shelf.
//!
//! Bessel prototypes are normalized for unit group delay, not for a -3dB point at `w = 1`.  The
//! scale factor that moves the -3dB point to `w = 1` is the positive root of a calibration
//! polynomial, see [`BesselOrder`].

use std::f64::consts::{PI, TAU};

use log::warn;

use super::{FilterSpec, cascade::Section, finite, positive, roots};
use crate::prelude::*;

/// -3dB frequency of the unit-delay second order Bessel prototype.
pub const BESSEL2_3DB: f64 = 1.3616541287161306;
/// -3dB frequency of the unit-delay third order Bessel prototype.
pub const BESSEL3_3DB: f64 = 1.7556723686812106;
/// -3dB frequency of the unit-delay fourth order Bessel prototype.
pub const BESSEL4_3DB: f64 = 2.113917674904216;

/// Supported Bessel orders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BesselOrder {
    Two,
    Three,
    Four,
}

impl BesselOrder {
    pub const ALL: [BesselOrder; 3] = [BesselOrder::Two, BesselOrder::Three, BesselOrder::Four];

    pub fn degree(&self) -> usize {
        match self {
            BesselOrder::Two => 2,
            BesselOrder::Three => 3,
            BesselOrder::Four => 4,
        }
    }

    /// `|D(jw)|² - 2·D(0)²` with `w²` expanded, ascending powers of `w`.  The -3dB frequency is its
    /// only positive real root.
    pub fn calibration_polynomial(&self) -> &'static [f64] {
        match self {
            BesselOrder::Two => &[-9.0, 0.0, 3.0, 0.0, 1.0],
            BesselOrder::Three => &[-225.0, 0.0, 45.0, 0.0, 6.0, 0.0, 1.0],
            BesselOrder::Four => &[-11025.0, 0.0, 1575.0, 0.0, 135.0, 0.0, 10.0, 0.0, 1.0],
        }
    }

    /// Hard-coded -3dB scale factor.
    pub fn cutoff_3db(&self) -> f64 {
        match self {
            BesselOrder::Two => BESSEL2_3DB,
            BesselOrder::Three => BESSEL3_3DB,
            BesselOrder::Four => BESSEL4_3DB,
        }
    }

    /// Solve the calibration polynomial instead of trusting the constant.
    pub fn solve_cutoff_3db(&self) -> Result<f64> {
        roots::positive_real_root(self.calibration_polynomial())
    }
}

impl std::fmt::Display for BesselOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.degree())
    }
}

/// Normalized second order coefficients, `a0 == 1` implied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Biquad {
    pub fn b(&self) -> [f64; 3] {
        [self.b0, self.b1, self.b2]
    }

    /// Denominator including the implied leading one.
    pub fn a(&self) -> [f64; 3] {
        [1.0, self.a1, self.a2]
    }

    pub fn section(&self) -> Section {
        Section::from_normalized(self.b().to_vec(), self.a().to_vec())
    }

    /// Jury conditions for a monic quadratic.  Cheaper than finding the poles.
    pub fn is_stable(&self) -> bool {
        self.a2.abs() < 1.0 && self.a1.abs() < 1.0 + self.a2
    }

    fn check_finite(self, what: &str) -> Result<Self> {
        if self.b().iter().chain(self.a().iter()).all(|c| c.is_finite()) {
            Ok(self)
        } else {
            Err(SynthgenError::NonFinite(format!("{what} coefficients")))
        }
    }
}

impl From<Biquad> for Section {
    fn from(bq: Biquad) -> Self {
        bq.section()
    }
}

/// Prewarped bilinear Bessel lowpass of any supported order.
pub fn bessel_bilinear(spec: &FilterSpec) -> Section {
    let wc = TAU * spec.fc() / spec.order().cutoff_3db();
    let k = 1.0 / (wc / (2.0 * spec.sr())).tan();

    let (b, a) = match spec.order() {
        BesselOrder::Two => {
            // 3 / (s² + 3s + 3)
            let a0 = (k + 3.0) * k + 3.0;
            let a1 = (-2.0 * k * k + 6.0) / a0;
            let a2 = ((k - 3.0) * k + 3.0) / a0;
            let b0 = 3.0 / a0;
            (vec![b0, 2.0 * b0, b0], vec![1.0, a1, a2])
        }
        BesselOrder::Three => {
            // 15 / (s³ + 6s² + 15s + 15)
            let a0 = ((k + 6.0) * k + 15.0) * k + 15.0;
            let a1 = (((-3.0 * k - 6.0) * k + 15.0) * k + 45.0) / a0;
            let a2 = (((3.0 * k - 6.0) * k - 15.0) * k + 45.0) / a0;
            let a3 = (((-k + 6.0) * k - 15.0) * k + 15.0) / a0;
            let b0 = 15.0 / a0;
            let b1 = 45.0 / a0;
            (vec![b0, b1, b1, b0], vec![1.0, a1, a2, a3])
        }
        BesselOrder::Four => {
            // 105 / (s⁴ + 10s³ + 45s² + 105s + 105)
            let k2 = k * k;
            let a0 = (((k + 10.0) * k + 45.0) * k + 105.0) * k + 105.0;
            let a1 = (((-4.0 * k - 20.0) * k2 + 210.0) * k + 420.0) / a0;
            let a2 = ((6.0 * k2 - 90.0) * k2 + 630.0) / a0;
            let a3 = (((-4.0 * k + 20.0) * k2 - 210.0) * k + 420.0) / a0;
            let a4 = ((((k - 10.0) * k + 45.0) * k - 105.0) * k + 105.0) / a0;
            let b0 = 105.0 / a0;
            let b1 = 420.0 / a0;
            let b2 = 630.0 / a0;
            (vec![b0, b1, b2, b1, b0], vec![1.0, a1, a2, a3, a4])
        }
    };
    Section::from_normalized(b, a)
}

/// Second order bilinear Bessel as a [`Biquad`].  Kept next to the production form as the
/// reference it must agree with at `z_inf = -1`.
pub fn bessel2_bilinear(fc: f64, sr: f64) -> Result<Biquad> {
    let spec = FilterSpec::new(BesselOrder::Two, fc, sr)?;
    let wc = TAU * spec.fc() / BESSEL2_3DB;
    let k = 1.0 / (wc / (2.0 * spec.sr())).tan();
    let a0 = (k + 3.0) * k + 3.0;
    let b0 = 3.0 / a0;
    Biquad {
        b0,
        b1: 2.0 * b0,
        b2: b0,
        a1: (-2.0 * k * k + 6.0) / a0,
        a2: ((k - 3.0) * k + 3.0) / a0,
    }
    .check_finite("bessel2 bilinear")
}

/// Normalized angular design frequency of the second order lowpass.  The generated runtime uses the
/// same expression in the same order.
pub fn bessel2_w0(fc: f64, sr: f64) -> f64 {
    TAU * fc / sr / BESSEL2_3DB
}

/// Second order Bessel lowpass with both zeros at `z_inf`.  The poles depend only on `w0`, the
/// zeros are placed afterwards and the numerator rescaled for unit gain at DC.
///
/// The poles are inside the unit circle for every `w0` in `(0, π)`.
pub fn bessel2_zinf(w0: f64, z_inf: f64) -> Result<Biquad> {
    let w0 = positive("w0", w0)?;
    if w0 >= PI {
        return Err(SynthgenError::InvalidFilterParameter {
            name: "w0",
            value: w0,
        });
    }
    let z_inf = finite("z_inf", z_inf)?;
    if z_inf == 1.0 {
        // Zeros at DC cannot be normalized to unit DC gain.
        return Err(SynthgenError::InvalidFilterParameter {
            name: "z_inf",
            value: z_inf,
        });
    }
    if z_inf > -1.0 {
        warn!("z_inf {z_inf} inside the unit circle, stopband will not reach Nyquist");
    }

    let (sin, cos) = w0.sin_cos();
    let oa0 = 1.0 / (4.0 - 2.0 * cos + 3.0 * sin);
    let a1 = (4.0 - 8.0 * cos) * oa0;
    let a2 = (4.0 - 2.0 * cos - 3.0 * sin) * oa0;
    let b0 = 12.0 * (1.0 - cos) / ((1.0 - z_inf) * (1.0 - z_inf)) * oa0;
    let zb0 = z_inf * b0;
    Biquad {
        b0,
        b1: -2.0 * zb0,
        b2: z_inf * zb0,
        a1,
        a2,
    }
    .check_finite("bessel2 z_inf")
}

/// High shelf with corner `fc`, shelf gain `db` and shelf slope `slope`.  Unit gain at DC.
pub fn hishelf(fc: f64, db: f64, slope: f64, sr: f64) -> Result<Biquad> {
    let sr = positive("sr", sr)?;
    let fc = positive("fc", fc)?;
    if fc >= sr / 2.0 {
        return Err(SynthgenError::InvalidFilterParameter {
            name: "fc",
            value: fc,
        });
    }
    let slope = positive("slope", slope)?;
    let db = finite("db", db)?;

    let amp = 10.0f64.powf(db / 40.0);
    let wc = TAU * fc / sr;
    let (sin, cos) = wc.sin_cos();
    let radicand = (amp + 1.0 / amp) * (1.0 / slope - 1.0) + 2.0;
    if radicand < 0.0 {
        return Err(SynthgenError::InvalidFilterParameter {
            name: "slope",
            value: slope,
        });
    }
    let alpha = 0.5 * sin * radicand.sqrt();

    let ap1 = amp + 1.0;
    let am1 = amp - 1.0;
    let ap1cos = ap1 * cos;
    let am1cos = am1 * cos;
    let sqrt_a_alpha2 = 2.0 * amp.sqrt() * alpha;

    let a0 = ap1 - am1cos + sqrt_a_alpha2;
    Biquad {
        b0: amp * (ap1 + am1cos + sqrt_a_alpha2) / a0,
        b1: -2.0 * amp * (am1 + ap1cos) / a0,
        b2: amp * (ap1 + am1cos - sqrt_a_alpha2) / a0,
        a1: 2.0 * (am1 - ap1cos) / a0,
        a2: (ap1 - am1cos - sqrt_a_alpha2) / a0,
    }
    .check_finite("hishelf")
}
