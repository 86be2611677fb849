// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Digital Signal Processing
//!
//! Closed-form filter design for the air filter and the pieces needed to reproduce it at runtime.
//!
//! ## Why Bessel
//!
//! Air does not ring.  A sound travelling a long way loses its top end smoothly and its transients
//! stay in place, so the lowpass must have flat group delay rather than a steep knee.  Bessel
//! filters are the family built for exactly that.  Orders 2 through 4 are derived here by hand from
//! their polynomials; only order 2 is used in production because it is cheap enough to re-derive
//! per voice.
//!
//! ## Warping
//!
//! The bilinear transform squeezes the whole analog frequency axis into the band below Nyquist.
//! Prewarping pins one frequency, but a lowpass pinned at its -3dB point still drifts everywhere
//! else, and near Nyquist the zeros at `z = -1` pull the response down far harder than air would.
//! The production lowpass therefore takes two corrections from fitted tables:
//!
//! - an unwarp factor that moves the design frequency so the measured -3dB point lands where it was
//!   asked for.
//! - a zero placement `z_inf` that replaces the fixed bilinear zero at -1.
//!
//! Both tables and their lookup live in [`warp`].  The derivations live in [`iir`], the root
//! solver that calibrates the Bessel frequency scaling in [`roots`], and series composition of
//! sections in [`cascade`] on top of the polynomial type in [`poly`].
//!
//! All math is 64bit.  The runtime consumes 64bit constants too, so nothing is truncated here.

pub mod cascade;
pub mod iir;
pub mod poly;
pub mod roots;
pub mod warp;

use crate::prelude::*;

/// Every lowpass is designed at this rate.  Other rates are handled by rescaling the requested
/// cutoff so that `fc / sr` is preserved.
pub const REFERENCE_RATE: u32 = 44_100;

/// A validated Bessel lowpass request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterSpec {
    order: iir::BesselOrder,
    fc: f64,
    sr: f64,
}

impl FilterSpec {
    /// Both frequencies must be positive and the cutoff must sit below Nyquist.
    pub fn new(order: iir::BesselOrder, fc: f64, sr: f64) -> Result<Self> {
        let fc = positive("fc", fc)?;
        let sr = positive("sr", sr)?;
        if fc >= sr / 2.0 {
            return Err(SynthgenError::InvalidFilterParameter {
                name: "fc",
                value: fc,
            });
        }
        Ok(Self { order, fc, sr })
    }

    pub fn order(&self) -> iir::BesselOrder {
        self.order
    }

    /// Cutoff frequency in Hz.
    pub fn fc(&self) -> f64 {
        self.fc
    }

    /// Sample rate in Hz.
    pub fn sr(&self) -> f64 {
        self.sr
    }

    /// Design with the classic prewarped bilinear transform.
    pub fn bilinear(&self) -> cascade::Section {
        iir::bessel_bilinear(self)
    }
}

/// Reject zero, negative, and non-finite parameters.
pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SynthgenError::InvalidFilterParameter { name, value })
    }
}

/// Reject non-finite parameters.
pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SynthgenError::InvalidFilterParameter { name, value })
    }
}
