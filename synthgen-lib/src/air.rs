// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Air Filter
//!
//! High-frequency loss of sound travelling through air, as a second order Bessel lowpass followed
//! by a gentle high shelf.  The lowpass cutoff follows propagation time through a fitted cubic, and
//! the lowpass itself is the `z_inf` design with both corrections taken from the warp tables.
//!
//! The generated runtime repeats [`AirTables::airfilt`] for arbitrary times.  The baked constants are
//! the same computation at [`AIR_FILTER_TIME`].  Cutoffs above the unwarp table, Nyquist and beyond
//! included, are designed at its last breakpoint so every time maps to a stable filter.

use std::f64::consts::PI;

use log::debug;

use crate::{
    dsp::{
        REFERENCE_RATE,
        cascade::Section,
        iir::{self, Biquad},
        positive,
        warp::{Log2Cubic, PrewarpTables},
    },
    prelude::*,
};

/// Propagation time of the baked air filter, in seconds.
pub const AIR_FILTER_TIME: f64 = 0.2;
/// Shelf corner in Hz.
pub const SHELF_FREQ: f64 = 275.0;
/// Shelf gain above the corner in dB.
pub const SHELF_GAIN_DB: f64 = -0.2;
/// Shelf slope.  One is the steepest slope without overshoot.
pub const SHELF_SLOPE: f64 = 0.5;

/// Immutable lookup tables.  Built once from [`crate::config::AirfiltInput`] and passed by
/// reference.
#[derive(Clone, Debug, PartialEq)]
pub struct AirTables {
    prewarp: PrewarpTables,
    cubic: Log2Cubic,
}

/// Every intermediate of one production lowpass derivation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LowpassDesign {
    /// Requested cutoff.
    pub fc: f64,
    pub sr: u32,
    /// Cutoff rescaled to the reference rate, capped at the unwarp table's last breakpoint.
    pub fc_ref: f64,
    /// Design frequency after unwarping.
    pub fc_pre: f64,
    pub w0: f64,
    pub z_inf: f64,
    pub biquad: Biquad,
}

impl AirTables {
    /// Fails when the unwarp table designs any cutoff at or above Nyquist of the reference rate.
    pub fn new(prewarp: PrewarpTables, cubic: Log2Cubic) -> Result<Self> {
        let peak = prewarp.max_design_frequency();
        let w0 = iir::bessel2_w0(peak, f64::from(REFERENCE_RATE));
        if w0 >= PI {
            return Err(SynthgenError::InvalidTable {
                table: "unwarp".to_owned(),
                reason: format!("designs up to {peak} Hz, w0 {w0}"),
            });
        }
        Ok(Self { prewarp, cubic })
    }

    pub fn prewarp(&self) -> &PrewarpTables {
        &self.prewarp
    }

    pub fn cubic(&self) -> &Log2Cubic {
        &self.cubic
    }

    /// Lowpass cutoff for `time` seconds of air.
    pub fn time2freq(&self, time: f64) -> Result<f64> {
        self.cubic.time2freq(time)
    }

    /// Production lowpass with its intermediates.  `0 < fc < sr / 2`.
    pub fn design_lowpass(&self, fc: f64, sr: u32) -> Result<LowpassDesign> {
        let sr = rate(sr)?;
        let fc = positive("fc", fc)?;
        if fc >= f64::from(sr) / 2.0 {
            return Err(SynthgenError::InvalidFilterParameter {
                name: "fc",
                value: fc,
            });
        }
        self.derive(fc, sr)
    }

    /// Production lowpass coefficients.
    pub fn bessel2_lpf(&self, fc: f64, sr: u32) -> Result<Biquad> {
        Ok(self.design_lowpass(fc, sr)?.biquad)
    }

    /// Lowpass for `time` seconds of air.  Short times may map above Nyquist, those land on the
    /// ceiling of the unwarp table like any other high cutoff.
    pub fn airfilt_design(&self, time: f64, sr: u32) -> Result<LowpassDesign> {
        let sr = rate(sr)?;
        self.derive(self.time2freq(time)?, sr)
    }

    /// Lowpass for `time` seconds of air at sample rate `sr`.
    pub fn airfilt(&self, time: f64, sr: u32) -> Result<Biquad> {
        Ok(self.airfilt_design(time, sr)?.biquad)
    }

    fn derive(&self, fc: f64, sr: u32) -> Result<LowpassDesign> {
        // Tables are fitted at the reference rate.  Keep fc / sr, then stay inside the unwarp
        // table.
        let fc_ref = if sr == REFERENCE_RATE {
            fc
        } else {
            fc * f64::from(REFERENCE_RATE) / f64::from(sr)
        }
        .min(self.prewarp.reference_ceiling());
        let fc_pre = self.prewarp.prewarp(fc_ref);
        let z_inf = self.prewarp.z_inf(fc_pre);
        let w0 = iir::bessel2_w0(fc_pre, f64::from(REFERENCE_RATE));
        let biquad = iir::bessel2_zinf(w0, z_inf)?;
        debug!("bessel2 lpf {fc} Hz @ {sr}: fc_pre {fc_pre} w0 {w0} z_inf {z_inf}");

        Ok(LowpassDesign {
            fc,
            sr,
            fc_ref,
            fc_pre,
            w0,
            z_inf,
            biquad,
        })
    }
}

fn rate(sr: u32) -> Result<u32> {
    if sr == 0 {
        Err(SynthgenError::InvalidFilterParameter {
            name: "sr",
            value: 0.0,
        })
    } else {
        Ok(sr)
    }
}

/// The fixed air filter: lowpass at [`AIR_FILTER_TIME`] and the shelf, kept as separate sections.
#[derive(Clone, Debug, PartialEq)]
pub struct AirFilter {
    pub time: f64,
    pub sr: u32,
    pub lowpass: LowpassDesign,
    pub shelf: Biquad,
}

impl AirFilter {
    pub fn design(tables: &AirTables, sr: u32) -> Result<Self> {
        let cutoff = tables.time2freq(AIR_FILTER_TIME)?;
        let lowpass = tables.design_lowpass(cutoff, sr)?;
        let shelf = iir::hishelf(SHELF_FREQ, SHELF_GAIN_DB, SHELF_SLOPE, f64::from(sr))?;
        debug!("air filter {AIR_FILTER_TIME}s @ {sr}: cutoff {cutoff} Hz");
        Ok(Self {
            time: AIR_FILTER_TIME,
            sr,
            lowpass,
            shelf,
        })
    }

    /// Lowpass then shelf as one fourth order section.  For inspection only.
    pub fn cascaded(&self) -> Section {
        self.lowpass.biquad.section().cascade(&self.shelf.section())
    }
}
