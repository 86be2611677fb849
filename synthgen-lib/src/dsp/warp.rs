// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Warp Tables
//!
//! Piecewise-linear lookup over fitted correction samples.  A table stores breakpoints, values, and
//! the slope of the segment that *ends* at each breakpoint.  Lookup picks the first breakpoint at or
//! above the query and walks back along that segment:
//!
//! ```text
//! y = slope[i] * (x - freq[i]) + value[i]
//! ```
//!
//! Anchoring on the right end makes breakpoints exact, since `x - freq[i]` is exactly zero there.
//! Below the first breakpoint the first value is held.  Above the last the final segment is
//! extended.
//!
//! The generated runtime carries its own copy of [`WarpTable::lookup`].  The two must perform the
//! same float operations in the same order.

use log::debug;

use crate::prelude::*;

/// Sorted breakpoints with values and precomputed segment slopes.
#[derive(Clone, Debug, PartialEq)]
pub struct WarpTable {
    freqs: Vec<f64>,
    values: Vec<f64>,
    slopes: Vec<f64>,
}

impl WarpTable {
    /// Build from `[freq, value]` samples.  Frequencies must be finite and strictly increasing.
    pub fn from_samples(name: &str, samples: &[[f64; 2]]) -> Result<Self> {
        if samples.is_empty() {
            return Err(SynthgenError::InvalidTable {
                table: name.to_owned(),
                reason: "no samples".to_owned(),
            });
        }
        if let Some((i, _)) = samples
            .iter()
            .enumerate()
            .find(|(_, [x, y])| !x.is_finite() || !y.is_finite())
        {
            return Err(SynthgenError::InvalidTable {
                table: name.to_owned(),
                reason: format!("sample {i} is not finite"),
            });
        }
        for (i, pair) in samples.windows(2).enumerate() {
            if pair[1][0] <= pair[0][0] {
                return Err(SynthgenError::TableOrdering {
                    table: name.to_owned(),
                    index: i + 1,
                    freq: pair[1][0],
                });
            }
        }

        let freqs: Vec<f64> = samples.iter().map(|s| s[0]).collect();
        let values: Vec<f64> = samples.iter().map(|s| s[1]).collect();
        let slopes: Vec<f64> = std::iter::once(0.0)
            .chain(
                samples
                    .windows(2)
                    .map(|w| (w[1][1] - w[0][1]) / (w[1][0] - w[0][0])),
            )
            .collect();

        debug!(
            "{name}: {} breakpoints over {}..{} Hz",
            freqs.len(),
            freqs[0],
            freqs[freqs.len() - 1]
        );

        Ok(Self {
            freqs,
            values,
            slopes,
        })
    }

    pub fn freqs(&self) -> &[f64] {
        &self.freqs
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `slopes[0]` is zero.  `slopes[i]` belongs to the segment ending at `freqs[i]`.
    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }

    pub fn lookup(&self, x: f64) -> f64 {
        let idx = self
            .freqs
            .iter()
            .position(|&f| x <= f)
            .unwrap_or(self.freqs.len() - 1);
        if idx == 0 {
            return self.values[0];
        }
        self.slopes[idx] * (x - self.freqs[idx]) + self.values[idx]
    }
}

/// Cubic in `log2(time)` giving `log2(freq)`.  Maps a propagation time in seconds to the lowpass
/// cutoff that air of that depth imposes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Log2Cubic {
    coeffs: [f64; 4],
}

impl Log2Cubic {
    /// Coefficients highest degree first.
    pub fn new(coeffs: [f64; 4]) -> Result<Self> {
        if coeffs.iter().all(|c| c.is_finite()) {
            Ok(Self { coeffs })
        } else {
            Err(SynthgenError::NonFinite("log2 cubic".to_owned()))
        }
    }

    pub fn coeffs(&self) -> [f64; 4] {
        self.coeffs
    }

    /// Cutoff in Hz for `time` seconds.
    pub fn time2freq(&self, time: f64) -> Result<f64> {
        let time = super::positive("time", time)?;
        let [c0, c1, c2, c3] = self.coeffs;
        let l = time.log2();
        let freq = (((c0 * l + c1) * l + c2) * l + c3).exp2();
        if freq.is_finite() {
            Ok(freq)
        } else {
            Err(SynthgenError::NonFinite(format!("time2freq({time})")))
        }
    }
}

/// The two correction tables consumed by the production lowpass.
#[derive(Clone, Debug, PartialEq)]
pub struct PrewarpTables {
    /// Factor applied to a requested cutoff to land the measured -3dB point on it.
    pub unwarp: WarpTable,
    /// Zero placement indexed by the prewarped cutoff.
    pub zeroes: WarpTable,
}

impl PrewarpTables {
    pub fn new(unwarp: &[[f64; 2]], zeroes: &[[f64; 2]]) -> Result<Self> {
        Ok(Self {
            unwarp: WarpTable::from_samples("unwarp", unwarp)?,
            zeroes: WarpTable::from_samples("zeroes", zeroes)?,
        })
    }

    /// Highest requested cutoff the unwarp table covers.  Cutoffs above it are designed here.
    pub fn reference_ceiling(&self) -> f64 {
        self.unwarp.freqs[self.unwarp.len() - 1]
    }

    /// Largest design frequency over requested cutoffs up to [`Self::reference_ceiling`].  Within a
    /// segment `fc · factor` is a quadratic, so its peak is an end or the vertex.
    pub fn max_design_frequency(&self) -> f64 {
        let t = &self.unwarp;
        let mut peak = self.prewarp(t.freqs[0]);
        for i in 1..t.len() {
            peak = peak.max(self.prewarp(t.freqs[i]));
            let slope = t.slopes[i];
            if slope < 0.0 {
                // fc (value + slope (fc - freq)) peaks where its derivative vanishes.
                let vertex = (slope * t.freqs[i] - t.values[i]) / (2.0 * slope);
                if vertex > t.freqs[i - 1] && vertex < t.freqs[i] {
                    peak = peak.max(self.prewarp(vertex));
                }
            }
        }
        peak
    }

    /// Design frequency for a requested cutoff at the reference rate.
    pub fn prewarp(&self, fc: f64) -> f64 {
        self.unwarp.lookup(fc) * fc
    }

    /// Zero placement for a prewarped design frequency.
    pub fn z_inf(&self, fc_pre: f64) -> f64 {
        self.zeroes.lookup(fc_pre)
    }
}
