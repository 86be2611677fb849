// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Air filter module rendering.
//!
//! The output carries the baked lowpass and shelf as separate constants, the correction tables,
//! and a runtime that re-derives the lowpass for any propagation time.  The runtime below must stay
//! in step with [`crate::air::AirTables::airfilt_design`], [`crate::dsp::warp::WarpTable::lookup`]
//! and [`crate::dsp::iir::bessel2_zinf`].

use std::{fmt::Write, path::Path};

use log::debug;

use super::{AIRFILT_FILE, Artifact, HEADER, literal, literals};
use crate::{
    air::{AirFilter, AirTables, SHELF_FREQ, SHELF_GAIN_DB, SHELF_SLOPE},
    dsp::{REFERENCE_RATE, iir, iir::Biquad, warp::WarpTable},
    prelude::*,
};

const RUNTIME: &str = r#"
/// Normalized second order section, `a0 == 1` implied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

/// Piecewise-linear lookup.  Exact at breakpoints, flat below the table, extrapolated above it.
pub fn flerp(freqs: &[f64], values: &[f64], slopes: &[f64], x: f64) -> f64 {
    let mut idx = freqs.len() - 1;
    for (i, &f) in freqs.iter().enumerate() {
        if x <= f {
            idx = i;
            break;
        }
    }
    if idx == 0 {
        return values[0];
    }
    slopes[idx] * (x - freqs[idx]) + values[idx]
}

/// Design frequency for a cutoff at the reference rate.
pub fn fprewarp(fc: f64) -> f64 {
    flerp(&UNWARP_FREQS, &UNWARP_VALUES, &UNWARP_SLOPES, fc) * fc
}

/// Zero placement for a design frequency.
pub fn f2z(fc_pre: f64) -> f64 {
    flerp(&ZEROES_FREQS, &ZEROES_VALUES, &ZEROES_SLOPES, fc_pre)
}

/// Lowpass cutoff for `time` seconds of air.
pub fn time2freq(time: f64) -> f64 {
    let [c0, c1, c2, c3] = TIME2FREQ;
    let l = time.log2();
    (((c0 * l + c1) * l + c2) * l + c3).exp2()
}

/// Second order Bessel lowpass with warp corrections.  `fc > 0`.  Cutoffs past the last unwarp
/// breakpoint, Nyquist and beyond included, are designed at that breakpoint.
pub fn get_bessel2_lpf(fc: f64, sr: u32) -> Biquad {
    let fc_ref = if sr == AIRFILT_REFERENCE_RATE {
        fc
    } else {
        fc * f64::from(AIRFILT_REFERENCE_RATE) / f64::from(sr)
    }
    .min(UNWARP_FREQS[UNWARP_LEN - 1]);
    let fc_pre = fprewarp(fc_ref);
    let z_inf = f2z(fc_pre);
    let w0 = core::f64::consts::TAU * fc_pre / f64::from(AIRFILT_REFERENCE_RATE) / BESSEL2_3DB;
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
}

/// Air lowpass for `time` seconds of propagation.
pub fn get_airfilt(time: f64, sr: u32) -> Biquad {
    get_bessel2_lpf(time2freq(time), sr)
}
"#;

/// Render the air filter module.
pub fn render(filter: &AirFilter, tables: &AirTables) -> Result<String> {
    let mut out = String::new();
    out.push_str(HEADER);
    writeln!(
        out,
        "// Air filter, {}s of propagation at {} Hz.",
        filter.time, filter.sr
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "pub const BESSEL2_3DB: f64 = {};",
        literal(iir::BESSEL2_3DB)?
    )?;
    writeln!(out, "pub const AIRFILT_REFERENCE_RATE: u32 = {REFERENCE_RATE};")?;
    writeln!(out)?;

    writeln!(out, "pub const AIRFILT_TIME: f64 = {};", literal(filter.time)?)?;
    writeln!(out, "pub const AIRFILT_RATE: u32 = {};", filter.sr)?;
    writeln!(
        out,
        "pub const AIRFILT_LPF_FC: f64 = {};",
        literal(filter.lowpass.fc)?
    )?;
    writeln!(
        out,
        "pub const AIRFILT_LPF_Z_INF: f64 = {};",
        literal(filter.lowpass.z_inf)?
    )?;
    biquad_const(&mut out, "AIRFILT_LPF", &filter.lowpass.biquad)?;
    writeln!(out)?;

    writeln!(out, "pub const AIRFILT_SHELF_FC: f64 = {};", literal(SHELF_FREQ)?)?;
    writeln!(
        out,
        "pub const AIRFILT_SHELF_GAIN_DB: f64 = {};",
        literal(SHELF_GAIN_DB)?
    )?;
    writeln!(
        out,
        "pub const AIRFILT_SHELF_SLOPE: f64 = {};",
        literal(SHELF_SLOPE)?
    )?;
    biquad_const(&mut out, "AIRFILT_SHELF", &filter.shelf)?;
    writeln!(out)?;

    writeln!(
        out,
        "pub const TIME2FREQ: [f64; 4] = [{}];",
        literals(&tables.cubic().coeffs())?
    )?;
    writeln!(out)?;

    warp_table(&mut out, "UNWARP", &tables.prewarp().unwarp)?;
    writeln!(out)?;
    warp_table(&mut out, "ZEROES", &tables.prewarp().zeroes)?;

    out.push_str(RUNTIME);
    debug!("rendered {AIRFILT_FILE}: {} bytes", out.len());
    Ok(out)
}

/// Design the fixed air filter at `sr` and render it into `out_dir`.
pub fn artifact(out_dir: &Path, tables: &AirTables, sr: u32) -> Result<Artifact> {
    let filter = AirFilter::design(tables, sr)?;
    Ok(Artifact::new(
        out_dir.join(AIRFILT_FILE),
        render(&filter, tables)?,
    ))
}

fn biquad_const(out: &mut String, name: &str, bq: &Biquad) -> Result<()> {
    writeln!(out, "pub const {name}: Biquad = Biquad {{")?;
    for (field, value) in [
        ("b0", bq.b0),
        ("b1", bq.b1),
        ("b2", bq.b2),
        ("a1", bq.a1),
        ("a2", bq.a2),
    ] {
        writeln!(out, "    {field}: {},", literal(value)?)?;
    }
    writeln!(out, "}};")?;
    Ok(())
}

fn warp_table(out: &mut String, prefix: &str, table: &WarpTable) -> Result<()> {
    let len = format!("{prefix}_LEN");
    writeln!(out, "pub const {len}: usize = {};", table.len())?;
    for (suffix, values) in [
        ("FREQS", table.freqs()),
        ("VALUES", table.values()),
        ("SLOPES", table.slopes()),
    ] {
        writeln!(out, "pub static {prefix}_{suffix}: [f64; {len}] = [")?;
        for v in values {
            writeln!(out, "    {},", literal(*v)?)?;
        }
        writeln!(out, "];")?;
    }
    Ok(())
}
