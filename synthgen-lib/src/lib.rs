// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline table generation for the synth runtime.
//!
//! The runtime cannot afford to solve polynomials or fit curves while it renders audio, so
//! everything that can be decided ahead of time is decided here and written out as constant
//! tables.  Two kinds of tables are produced:
//!
//! - **Air filter** ([`air`]): a second-order Bessel lowpass plus a gentle high shelf that together
//!   simulate the high-frequency loss of sound travelling through air.  The lowpass is derived
//!   directly in the z-domain with a movable zero (`z_inf`) that counteracts bilinear warping near
//!   Nyquist.  The emitted file bakes the 200ms design and carries a runtime function that
//!   re-derives coefficients for any propagation time from the same tables.
//! - **Band-limited steps** ([`blep`]): polynomial segment tables for the anti-aliased oscillators,
//!   three quality tiers times four kernel shapes.  The kernel math lives elsewhere.  This crate
//!   only checks the sizes and writes typed arrays whose lengths follow from emitted constants.
//!
//! The [`dsp`] module holds the filter math shared by both paths, [`config`] reads the externally
//! fitted data, and [`emit`] renders and atomically writes the generated source.

pub mod air;
pub mod blep;
pub mod config;
pub mod dsp;
pub mod emit;

pub mod prelude {
    pub use crate::{Result, SynthgenError};
}

/// All the ways a generation run can fail.  Every one of them aborts the run before any output
/// file is finalized.
#[derive(thiserror::Error, Debug)]
pub enum SynthgenError {
    #[error("no positive real root for degree {degree} polynomial")]
    RootNotFound { degree: usize },

    #[error("{count} positive real roots for degree {degree} polynomial, expected exactly one")]
    RootAmbiguous { degree: usize, count: usize },

    #[error("root finding did not converge for degree {degree} polynomial")]
    RootConvergence { degree: usize },

    #[error("invalid filter parameter {name}: {value}")]
    InvalidFilterParameter { name: &'static str, value: f64 },

    #[error("{table}: breakpoint {index} at {freq} Hz does not increase on the previous one")]
    TableOrdering {
        table: String,
        index: usize,
        freq: f64,
    },

    #[error("{table}: {reason}")]
    InvalidTable { table: String, reason: String },

    #[error("{table}: {what} expected {expected}, found {found}")]
    SizeMismatch {
        table: String,
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("empty {0} coefficients")]
    EmptyCoefficients(&'static str),

    #[error("non-finite value in {0}")]
    NonFinite(String),

    #[error("kernel source: {0}")]
    KernelSource(String),

    #[error("calibration: {0}")]
    Calibration(String),

    #[error("render failed: {0}")]
    Render(#[from] std::fmt::Error),

    #[error("config parse failed: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("persist failed: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type Result<T> = std::result::Result<T, SynthgenError>;
