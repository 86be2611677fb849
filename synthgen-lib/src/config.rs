// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Config
//!
//! Externally fitted inputs, read from TOML.  The shapes here are file formats only.  Validation
//! happens when they are turned into tables.

use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::{
    air::AirTables,
    dsp::warp::{Log2Cubic, PrewarpTables},
    prelude::*,
};

const BUNDLED_AIRFILT: &str = include_str!("../data/airfilt.toml");

/// Air filter correction data.  See `data/airfilt.toml` for the bundled fit.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AirfiltInput {
    /// `log2(freq)` as a cubic in `log2(time)`, highest degree first.
    pub log2cubic: [f64; 4],
    /// `[freq, factor]` pairs.
    pub unwarp: Vec<[f64; 2]>,
    /// `[freq, z_inf]` pairs.
    pub zeroes: Vec<[f64; 2]>,
}

impl AirfiltInput {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!("reading air filter data from {}", path.display());
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// The fit shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::parse(BUNDLED_AIRFILT)
    }

    /// `path` if given, else the bundled fit.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    /// Validate and build the lookup tables.
    pub fn tables(&self) -> Result<AirTables> {
        let prewarp = PrewarpTables::new(&self.unwarp, &self.zeroes)?;
        let cubic = Log2Cubic::new(self.log2cubic)?;
        AirTables::new(prewarp, cubic)
    }
}

/// One kernel matrix as written by the kernel fitting tools.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KernelFile {
    pub length: usize,
    pub zero_crossings: usize,
    /// Window name used by the fit, checked when present.
    #[serde(default)]
    pub window: Option<String>,
    /// Spline fit name, checked when present.
    #[serde(default)]
    pub fit: Option<String>,
    /// One row per polynomial segment, highest degree first.
    pub coefficients: Vec<Vec<f64>>,
}

impl KernelFile {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!("reading kernel from {}", path.display());
        Self::parse(&std::fs::read_to_string(path)?)
    }
}
