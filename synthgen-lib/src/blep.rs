// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Band-Limited Steps
//!
//! Tables of polynomial segments for the anti-aliased oscillators.  A band-limited step of length
//! `L` is split into `L - 1` segments, each a polynomial in the fractional sample position.  The
//! oscillator evaluates the segments around a discontinuity and adds the residual to its naive
//! output.
//!
//! Twelve tables are produced: every [`Variant`] at every [`Tier`].  The tier fixes length, zero
//! crossings, and the polynomial class.  The variant fixes the step shape.  Fitting the kernels is
//! the business of a [`KernelGenerator`].  This module builds the requests, checks the answers have
//! the sizes the emitted constants will promise, and keeps them in a fixed order.

use std::path::PathBuf;

use log::{debug, info};

use crate::{config::KernelFile, prelude::*};

/// Length and polynomial class trade-offs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    Precise,
    Fast,
    Xfast,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Precise, Tier::Fast, Tier::Xfast];

    /// Samples covered by the step.
    pub fn length(&self) -> usize {
        match self {
            Tier::Precise => 60,
            Tier::Fast => 20,
            Tier::Xfast => 16,
        }
    }

    pub fn zero_crossings(&self) -> usize {
        match self {
            Tier::Precise => 25,
            Tier::Fast => 7,
            Tier::Xfast => 5,
        }
    }

    pub fn fit(&self) -> SplineFit {
        match self {
            Tier::Precise => SplineFit::Septic3,
            Tier::Fast => SplineFit::Nonic2,
            Tier::Xfast => SplineFit::Quintic4,
        }
    }

    pub fn degree(&self) -> PolyDegree {
        self.fit().degree()
    }

    /// Suffix on size constants.  The precise tier is the unsuffixed default.
    pub fn const_suffix(&self) -> &'static str {
        match self {
            Tier::Precise => "",
            Tier::Fast => "_FAST",
            Tier::Xfast => "_XFAST",
        }
    }

    /// Suffix on type aliases.
    pub fn alias_suffix(&self) -> &'static str {
        match self {
            Tier::Precise => "",
            Tier::Fast => "Fast",
            Tier::Xfast => "Xfast",
        }
    }

    /// Suffix on table arrays.  Always present.
    pub fn array_suffix(&self) -> &'static str {
        match self {
            Tier::Precise => "PRECISE",
            Tier::Fast => "FAST",
            Tier::Xfast => "XFAST",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tier::Precise => "precise",
            Tier::Fast => "fast",
            Tier::Xfast => "xfast",
        }
    }
}

/// Polynomial class of one segment.  Coefficient counts are one more than the degree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PolyDegree {
    Quintic,
    Septic,
    Nonic,
}

impl PolyDegree {
    pub fn degree(&self) -> usize {
        match self {
            PolyDegree::Quintic => 5,
            PolyDegree::Septic => 7,
            PolyDegree::Nonic => 9,
        }
    }

    pub fn coefficients(&self) -> usize {
        self.degree() + 1
    }

    /// Runtime type holding one segment.
    pub fn type_name(&self) -> &'static str {
        match self {
            PolyDegree::Quintic => "Quintic64",
            PolyDegree::Septic => "Septic64",
            PolyDegree::Nonic => "Nonic64",
        }
    }
}

/// Spline fits used by the kernel generator.  The fit implies the polynomial class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SplineFit {
    Septic3,
    Nonic2,
    Quintic4,
}

impl SplineFit {
    pub fn degree(&self) -> PolyDegree {
        match self {
            SplineFit::Septic3 => PolyDegree::Septic,
            SplineFit::Nonic2 => PolyDegree::Nonic,
            SplineFit::Quintic4 => PolyDegree::Quintic,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SplineFit::Septic3 => "septic3",
            SplineFit::Nonic2 => "nonic2",
            SplineFit::Quintic4 => "quintic4",
        }
    }
}

/// Window applied to the ideal step before fitting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Window {
    #[default]
    Quartic,
    Hann,
}

impl Window {
    pub fn name(&self) -> &'static str {
        match self {
            Window::Quartic => "quart",
            Window::Hann => "hann",
        }
    }
}

/// Ripple depth of the rippled step variants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RippleDepth {
    /// Trough below peak, in dB.
    Decibels(f64),
    /// Trough over peak, as an amplitude ratio.
    Ratio(f64),
}

impl RippleDepth {
    /// Amplitude ratio of trough to peak.
    pub fn ratio(&self) -> f64 {
        match *self {
            RippleDepth::Decibels(db) => 10.0f64.powf(-db / 20.0),
            RippleDepth::Ratio(r) => r,
        }
    }
}

/// Step shape requested from the kernel generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepShape {
    /// Windowed sinc integral.
    Blep3,
    /// Windowed step that never overshoots.
    WindowedMonotonic,
    /// Windowed step with controlled ripple.
    WindowedRipple(RippleDepth),
}

impl StepShape {
    pub fn name(&self) -> String {
        match self {
            StepShape::Blep3 => "blep3".to_owned(),
            StepShape::WindowedMonotonic => "wmonostep".to_owned(),
            StepShape::WindowedRipple(depth) => format!("wripplestep({:?})", depth.ratio()),
        }
    }
}

/// Step kernel families.  Each gets a table at every tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Blep,
    MBlep,
    RBlep,
    HBlep,
}

impl Variant {
    pub const ALL: [Variant; 4] = [Variant::Blep, Variant::MBlep, Variant::RBlep, Variant::HBlep];

    pub fn shape(&self) -> StepShape {
        match self {
            Variant::Blep => StepShape::Blep3,
            Variant::MBlep => StepShape::WindowedMonotonic,
            Variant::RBlep => StepShape::WindowedRipple(RippleDepth::Decibels(3.0)),
            Variant::HBlep => StepShape::WindowedRipple(RippleDepth::Ratio(0.5)),
        }
    }

    /// Prefix on constants and arrays.
    pub fn const_prefix(&self) -> &'static str {
        match self {
            Variant::Blep => "BLEP",
            Variant::MBlep => "MBLEP",
            Variant::RBlep => "RBLEP",
            Variant::HBlep => "HBLEP",
        }
    }

    /// Prefix on type aliases.
    pub fn alias_prefix(&self) -> &'static str {
        match self {
            Variant::Blep => "Blep",
            Variant::MBlep => "MBlep",
            Variant::RBlep => "RBlep",
            Variant::HBlep => "HBlep",
        }
    }
}

/// One of the twelve generated tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KernelConfig {
    pub variant: Variant,
    pub tier: Tier,
}

impl KernelConfig {
    /// Every configuration in emission order, variant-major.
    pub fn all() -> impl Iterator<Item = KernelConfig> {
        Variant::ALL.into_iter().flat_map(|variant| {
            Tier::ALL
                .into_iter()
                .map(move |tier| KernelConfig { variant, tier })
        })
    }

    pub fn request(&self, window: Window) -> KernelRequest {
        KernelRequest {
            config: *self,
            length: self.tier.length(),
            zero_crossings: self.tier.zero_crossings(),
            shape: self.variant.shape(),
            window,
            fit: self.tier.fit(),
        }
    }

    /// Number of polynomial segments.
    pub fn polys(&self) -> usize {
        self.tier.length() - 1
    }

    /// Segments on either side of the discontinuity.
    pub fn peek(&self) -> usize {
        self.polys() / 2
    }

    pub fn length_const(&self) -> String {
        format!("{}_LENGTH{}", self.variant.const_prefix(), self.tier.const_suffix())
    }

    pub fn zero_crossings_const(&self) -> String {
        format!(
            "{}_ZERO_CROSSINGS{}",
            self.variant.const_prefix(),
            self.tier.const_suffix()
        )
    }

    pub fn polys_const(&self) -> String {
        format!("{}_POLYS{}", self.variant.const_prefix(), self.tier.const_suffix())
    }

    pub fn peek_const(&self) -> String {
        format!("{}_PEEK{}", self.variant.const_prefix(), self.tier.const_suffix())
    }

    pub fn type_alias(&self) -> String {
        format!("{}PolyType{}", self.variant.alias_prefix(), self.tier.alias_suffix())
    }

    pub fn array_name(&self) -> String {
        format!("{}_{}", self.variant.const_prefix(), self.tier.array_suffix())
    }

    /// File stem used by [`KernelDir`], for example `mblep_fast`.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}",
            self.variant.const_prefix().to_lowercase(),
            self.tier.name()
        )
    }
}

impl std::fmt::Display for KernelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.array_name())
    }
}

/// Parameters handed to the kernel generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelRequest {
    pub config: KernelConfig,
    pub length: usize,
    pub zero_crossings: usize,
    pub shape: StepShape,
    pub window: Window,
    pub fit: SplineFit,
}

/// Source of fitted kernels.  Returns `length - 1` rows of polynomial coefficients, highest degree
/// first, earliest segment first.
pub trait KernelGenerator {
    fn coefficients(&self, request: &KernelRequest) -> Result<Vec<Vec<f64>>>;
}

/// A size-checked table.
#[derive(Clone, Debug, PartialEq)]
pub struct StepKernelTable {
    config: KernelConfig,
    rows: Vec<Vec<f64>>,
}

impl StepKernelTable {
    pub fn new(config: KernelConfig, rows: Vec<Vec<f64>>) -> Result<Self> {
        let table = config.array_name();
        if rows.len() != config.polys() {
            return Err(SynthgenError::SizeMismatch {
                table,
                what: "polynomial segments".to_owned(),
                expected: config.polys(),
                found: rows.len(),
            });
        }
        let arity = config.tier.degree().coefficients();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != arity {
                return Err(SynthgenError::SizeMismatch {
                    table,
                    what: format!("coefficients in segment {i}"),
                    expected: arity,
                    found: row.len(),
                });
            }
            if row.iter().any(|c| !c.is_finite()) {
                return Err(SynthgenError::NonFinite(format!("{table} segment {i}")));
            }
        }
        Ok(Self { config, rows })
    }

    pub fn config(&self) -> KernelConfig {
        self.config
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}

/// Request and check all twelve tables, in [`KernelConfig::all`] order.
pub fn build_tables(
    generator: &impl KernelGenerator,
    window: Window,
) -> Result<Vec<StepKernelTable>> {
    KernelConfig::all()
        .map(|config| {
            let request = config.request(window);
            debug!(
                "requesting {config}: length {} zero crossings {} {} {} {}",
                request.length,
                request.zero_crossings,
                request.shape.name(),
                request.window.name(),
                request.fit.name()
            );
            let rows = generator.coefficients(&request)?;
            StepKernelTable::new(config, rows)
        })
        .collect()
}

/// Kernels fitted ahead of time and stored as one TOML file per configuration.
#[derive(Clone, Debug)]
pub struct KernelDir {
    root: PathBuf,
}

impl KernelDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, config: &KernelConfig) -> PathBuf {
        self.root.join(format!("{}.toml", config.file_stem()))
    }
}

impl KernelGenerator for KernelDir {
    fn coefficients(&self, request: &KernelRequest) -> Result<Vec<Vec<f64>>> {
        let path = self.path_for(&request.config);
        if !path.is_file() {
            return Err(SynthgenError::KernelSource(format!(
                "{} not found",
                path.display()
            )));
        }
        let file = KernelFile::from_path(&path)?;

        let mismatch = |what: &str, expected: usize, found: usize| SynthgenError::SizeMismatch {
            table: path.display().to_string(),
            what: what.to_owned(),
            expected,
            found,
        };
        if file.length != request.length {
            return Err(mismatch("length", request.length, file.length));
        }
        if file.zero_crossings != request.zero_crossings {
            return Err(mismatch(
                "zero crossings",
                request.zero_crossings,
                file.zero_crossings,
            ));
        }
        if let Some(window) = &file.window
            && window != request.window.name()
        {
            return Err(SynthgenError::KernelSource(format!(
                "{}: fitted with window {window}, requested {}",
                path.display(),
                request.window.name()
            )));
        }
        if let Some(fit) = &file.fit
            && fit != request.fit.name()
        {
            return Err(SynthgenError::KernelSource(format!(
                "{}: fitted with {fit}, requested {}",
                path.display(),
                request.fit.name()
            )));
        }

        info!("loaded {} from {}", request.config, path.display());
        Ok(file.coefficients)
    }
}
