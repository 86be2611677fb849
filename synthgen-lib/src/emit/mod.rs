// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Emit
//!
//! Rendering and writing of generated Rust source.
//!
//! Rendering is pure: same inputs, same bytes.  Every array length in the output is spelled as a
//! size constant or arithmetic on one, so consumers never recount.  Floats are written in their
//! shortest form that parses back to the same `f64`.
//!
//! Writing is all-or-nothing up to the final renames.  Every artifact is rendered before anything
//! touches the disk, then written into a temporary file next to its destination, and only when all
//! temporaries are complete are they persisted over their targets.

pub mod air;
pub mod blep;

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use log::info;
use tempfile::NamedTempFile;

use crate::prelude::*;

/// File name of the air filter module.
pub const AIRFILT_FILE: &str = "airfilt.rs";
/// File name of the step kernel tables module.
pub const BLEP_FILE: &str = "blep_tables.rs";
/// Where the step tables import `Quintic64`, `Septic64` and `Nonic64` from.
pub const DEFAULT_POLY_PATH: &str = "super::poly";

pub(crate) const HEADER: &str = "// @generated by synthgen.  Do not edit.\n";

/// Shortest round-trip literal.  Always contains a `.` or an exponent so it reads as `f64`.
pub fn literal(value: f64) -> Result<String> {
    if value.is_finite() {
        Ok(format!("{value:?}"))
    } else {
        Err(SynthgenError::NonFinite(format!("literal {value}")))
    }
}

/// Comma separated literals.
pub(crate) fn literals(values: &[f64]) -> Result<String> {
    Ok(values
        .iter()
        .map(|v| literal(*v))
        .collect::<Result<Vec<_>>>()?
        .join(", "))
}

/// A rendered file and where it goes.
#[derive(Clone, Debug, PartialEq)]
pub struct Artifact {
    path: PathBuf,
    contents: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

/// Write every artifact or leave every destination untouched.
///
/// Rendering, staging and syncing failures leave all targets as they were.  The final renames run
/// one after another, so a rename failing after an earlier one succeeded leaves the earlier targets
/// replaced and the later ones old.  Rerun to converge.
pub fn commit(artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    let mut staged = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let dir = match artifact.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        // Same directory as the target, so persisting is a rename and never a copy.
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(artifact.contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        staged.push((tmp, artifact.path.clone()));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (tmp, path) in staged {
        tmp.persist(&path)?;
        info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
