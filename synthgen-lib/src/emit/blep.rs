// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Step kernel table rendering.  One parameterized emitter serves all twelve configurations.

use std::{collections::BTreeSet, fmt::Write, path::Path};

use log::debug;

use super::{Artifact, BLEP_FILE, HEADER, literals};
use crate::{
    blep::{self, KernelGenerator, StepKernelTable, Window},
    prelude::*,
};

/// Render the step kernel module.  Polynomial types are imported from `poly_path`, which must
/// provide `const fn new([f64; N]) -> Self` for each class in use.
pub fn render(tables: &[StepKernelTable], poly_path: &str) -> Result<String> {
    if tables.is_empty() {
        return Err(SynthgenError::KernelSource("no step kernel tables".to_owned()));
    }

    let mut out = String::new();
    out.push_str(HEADER);
    writeln!(
        out,
        "// Band-limited step tables.  Coefficients are highest degree first, segment 0 first."
    )?;
    writeln!(out)?;

    let types: Vec<&str> = tables
        .iter()
        .map(|t| t.config().tier.degree().type_name())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    match types.as_slice() {
        [single] => writeln!(out, "use {poly_path}::{single};")?,
        many => writeln!(out, "use {poly_path}::{{{}}};", many.join(", "))?,
    }

    for table in tables {
        writeln!(out)?;
        sizes(&mut out, table)?;
    }
    for table in tables {
        writeln!(out)?;
        array(&mut out, table)?;
    }

    debug!("rendered {BLEP_FILE}: {} tables, {} bytes", tables.len(), out.len());
    Ok(out)
}

/// Fetch, check and render all twelve tables into `out_dir`.
pub fn artifact(
    out_dir: &Path,
    generator: &impl KernelGenerator,
    window: Window,
    poly_path: &str,
) -> Result<Artifact> {
    let tables = blep::build_tables(generator, window)?;
    Ok(Artifact::new(
        out_dir.join(BLEP_FILE),
        render(&tables, poly_path)?,
    ))
}

fn sizes(out: &mut String, table: &StepKernelTable) -> Result<()> {
    let c = table.config();
    let (length, polys) = (c.length_const(), c.polys_const());
    writeln!(out, "pub const {length}: usize = {};", c.tier.length())?;
    writeln!(
        out,
        "pub const {}: usize = {};",
        c.zero_crossings_const(),
        c.tier.zero_crossings()
    )?;
    writeln!(out, "pub const {polys}: usize = {length} - 1;")?;
    writeln!(out, "pub const {}: usize = {polys} / 2;", c.peek_const())?;
    writeln!(
        out,
        "pub type {} = {};",
        c.type_alias(),
        c.tier.degree().type_name()
    )?;
    Ok(())
}

fn array(out: &mut String, table: &StepKernelTable) -> Result<()> {
    let c = table.config();
    let alias = c.type_alias();
    writeln!(
        out,
        "pub static {}: [{alias}; {}] = [",
        c.array_name(),
        c.polys_const()
    )?;
    for row in table.rows() {
        writeln!(out, "    {alias}::new([{}]),", literals(row)?)?;
    }
    writeln!(out, "];")?;
    Ok(())
}
