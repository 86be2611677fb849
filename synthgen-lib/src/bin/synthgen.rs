// Copyright 2026 The Synthgen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Synthgen
//!
//! Generates the air filter module and the step kernel tables, and prints the intermediate designs
//! for inspection.
//!
//! ## Usage
//!
//! `synthgen all --kernels fitted/ --out src/generated` writes both modules.  Nothing is written
//! unless everything renders.  `RUST_LOG=debug` shows every table as it is built.
//!
//! (Try --help)

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use synthgen_lib::{
    self as synthgen,
    air::{AIR_FILTER_TIME, AirFilter, AirTables, SHELF_FREQ, SHELF_GAIN_DB, SHELF_SLOPE},
    blep::{KernelConfig, KernelDir, Window},
    config::AirfiltInput,
    dsp::{
        FilterSpec, REFERENCE_RATE,
        cascade::Section,
        iir::{self, BesselOrder, Biquad},
    },
    emit,
    prelude::*,
};

#[derive(Parser, Debug)]
#[command(name = "synthgen")]
#[command(about = "Generate air filter and band-limited step tables.", long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Unhandled error: {0}")]
    Unhandled(#[from] synthgen::SynthgenError),
}

fn main() -> std::result::Result<(), CliError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        None => unreachable!(),
        Some(Command::Airfilt(a)) => cmd_airfilt(a)?,
        Some(Command::Blep(a)) => cmd_blep(a)?,
        Some(Command::All(a)) => cmd_all(a)?,
        Some(Command::Design(a)) => cmd_design(a)?,
        Some(Command::Shelf(a)) => cmd_shelf(a)?,
        Some(Command::Time(a)) => cmd_time(a)?,
        Some(Command::Calibrate(_)) => cmd_calibrate()?,
        Some(Command::Show(a)) => cmd_show(a)?,
    }

    Ok(())
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the air filter module
    Airfilt(AirfiltArgs),
    /// Write the step kernel tables
    Blep(BlepArgs),
    /// Write both modules, all or nothing
    All(AllArgs),
    /// Print a Bessel lowpass design
    Design(DesignArgs),
    /// Print a high shelf design
    Shelf(ShelfArgs),
    /// Print the air lowpass for a propagation time
    Time(TimeArgs),
    /// Check the hard-coded Bessel constants against the root solver
    Calibrate(CalibrateArgs),
    /// Print the fixed air filter and its response
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
struct DataArgs {
    /// Air filter correction data, defaults to the bundled fit
    #[arg(long)]
    data: Option<PathBuf>,
}

impl DataArgs {
    fn tables(&self) -> Result<AirTables> {
        AirfiltInput::load(self.data.as_deref())?.tables()
    }
}

#[derive(clap::Args, Debug)]
struct KernelArgs {
    /// Directory of fitted kernels, one `<variant>_<tier>.toml` per table
    #[arg(long)]
    kernels: PathBuf,

    /// Window the kernels were fitted with
    #[arg(long, value_enum, default_value_t = Window::Quartic)]
    window: Window,

    /// Module path providing Quintic64, Septic64 and Nonic64
    #[arg(long, default_value = emit::DEFAULT_POLY_PATH)]
    poly_path: String,
}

#[derive(clap::Args, Debug)]
struct AirfiltArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Sample rate of the baked filter
    #[arg(long, default_value_t = REFERENCE_RATE)]
    sr: u32,
}

#[derive(clap::Args, Debug)]
struct BlepArgs {
    #[command(flatten)]
    kernels: KernelArgs,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(clap::Args, Debug)]
struct AllArgs {
    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    kernels: KernelArgs,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Sample rate of the baked air filter
    #[arg(long, default_value_t = REFERENCE_RATE)]
    sr: u32,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OrderChoice {
    #[value(name = "2")]
    Two,
    #[value(name = "3")]
    Three,
    #[value(name = "4")]
    Four,
}

impl From<OrderChoice> for BesselOrder {
    fn from(order: OrderChoice) -> Self {
        match order {
            OrderChoice::Two => BesselOrder::Two,
            OrderChoice::Three => BesselOrder::Three,
            OrderChoice::Four => BesselOrder::Four,
        }
    }
}

#[derive(clap::Args, Debug)]
struct DesignArgs {
    /// Cutoff in Hz
    #[arg(index = 1, required = true)]
    fc: f64,

    /// Filter order
    #[arg(long, value_enum, default_value_t = OrderChoice::Two)]
    order: OrderChoice,

    /// Sample rate in Hz
    #[arg(long, default_value_t = f64::from(REFERENCE_RATE))]
    sr: f64,

    /// Move both zeros here instead of -1.  Second order only.
    #[arg(long, allow_hyphen_values = true)]
    z_inf: Option<f64>,
}

#[derive(clap::Args, Debug)]
struct ShelfArgs {
    /// Corner in Hz
    #[arg(long, default_value_t = SHELF_FREQ)]
    fc: f64,

    /// Shelf gain in dB
    #[arg(long, default_value_t = SHELF_GAIN_DB, allow_hyphen_values = true)]
    db: f64,

    /// Shelf slope
    #[arg(long, default_value_t = SHELF_SLOPE)]
    slope: f64,

    /// Sample rate in Hz
    #[arg(long, default_value_t = f64::from(REFERENCE_RATE))]
    sr: f64,
}

#[derive(clap::Args, Debug)]
struct TimeArgs {
    /// Propagation time in seconds
    #[arg(index = 1, required = true)]
    time: f64,

    /// Sample rate in Hz
    #[arg(long, default_value_t = REFERENCE_RATE)]
    sr: u32,

    #[command(flatten)]
    data: DataArgs,
}

#[derive(clap::Args, Debug)]
struct CalibrateArgs {}

#[derive(clap::Args, Debug)]
struct ShowArgs {
    /// Sample rate in Hz
    #[arg(long, default_value_t = REFERENCE_RATE)]
    sr: u32,

    #[command(flatten)]
    data: DataArgs,
}

/// Probe frequencies for response printouts.
const PROBES: [f64; 8] = [
    100.0, 1000.0, 2000.0, 4500.0, 8000.0, 12_000.0, 16_000.0, 20_000.0,
];
const CALIBRATION_TOL: f64 = 1e-12;

const INDENT: usize = 2;
const LABEL_W: usize = 28; // includes colon
const VALUE_W: usize = 26;

macro_rules! header {
    ($($arg:tt)*) => {{
        const WIDTH: usize = INDENT + LABEL_W + 1 + VALUE_W;
        let title = format!($($arg)*);
        println!("\n{title}");
        println!("{}", "=".repeat(WIDTH));
    }};
}

macro_rules! row {
    ($label:expr, $fmt:expr, $value:expr) => {{
        let value = format!($fmt, $value);
        println!(
            "{:indent$}{label:<label_w$} {:>value_w$}",
            "",
            value,
            indent = INDENT,
            label = format!("{}:", $label),
            label_w = LABEL_W,
            value_w = VALUE_W,
        );
    }};
}

fn cmd_airfilt(args: AirfiltArgs) -> Result<()> {
    let tables = args.data.tables()?;
    let artifact = emit::air::artifact(&args.out, &tables, args.sr)?;
    emit::commit(&[artifact])?;
    Ok(())
}

fn cmd_blep(args: BlepArgs) -> Result<()> {
    let artifact = blep_artifact(&args.kernels, &args.out)?;
    emit::commit(&[artifact])?;
    Ok(())
}

fn cmd_all(args: AllArgs) -> Result<()> {
    let tables = args.data.tables()?;
    let air = emit::air::artifact(&args.out, &tables, args.sr)?;
    let blep = blep_artifact(&args.kernels, &args.out)?;
    let written = emit::commit(&[air, blep])?;
    info!("generated {} files in {}", written.len(), args.out.display());
    Ok(())
}

fn blep_artifact(args: &KernelArgs, out: &Path) -> Result<emit::Artifact> {
    let kernels = KernelDir::new(&args.kernels);
    emit::blep::artifact(out, &kernels, args.window, &args.poly_path)
}

fn cmd_design(args: DesignArgs) -> Result<()> {
    let order = BesselOrder::from(args.order);
    let spec = FilterSpec::new(order, args.fc, args.sr)?;

    let section = match (order, args.z_inf) {
        (_, None) => spec.bilinear(),
        (BesselOrder::Two, Some(z_inf)) => {
            iir::bessel2_zinf(iir::bessel2_w0(spec.fc(), spec.sr()), z_inf)?.section()
        }
        (_, Some(_)) => {
            return Err(SynthgenError::InvalidFilterParameter {
                name: "order",
                value: order.degree() as f64,
            });
        }
    };

    header!("Bessel lowpass, order {order}");
    row!("Cutoff", "{:.2} Hz", spec.fc());
    row!("Sample rate", "{} Hz", spec.sr());
    row!("-3dB scale", "{:?}", order.cutoff_3db());
    if let Some(z_inf) = args.z_inf {
        row!("z_inf", "{:?}", z_inf);
    }
    print_section(&section, spec.sr())
}

fn cmd_shelf(args: ShelfArgs) -> Result<()> {
    let shelf = iir::hishelf(args.fc, args.db, args.slope, args.sr)?;
    header!("High shelf");
    row!("Corner", "{:.2} Hz", args.fc);
    row!("Gain", "{:.2} dB", args.db);
    row!("Slope", "{:.3}", args.slope);
    print_section(&shelf.section(), args.sr)
}

fn cmd_time(args: TimeArgs) -> Result<()> {
    let tables = args.data.tables()?;
    let design = tables.airfilt_design(args.time, args.sr)?;

    header!("Air lowpass after {}s", args.time);
    row!("Cutoff", "{:.3} Hz", design.fc);
    row!("Cutoff at reference rate", "{:.3} Hz", design.fc_ref);
    row!("Design frequency", "{:.3} Hz", design.fc_pre);
    row!("w0", "{:.6}", design.w0);
    row!("z_inf", "{:.6}", design.z_inf);
    print_section(&design.biquad.section(), f64::from(args.sr))
}

fn cmd_calibrate() -> Result<()> {
    header!("Bessel -3dB calibration");
    let mut worst: f64 = 0.0;
    for order in BesselOrder::ALL {
        let solved = order.solve_cutoff_3db()?;
        let error = (solved - order.cutoff_3db()).abs();
        worst = worst.max(error);
        row!(format!("Order {order} solved"), "{:?}", solved);
        row!(format!("Order {order} constant"), "{:?}", order.cutoff_3db());
        row!(format!("Order {order} error"), "{:.3e}", error);
    }
    if worst > CALIBRATION_TOL {
        return Err(SynthgenError::Calibration(format!(
            "constants disagree with the solver by {worst:e}"
        )));
    }
    Ok(())
}

fn cmd_show(args: ShowArgs) -> Result<()> {
    let tables = args.data.tables()?;
    let filter = AirFilter::design(&tables, args.sr)?;
    let sr = f64::from(args.sr);

    header!("Air filter, {AIR_FILTER_TIME}s at {} Hz", args.sr);
    row!("Lowpass cutoff", "{:.3} Hz", filter.lowpass.fc);
    row!("Lowpass z_inf", "{:.6}", filter.lowpass.z_inf);
    print_biquad(&filter.lowpass.biquad);

    header!("Shelf {SHELF_FREQ} Hz, {SHELF_GAIN_DB} dB, S={SHELF_SLOPE}");
    print_biquad(&filter.shelf);

    header!("Series");
    print_section(&filter.cascaded(), sr)?;

    header!("Kernel tables");
    for config in KernelConfig::all() {
        row!(
            config.array_name(),
            "{}",
            format!(
                "{} x {}",
                config.polys(),
                config.tier.degree().type_name()
            )
        );
    }
    Ok(())
}

fn print_biquad(bq: &Biquad) {
    row!("b0", "{:?}", bq.b0);
    row!("b1", "{:?}", bq.b1);
    row!("b2", "{:?}", bq.b2);
    row!("a1", "{:?}", bq.a1);
    row!("a2", "{:?}", bq.a2);
}

fn print_section(section: &Section, sr: f64) -> Result<()> {
    for (i, b) in section.b().iter().enumerate() {
        row!(format!("b{i}"), "{:?}", b);
    }
    for (i, a) in section.a().iter().enumerate().skip(1) {
        row!(format!("a{i}"), "{:?}", a);
    }
    for (i, pole) in section.poles()?.iter().enumerate() {
        row!(
            format!("pole {i}"),
            "{}",
            format!("{:.6} @ {:+.4} rad", pole.norm(), pole.arg())
        );
    }
    row!("Stable", "{}", section.is_stable()?);
    for f in PROBES.iter().filter(|f| **f < sr / 2.0) {
        row!(format!("Gain at {f} Hz"), "{:.3} dB", section.gain_db(*f, sr));
    }
    Ok(())
}
