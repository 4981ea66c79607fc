//! Gridcalc - command-mode driver for the spreadsheet recalculation engine

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use gridcalc_core::{Document, parse_cell_ref};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Apply cell edits to a workbook and print recalculated values.")]
struct Args {
    /// Workbook file (JSON). Created on save if it does not exist.
    file: Option<PathBuf>,

    /// Sheet to edit and read, created if missing.
    #[arg(long, value_name = "NAME")]
    sheet: Option<String>,

    /// Apply an edit, e.g. `-s "B1: =A1*2"` (repeatable).
    #[arg(short = 's', long = "set", value_name = "REF: INPUT")]
    set: Vec<String>,

    /// Read edits from stdin, one per line.
    #[arg(long)]
    stdin: bool,

    /// Print the display value of a cell (repeatable).
    #[arg(short = 'g', long = "get", value_name = "REF")]
    get: Vec<String>,

    /// Print the formula-bar text of a cell (repeatable).
    #[arg(long, value_name = "REF")]
    formula: Vec<String>,

    /// Print the serialized workbook.
    #[arg(long)]
    dump: bool,

    /// Config file to use instead of the user config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore the user config file.
    #[arg(long)]
    no_config: bool,

    /// Log edits and relinks at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let (options, warnings) = config::load_options(args.config.as_deref(), args.no_config);
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let mut doc = Document::with_file(args.file.clone(), options)
        .with_context(|| "Failed to open workbook")?;

    if let Some(name) = args.sheet.as_deref() {
        if doc.workbook.contains_sheet(name) {
            doc.set_active_sheet(name)?;
        } else {
            doc.add_sheet_named(name)?;
        }
    }
    let sheet = doc.active_sheet().to_string();

    let mut edits = args
        .set
        .iter()
        .map(|line| commands::parse_edit(line))
        .collect::<Result<Vec<_>>>()?;
    if args.stdin {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        edits.extend(commands::parse_edit_lines(&text)?);
    }

    for edit in &edits {
        let report = doc.on_cell_edited(&sheet, &edit.cell, &edit.input)?;
        if report.had_cycles() {
            let cells: Vec<String> = report.cycles.iter().map(|c| c.to_string()).collect();
            eprintln!("Warning: circular reference: {}", cells.join(", "));
        }
    }

    for reference in &args.get {
        let cell = parse_cell_ref(reference)?;
        println!("{}", doc.display_value(&sheet, &cell)?);
    }
    for reference in &args.formula {
        let cell = parse_cell_ref(reference)?;
        println!("{}", doc.formula_text(&sheet, &cell)?);
    }
    if args.dump {
        println!("{}", doc.serialize_workbook()?);
    }

    if !edits.is_empty() && doc.file_path.is_some() {
        let path = doc.save_file()?;
        tracing::info!(path = %path.display(), edits = edits.len(), "applied edits");
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
