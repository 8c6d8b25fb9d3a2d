// abif: Decoder for Applied Biosystems AB1 trace files.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
use std::io::BufWriter;
use std::io::StdoutLock;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use abif::assembly::metadata::format_legacy_block;
use abif::chromatogram::ChromatogramBuilder;
use abif::nucleotide::format_sequence;
use abif::session::Ab1File;

mod cli;

type E = Box<dyn std::error::Error>;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    stderrlog::new()
    .module(module_path!())
    .quiet(false)
    .verbosity(log_max_level)
    .timestamp(stderrlog::Timestamp::Off)
    .init()
    .unwrap();
}

/// stderrlog verbosity: warnings by default, debug messages with `--verbose`.
fn verbosity(verbose: bool) -> usize {
    if verbose { 3 } else { 1 }
}

fn print_info<W: Write>(file: &Path, conn_out: &mut W) -> Result<(), E> {
    let metadata = Ab1File::new(file).session()?.metadata()?;
    writeln!(conn_out, "# {}", file.display())?;
    conn_out.write_all(format_legacy_block(&metadata).as_bytes())?;
    Ok(())
}

fn print_directory<W: Write>(file: &Path, conn_out: &mut W) -> Result<(), E> {
    let session = Ab1File::new(file).session()?;
    writeln!(conn_out, "# {} (format version {})", file.display(), session.header().version)?;
    for ((category, tag), records) in session.records().iter() {
        for desc in records.iter() {
            writeln!(
                conn_out, "{}\t{}\t{:?}\t{}\t{}\t{}\t{:?}",
                tag, desc.number, desc.data_type, desc.element_size,
                desc.element_count, desc.record_length, category,
            )?;
        }
    }
    Ok(())
}

fn print_bases<W: Write>(file: &Path, original: bool, conn_out: &mut W) -> Result<(), E> {
    let mut builder = ChromatogramBuilder::new();
    Ab1File::new(file).decode(&mut builder)?;
    let chromatogram = builder.build();

    let name = match chromatogram.name() {
        Some(name) => name.to_string(),
        None => file.file_stem().map(|x| x.to_string_lossy().to_string()).unwrap_or_default(),
    };

    let (bases, quality) = if original {
        let bases = chromatogram.ab1.original_basecalls.clone().unwrap_or_default();
        let quality = chromatogram.original_quality().unwrap_or_else(|| vec![0; bases.len()]);
        (bases, quality)
    } else {
        (chromatogram.basecalls.clone(), chromatogram.quality())
    };

    writeln!(conn_out, ">{}", name)?;
    writeln!(conn_out, "{}", format_sequence(&bases))?;
    let quality: Vec<String> = quality.iter().map(|x| x.to_string()).collect();
    writeln!(conn_out, "{}", quality.join(" "))?;
    Ok(())
}

/// Runs `f` on every input, logging failures. False if any input or the
/// final flush failed.
fn process_each<W, F>(input_files: &[PathBuf], conn_out: &mut W, mut f: F) -> bool
where
    W: Write,
    F: FnMut(&Path, &mut W) -> Result<(), E>,
{
    let mut failed = false;
    input_files.iter().for_each(|file| {
        if let Err(err) = f(file.as_path(), conn_out) {
            log::error!("{}: {}", file.display(), err);
            failed = true;
        }
    });
    if let Err(err) = conn_out.flush() {
        log::error!("could not write output: {}", err);
        failed = true;
    }
    !failed
}

fn run_each<F>(input_files: &[PathBuf], f: F)
where
    F: FnMut(&Path, &mut BufWriter<StdoutLock<'static>>) -> Result<(), E>,
{
    let mut conn_out = BufWriter::new(std::io::stdout().lock());
    if !process_each(input_files, &mut conn_out, f) {
        std::process::exit(1);
    }
}

fn main() {
    let cli = cli::Cli::parse();

    // Subcommands:
    match &cli.command {
        // Info
        Some(cli::Commands::Info {
            input_files,
            verbose,
        }) => {
            init_log(verbosity(*verbose));
            run_each(input_files, |file, conn_out| print_info(file, conn_out));
        },

        // Directory
        Some(cli::Commands::Directory {
            input_files,
            verbose,
        }) => {
            init_log(verbosity(*verbose));
            run_each(input_files, |file, conn_out| print_directory(file, conn_out));
        },

        // Bases
        Some(cli::Commands::Bases {
            input_files,
            original,
            verbose,
        }) => {
            init_log(verbosity(*verbose));
            run_each(input_files, |file, conn_out| print_bases(file, *original, conn_out));
        },
        None => {
            let _ = cli::Cli::command().print_help();
        },
    }
}
