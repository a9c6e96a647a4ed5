/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The sable command line shell.
//!
//! Wires stdin/stdout and the filesystem to the codec crates:
//! `compress` and `decompress` move zlib streams through the standard
//! pipes, `png` converts a BMP file into a PNG file.

use std::io::{Read, Write};
use std::process::exit;

use clap::ArgMatches;
use log::{error, info, LevelFilter};
use sable_bmp::BmpDecoder;
use sable_core::options::EncoderOptions;
use sable_deflate::{
    DeflateDecoder, DeflateEncoder, DeflateEncodingOptions, DeflateEncodingStrategy
};
use sable_png::PngEncoder;
use simple_logger::SimpleLogger;

mod cmd_args;

pub fn main() {
    let cmd = cmd_args::create_cmd_args();
    let options = cmd.get_matches();

    setup_logger(&options);

    let result = run_command(&options);

    if let Err(reason) = result {
        println!();
        error!(" Could not complete the requested operation, reason: {reason}");

        println!();
        exit(-1);
    }
}

fn setup_logger(options: &ArgMatches) {
    let level = if options.get_flag("quiet") {
        LevelFilter::Error
    } else {
        match options.get_count("verbose") {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace
        }
    };

    let _ = SimpleLogger::new().with_level(level).init();
}

fn run_command(options: &ArgMatches) -> Result<(), String> {
    match options.subcommand() {
        Some(("compress", matches)) => compress_stdin(matches),
        Some(("decompress", _)) => decompress_stdin(),
        Some(("png", matches)) => bmp_to_png(matches),
        _ => Err("no subcommand given, see --help for the available ones".to_string())
    }
}

fn read_stdin() -> Result<Vec<u8>, String> {
    let mut input = vec![];

    std::io::stdin()
        .lock()
        .read_to_end(&mut input)
        .map_err(|err| format!("could not read stdin: {err}"))?;
    Ok(input)
}

fn write_stdout(data: &[u8]) -> Result<(), String> {
    std::io::stdout()
        .lock()
        .write_all(data)
        .map_err(|err| format!("could not write stdout: {err}"))
}

fn compress_stdin(matches: &ArgMatches) -> Result<(), String> {
    let level = *matches.get_one::<i32>("level").unwrap_or(&-1);
    let window_bits = *matches.get_one::<u8>("window-bits").unwrap_or(&15);

    let strategy = match matches
        .get_one::<String>("strategy")
        .map(String::as_str)
        .unwrap_or("auto")
    {
        "store" => DeflateEncodingStrategy::NoCompression,
        "fixed" => DeflateEncodingStrategy::FixedHuffman,
        "dynamic" => DeflateEncodingStrategy::DynamicHuffman,
        _ => DeflateEncodingStrategy::Auto
    };

    let input = read_stdin()?;

    let options = DeflateEncodingOptions::default()
        .set_level(level)
        .set_window_bits(window_bits)
        .set_strategy(strategy);

    let output = DeflateEncoder::new_with_options(&input, options).encode_zlib();

    info!("compressed {} bytes into {}", input.len(), output.len());

    write_stdout(&output)
}

fn decompress_stdin() -> Result<(), String> {
    let input = read_stdin()?;

    let output = DeflateDecoder::new(&input)
        .decode_zlib()
        .map_err(|err| format!("{err:?}"))?;

    info!("decompressed {} bytes into {}", input.len(), output.len());

    write_stdout(&output)
}

fn bmp_to_png(matches: &ArgMatches) -> Result<(), String> {
    let input_path = matches
        .get_one::<std::path::PathBuf>("in")
        .ok_or("missing input path")?;
    let output_path = matches
        .get_one::<std::path::PathBuf>("out")
        .ok_or("missing output path")?;
    let level = *matches.get_one::<i32>("level").unwrap_or(&-1);

    let file = std::fs::read(input_path)
        .map_err(|err| format!("could not read {}: {err}", input_path.display()))?;

    let mut decoder = BmpDecoder::new(&file[..]);
    let pixels = decoder.decode().map_err(|err| format!("{err:?}"))?;
    let (width, height) = decoder
        .dimensions()
        .ok_or("decoder produced pixels without dimensions")?;

    let options = EncoderOptions::default()
        .set_width(width)
        .set_height(height)
        .set_level(level);

    let mut sink = vec![];
    PngEncoder::new(&pixels, options)
        .encode(&mut sink)
        .map_err(|err| format!("{err:?}"))?;

    // the output file only appears once the whole encode succeeded
    std::fs::write(output_path, &sink)
        .map_err(|err| format!("could not write {}: {err}", output_path.display()))?;

    info!(
        "wrote {} ({width}x{height}, {} bytes)",
        output_path.display(),
        sink.len()
    );

    Ok(())
}
