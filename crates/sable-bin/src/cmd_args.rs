/*
 * Copyright (c) 2024.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

fn level_arg() -> Arg {
    Arg::new("level")
        .short('l')
        .long("level")
        .help("Compression level, -1 for the default, 0 stores, 1..=9 compress")
        .value_parser(value_parser!(i32).range(-1..=9))
        .default_value("-1")
        .allow_hyphen_values(true)
        .action(ArgAction::Set)
}

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("sable")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Encode PNG images and zlib streams, from scratch")
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("Raise log verbosity, repeat for more detail")
            .action(ArgAction::Count)
            .global(true))
        .arg(Arg::new("quiet")
            .short('q')
            .long("quiet")
            .help("Log errors only")
            .action(ArgAction::SetTrue)
            .global(true))
        .subcommand(Command::new("compress")
            .about("Compress stdin into a zlib stream on stdout")
            .arg(level_arg())
            .arg(Arg::new("window-bits")
                .short('w')
                .long("window-bits")
                .help("Window size exponent of the emitted stream")
                .value_parser(value_parser!(u8).range(9..=15))
                .default_value("15")
                .action(ArgAction::Set))
            .arg(Arg::new("strategy")
                .short('s')
                .long("strategy")
                .help("Block type selection")
                .value_parser(["store", "fixed", "dynamic", "auto"])
                .default_value("auto")
                .action(ArgAction::Set)))
        .subcommand(Command::new("decompress")
            .about("Decompress a zlib stream from stdin onto stdout")
            .after_help("Only streams using stored or fixed-huffman blocks decode,\n\
                         dynamic blocks are reported as unsupported."))
        .subcommand(Command::new("png")
            .about("Convert a 24-bit BMP file into a PNG file")
            .arg(Arg::new("in")
                .short('i')
                .long("input")
                .help("Input BMP file to read pixels from")
                .value_parser(value_parser!(PathBuf))
                .action(ArgAction::Set)
                .required(true))
            .arg(Arg::new("out")
                .short('o')
                .long("out")
                .help("Output PNG file to write")
                .value_parser(value_parser!(PathBuf))
                .action(ArgAction::Set)
                .required(true))
            .arg(level_arg()))
}
