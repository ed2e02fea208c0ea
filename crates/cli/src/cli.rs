//! CLI argument definitions for riotfmt.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser)]
#[command(
    name = "riotfmt",
    version,
    about = "Decode, print and re-encode BIN documents and WAD archives",
    long_about = "Decode a BIN property tree or a WAD chunk table, print it, \
                  and write it back out.\n\n\
                  WAD archives of any version are written as version 3.1."
)]
pub struct Cli {
    /// Format of the source file.
    #[arg(value_enum, value_name = "MODE")]
    pub mode: ModeArg,

    /// File to decode.
    #[arg(value_name = "SRC")]
    pub src: PathBuf,

    /// Where to write the re-encoded file.
    #[arg(value_name = "DST")]
    pub dst: PathBuf,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Skip printing the decoded structure.
    #[arg(long = "no-print")]
    pub no_print: bool,

    /// Decode the written file again and compare it with the source.
    #[arg(long = "verify")]
    pub verify: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Wad,
    #[value(alias = "bin")]
    Inibin,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
